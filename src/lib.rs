//! Arcane Rooms - combat simulation core for a room-based arena roguelike
//!
//! Core modules:
//! - `sim`: Deterministic simulation (abilities, synergies, enemy AI, combat, rooms)
//! - `config`: Data-driven balance tables loaded from JSON
//! - `events`: Discrete event tags for the audio/UI collaborators
//! - `snapshot`: Read-only view handed to the renderer each frame

pub mod config;
pub mod events;
pub mod sim;
pub mod snapshot;

pub use config::{ContentError, SimConfig};
pub use events::SimEvent;
pub use snapshot::Snapshot;

use glam::Vec2;

/// Engine constants (balance data lives in `SimConfig`)
pub mod consts {
    /// Fixed simulation timestep (60 Hz, all tick-based timers assume this)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default arena dimensions
    pub const ARENA_WIDTH: f32 = 320.0;
    pub const ARENA_HEIGHT: f32 = 240.0;
    /// Player is kept this far from the arena edge
    pub const PLAYER_EDGE_MARGIN: f32 = 8.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 4.0;
    /// Number of recent player positions kept for boss aim prediction
    pub const POSITION_HISTORY: usize = 10;

    /// Projectile hit radii
    pub const PLAYER_PROJECTILE_RADIUS: f32 = 4.0;
    pub const ENEMY_PROJECTILE_RADIUS: f32 = 2.0;
    /// Default lifetime for player projectiles (ticks)
    pub const PROJECTILE_LIFE: u32 = 120;

    /// Number of loadout slots
    pub const SLOT_COUNT: usize = 3;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Vector of the given length pointing along `theta`
#[inline]
pub fn from_angle(theta: f32, length: f32) -> Vec2 {
    Vec2::new(length * theta.cos(), length * theta.sin())
}

/// Heading from `from` toward `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
