//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod ai;
pub mod boss;
pub mod cast;
pub mod catalog;
pub mod collision;
pub mod combat;
pub mod encounter;
pub mod rng;
pub mod state;
pub mod synergy;
pub mod tick;

pub use catalog::{AbilityKind, EnemyKind, RelicKind, SynergyKind};
pub use encounter::{DraftChoice, choose, choose_ability, choose_relic};
pub use rng::SimRng;
pub use state::{
    AbilitySlot, Draft, Enemy, GameState, Player, Projectile, ProjectileKind, RunStats, SimPhase,
};
pub use tick::{TickInput, tick};
