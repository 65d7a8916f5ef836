//! Fixed timestep simulation tick
//!
//! Core loop that advances the run deterministically. Every subsystem runs in
//! a fixed order against the single `GameState`.

use glam::Vec2;

use super::encounter::{self, DraftChoice};
use super::state::{GameState, SimPhase};
use super::{ai, cast, combat, synergy};
use crate::consts::*;
use crate::from_angle;

/// Enemies closer than this make the idle pilot back off
const IDLE_FLEE_DISTANCE: f32 = 60.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction; longer than 1 is normalized
    pub movement: Vec2,
    /// Select a loadout slot (0-based)
    pub select_slot: Option<usize>,
    /// Cast the selected slot
    pub cast: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - AI plays the run
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        match state.phase {
            SimPhase::Play => {
                state.phase = SimPhase::Paused;
                return;
            }
            SimPhase::Paused => state.phase = SimPhase::Play,
            _ => {}
        }
    }

    let mut input = input.clone();
    if input.idle_mode {
        if matches!(
            state.phase,
            SimPhase::AwaitingAbilityChoice | SimPhase::AwaitingRelicChoice
        ) {
            encounter::choose(state, DraftChoice::Pick(0));
        }
        if state.phase == SimPhase::Play {
            pilot(state, &mut input);
        }
    }

    if state.phase != SimPhase::Play {
        return;
    }
    state.time_ticks += 1;
    synergy::clear_edges(state);

    // Slot selection and casting
    if let Some(slot) = input.select_slot {
        if slot < SLOT_COUNT {
            state.selected_slot = slot;
        } else {
            log::warn!("Ignoring selection of slot {slot}");
        }
    }
    if input.cast {
        let slot = state.selected_slot;
        cast::try_cast(state, slot);
    }

    move_player(state, input.movement, dt);
    tick_player_timers(state);
    cast::tick_cooldowns(state, dt);
    synergy::tick_expiry(state);

    combat::tick_enemy_status(state);
    ai::run(state, dt);
    combat::separate_enemies(state);
    combat::update_player_projectiles(state, dt);
    combat::update_enemy_projectiles(state, dt);
    combat::contact_damage(state);
    combat::resolve_deaths(state);
    state.normalize_order();

    if encounter::room_cleared(state) {
        encounter::end_room(state);
    }
}

fn move_player(state: &mut GameState, movement: Vec2, dt: f32) {
    let intent = if !movement.is_finite() {
        Vec2::ZERO
    } else if movement.length_squared() > 1.0 {
        movement.normalize()
    } else {
        movement
    };
    state.player.intent = intent;

    let previous = state.player.pos;
    if state.player.stun == 0 {
        let speed = state.player.speed * state.relics.speed_scalar();
        let target = state.player.pos + intent * speed * dt;
        state.player.pos = state.clamp_to_arena(target, PLAYER_EDGE_MARGIN);
    }
    state.player.record_position();
    synergy::storm_walk(state, previous);
}

fn tick_player_timers(state: &mut GameState) {
    let player = &mut state.player;
    player.i_timer = player.i_timer.saturating_sub(1);
    player.eclipse = player.eclipse.saturating_sub(1);
    player.stun = player.stun.saturating_sub(1);
    player.shield_effect = player.shield_effect.saturating_sub(1);
}

/// Demo pilot: kite the nearest enemy and cast whatever is ready
fn pilot(state: &GameState, input: &mut TickInput) {
    let pos = state.player.pos;
    input.movement = match state.nearest_enemy(pos, None) {
        Some(idx) => {
            let enemy = state.enemies[idx].pos;
            let away = ai::flee_direction(pos, enemy);
            if enemy.distance(pos) < IDLE_FLEE_DISTANCE {
                from_angle(away, 1.0)
            } else {
                // Strafe around the target
                from_angle(away + std::f32::consts::FRAC_PI_2, 1.0)
            }
        }
        None => Vec2::ZERO,
    };

    let ready = state
        .loadout
        .iter()
        .position(|slot| slot.is_some_and(|s| s.cooldown <= 0.0));
    if let Some(slot) = ready {
        input.select_slot = Some(slot);
        input.cast = true;
    }
}
