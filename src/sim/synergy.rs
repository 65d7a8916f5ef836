//! Synergy engine
//!
//! Casting two paired abilities within the recent-cast window activates (or
//! refreshes) a named synergy. Each kind has at most one live instance.

use glam::Vec2;

use super::catalog::{AbilityKind, SynergyKind, synergy_for};
use super::combat::{self, Element};
use super::state::{ActiveSynergy, GameState, RecentCast};
use crate::events::SimEvent;

/// Eclipse empowerment length
pub const ECLIPSE_TICKS: u32 = 200;
/// StormWalk shock chance per tick of movement
pub const STORM_WALK_CHANCE: f32 = 0.3;
pub const STORM_WALK_RADIUS: f32 = 16.0;

/// Whether a synergy is currently live
pub fn is_active(state: &GameState, kind: SynergyKind) -> bool {
    state.synergies.iter().any(|s| s.kind == kind)
}

/// Record a cast and activate every synergy it completes.
///
/// Returns the kinds activated (or refreshed) by this cast, in table order.
pub fn record_cast(state: &mut GameState, ability: AbilityKind) -> Vec<SynergyKind> {
    let now = state.time_ticks;
    let window = state.recent_cast_window();
    state.recent_casts.retain(|c| now.saturating_sub(c.tick) < window);

    let mut completed: Vec<SynergyKind> = state
        .recent_casts
        .iter()
        .filter_map(|c| synergy_for(c.ability, ability))
        .collect();
    completed.sort_by_key(|k| *k as usize);
    completed.dedup();

    state.recent_casts.push(RecentCast { ability, tick: now });

    for &kind in &completed {
        activate(state, kind);
    }
    completed
}

/// Start or refresh a synergy and run its activation hook
pub fn activate(state: &mut GameState, kind: SynergyKind) {
    let refreshed = is_active(state, kind);
    let remaining = state.synergy_duration();
    state.synergies.retain(|s| s.kind != kind);
    state.synergies.push(ActiveSynergy {
        kind,
        remaining,
        just_activated: true,
    });
    if refreshed {
        log::debug!("Synergy refreshed: {}", kind.name());
    } else {
        log::debug!("Synergy activated: {} ({})", kind.name(), kind.def().desc);
    }
    state.emit(SimEvent::SynergyActivated { synergy: kind });
    on_activate(state, kind);
}

/// Drop the activation edge left over from the previous tick
pub fn clear_edges(state: &mut GameState) {
    for synergy in state.synergies.iter_mut() {
        synergy.just_activated = false;
    }
}

/// Count down live synergies, expiring those that reach zero
pub fn tick_expiry(state: &mut GameState) {
    let mut expired = Vec::new();
    for synergy in state.synergies.iter_mut() {
        synergy.remaining = synergy.remaining.saturating_sub(1);
        if synergy.remaining == 0 {
            expired.push(synergy.kind);
        }
    }
    if expired.is_empty() {
        return;
    }
    state.synergies.retain(|s| s.remaining > 0);
    for kind in expired {
        log::debug!("Synergy expired: {}", kind.name());
        on_expire(state, kind);
        state.emit(SimEvent::SynergyExpired { synergy: kind });
    }
}

/// One-shot effect when a synergy becomes (or is re-made) active.
///
/// Also used by level-triggered cast bonuses, which repeat the activation
/// effect when the member ability is cast while the synergy is live.
pub fn on_activate(state: &mut GameState, kind: SynergyKind) {
    let pos = state.player.pos;
    let damage = state.base_damage();
    match kind {
        SynergyKind::Eclipse => {
            state.player.eclipse = ECLIPSE_TICKS;
        }
        SynergyKind::Aegis => {
            state.player.grant_iframes(180);
            state.player.heal(1);
        }
        SynergyKind::Thunderquake => {
            combat::slow_in_radius(state, pos, 35.0, 0.1, 60);
            combat::chain_lightning(state, pos, 5, damage, None);
        }
        SynergyKind::Frostquake => {
            combat::radial_explosion(state, pos, 30.0, damage, Element::Ice);
            combat::slow_in_radius(state, pos, 30.0, 0.2, 120);
        }
        SynergyKind::Fortress => {
            state.player.grant_iframes(200);
            state.player.shield_effect = state.player.shield_effect.max(200);
            combat::radial_explosion(state, pos, 20.0, damage, Element::Earth);
        }
        SynergyKind::PhaseGuard => {
            state.player.grant_iframes(90);
        }
        SynergyKind::LifeSpark => {
            state.player.heal(1);
        }
        // Continuous effects resolved on hit or on movement
        SynergyKind::Firestorm
        | SynergyKind::ShatterShock
        | SynergyKind::VenomRend
        | SynergyKind::StormWalk
        | SynergyKind::VoidStorm
        | SynergyKind::Hellfire
        | SynergyKind::VoidTornado
        | SynergyKind::PrismIce => {}
    }
}

fn on_expire(state: &mut GameState, kind: SynergyKind) {
    if kind == SynergyKind::Eclipse {
        state.player.eclipse = 0;
    }
}

/// StormWalk: moving may discharge a shock around the previous position
pub fn storm_walk(state: &mut GameState, previous: Vec2) {
    if !is_active(state, SynergyKind::StormWalk) || state.player.pos == previous {
        return;
    }
    if state.rng.chance(STORM_WALK_CHANCE) {
        combat::radial_explosion(state, previous, STORM_WALK_RADIUS, 1, Element::Shock);
    }
}
