//! Ability casting and cooldowns

use std::f32::consts::TAU;

use glam::Vec2;

use super::catalog::{AbilityKind, RelicKind, SynergyKind};
use super::combat::{self, Element};
use super::state::{GameState, Owner, Projectile, ProjectileKind, SimPhase};
use super::synergy::{self, is_active};
use crate::angle_to;
use crate::consts::SLOT_COUNT;
use crate::events::SimEvent;

/// Chance for Echo Chamber to repeat a cast effect
pub const ECHO_CHANCE: f32 = 0.1;
pub const SHIELD_IFRAMES: u32 = 90;
/// Shield i-frames with the PhaseGuard relic
pub const SHIELD_IFRAMES_GUARDED: u32 = 140;
pub const BLINK_DISTANCE: f32 = 24.0;
pub const BLINK_IFRAMES: u32 = 50;
pub const QUAKE_RADIUS: f32 = 28.0;
pub const VOID_NOVA_BOLTS: u32 = 16;
pub const RADIANT_ARC_LIFE: u32 = 90;

const FIREBOLT_SPEED: f32 = 132.0;
const ICE_SPEED: f32 = 108.0;
const WIND_SPEED: f32 = 168.0;
const VOID_SPEED: f32 = 90.0;
const RADIANT_SPEED: f32 = 120.0;
const POISON_SPEED: f32 = 150.0;
const STORM_WALK_PATH_RADIUS: f32 = 16.0;

/// Attempt to cast the ability in `slot`.
///
/// A no-op (returning false) when the slot is out of range or empty, still
/// cooling down, or the run is not in play.
pub fn try_cast(state: &mut GameState, slot: usize) -> bool {
    if state.phase != SimPhase::Play || slot >= SLOT_COUNT {
        return false;
    }
    let Some(ability) = state.loadout[slot] else {
        return false;
    };
    if ability.cooldown > 0.0 {
        return false;
    }
    let kind = ability.kind;

    let fresh = synergy::record_cast(state, kind);
    cast_effect(state, kind, &fresh);
    if state.has_relic(RelicKind::EchoChamber) && state.rng.chance(ECHO_CHANCE) {
        log::debug!("Echo Chamber repeats {}", kind.name());
        cast_effect(state, kind, &fresh);
    }

    let cooldown = kind.def().cooldown * state.relics.cooldown_scalar(kind);
    if let Some(entry) = state.loadout[slot].as_mut() {
        entry.cooldown = cooldown.max(0.0);
    }
    state.emit(SimEvent::Cast { ability: kind });
    true
}

/// Count every slot's cooldown down by `dt` seconds
pub fn tick_cooldowns(state: &mut GameState, dt: f32) {
    for slot in state.loadout.iter_mut().flatten() {
        slot.cooldown = (slot.cooldown - dt).max(0.0);
    }
}

/// Heading toward the nearest live enemy, or +x with none
fn aim(state: &GameState) -> f32 {
    state
        .nearest_enemy(state.player.pos, None)
        .map(|idx| angle_to(state.player.pos, state.enemies[idx].pos))
        .unwrap_or(0.0)
}

/// A level-triggered bonus applies when the synergy is live and was not
/// switched on by this very cast
fn bonus_active(state: &GameState, kind: SynergyKind, fresh: &[SynergyKind]) -> bool {
    is_active(state, kind) && !fresh.contains(&kind)
}

fn cast_effect(state: &mut GameState, kind: AbilityKind, fresh: &[SynergyKind]) {
    let pos = state.player.pos;
    let damage = state.base_damage();
    let dir = aim(state);

    match kind {
        AbilityKind::Firebolt => {
            state.spawn_projectile(Projectile::new(
                Owner::Player,
                ProjectileKind::Fire,
                pos,
                dir,
                FIREBOLT_SPEED,
                damage,
            ));
        }
        AbilityKind::IceShard => {
            state.spawn_projectile(
                Projectile::new(Owner::Player, ProjectileKind::Ice, pos, dir, ICE_SPEED, damage).with_slow(0.6, 80),
            );
        }
        AbilityKind::Lightning => {
            combat::chain_lightning(state, pos, 3, damage + 1, None);
        }
        AbilityKind::WindSlash => {
            state.spawn_projectile(
                Projectile::new(Owner::Player, ProjectileKind::Wind, pos, dir, WIND_SPEED, damage).with_pierce(2),
            );
        }
        AbilityKind::Shield => {
            let iframes = if state.has_relic(RelicKind::PhaseGuard) {
                SHIELD_IFRAMES_GUARDED
            } else {
                SHIELD_IFRAMES
            };
            state.player.grant_iframes(iframes);
            state.player.shield_effect = state.player.shield_effect.max(iframes);
            for synergy in [SynergyKind::Aegis, SynergyKind::Fortress] {
                if bonus_active(state, synergy, fresh) {
                    synergy::on_activate(state, synergy);
                }
            }
        }
        AbilityKind::Heal => {
            state.player.heal(2);
            if bonus_active(state, SynergyKind::LifeSpark, fresh) {
                combat::chain_lightning(state, pos, 1, damage, None);
            }
        }
        AbilityKind::VoidNova => {
            let pierce = u32::from(bonus_active(state, SynergyKind::VoidTornado, fresh));
            for i in 0..VOID_NOVA_BOLTS {
                let angle = i as f32 / VOID_NOVA_BOLTS as f32 * TAU;
                state.spawn_projectile(
                    Projectile::new(Owner::Player, ProjectileKind::Void, pos, angle, VOID_SPEED, damage)
                        .with_pierce(pierce),
                );
            }
            if bonus_active(state, SynergyKind::Eclipse, fresh) {
                synergy::on_activate(state, SynergyKind::Eclipse);
            }
        }
        AbilityKind::RadiantArc => {
            state.spawn_projectile(
                Projectile::new(Owner::Player, ProjectileKind::Radiant, pos, dir, RADIANT_SPEED, damage)
                    .with_pierce(1)
                    .with_life(RADIANT_ARC_LIFE)
                    .boomerang(),
            );
        }
        AbilityKind::PoisonDart => {
            state.spawn_projectile(
                Projectile::new(Owner::Player, ProjectileKind::Poison, pos, dir, POISON_SPEED, damage)
                    .with_poison(1, 160),
            );
        }
        AbilityKind::Quake => {
            combat::radial_explosion(state, pos, QUAKE_RADIUS, damage, Element::Earth);
            if state.has_relic(RelicKind::Grounded) {
                combat::slow_in_radius(state, pos, 24.0, 0.1, 50);
            }
            for synergy in [SynergyKind::Thunderquake, SynergyKind::Frostquake] {
                if bonus_active(state, synergy, fresh) {
                    synergy::on_activate(state, synergy);
                }
            }
        }
        AbilityKind::Blink => {
            let heading = if state.player.intent.length_squared() > f32::EPSILON {
                state.player.intent.normalize()
            } else {
                Vec2::X
            };
            let radius = state.player.radius;
            let target = state.clamp_to_arena(pos + heading * BLINK_DISTANCE, radius);
            state.player.pos = target;
            state.player.grant_iframes(BLINK_IFRAMES);
            if bonus_active(state, SynergyKind::StormWalk, fresh) {
                combat::line_strike(state, pos, target, STORM_WALK_PATH_RADIUS, 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::EnemyKind;
    use crate::sim::state::AbilitySlot;

    fn empty_state() -> GameState {
        let mut state = GameState::new(21);
        state.enemies.clear();
        state.events.clear();
        state
    }

    fn cast_events(state: &GameState) -> usize {
        state
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::Cast { .. }))
            .count()
    }

    #[test]
    fn test_cast_sets_cooldown_and_emits() {
        let mut state = empty_state();
        assert!(try_cast(&mut state, 0));
        assert_eq!(state.loadout[0].map(|s| s.cooldown), Some(2.0));
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(cast_events(&state), 1);
    }

    #[test]
    fn test_cast_while_cooling_is_noop() {
        let mut state = empty_state();
        assert!(try_cast(&mut state, 0));
        tick_cooldowns(&mut state, 1.0);
        assert!(!try_cast(&mut state, 0));
        assert_eq!(cast_events(&state), 1);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_invalid_slots_are_ignored() {
        let mut state = empty_state();
        state.loadout[2] = None;
        assert!(!try_cast(&mut state, 2));
        assert!(!try_cast(&mut state, 7));
        state.phase = SimPhase::Paused;
        assert!(!try_cast(&mut state, 0));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_cooldown_clamps_at_zero() {
        let mut state = empty_state();
        try_cast(&mut state, 1);
        for _ in 0..500 {
            tick_cooldowns(&mut state, 1.0 / 60.0);
        }
        assert_eq!(state.loadout[1].map(|s| s.cooldown), Some(0.0));
    }

    #[test]
    fn test_relic_cooldown_scalars() {
        let mut state = empty_state();
        state.relics.insert(RelicKind::ShieldBattery);
        try_cast(&mut state, 2);
        assert_eq!(state.loadout[2].map(|s| s.cooldown), Some(3.0));
        try_cast(&mut state, 0);
        assert_eq!(state.loadout[0].map(|s| s.cooldown), Some(2.0));
    }

    #[test]
    fn test_aims_at_nearest_enemy() {
        let mut state = empty_state();
        let below = state.player.pos + Vec2::new(0.0, 50.0);
        state.spawn_enemy(EnemyKind::Grunt, below);
        try_cast(&mut state, 0);
        let vel = state.projectiles[0].vel;
        assert!(vel.x.abs() < 1e-3 && vel.y > 0.0);
    }

    #[test]
    fn test_lightning_with_empty_field() {
        let mut state = empty_state();
        state.loadout[0] = Some(AbilitySlot::new(AbilityKind::Lightning));
        assert!(try_cast(&mut state, 0));
        assert_eq!(cast_events(&state), 1);
    }

    #[test]
    fn test_blink_moves_along_intent_with_iframes() {
        let mut state = empty_state();
        state.loadout[0] = Some(AbilitySlot::new(AbilityKind::Blink));
        state.player.intent = Vec2::new(0.0, -1.0);
        let start = state.player.pos;
        try_cast(&mut state, 0);
        assert!((state.player.pos - (start - Vec2::new(0.0, BLINK_DISTANCE))).length() < 1e-4);
        assert_eq!(state.player.i_timer, BLINK_IFRAMES);
    }

    #[test]
    fn test_cast_bonus_skipped_on_activating_cast() {
        let mut state = empty_state();
        state.loadout = [
            Some(AbilitySlot::new(AbilityKind::Shield)),
            Some(AbilitySlot::new(AbilityKind::Heal)),
            None,
        ];
        state.player.hp = 2;
        try_cast(&mut state, 0);
        try_cast(&mut state, 1);
        // Heal 2 plus Aegis activation heal 1
        assert_eq!(state.player.hp, 5);
        assert!(is_active(&state, SynergyKind::Aegis));

        // Shield again while Aegis is live: level-triggered bonus heals 1
        state.loadout[0] = Some(AbilitySlot::new(AbilityKind::Shield));
        state.synergies.retain(|s| s.kind == SynergyKind::Aegis);
        state.recent_casts.clear();
        try_cast(&mut state, 0);
        assert_eq!(state.player.hp, 6);
    }

    #[test]
    fn test_void_tornado_adds_pierce() {
        let mut state = empty_state();
        synergy::activate(&mut state, SynergyKind::VoidTornado);
        state.loadout[0] = Some(AbilitySlot::new(AbilityKind::VoidNova));
        state.recent_casts.clear();
        try_cast(&mut state, 0);
        assert_eq!(state.projectiles.len(), VOID_NOVA_BOLTS as usize);
        assert!(state.projectiles.iter().all(|p| p.pierce == 1));
    }
}
