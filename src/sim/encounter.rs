//! Room flow: room starts, wave composition, room clears and drafts
//!
//! A run is a sequence of rooms. Clearing a room opens an ability draft;
//! after boss rooms (and on even rooms) a relic draft follows. The UI resolves
//! drafts with [`choose_ability`] / [`choose_relic`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss;
use super::catalog::{AbilityKind, RelicKind, RelicPool};
use super::rng::SimRng;
use super::state::{AbilitySlot, Draft, GameState, SimPhase, arena_center};
use crate::events::SimEvent;

/// Rerolls allowed when a spawn lands too close to the player
pub const MAX_SPAWN_ATTEMPTS: u32 = 12;
/// Spawns keep this far from the arena edge
const SPAWN_MARGIN: f32 = 16.0;

/// Player decision at a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftChoice {
    /// Take the option at this index
    Pick(usize),
    Skip,
}

/// Reset everything and enter room 1
pub fn start_run(state: &mut GameState) {
    state.reset_run();
    log::info!("Starting run with seed {}", state.rng.seed());
    start_room(state);
}

/// Clear the arena and spawn the current room's encounter
pub fn start_room(state: &mut GameState) {
    state.enemies.clear();
    state.projectiles.clear();
    state.enemy_projectiles.clear();
    state.draft = None;

    let center = arena_center(&state.config);
    state.player.pos = center;
    state.player.intent = Vec2::ZERO;
    state.player.i_timer = 0;
    state.player.stun = 0;
    state.player.history.clear();
    state.phase = SimPhase::Play;

    let room = state.room;
    if state.config.is_boss_room(room) {
        let kind = state.config.boss_for_room(room);
        state.spawn_enemy(kind, boss::spawn_point(center));
        log::info!("Room {room}: boss {}", kind.name());
    } else {
        let count = 3 + room;
        let weights = state.config.tier_for_room(room).weights.clone();
        for _ in 0..count {
            let Some(kind) = state.rng.weighted(&weights) else {
                break;
            };
            let pos = spawn_position(state);
            state.spawn_enemy(kind, pos);
        }
        log::info!("Room {room}: {} enemies", state.enemies.len());
    }
    state.normalize_order();
}

/// Random arena position away from the player (bounded rerolls)
fn spawn_position(state: &mut GameState) -> Vec2 {
    let (w, h) = (state.config.arena_width, state.config.arena_height);
    let safe = state.config.spawn_safe_distance;
    let player = state.player.pos;
    let mut candidate = player;
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        candidate = Vec2::new(
            state.rng.range_f32(SPAWN_MARGIN.min(w / 2.0), (w - SPAWN_MARGIN).max(w / 2.0)),
            state.rng.range_f32(SPAWN_MARGIN.min(h / 2.0), (h - SPAWN_MARGIN).max(h / 2.0)),
        );
        if candidate.distance(player) >= safe {
            break;
        }
    }
    candidate
}

/// The room is done once no enemies remain
pub fn room_cleared(state: &GameState) -> bool {
    state.phase == SimPhase::Play && state.enemies.is_empty()
}

/// Close out the current room and open the next decision point
pub fn end_room(state: &mut GameState) {
    let room = state.room;
    state.stats.rooms_cleared += 1;
    state.projectiles.clear();
    state.enemy_projectiles.clear();
    state.emit(SimEvent::RoomCleared { room });
    log::info!("Room {room} cleared ({} kills so far)", state.stats.kills);

    if room >= state.config.max_rooms {
        log::info!("Victory after {} rooms", state.stats.rooms_cleared);
        state.phase = SimPhase::Victory;
        state.emit(SimEvent::Victory);
        return;
    }
    state.room += 1;
    open_ability_draft(state);
}

/// Draw `count` distinct items from `pool`
fn draw<T: Copy>(rng: &mut SimRng, mut pool: Vec<T>, count: usize) -> Vec<T> {
    let count = count.min(pool.len());
    for i in 0..count {
        let j = i + rng.index(pool.len() - i);
        pool.swap(i, j);
    }
    pool.truncate(count);
    pool
}

fn draft_size(state: &mut GameState) -> usize {
    let (min, max) = (state.config.draft_min, state.config.draft_max);
    state.rng.range(min as i32, max as i32).max(0) as usize
}

fn open_ability_draft(state: &mut GameState) {
    let pool: Vec<AbilityKind> = AbilityKind::ALL
        .into_iter()
        .filter(|k| !state.loadout.iter().flatten().any(|s| s.kind == *k))
        .collect();
    let size = draft_size(state);
    let options = draw(&mut state.rng, pool, size);
    if options.is_empty() {
        after_ability_draft(state);
        return;
    }
    log::info!(
        "Ability draft: {}",
        options.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
    );
    state.draft = Some(Draft::Ability { options });
    state.phase = SimPhase::AwaitingAbilityChoice;
}

fn after_ability_draft(state: &mut GameState) {
    if state.boss_reward_pending {
        state.boss_reward_pending = false;
        open_relic_draft(state, RelicPool::Legendary);
    } else if state.room % state.config.relic_draft_every.max(1) == 0 {
        open_relic_draft(state, RelicPool::Standard);
    } else {
        start_room(state);
    }
}

fn open_relic_draft(state: &mut GameState, pool: RelicPool) {
    let candidates: Vec<RelicKind> = RelicKind::ALL
        .into_iter()
        .filter(|k| k.def().pool == pool && !state.relics.has(*k))
        .collect();
    let size = draft_size(state);
    let options = draw(&mut state.rng, candidates, size);
    if options.is_empty() {
        start_room(state);
        return;
    }
    log::info!(
        "Relic draft ({pool:?}): {}",
        options.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
    );
    state.draft = Some(Draft::Relic {
        options,
        legendary: pool == RelicPool::Legendary,
    });
    state.phase = SimPhase::AwaitingRelicChoice;
}

/// Resolve a pending ability draft; returns false if the choice was rejected
pub fn choose_ability(state: &mut GameState, choice: DraftChoice) -> bool {
    let options = match (&state.phase, &state.draft) {
        (SimPhase::AwaitingAbilityChoice, Some(Draft::Ability { options })) => options.clone(),
        _ => {
            log::warn!("Ignoring ability choice outside an ability draft");
            return false;
        }
    };
    if let DraftChoice::Pick(index) = choice {
        let Some(&kind) = options.get(index) else {
            log::warn!("Ability choice {index} out of range ({} options)", options.len());
            return false;
        };
        let slot = state.selected_slot;
        log::info!("Slot {} <- {}", slot + 1, kind.name());
        state.loadout[slot] = Some(AbilitySlot::new(kind));
    }
    state.draft = None;
    after_ability_draft(state);
    true
}

/// Resolve a pending relic draft; returns false if the choice was rejected
pub fn choose_relic(state: &mut GameState, choice: DraftChoice) -> bool {
    let options = match (&state.phase, &state.draft) {
        (SimPhase::AwaitingRelicChoice, Some(Draft::Relic { options, .. })) => options.clone(),
        _ => {
            log::warn!("Ignoring relic choice outside a relic draft");
            return false;
        }
    };
    if let DraftChoice::Pick(index) = choice {
        let Some(&kind) = options.get(index) else {
            log::warn!("Relic choice {index} out of range ({} options)", options.len());
            return false;
        };
        apply_relic(state, kind);
    }
    state.draft = None;
    start_room(state);
    true
}

/// Resolve whichever draft is pending
pub fn choose(state: &mut GameState, choice: DraftChoice) -> bool {
    match state.phase {
        SimPhase::AwaitingAbilityChoice => choose_ability(state, choice),
        SimPhase::AwaitingRelicChoice => choose_relic(state, choice),
        _ => false,
    }
}

/// Grant a relic; returns false if it was already owned
pub fn apply_relic(state: &mut GameState, kind: RelicKind) -> bool {
    if !state.relics.insert(kind) {
        return false;
    }
    match kind {
        RelicKind::HeartSigil => {
            let hp_max = state.player.hp_max + 2;
            state.player.set_hp_max(hp_max);
            state.player.heal(2);
        }
        RelicKind::GlassCannon => {
            let hp_max = state.player.hp_max - 2;
            state.player.set_hp_max(hp_max);
        }
        _ => {}
    }
    log::info!("Relic acquired: {} ({})", kind.name(), kind.def().desc);
    state.emit(SimEvent::RelicAcquired { relic: kind });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::EnemyKind;

    #[test]
    fn test_room_composition_size_and_safety() {
        let state = GameState::new(77);
        assert_eq!(state.enemies.len(), 4);
        for enemy in &state.enemies {
            assert!(!enemy.kind.is_boss());
            assert!(enemy.pos.distance(state.player.pos) >= state.config.spawn_safe_distance);
        }
    }

    #[test]
    fn test_boss_room_spawns_single_boss() {
        let mut state = GameState::new(77);
        state.room = 4;
        start_room(&mut state);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].kind, EnemyKind::Warden);

        state.room = 12;
        start_room(&mut state);
        assert_eq!(state.enemies[0].kind, EnemyKind::VoidMonarch);
    }

    #[test]
    fn test_clear_opens_ability_draft() {
        let mut state = GameState::new(5);
        state.enemies.clear();
        end_room(&mut state);
        assert_eq!(state.room, 2);
        assert_eq!(state.phase, SimPhase::AwaitingAbilityChoice);
        let Some(Draft::Ability { options }) = &state.draft else {
            panic!("expected ability draft");
        };
        assert!((2..=3).contains(&options.len()));
        for kind in options {
            assert!(!AbilityKind::STARTERS.contains(kind));
        }
    }

    #[test]
    fn test_pick_replaces_selected_slot() {
        let mut state = GameState::new(5);
        end_room(&mut state);
        let Some(Draft::Ability { options }) = state.draft.clone() else {
            panic!("expected ability draft");
        };
        state.selected_slot = 1;
        assert!(choose_ability(&mut state, DraftChoice::Pick(0)));
        assert_eq!(state.loadout[1].map(|s| s.kind), Some(options[0]));
        assert_eq!(state.loadout[1].map(|s| s.cooldown), Some(0.0));
        // Room 2 is even: standard relic draft follows
        assert_eq!(state.phase, SimPhase::AwaitingRelicChoice);
        assert!(matches!(state.draft, Some(Draft::Relic { legendary: false, .. })));
    }

    #[test]
    fn test_out_of_range_pick_is_rejected() {
        let mut state = GameState::new(5);
        end_room(&mut state);
        assert!(!choose_ability(&mut state, DraftChoice::Pick(9)));
        assert_eq!(state.phase, SimPhase::AwaitingAbilityChoice);
        assert!(!choose_relic(&mut state, DraftChoice::Skip));
    }

    #[test]
    fn test_boss_reward_offers_legendary_relics() {
        let mut state = GameState::new(5);
        state.room = 4;
        start_room(&mut state);
        state.boss_reward_pending = true;
        state.enemies.clear();
        end_room(&mut state);
        assert_eq!(state.room, 5);
        assert!(choose(&mut state, DraftChoice::Skip));
        let Some(Draft::Relic { options, legendary }) = &state.draft else {
            panic!("expected relic draft");
        };
        assert!(*legendary);
        assert!(options.iter().all(|r| r.def().pool == RelicPool::Legendary));
        assert!(choose(&mut state, DraftChoice::Skip));
        assert_eq!(state.phase, SimPhase::Play);
        assert_eq!(state.room, 5);
    }

    #[test]
    fn test_odd_room_skips_relic_draft() {
        let mut state = GameState::new(5);
        state.room = 2;
        end_room(&mut state);
        assert_eq!(state.room, 3);
        choose(&mut state, DraftChoice::Skip);
        assert_eq!(state.phase, SimPhase::Play);
        assert!(state.draft.is_none());
    }

    #[test]
    fn test_final_room_clear_is_victory() {
        let mut state = GameState::new(5);
        state.room = state.config.max_rooms;
        end_room(&mut state);
        assert_eq!(state.phase, SimPhase::Victory);
        assert!(state.events.contains(&SimEvent::Victory));
    }

    #[test]
    fn test_relic_hp_adjustments() {
        let mut state = GameState::new(5);
        state.player.hp = 5;
        assert!(apply_relic(&mut state, RelicKind::HeartSigil));
        assert_eq!(state.player.hp_max, 10);
        assert_eq!(state.player.hp, 7);
        assert!(!apply_relic(&mut state, RelicKind::HeartSigil));
        apply_relic(&mut state, RelicKind::GlassCannon);
        assert_eq!(state.player.hp_max, 8);
        assert_eq!(state.player.hp, 7);
    }

    #[test]
    fn test_draw_is_distinct() {
        let mut rng = SimRng::new(3);
        let picked = draw(&mut rng, (0..10).collect(), 4);
        assert_eq!(picked.len(), 4);
        let mut sorted = picked.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 4);
        assert!(draw(&mut rng, Vec::<u8>::new(), 3).is_empty());
    }
}
