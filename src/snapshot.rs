//! Read-only view of the simulation for the renderer and UI
//!
//! Built once per frame from `GameState`; nothing here feeds back into the
//! simulation.

use glam::Vec2;
use serde::Serialize;

use crate::sim::catalog::{AbilityKind, AbilityTag, EnemyKind, Rarity, RelicKind};
use crate::sim::state::{Draft, GameState, Owner, ProjectileKind, RunStats, SimPhase};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub hp: i32,
    pub hp_max: i32,
    pub invulnerable: bool,
    pub stunned: bool,
    pub shielded: bool,
    pub eclipse: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub slowed: bool,
    pub poisoned: bool,
    pub stunned: bool,
    pub shielded: bool,
    pub invisible: bool,
    pub clone: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub owner: Owner,
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub ability: AbilityKind,
    pub name: &'static str,
    pub tags: &'static [AbilityTag],
    /// Seconds until ready
    pub cooldown: f32,
    pub ready: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelicView {
    pub name: &'static str,
    pub desc: &'static str,
    pub rarity: Rarity,
}

impl RelicView {
    fn of(kind: RelicKind) -> Self {
        let def = kind.def();
        Self {
            name: def.name,
            desc: def.desc,
            rarity: def.rarity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SynergyView {
    pub name: &'static str,
    pub desc: &'static str,
    /// Ticks left
    pub remaining: u32,
    /// Set only on the tick the synergy was (re)activated
    pub just_activated: bool,
}

/// Boss health bar
#[derive(Debug, Clone, Serialize)]
pub struct BossView {
    pub name: &'static str,
    pub hp_fraction: f32,
    pub phase: u8,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: SimPhase,
    pub room: u32,
    pub max_rooms: u32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub loadout: Vec<Option<SlotView>>,
    pub selected_slot: usize,
    pub synergies: Vec<SynergyView>,
    pub relics: Vec<RelicView>,
    pub boss: Option<BossView>,
    pub draft: Option<Draft>,
    pub stats: RunStats,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let player = &state.player;
        let boss = state.boss().map(|enemy| BossView {
            name: enemy.kind.name(),
            hp_fraction: enemy.hp_fraction(),
            phase: enemy.boss_state().map_or(1, |b| b.phase),
        });

        Self {
            tick: state.time_ticks,
            phase: state.phase,
            room: state.room,
            max_rooms: state.config.max_rooms,
            player: PlayerView {
                pos: player.pos,
                hp: player.hp,
                hp_max: player.hp_max,
                invulnerable: player.i_timer > 0,
                stunned: player.stun > 0,
                shielded: player.shield_effect > 0,
                eclipse: player.eclipse > 0,
            },
            enemies: state
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    radius: e.radius,
                    hp: e.hp,
                    max_hp: e.max_hp,
                    slowed: e.slow_timer > 0,
                    poisoned: e.poison_timer > 0,
                    stunned: e.stun > 0,
                    shielded: e.is_shielded(),
                    invisible: e.is_invisible(),
                    clone: e.is_clone,
                })
                .collect(),
            projectiles: state
                .projectiles
                .iter()
                .chain(&state.enemy_projectiles)
                .map(|p| ProjectileView {
                    owner: p.owner,
                    kind: p.kind,
                    pos: p.pos,
                    radius: p.radius,
                })
                .collect(),
            loadout: state
                .loadout
                .iter()
                .map(|slot| {
                    slot.map(|s| SlotView {
                        ability: s.kind,
                        name: s.kind.name(),
                        tags: s.kind.def().tags,
                        cooldown: s.cooldown,
                        ready: s.cooldown <= 0.0,
                    })
                })
                .collect(),
            selected_slot: state.selected_slot,
            synergies: state
                .synergies
                .iter()
                .map(|s| SynergyView {
                    name: s.kind.name(),
                    desc: s.kind.def().desc,
                    remaining: s.remaining,
                    just_activated: s.just_activated,
                })
                .collect(),
            relics: state.relics.iter().map(RelicView::of).collect(),
            boss,
            draft: state.draft.clone(),
            stats: state.stats.clone(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::{RelicKind, SynergyKind};
    use crate::sim::{encounter, synergy};

    #[test]
    fn test_capture_new_run() {
        let state = GameState::new(42);
        let snap = Snapshot::capture(&state);
        assert_eq!(snap.room, 1);
        assert_eq!(snap.phase, SimPhase::Play);
        assert_eq!(snap.player.hp, 8);
        assert_eq!(snap.enemies.len(), state.enemies.len());
        assert_eq!(snap.loadout.len(), 3);
        assert!(snap.loadout.iter().flatten().all(|s| s.ready));
        assert!(snap.boss.is_none());
    }

    #[test]
    fn test_capture_boss_and_synergies() {
        let mut state = GameState::new(42);
        state.room = 4;
        encounter::start_room(&mut state);
        synergy::activate(&mut state, SynergyKind::Firestorm);
        encounter::apply_relic(&mut state, RelicKind::FleetBoots);

        let snap = Snapshot::capture(&state);
        let boss = snap.boss.as_ref().map(|b| (b.name, b.phase));
        assert_eq!(boss, Some(("The Warden", 1)));
        assert_eq!(snap.synergies.len(), 1);
        assert_eq!(snap.synergies[0].name, SynergyKind::Firestorm.name());
        let relics: Vec<_> = snap.relics.iter().map(|r| (r.name, r.rarity)).collect();
        assert_eq!(relics, vec![(RelicKind::FleetBoots.name(), Rarity::Common)]);
    }

    #[test]
    fn test_capture_tags_and_rarity() {
        let mut state = GameState::new(42);
        state.loadout[0] = Some(crate::sim::state::AbilitySlot::new(AbilityKind::Quake));
        encounter::apply_relic(&mut state, RelicKind::EchoChamber);

        let snap = Snapshot::capture(&state);
        let quake = snap.loadout[0].as_ref().map(|s| s.tags);
        assert_eq!(quake, Some(&[AbilityTag::Earth, AbilityTag::Control][..]));

        let value: serde_json::Value = serde_json::from_str(&snap.to_json()).unwrap();
        assert_eq!(value["loadout"][0]["tags"][1], "Control");
        assert_eq!(value["relics"][0]["rarity"], "Legendary");
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(42);
        let json = Snapshot::capture(&state).to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["room"], 1);
        assert_eq!(value["phase"], "Play");
        assert!(value["enemies"].is_array());
    }
}
