//! Discrete simulation events
//!
//! Fire-and-forget tags for the audio and UI collaborators. The simulation
//! queues them during a tick; the driver drains them once per frame.

use serde::{Deserialize, Serialize};

use crate::sim::catalog::{AbilityKind, EnemyKind, RelicKind, SynergyKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// An ability was cast from a loadout slot
    Cast { ability: AbilityKind },
    /// An enemy took damage
    Hit { enemy_id: u32 },
    /// An enemy died
    Kill { enemy_id: u32, kind: EnemyKind },
    /// The player lost health
    Hurt { damage: i32 },
    /// The player gained a relic
    RelicAcquired { relic: RelicKind },
    SynergyActivated { synergy: SynergyKind },
    SynergyExpired { synergy: SynergyKind },
    /// A boss advanced to a new attack phase (2 or 3)
    BossPhase { kind: EnemyKind, phase: u8 },
    BossDefeated { kind: EnemyKind },
    /// A bomber detonated
    Detonation { enemy_id: u32 },
    RoomCleared { room: u32 },
    Victory,
    Defeat,
}

impl SimEvent {
    /// Short tag used by the audio collaborator to pick a cue
    pub fn cue(&self) -> &'static str {
        match self {
            SimEvent::Cast { .. } => "cast",
            SimEvent::Hit { .. } => "hit",
            SimEvent::Kill { .. } => "kill",
            SimEvent::Hurt { .. } => "hurt",
            SimEvent::RelicAcquired { .. } => "relic",
            SimEvent::SynergyActivated { .. } => "synergy",
            SimEvent::SynergyExpired { .. } => "synergy_fade",
            SimEvent::BossPhase { .. } => "boss_phase",
            SimEvent::BossDefeated { .. } => "boss_defeated",
            SimEvent::Detonation { .. } => "explosion",
            SimEvent::RoomCleared { .. } => "room_clear",
            SimEvent::Victory => "victory",
            SimEvent::Defeat => "defeat",
        }
    }
}
