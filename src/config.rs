//! Simulation balance configuration
//!
//! Loaded once at content-load time. Any structural problem (including an
//! unknown archetype tag in a spawn table) is rejected here so the runtime
//! never has to recover from bad content.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::sim::catalog::EnemyKind;

/// Errors raised while loading or validating content
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Malformed JSON or an unrecognized tag (e.g. unknown archetype)
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("arena must have positive size, got {width}x{height}")]
    InvalidArena { width: f32, height: f32 },

    #[error("player base hp must be positive, got {0}")]
    InvalidPlayerHp(i32),

    #[error("max_rooms ({max_rooms}) and boss_interval ({boss_interval}) must both be at least 1")]
    InvalidRoomLayout { max_rooms: u32, boss_interval: u32 },

    #[error("draft size range {min}..={max} is empty or zero")]
    InvalidDraftSize { min: usize, max: usize },

    #[error("no spawn tier covers room 1")]
    NoTierForFirstRoom,

    #[error("spawn tiers must be sorted by min_room (tier starting at room {0} is out of order)")]
    UnsortedTiers(u32),

    #[error("spawn tier starting at room {0} has no positive weights")]
    EmptyTier(u32),

    #[error("boss archetype {kind:?} cannot appear in the spawn tier starting at room {min_room}")]
    BossInSpawnTier { min_room: u32, kind: EnemyKind },
}

/// Weighted archetype table used from `min_room` onward
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTier {
    pub min_room: u32,
    pub weights: Vec<(EnemyKind, u32)>,
}

/// Tunable simulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,

    // === Player ===
    pub player_hp: i32,
    /// Pixels per second
    pub player_speed: f32,
    /// i-frames granted after taking a hit
    pub invulnerability_ticks: u32,

    // === Contact damage ===
    pub contact_damage: i32,
    /// Per-enemy cooldown before the same enemy can hurt the player again
    pub contact_cooldown_ticks: u32,

    // === Synergies ===
    pub recent_cast_window_ticks: u32,
    pub synergy_duration_ticks: u32,

    // === Rooms ===
    pub max_rooms: u32,
    pub boss_interval: u32,
    /// A standard relic draft follows the ability draft when the new room index
    /// is a multiple of this
    pub relic_draft_every: u32,
    pub draft_min: usize,
    pub draft_max: usize,
    /// Spawns closer than this to the player are rerolled
    pub spawn_safe_distance: f32,
    pub spawn_tiers: Vec<SpawnTier>,
}

impl Default for SimConfig {
    fn default() -> Self {
        use EnemyKind::*;
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,

            player_hp: 8,
            player_speed: 72.0,
            invulnerability_ticks: 60,

            contact_damage: 1,
            contact_cooldown_ticks: 90,

            recent_cast_window_ticks: 180,
            synergy_duration_ticks: 300,

            max_rooms: 12,
            boss_interval: 4,
            relic_draft_every: 2,
            draft_min: 2,
            draft_max: 3,
            spawn_safe_distance: 32.0,
            spawn_tiers: vec![
                SpawnTier {
                    min_room: 1,
                    weights: vec![(Grunt, 70), (Archer, 20), (Bomber, 10)],
                },
                SpawnTier {
                    min_room: 3,
                    weights: vec![(Grunt, 40), (Archer, 20), (Bomber, 15), (Dasher, 15), (OrbitMage, 10)],
                },
                SpawnTier {
                    min_room: 4,
                    weights: vec![
                        (Grunt, 25),
                        (Archer, 20),
                        (Dasher, 15),
                        (OrbitMage, 15),
                        (Splitter, 15),
                        (Tank, 10),
                    ],
                },
                SpawnTier {
                    min_room: 7,
                    weights: vec![(Dasher, 20), (OrbitMage, 20), (Splitter, 20), (Tank, 20), (Sniper, 20)],
                },
                SpawnTier {
                    min_room: 9,
                    weights: vec![
                        (Dasher, 15),
                        (OrbitMage, 10),
                        (Splitter, 10),
                        (Tank, 10),
                        (Sniper, 15),
                        (Phantom, 10),
                        (Healer, 8),
                        (Shielder, 7),
                        (Trickster, 10),
                        (Voidling, 5),
                    ],
                },
            ],
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Loaded config: {} rooms, boss every {}, {} spawn tiers",
            config.max_rooms,
            config.boss_interval,
            config.spawn_tiers.len()
        );
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> String {
        // A plain data struct with string-keyed enums always serializes
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject structurally invalid content
    pub fn validate(&self) -> Result<(), ContentError> {
        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return Err(ContentError::InvalidArena {
                width: self.arena_width,
                height: self.arena_height,
            });
        }
        if self.player_hp <= 0 {
            return Err(ContentError::InvalidPlayerHp(self.player_hp));
        }
        if self.max_rooms == 0 || self.boss_interval == 0 {
            return Err(ContentError::InvalidRoomLayout {
                max_rooms: self.max_rooms,
                boss_interval: self.boss_interval,
            });
        }
        if self.draft_min == 0 || self.draft_min > self.draft_max {
            return Err(ContentError::InvalidDraftSize {
                min: self.draft_min,
                max: self.draft_max,
            });
        }
        match self.spawn_tiers.first() {
            Some(tier) if tier.min_room <= 1 => {}
            _ => return Err(ContentError::NoTierForFirstRoom),
        }
        let mut last_min = 0;
        for tier in &self.spawn_tiers {
            if tier.min_room < last_min {
                return Err(ContentError::UnsortedTiers(tier.min_room));
            }
            last_min = tier.min_room;
            if tier.weights.iter().all(|(_, w)| *w == 0) {
                return Err(ContentError::EmptyTier(tier.min_room));
            }
            if let Some((kind, _)) = tier.weights.iter().find(|(k, _)| k.is_boss()) {
                return Err(ContentError::BossInSpawnTier {
                    min_room: tier.min_room,
                    kind: *kind,
                });
            }
        }
        Ok(())
    }

    /// Spawn tier in effect for a room (the last tier whose `min_room` is reached)
    pub fn tier_for_room(&self, room: u32) -> &SpawnTier {
        self.spawn_tiers
            .iter()
            .rev()
            .find(|t| t.min_room <= room)
            .unwrap_or(&self.spawn_tiers[0])
    }

    /// Whether `room` hosts a boss
    pub fn is_boss_room(&self, room: u32) -> bool {
        room == self.max_rooms || room % self.boss_interval == 0
    }

    /// Boss for a boss room: the final room always gets the final boss
    pub fn boss_for_room(&self, room: u32) -> EnemyKind {
        if room >= self.max_rooms {
            return EnemyKind::VoidMonarch;
        }
        match room / self.boss_interval {
            0 | 1 => EnemyKind::Warden,
            _ => EnemyKind::EclipseTwin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = SimConfig::from_json(r#"{ "max_rooms": 8, "player_hp": 5 }"#).unwrap();
        assert_eq!(config.max_rooms, 8);
        assert_eq!(config.player_hp, 5);
        assert_eq!(config.boss_interval, 4);
        assert_eq!(config.spawn_tiers.len(), 5);
    }

    #[test]
    fn test_unknown_archetype_is_rejected_at_load() {
        let json = r#"{ "spawn_tiers": [ { "min_room": 1, "weights": [["grunt", 5], ["dragon", 5]] } ] }"#;
        let err = SimConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ContentError::Parse(_)), "got {err}");
    }

    #[test]
    fn test_boss_in_spawn_tier_is_rejected() {
        let json = r#"{ "spawn_tiers": [ { "min_room": 1, "weights": [["warden", 1]] } ] }"#;
        let err = SimConfig::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            ContentError::BossInSpawnTier { kind: EnemyKind::Warden, .. }
        ));
    }

    #[test]
    fn test_structural_errors() {
        let mut config = SimConfig::default();
        config.draft_min = 4;
        assert!(matches!(config.validate(), Err(ContentError::InvalidDraftSize { .. })));

        let mut config = SimConfig::default();
        config.spawn_tiers[0].min_room = 2;
        assert!(matches!(config.validate(), Err(ContentError::NoTierForFirstRoom)));

        let mut config = SimConfig::default();
        config.spawn_tiers[1].weights.iter_mut().for_each(|w| w.1 = 0);
        assert!(matches!(config.validate(), Err(ContentError::EmptyTier(3))));
    }

    #[test]
    fn test_tier_and_boss_layout() {
        let config = SimConfig::default();
        assert_eq!(config.tier_for_room(1).min_room, 1);
        assert_eq!(config.tier_for_room(2).min_room, 1);
        assert_eq!(config.tier_for_room(6).min_room, 4);
        assert_eq!(config.tier_for_room(11).min_room, 9);

        assert!(!config.is_boss_room(3));
        assert!(config.is_boss_room(4));
        assert_eq!(config.boss_for_room(4), EnemyKind::Warden);
        assert_eq!(config.boss_for_room(8), EnemyKind::EclipseTwin);
        assert_eq!(config.boss_for_room(12), EnemyKind::VoidMonarch);
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = SimConfig::default();
        let parsed = SimConfig::from_json(&config.to_json_pretty()).unwrap();
        assert_eq!(parsed.spawn_tiers[4].weights, config.spawn_tiers[4].weights);
    }
}
