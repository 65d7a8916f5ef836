//! Game state and core simulation types
//!
//! `GameState` is the single simulation context: every subsystem takes it by
//! `&mut` and nothing lives in globals.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::BossState;
use super::catalog::{AbilityKind, EnemyKind, RelicKind, RelicSet, SynergyKind};
use super::rng::SimRng;
use crate::config::SimConfig;
use crate::consts::*;
use crate::events::SimEvent;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Active gameplay
    Play,
    /// Room cleared, waiting for the UI to pick (or skip) an ability
    AwaitingAbilityChoice,
    /// Waiting for the UI to pick (or skip) a relic
    AwaitingRelicChoice,
    Paused,
    /// Run ended in defeat
    Over,
    /// Final boss defeated
    Victory,
}

/// The player character
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Normalized movement intent from the input provider
    pub intent: Vec2,
    pub hp: i32,
    pub hp_max: i32,
    pub radius: f32,
    /// Base move speed in px/s (relics scale it at use)
    pub speed: f32,
    /// Invulnerability ticks remaining
    pub i_timer: u32,
    /// Eclipse empowerment ticks remaining (+1 damage)
    pub eclipse: u32,
    /// Movement is ignored while stunned
    pub stun: u32,
    /// Shield visual ticks remaining
    pub shield_effect: u32,
    /// Recent positions, newest last
    pub history: VecDeque<Vec2>,
}

impl Player {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            pos: arena_center(config),
            intent: Vec2::ZERO,
            hp: config.player_hp,
            hp_max: config.player_hp,
            radius: PLAYER_RADIUS,
            speed: config.player_speed,
            i_timer: 0,
            eclipse: 0,
            stun: 0,
            shield_effect: 0,
            history: VecDeque::with_capacity(POSITION_HISTORY),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount.max(0)).clamp(0, self.hp_max);
    }

    /// Deal damage unless invulnerable; returns the damage actually taken
    pub fn take_damage(&mut self, amount: i32, i_frames: u32) -> i32 {
        if self.i_timer > 0 || amount <= 0 {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp - amount).clamp(0, self.hp_max);
        self.i_timer = i_frames;
        before - self.hp
    }

    /// Extend i-frames to at least `ticks`
    pub fn grant_iframes(&mut self, ticks: u32) {
        self.i_timer = self.i_timer.max(ticks);
    }

    /// Change max hp (relics), keeping hp inside the new bounds
    pub fn set_hp_max(&mut self, hp_max: i32) {
        self.hp_max = hp_max.max(1);
        self.hp = self.hp.clamp(0, self.hp_max);
    }

    pub fn record_position(&mut self) {
        self.history.push_back(self.pos);
        if self.history.len() > POSITION_HISTORY {
            self.history.pop_front();
        }
    }

    /// Average velocity over the recorded history, in px/tick
    pub fn velocity_estimate(&self) -> Vec2 {
        match (self.history.front(), self.history.back()) {
            (Some(first), Some(last)) if self.history.len() > 1 => {
                (*last - *first) / (self.history.len() - 1) as f32
            }
            _ => Vec2::ZERO,
        }
    }
}

/// Archetype-specific enemy state
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyBrain {
    /// Chasers, splitters, minions, tanks, bombers
    Chase,
    /// Archer: approaches and fires on a random cooldown
    Archer { shoot_timer: i32 },
    /// Orbit mage: circles the player at a fixed radius
    Orbit { angle: f32, shoot_timer: i32 },
    /// Sniper: holds range, charges, fires
    Sniper { charging: bool, charge_timer: u32 },
    /// Dasher: idle approach alternating with committed dashes
    Dasher { dashing: bool, timer: u32, dir: f32 },
    /// Phantom: fades in and out
    Phantom { fade_timer: u32, invisible: bool },
    /// Healer, shielder, trickster and voidling: periodic role action
    Support { action_timer: u32 },
    Boss(BossState),
}

impl EnemyBrain {
    fn for_kind(kind: EnemyKind, rng: &mut SimRng) -> Self {
        match kind {
            EnemyKind::Grunt
            | EnemyKind::Bomber
            | EnemyKind::Splitter
            | EnemyKind::Tank
            | EnemyKind::Minion => EnemyBrain::Chase,
            EnemyKind::Archer => EnemyBrain::Archer {
                shoot_timer: rng.range(30, 60),
            },
            EnemyKind::OrbitMage => EnemyBrain::Orbit {
                angle: rng.range_f32(0.0, std::f32::consts::TAU),
                shoot_timer: 80,
            },
            EnemyKind::Sniper => EnemyBrain::Sniper {
                charging: false,
                charge_timer: 0,
            },
            EnemyKind::Dasher => EnemyBrain::Dasher {
                dashing: false,
                timer: 80,
                dir: 0.0,
            },
            EnemyKind::Phantom => EnemyBrain::Phantom {
                fade_timer: 0,
                invisible: false,
            },
            EnemyKind::Healer | EnemyKind::Shielder | EnemyKind::Trickster | EnemyKind::Voidling => {
                EnemyBrain::Support { action_timer: 0 }
            }
            EnemyKind::Warden | EnemyKind::EclipseTwin | EnemyKind::VoidMonarch => {
                EnemyBrain::Boss(BossState::new())
            }
        }
    }
}

/// An enemy entity
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f32,
    pub hp: i32,
    pub max_hp: i32,
    /// Base move speed in px/s
    pub speed: f32,
    pub slow_timer: u32,
    pub slow_mul: f32,
    pub poison_timer: u32,
    pub poison_stacks: i32,
    /// Ticks until the next poison damage tick
    pub poison_tick: u32,
    pub stun: u32,
    /// Ticks before this enemy can deal contact damage again
    pub contact_cooldown: u32,
    /// Shield granted by a shielder (cosmetic status)
    pub shield_timer: u32,
    /// Trickster decoy
    pub is_clone: bool,
    pub brain: EnemyBrain,
}

impl Enemy {
    /// Create an enemy with room-scaled stats
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, room: u32, rng: &mut SimRng) -> Self {
        let hp = kind.hp_for_room(room).max(1);
        Self {
            id,
            kind,
            pos,
            radius: kind.params().radius,
            hp,
            max_hp: hp,
            speed: kind.speed_for_room(room),
            slow_timer: 0,
            slow_mul: 1.0,
            poison_timer: 0,
            poison_stacks: 0,
            poison_tick: 0,
            stun: 0,
            contact_cooldown: 0,
            shield_timer: 0,
            is_clone: false,
            brain: EnemyBrain::for_kind(kind, rng),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32
    }

    /// Current slow multiplier (1.0 when not slowed)
    pub fn speed_multiplier(&self) -> f32 {
        if self.slow_timer > 0 { self.slow_mul } else { 1.0 }
    }

    /// Subtract hp, clamped at zero; returns the damage actually dealt
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0)).clamp(0, self.max_hp);
        before - self.hp
    }

    pub fn heal(&mut self, amount: i32) {
        if self.is_alive() {
            self.hp = (self.hp + amount.max(0)).clamp(0, self.max_hp);
        }
    }

    pub fn apply_slow(&mut self, multiplier: f32, ticks: u32) {
        self.slow_mul = multiplier;
        self.slow_timer = ticks;
    }

    /// Poison duration accumulates; stacks take the strongest application
    pub fn apply_poison(&mut self, stacks: i32, ticks: u32) {
        self.poison_timer += ticks;
        self.poison_stacks = self.poison_stacks.max(stacks);
    }

    pub fn is_shielded(&self) -> bool {
        self.shield_timer > 0
    }

    pub fn is_invisible(&self) -> bool {
        matches!(self.brain, EnemyBrain::Phantom { invisible: true, .. })
    }

    pub fn boss_state(&self) -> Option<&BossState> {
        match &self.brain {
            EnemyBrain::Boss(boss) => Some(boss),
            _ => None,
        }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// Projectile archetype (drives on-hit side effects)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Fire,
    Ice,
    Wind,
    Void,
    Radiant,
    /// Refracted radiant shard (never refracts again)
    Prism,
    Poison,
    /// Plain enemy shot
    Bolt,
}

/// A projectile entity
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub owner: Owner,
    pub kind: ProjectileKind,
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    /// Ticks remaining
    pub life: u32,
    pub damage: i32,
    /// Extra enemies this projectile passes through
    pub pierce: u32,
    pub radius: f32,
    /// Slow applied on hit: (multiplier, ticks)
    pub slow: Option<(f32, u32)>,
    /// Poison applied on hit: (stacks, ticks)
    pub poison: Option<(i32, u32)>,
    /// Max turn per tick (radians) when homing on the player
    pub homing: Option<f32>,
    /// Turns back toward the player partway through its life
    pub boomerang: bool,
    /// Enemies already hit (a piercing shot hits each enemy once)
    pub hit_ids: Vec<u32>,
}

impl Projectile {
    pub fn new(owner: Owner, kind: ProjectileKind, pos: Vec2, dir: f32, speed: f32, damage: i32) -> Self {
        let radius = match owner {
            Owner::Player => PLAYER_PROJECTILE_RADIUS,
            Owner::Enemy => ENEMY_PROJECTILE_RADIUS,
        };
        Self {
            id: 0,
            owner,
            kind,
            pos,
            vel: crate::from_angle(dir, speed),
            life: PROJECTILE_LIFE,
            damage,
            pierce: 0,
            radius,
            slow: None,
            poison: None,
            homing: None,
            boomerang: false,
            hit_ids: Vec::new(),
        }
    }

    /// Plain enemy shot
    pub fn enemy_bolt(pos: Vec2, dir: f32, speed: f32, life: u32) -> Self {
        Self::new(Owner::Enemy, ProjectileKind::Bolt, pos, dir, speed, 1).with_life(life)
    }

    pub fn with_life(mut self, life: u32) -> Self {
        self.life = life;
        self
    }

    pub fn with_pierce(mut self, pierce: u32) -> Self {
        self.pierce = pierce;
        self
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_slow(mut self, multiplier: f32, ticks: u32) -> Self {
        self.slow = Some((multiplier, ticks));
        self
    }

    pub fn with_poison(mut self, stacks: i32, ticks: u32) -> Self {
        self.poison = Some((stacks, ticks));
        self
    }

    pub fn with_homing(mut self, turn_rate: f32) -> Self {
        self.homing = Some(turn_rate);
        self
    }

    pub fn boomerang(mut self) -> Self {
        self.boomerang = true;
        self
    }
}

/// An ability occupying a loadout slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilitySlot {
    pub kind: AbilityKind,
    /// Seconds remaining, never negative
    pub cooldown: f32,
}

impl AbilitySlot {
    pub fn new(kind: AbilityKind) -> Self {
        Self { kind, cooldown: 0.0 }
    }
}

/// A cast retained for synergy pairing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentCast {
    pub ability: AbilityKind,
    pub tick: u64,
}

/// A live synergy buff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveSynergy {
    pub kind: SynergyKind,
    /// Ticks remaining
    pub remaining: u32,
    /// True only during the tick the synergy was (re)activated
    pub just_activated: bool,
}

/// Options offered at a draft suspension point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Draft {
    Ability { options: Vec<AbilityKind> },
    Relic { options: Vec<RelicKind>, legendary: bool },
}

/// Per-run counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub kills: u32,
    pub rooms_cleared: u32,
    /// Kills counted toward the next Vampiric Touch heal
    pub vampiric_kills: u32,
}

/// Complete simulation state (deterministic for a given seed and input script)
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: SimConfig,
    pub rng: SimRng,
    /// Current room (1-based)
    pub room: u32,
    pub phase: SimPhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    pub loadout: [Option<AbilitySlot>; SLOT_COUNT],
    pub selected_slot: usize,
    pub recent_casts: Vec<RecentCast>,
    pub synergies: Vec<ActiveSynergy>,
    pub relics: RelicSet,
    /// Live enemies (sorted by id for determinism)
    pub enemies: Vec<Enemy>,
    /// Player projectiles
    pub projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub draft: Option<Draft>,
    /// A boss died this room; the next draft includes a legendary relic pick
    pub boss_reward_pending: bool,
    pub stats: RunStats,
    /// Events queued since the last drain
    pub events: Vec<SimEvent>,
    next_id: u32,
}

impl GameState {
    /// Start a new run with the default config
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, SimConfig::default())
    }

    /// Start a new run; the config is assumed validated
    pub fn with_config(seed: u64, config: SimConfig) -> Self {
        let player = Player::new(&config);
        let mut state = Self {
            config,
            rng: SimRng::new(seed),
            room: 1,
            phase: SimPhase::Play,
            time_ticks: 0,
            player,
            loadout: [None; SLOT_COUNT],
            selected_slot: 0,
            recent_casts: Vec::new(),
            synergies: Vec::new(),
            relics: RelicSet::default(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            draft: None,
            boss_reward_pending: false,
            stats: RunStats::default(),
            events: Vec::new(),
            next_id: 1,
        };
        super::encounter::start_run(&mut state);
        state
    }

    /// Reset every collection and timer to run-start values (seed is kept)
    pub fn reset_run(&mut self) {
        self.rng = SimRng::new(self.rng.seed());
        self.room = 1;
        self.phase = SimPhase::Play;
        self.time_ticks = 0;
        self.player = Player::new(&self.config);
        self.loadout = AbilityKind::STARTERS.map(|k| Some(AbilitySlot::new(k)));
        self.selected_slot = 0;
        self.recent_casts.clear();
        self.synergies.clear();
        self.relics = RelicSet::default();
        self.enemies.clear();
        self.projectiles.clear();
        self.enemy_projectiles.clear();
        self.draft = None;
        self.boss_reward_pending = false;
        self.stats = RunStats::default();
        self.events.clear();
        self.next_id = 1;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spawn an enemy with room-scaled stats; returns its id
    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let room = self.room;
        let enemy = Enemy::new(id, kind, self.clamp_to_arena(pos, kind.params().radius), room, &mut self.rng);
        self.enemies.push(enemy);
        id
    }

    /// Queue a projectile into the collection matching its owner
    pub fn spawn_projectile(&mut self, mut projectile: Projectile) {
        projectile.id = self.next_entity_id();
        match projectile.owner {
            Owner::Player => self.projectiles.push(projectile),
            Owner::Enemy => self.enemy_projectiles.push(projectile),
        }
    }

    pub fn enemy_index(&self, id: u32) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id)
    }

    /// Nearest live enemy to `pos`, optionally excluding one id
    pub fn nearest_enemy(&self, pos: Vec2, exclude: Option<u32>) -> Option<usize> {
        self.enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_alive() && Some(e.id) != exclude)
            .min_by(|(_, a), (_, b)| {
                a.pos
                    .distance_squared(pos)
                    .partial_cmp(&b.pos.distance_squared(pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }

    /// Live boss, if any
    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.kind.is_boss() && e.is_alive())
    }

    /// Ability damage before per-ability adjustments
    pub fn base_damage(&self) -> i32 {
        let eclipse = if self.player.eclipse > 0 { 1 } else { 0 };
        1 + eclipse + self.relics.damage_bonus(self.player.hp)
    }

    pub fn recent_cast_window(&self) -> u64 {
        (self.config.recent_cast_window_ticks as f32 * self.relics.effect_duration_scalar()) as u64
    }

    pub fn synergy_duration(&self) -> u32 {
        (self.config.synergy_duration_ticks as f32 * self.relics.effect_duration_scalar()) as u32
    }

    pub fn has_relic(&self, kind: RelicKind) -> bool {
        self.relics.has(kind)
    }

    /// Keep a circle of `radius` inside the arena
    pub fn clamp_to_arena(&self, pos: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            pos.x.clamp(radius, (self.config.arena_width - radius).max(radius)),
            pos.y.clamp(radius, (self.config.arena_height - radius).max(radius)),
        )
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
        self.enemy_projectiles.sort_by_key(|p| p.id);
    }
}

/// Center of the arena
pub fn arena_center(config: &SimConfig) -> Vec2 {
    Vec2::new(config.arena_width / 2.0, config.arena_height / 2.0)
}
