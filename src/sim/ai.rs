//! Per-archetype enemy behavior
//!
//! Each step mutates only the enemy it is given. Everything that touches
//! other entities (shots, ally heals and shields, spawns, pulls on the
//! player, detonations) goes into an [`AiOutput`] that is applied once the
//! whole pass has run.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use super::boss;
use super::catalog::EnemyKind;
use super::collision::{move_toward, within};
use super::combat;
use super::rng::SimRng;
use super::state::{Enemy, EnemyBrain, GameState, Projectile, arena_center};
use crate::events::SimEvent;
use crate::{angle_to, from_angle};

const ARCHER_RANGE: f32 = 46.0;
const ARCHER_SHOT_SPEED: f32 = 78.0;
const ARCHER_SHOT_LIFE: u32 = 160;
const ORBIT_RADIUS: f32 = 60.0;
const ORBIT_STEP: f32 = 0.02;
const ORBIT_SHOT_COOLDOWN: i32 = 60;
const ORBIT_SHOT_SPEED: f32 = 66.0;
const SNIPER_RANGE: f32 = 80.0;
const SNIPER_CHARGE: u32 = 40;
const SNIPER_SHOT_SPEED: f32 = 180.0;
const SNIPER_SHOT_LIFE: u32 = 100;
const SNIPER_SHOT_DAMAGE: i32 = 2;
const DASH_SPEED: f32 = 150.0;
const DASH_TICKS: u32 = 20;
const DASH_COOLDOWN: u32 = 80;
const BOMBER_TRIGGER: f32 = 10.0;
pub const BOMBER_BLAST_RADIUS: f32 = 20.0;
pub const BOMBER_BLAST_DAMAGE: i32 = 2;
const PHANTOM_FADE: u32 = 60;
const PHANTOM_BOOST: f32 = 1.5;
const HEALER_DISTANCE: f32 = 60.0;
const HEALER_COOLDOWN: u32 = 120;
const HEAL_RADIUS: f32 = 50.0;
const SHIELDER_COOLDOWN: u32 = 150;
const SHIELD_RADIUS: f32 = 40.0;
const SHIELD_TICKS: u32 = 100;
const TRICKSTER_COOLDOWN: u32 = 80;
const TELEPORT_RANGE: f32 = 60.0;
const CLONE_COUNT: u32 = 2;
const CLONE_OFFSET: f32 = 20.0;
const VOIDLING_COOLDOWN: u32 = 100;
const PULL_RADIUS: f32 = 30.0;
const PULL_DISTANCE: f32 = 8.0;
const PULL_STUN: u32 = 20;

/// Read-only view of the world for one AI pass
#[derive(Debug, Clone)]
pub struct AiContext {
    pub player_pos: Vec2,
    /// Recent player velocity in px/tick
    pub player_vel: Vec2,
    pub center: Vec2,
    pub tick: u64,
    pub dt: f32,
}

/// Area effect on allies around a support enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllyEffect {
    pub source: u32,
    pub center: Vec2,
    pub radius: f32,
    pub amount: u32,
}

/// Enemy to create after the pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Trickster decoys have 1 hp
    pub clone: bool,
}

/// Side effects collected during an AI pass
#[derive(Debug, Default)]
pub struct AiOutput {
    pub projectiles: Vec<Projectile>,
    pub heals: Vec<AllyEffect>,
    pub shields: Vec<AllyEffect>,
    pub spawns: Vec<Spawn>,
    /// Voidling pull origins
    pub pulls: Vec<Vec2>,
    /// Bombers that reached the player: (id, position)
    pub detonations: Vec<(u32, Vec2)>,
    pub phase_changes: Vec<(EnemyKind, u8)>,
}

/// Run every enemy's step, then apply the collected side effects
pub fn run(state: &mut GameState, dt: f32) {
    let ctx = AiContext {
        player_pos: state.player.pos,
        player_vel: state.player.velocity_estimate(),
        center: arena_center(&state.config),
        tick: state.time_ticks,
        dt,
    };
    let mut out = AiOutput::default();
    for enemy in state.enemies.iter_mut() {
        step(enemy, &ctx, &mut state.rng, &mut out);
    }
    apply(state, out);
}

/// Advance one enemy by a tick
pub fn step(enemy: &mut Enemy, ctx: &AiContext, rng: &mut SimRng, out: &mut AiOutput) {
    if !enemy.is_alive() {
        return;
    }
    if enemy.stun > 0 {
        // A stunned boss still changes phase; it just neither moves nor fires
        boss::check_phase(enemy, out);
        return;
    }
    let stride = enemy.speed * enemy.speed_multiplier() * ctx.dt;
    let player = ctx.player_pos;
    let dist = enemy.pos.distance(player);

    match enemy.kind {
        EnemyKind::Grunt | EnemyKind::Splitter | EnemyKind::Minion | EnemyKind::Tank => {
            enemy.pos = move_toward(enemy.pos, player, stride);
        }
        EnemyKind::Bomber => {
            enemy.pos = move_toward(enemy.pos, player, stride);
            if enemy.pos.distance(player) <= BOMBER_TRIGGER {
                out.detonations.push((enemy.id, enemy.pos));
            }
        }
        EnemyKind::Archer => {
            if dist > ARCHER_RANGE {
                enemy.pos = move_toward(enemy.pos, player, stride);
            }
            if let EnemyBrain::Archer { shoot_timer } = &mut enemy.brain {
                *shoot_timer -= 1;
                if *shoot_timer <= 0 {
                    let dir = angle_to(enemy.pos, player);
                    out.projectiles
                        .push(Projectile::enemy_bolt(enemy.pos, dir, ARCHER_SHOT_SPEED, ARCHER_SHOT_LIFE));
                    *shoot_timer = rng.range(45, 80);
                }
            }
        }
        EnemyKind::OrbitMage => {
            if let EnemyBrain::Orbit { angle, shoot_timer } = &mut enemy.brain {
                *angle = crate::normalize_angle(*angle + ORBIT_STEP);
                let target = player + from_angle(*angle, ORBIT_RADIUS);
                enemy.pos = move_toward(enemy.pos, target, stride);
                *shoot_timer -= 1;
                if *shoot_timer <= 0 {
                    let dir = angle_to(enemy.pos, player);
                    out.projectiles
                        .push(Projectile::enemy_bolt(enemy.pos, dir, ORBIT_SHOT_SPEED, 120));
                    *shoot_timer = ORBIT_SHOT_COOLDOWN;
                }
            }
        }
        EnemyKind::Sniper => {
            if let EnemyBrain::Sniper { charging, charge_timer } = &mut enemy.brain {
                if !*charging {
                    if dist > SNIPER_RANGE {
                        enemy.pos = move_toward(enemy.pos, player, stride);
                    } else {
                        *charging = true;
                        *charge_timer = SNIPER_CHARGE;
                    }
                } else {
                    *charge_timer = charge_timer.saturating_sub(1);
                    if *charge_timer == 0 {
                        let dir = angle_to(enemy.pos, player);
                        out.projectiles.push(
                            Projectile::enemy_bolt(enemy.pos, dir, SNIPER_SHOT_SPEED, SNIPER_SHOT_LIFE)
                                .with_damage(SNIPER_SHOT_DAMAGE),
                        );
                        *charging = false;
                    }
                }
            }
        }
        EnemyKind::Dasher => {
            if let EnemyBrain::Dasher { dashing, timer, dir } = &mut enemy.brain {
                if *dashing {
                    enemy.pos += from_angle(*dir, DASH_SPEED * ctx.dt);
                    *timer = timer.saturating_sub(1);
                    if *timer == 0 {
                        *dashing = false;
                        *timer = DASH_COOLDOWN;
                    }
                } else {
                    enemy.pos = move_toward(enemy.pos, player, stride);
                    *timer = timer.saturating_sub(1);
                    if *timer == 0 {
                        *dashing = true;
                        *dir = angle_to(enemy.pos, player);
                        *timer = DASH_TICKS;
                    }
                }
            }
        }
        EnemyKind::Phantom => {
            if let EnemyBrain::Phantom { fade_timer, invisible } = &mut enemy.brain {
                *fade_timer += 1;
                if *fade_timer >= PHANTOM_FADE {
                    *fade_timer = 0;
                    *invisible = !*invisible;
                }
                let boost = if *invisible { PHANTOM_BOOST } else { 1.0 };
                enemy.pos = move_toward(enemy.pos, player, stride * boost);
            }
        }
        EnemyKind::Healer => {
            if dist < HEALER_DISTANCE && dist > f32::EPSILON {
                enemy.pos += (enemy.pos - player) / dist * stride;
            }
            if support_ready(&mut enemy.brain, HEALER_COOLDOWN) {
                out.heals.push(AllyEffect {
                    source: enemy.id,
                    center: enemy.pos,
                    radius: HEAL_RADIUS,
                    amount: 1,
                });
            }
        }
        EnemyKind::Shielder => {
            enemy.pos = move_toward(enemy.pos, player, stride);
            if support_ready(&mut enemy.brain, SHIELDER_COOLDOWN) {
                out.shields.push(AllyEffect {
                    source: enemy.id,
                    center: enemy.pos,
                    radius: SHIELD_RADIUS,
                    amount: SHIELD_TICKS,
                });
            }
        }
        EnemyKind::Trickster => {
            if support_ready(&mut enemy.brain, TRICKSTER_COOLDOWN) {
                let away = flee_direction(enemy.pos, player);
                enemy.pos += from_angle(away, TELEPORT_RANGE);
                for i in 0..CLONE_COUNT {
                    let offset = from_angle(i as f32 / CLONE_COUNT as f32 * TAU, CLONE_OFFSET);
                    out.spawns.push(Spawn {
                        kind: EnemyKind::Minion,
                        pos: enemy.pos + offset,
                        clone: true,
                    });
                }
            } else {
                enemy.pos = move_toward(enemy.pos, player, stride);
            }
        }
        EnemyKind::Voidling => {
            if support_ready(&mut enemy.brain, VOIDLING_COOLDOWN) {
                out.pulls.push(enemy.pos);
            }
        }
        EnemyKind::Warden | EnemyKind::EclipseTwin | EnemyKind::VoidMonarch => {
            boss::step(enemy, ctx, rng, out);
        }
    }
}

/// Count a support action timer up; true when the action fires
fn support_ready(brain: &mut EnemyBrain, cooldown: u32) -> bool {
    let EnemyBrain::Support { action_timer } = brain else {
        return false;
    };
    *action_timer += 1;
    if *action_timer >= cooldown {
        *action_timer = 0;
        true
    } else {
        false
    }
}

/// Apply collected side effects to the world
pub fn apply(state: &mut GameState, out: AiOutput) {
    for projectile in out.projectiles {
        state.spawn_projectile(projectile);
    }

    for heal in &out.heals {
        for ally in state.enemies.iter_mut() {
            if ally.id != heal.source && ally.is_alive() && within(heal.center, heal.radius, ally.pos) {
                ally.heal(heal.amount as i32);
            }
        }
    }
    for shield in &out.shields {
        for ally in state.enemies.iter_mut() {
            if ally.id != shield.source && ally.is_alive() && within(shield.center, shield.radius, ally.pos) {
                ally.shield_timer = ally.shield_timer.max(shield.amount);
            }
        }
    }

    for origin in out.pulls {
        let player = &mut state.player;
        if within(origin, PULL_RADIUS, player.pos) {
            player.pos = move_toward(player.pos, origin, PULL_DISTANCE);
            player.stun = player.stun.max(PULL_STUN);
        }
    }

    for (enemy_id, pos) in out.detonations {
        log::debug!("Bomber {enemy_id} detonated at ({:.0}, {:.0})", pos.x, pos.y);
        state.emit(SimEvent::Detonation { enemy_id });
        if within(pos, BOMBER_BLAST_RADIUS, state.player.pos) {
            combat::hurt_player(state, BOMBER_BLAST_DAMAGE);
        }
        state.enemies.retain(|e| e.id != enemy_id);
    }

    for spawn in out.spawns {
        let id = state.spawn_enemy(spawn.kind, spawn.pos);
        if spawn.clone {
            if let Some(idx) = state.enemy_index(id) {
                let clone = &mut state.enemies[idx];
                clone.is_clone = true;
                clone.hp = 1;
                clone.max_hp = 1;
            }
        }
    }

    for (kind, phase) in out.phase_changes {
        log::info!("{} enters phase {phase}", kind.name());
        state.emit(SimEvent::BossPhase { kind, phase });
    }
}

/// Heading away from the player (fixed when standing on top of them)
pub fn flee_direction(from: Vec2, player: Vec2) -> f32 {
    if from.distance_squared(player) <= f32::EPSILON {
        PI
    } else {
        angle_to(player, from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn ctx(player: Vec2) -> AiContext {
        AiContext {
            player_pos: player,
            player_vel: Vec2::ZERO,
            center: Vec2::new(160.0, 120.0),
            tick: 0,
            dt: SIM_DT,
        }
    }

    fn enemy(kind: EnemyKind, pos: Vec2) -> Enemy {
        let mut rng = SimRng::new(9);
        Enemy::new(1, kind, pos, 1, &mut rng)
    }

    #[test]
    fn test_stunned_enemy_skips_step() {
        let mut e = enemy(EnemyKind::Grunt, Vec2::new(50.0, 50.0));
        e.stun = 5;
        let mut out = AiOutput::default();
        step(&mut e, &ctx(Vec2::new(150.0, 50.0)), &mut SimRng::new(1), &mut out);
        assert_eq!(e.pos, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_stunned_boss_still_changes_phase() {
        let start = Vec2::new(160.0, 60.0);
        let mut warden = enemy(EnemyKind::Warden, start);
        warden.hp = warden.max_hp / 2;
        warden.stun = 30;
        if let EnemyBrain::Boss(b) = &mut warden.brain {
            b.attack_timer = 1;
        }
        let mut out = AiOutput::default();
        step(&mut warden, &ctx(Vec2::new(160.0, 200.0)), &mut SimRng::new(1), &mut out);

        assert_eq!(out.phase_changes, vec![(EnemyKind::Warden, 2)]);
        assert_eq!(warden.boss_state().map(|b| b.phase), Some(2));
        // Stunned: no movement and no volley
        assert_eq!(warden.pos, start);
        assert!(out.projectiles.is_empty());
    }

    #[test]
    fn test_slow_scales_movement() {
        let c = ctx(Vec2::new(250.0, 50.0));
        let mut fast = enemy(EnemyKind::Grunt, Vec2::new(50.0, 50.0));
        let mut slow = fast.clone();
        slow.apply_slow(0.5, 10);
        let mut out = AiOutput::default();
        let mut rng = SimRng::new(1);
        step(&mut fast, &c, &mut rng, &mut out);
        step(&mut slow, &c, &mut rng, &mut out);
        let fast_moved = fast.pos.x - 50.0;
        let slow_moved = slow.pos.x - 50.0;
        assert!((slow_moved - fast_moved * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_dasher_direction_fixed_during_dash() {
        let mut e = enemy(EnemyKind::Dasher, Vec2::new(50.0, 50.0));
        e.brain = EnemyBrain::Dasher {
            dashing: false,
            timer: 1,
            dir: 0.0,
        };
        let mut out = AiOutput::default();
        let mut rng = SimRng::new(1);
        step(&mut e, &ctx(Vec2::new(150.0, 50.0)), &mut rng, &mut out);
        let start = e.pos;
        // Player moves; the dash keeps its heading
        step(&mut e, &ctx(Vec2::new(50.0, 200.0)), &mut rng, &mut out);
        assert!((e.pos.y - start.y).abs() < 1e-4);
        assert!((e.pos.x - start.x - DASH_SPEED * SIM_DT).abs() < 1e-3);
    }

    #[test]
    fn test_sniper_charges_then_fires() {
        let mut e = enemy(EnemyKind::Sniper, Vec2::new(100.0, 100.0));
        let c = ctx(Vec2::new(150.0, 100.0));
        let mut out = AiOutput::default();
        let mut rng = SimRng::new(1);
        step(&mut e, &c, &mut rng, &mut out);
        for _ in 0..(SNIPER_CHARGE - 1) {
            step(&mut e, &c, &mut rng, &mut out);
        }
        assert!(out.projectiles.is_empty());
        step(&mut e, &c, &mut rng, &mut out);
        assert_eq!(out.projectiles.len(), 1);
        assert_eq!(out.projectiles[0].damage, SNIPER_SHOT_DAMAGE);
    }

    #[test]
    fn test_bomber_detonates_and_hurts_player() {
        let mut state = GameState::new(4);
        state.enemies.clear();
        let pos = state.player.pos + Vec2::new(5.0, 0.0);
        state.spawn_enemy(EnemyKind::Bomber, pos);
        run(&mut state, SIM_DT);
        assert!(state.enemies.is_empty());
        assert_eq!(state.player.hp, state.player.hp_max - BOMBER_BLAST_DAMAGE);
        assert!(state.events.iter().any(|e| matches!(e, SimEvent::Detonation { .. })));
    }

    #[test]
    fn test_voidling_pulls_and_stuns() {
        let mut state = GameState::new(4);
        state.enemies.clear();
        let pos = state.player.pos + Vec2::new(20.0, 0.0);
        state.spawn_enemy(EnemyKind::Voidling, pos);
        let start = state.player.pos;
        for _ in 0..VOIDLING_COOLDOWN {
            run(&mut state, SIM_DT);
        }
        assert!((state.player.pos.x - (start.x + PULL_DISTANCE)).abs() < 1e-3);
        assert_eq!(state.player.stun, PULL_STUN);
    }

    #[test]
    fn test_trickster_spawns_clones() {
        let mut state = GameState::new(4);
        state.enemies.clear();
        let pos = state.player.pos + Vec2::new(30.0, 0.0);
        let id = state.spawn_enemy(EnemyKind::Trickster, pos);
        for _ in 0..TRICKSTER_COOLDOWN {
            run(&mut state, SIM_DT);
        }
        let clones: Vec<_> = state.enemies.iter().filter(|e| e.is_clone).collect();
        assert_eq!(clones.len(), CLONE_COUNT as usize);
        assert!(clones.iter().all(|c| c.hp == 1 && c.kind == EnemyKind::Minion));
        let trickster = &state.enemies[state.enemy_index(id).unwrap()];
        assert!(trickster.pos.distance(state.player.pos) > 30.0);
    }

    #[test]
    fn test_healer_heals_allies_not_self() {
        let mut state = GameState::new(4);
        state.enemies.clear();
        let far = state.player.pos + Vec2::new(100.0, 0.0);
        let healer = state.spawn_enemy(EnemyKind::Healer, far);
        let ally = state.spawn_enemy(EnemyKind::Tank, far + Vec2::new(10.0, 0.0));
        for e in state.enemies.iter_mut() {
            e.hp = 1;
        }
        for _ in 0..HEALER_COOLDOWN {
            run(&mut state, SIM_DT);
        }
        assert_eq!(state.enemies[state.enemy_index(ally).unwrap()].hp, 2);
        assert_eq!(state.enemies[state.enemy_index(healer).unwrap()].hp, 1);
    }

    #[test]
    fn test_heal_skips_dead_allies() {
        let mut state = GameState::new(4);
        state.enemies.clear();
        let far = state.player.pos + Vec2::new(100.0, 0.0);
        let healer = state.spawn_enemy(EnemyKind::Healer, far);
        let corpse = state.spawn_enemy(EnemyKind::Grunt, far + Vec2::new(10.0, 0.0));
        let idx = state.enemy_index(corpse).unwrap();
        state.enemies[idx].hp = 0;

        let out = AiOutput {
            heals: vec![AllyEffect {
                source: healer,
                center: far,
                radius: HEAL_RADIUS,
                amount: 1,
            }],
            ..Default::default()
        };
        apply(&mut state, out);
        assert_eq!(state.enemies[idx].hp, 0);
    }
}
