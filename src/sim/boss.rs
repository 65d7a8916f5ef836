//! Boss phase machine and attack patterns
//!
//! Each boss moves through phases 1 → 2 → 3 as its health drops. The phase
//! never goes back down, and each phase selects a different attack pattern
//! and cadence.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;

use super::ai::{AiContext, AiOutput, Spawn};
use super::catalog::EnemyKind;
use super::collision::move_toward;
use super::rng::SimRng;
use super::state::{Enemy, EnemyBrain, Projectile};
use crate::angle_to;

/// Phase 2 begins once the hp fraction drops below this
pub const PHASE_TWO_BELOW: f32 = 0.66;
/// Phase 3 begins once the hp fraction drops below this
pub const PHASE_THREE_BELOW: f32 = 0.33;
/// Ticks before a boss's first attack
pub const FIRST_ATTACK_DELAY: i32 = 90;
/// Aim prediction never extrapolates further than this many ticks
pub const MAX_PREDICTION_TICKS: f32 = 30.0;

const SHOTGUN_SPREAD: f32 = 0.1;
const SPIRAL_STEP: f32 = 0.35;
const HOMING_TURN_RATE: f32 = 0.03;
const ECLIPSE_ORBIT: Vec2 = Vec2::new(40.0, 30.0);
const MONARCH_LEASH: f32 = 40.0;
const VOIDLING_CHANCE: f32 = 0.05;

/// Per-boss phase bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct BossState {
    /// 1, 2 or 3
    pub phase: u8,
    /// Ticks until the next volley
    pub attack_timer: i32,
    /// Rotation carried between spiral volleys
    pub spiral: f32,
}

impl BossState {
    pub fn new() -> Self {
        Self {
            phase: 1,
            attack_timer: FIRST_ATTACK_DELAY,
            spiral: 0.0,
        }
    }
}

impl Default for BossState {
    fn default() -> Self {
        Self::new()
    }
}

/// Phase for a health fraction
pub fn phase_for_fraction(fraction: f32) -> u8 {
    if fraction < PHASE_THREE_BELOW {
        3
    } else if fraction < PHASE_TWO_BELOW {
        2
    } else {
        1
    }
}

/// Advance the phase if health has dropped far enough.
///
/// Returns the new phase on a transition. Healing never lowers the phase.
pub fn update_phase(boss: &mut BossState, fraction: f32) -> Option<u8> {
    let target = phase_for_fraction(fraction);
    if target > boss.phase {
        boss.phase = target;
        Some(target)
    } else {
        None
    }
}

/// Re-evaluate a boss's phase from its current health; no-op for other kinds
pub fn check_phase(enemy: &mut Enemy, out: &mut AiOutput) {
    let (kind, fraction) = (enemy.kind, enemy.hp_fraction());
    if let EnemyBrain::Boss(boss) = &mut enemy.brain {
        if let Some(phase) = update_phase(boss, fraction) {
            out.phase_changes.push((kind, phase));
        }
    }
}

/// Movement multiplier for a phase
pub fn phase_speed(phase: u8) -> f32 {
    match phase {
        0 | 1 => 1.0,
        2 => 1.15,
        _ => 1.3,
    }
}

/// Volley tuning for a boss archetype
#[derive(Debug, Clone, Copy)]
pub struct BossProfile {
    /// Ticks between volleys in phase 1
    pub attack_cooldown: i32,
    /// Projectiles per radial volley
    pub projectile_count: u32,
    /// Pixels per second
    pub projectile_speed: f32,
    pub projectile_life: u32,
}

pub fn profile(kind: EnemyKind) -> BossProfile {
    match kind {
        EnemyKind::EclipseTwin => BossProfile {
            attack_cooldown: 70,
            projectile_count: 10,
            projectile_speed: 90.0,
            projectile_life: 130,
        },
        EnemyKind::VoidMonarch => BossProfile {
            attack_cooldown: 60,
            projectile_count: 12,
            projectile_speed: 108.0,
            projectile_life: 150,
        },
        _ => BossProfile {
            attack_cooldown: 90,
            projectile_count: 8,
            projectile_speed: 72.0,
            projectile_life: 120,
        },
    }
}

/// Ticks between volleys for a boss in a given phase
pub fn attack_cooldown(kind: EnemyKind, phase: u8) -> i32 {
    (profile(kind).attack_cooldown as f32 / phase_speed(phase)).round() as i32
}

/// Attack pattern fired when the attack timer expires
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    /// Evenly spaced ring
    Radial { count: u32 },
    /// Fan aimed at the player's predicted position
    PredictedShotgun { count: u32 },
    /// Ring that rotates between volleys
    Spiral { count: u32 },
    /// Slower ring of shots that steer toward the player
    HomingRing { count: u32 },
    /// Four fast shots in a cross on the predicted aim, plus a ring
    CrossNova,
    /// Radial ring at scaled speed
    Nova { speed_scale: f32 },
}

pub fn pattern_for(kind: EnemyKind, phase: u8) -> Pattern {
    match (kind, phase) {
        (EnemyKind::EclipseTwin, 1) => Pattern::PredictedShotgun { count: 5 },
        (EnemyKind::EclipseTwin, 2) => Pattern::Spiral { count: 10 },
        (EnemyKind::EclipseTwin, _) => Pattern::HomingRing { count: 12 },
        (EnemyKind::VoidMonarch, 1) => Pattern::Radial { count: 12 },
        (EnemyKind::VoidMonarch, 2) => Pattern::Spiral { count: 12 },
        (EnemyKind::VoidMonarch, _) => Pattern::Nova { speed_scale: 1.2 },
        (_, 1) => Pattern::Radial { count: 8 },
        (_, 2) => Pattern::PredictedShotgun { count: 5 },
        (_, _) => Pattern::CrossNova,
    }
}

/// Heading that leads the player by their recent velocity
pub fn predict_aim(from: Vec2, ctx: &AiContext, shot_speed: f32) -> f32 {
    let per_tick = shot_speed * ctx.dt;
    let horizon = if per_tick > f32::EPSILON {
        (from.distance(ctx.player_pos) / per_tick).min(MAX_PREDICTION_TICKS)
    } else {
        0.0
    };
    angle_to(from, ctx.player_pos + ctx.player_vel * horizon)
}

/// Run one boss step: phase check, movement, volley
pub fn step(enemy: &mut Enemy, ctx: &AiContext, rng: &mut SimRng, out: &mut AiOutput) {
    check_phase(enemy, out);
    let kind = enemy.kind;
    let base_step = enemy.speed * enemy.speed_multiplier() * ctx.dt;
    let EnemyBrain::Boss(boss) = &mut enemy.brain else {
        return;
    };

    let step = base_step * phase_speed(boss.phase);

    enemy.pos = match kind {
        EnemyKind::EclipseTwin => {
            let angle = ctx.tick as f32 / 600.0 + boss.phase as f32 * 2.1;
            let target = ctx.center + Vec2::new(angle.cos(), angle.sin()) * ECLIPSE_ORBIT;
            move_toward(enemy.pos, target, step)
        }
        EnemyKind::VoidMonarch => {
            if enemy.pos.distance(ctx.center) > MONARCH_LEASH {
                move_toward(enemy.pos, ctx.center, step * 0.5)
            } else {
                enemy.pos
            }
        }
        _ => move_toward(enemy.pos, ctx.player_pos, step * 0.7),
    };

    boss.attack_timer -= 1;
    if boss.attack_timer > 0 {
        return;
    }
    boss.attack_timer = attack_cooldown(kind, boss.phase);
    let pattern = pattern_for(kind, boss.phase);
    fire(pattern, kind, enemy.pos, &mut boss.spiral, ctx, out);

    if kind == EnemyKind::VoidMonarch && boss.phase >= 2 {
        let (chance, spread) = if boss.phase >= 3 {
            (VOIDLING_CHANCE * 2.0, 30.0)
        } else {
            (VOIDLING_CHANCE, 20.0)
        };
        if rng.chance(chance) {
            let offset = Vec2::new(rng.range_f32(-spread, spread), rng.range_f32(-spread, spread));
            out.spawns.push(Spawn {
                kind: EnemyKind::Voidling,
                pos: enemy.pos + offset,
                clone: false,
            });
        }
    }
}

fn ring(pos: Vec2, count: u32, offset: f32, speed: f32, life: u32) -> impl Iterator<Item = Projectile> {
    (0..count).map(move |i| {
        let dir = i as f32 / count as f32 * TAU + offset;
        Projectile::enemy_bolt(pos, dir, speed, life)
    })
}

fn fire(pattern: Pattern, kind: EnemyKind, pos: Vec2, spiral: &mut f32, ctx: &AiContext, out: &mut AiOutput) {
    let p = profile(kind);
    match pattern {
        Pattern::Radial { count } => {
            out.projectiles
                .extend(ring(pos, count, 0.0, p.projectile_speed, p.projectile_life));
        }
        Pattern::PredictedShotgun { count } => {
            let aim = predict_aim(pos, ctx, p.projectile_speed);
            let half = (count / 2) as i32;
            for k in -half..=half {
                let dir = aim + k as f32 * SHOTGUN_SPREAD;
                out.projectiles
                    .push(Projectile::enemy_bolt(pos, dir, p.projectile_speed, p.projectile_life));
            }
        }
        Pattern::Spiral { count } => {
            out.projectiles
                .extend(ring(pos, count, *spiral, p.projectile_speed, p.projectile_life));
            *spiral = crate::normalize_angle(*spiral + SPIRAL_STEP);
        }
        Pattern::HomingRing { count } => {
            out.projectiles.extend(
                ring(pos, count, 0.0, p.projectile_speed * 0.8, p.projectile_life)
                    .map(|shot| shot.with_homing(HOMING_TURN_RATE)),
            );
        }
        Pattern::CrossNova => {
            let aim = predict_aim(pos, ctx, p.projectile_speed * 1.3);
            for i in 0..4 {
                let dir = aim + i as f32 * FRAC_PI_2;
                out.projectiles
                    .push(Projectile::enemy_bolt(pos, dir, p.projectile_speed * 1.3, p.projectile_life));
            }
            out.projectiles
                .extend(ring(pos, p.projectile_count, 0.0, p.projectile_speed, p.projectile_life));
        }
        Pattern::Nova { speed_scale } => {
            out.projectiles.extend(ring(
                pos,
                p.projectile_count,
                0.0,
                p.projectile_speed * speed_scale,
                p.projectile_life,
            ));
        }
    }
}

/// Bosses enter at the top-center of the arena
pub fn spawn_point(center: Vec2) -> Vec2 {
    Vec2::new(center.x, center.y * 0.5)
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

    fn boss(kind: EnemyKind) -> Enemy {
        let mut rng = SimRng::new(5);
        Enemy::new(1, kind, Vec2::new(160.0, 60.0), 4, &mut rng)
    }

    #[test]
    fn test_phase_thresholds() {
        assert_eq!(phase_for_fraction(1.0), 1);
        assert_eq!(phase_for_fraction(0.66), 1);
        assert_eq!(phase_for_fraction(0.65), 2);
        assert_eq!(phase_for_fraction(0.33), 2);
        assert_eq!(phase_for_fraction(0.32), 3);
    }

    #[test]
    fn test_phase_never_reverts() {
        let mut state = BossState::new();
        assert_eq!(update_phase(&mut state, 0.5), Some(2));
        assert_eq!(update_phase(&mut state, 0.9), None);
        assert_eq!(state.phase, 2);
        assert_eq!(update_phase(&mut state, 0.1), Some(3));
        assert_eq!(update_phase(&mut state, 1.0), None);
        assert_eq!(state.phase, 3);
    }

    #[test]
    fn test_first_volley_after_delay() {
        let mut enemy = boss(EnemyKind::Warden);
        let mut rng = SimRng::new(1);
        let mut out = AiOutput::default();
        let c = ctx(Vec2::new(160.0, 200.0));
        for _ in 0..(FIRST_ATTACK_DELAY - 1) {
            step(&mut enemy, &c, &mut rng, &mut out);
        }
        assert!(out.projectiles.is_empty());
        step(&mut enemy, &c, &mut rng, &mut out);
        assert_eq!(out.projectiles.len(), 8);
    }

    #[test]
    fn test_pattern_follows_current_phase() {
        let mut enemy = boss(EnemyKind::Warden);
        let mut rng = SimRng::new(1);
        let mut out = AiOutput::default();
        let c = ctx(Vec2::new(160.0, 200.0));

        enemy.hp = (enemy.max_hp as f32 * 0.5) as i32;
        if let EnemyBrain::Boss(b) = &mut enemy.brain {
            b.attack_timer = 1;
        }
        step(&mut enemy, &c, &mut rng, &mut out);
        assert_eq!(out.phase_changes, vec![(EnemyKind::Warden, 2)]);
        // Predicted shotgun of 5
        assert_eq!(out.projectiles.len(), 5);
        assert_eq!(
            enemy.boss_state().map(|b| b.attack_timer),
            Some(attack_cooldown(EnemyKind::Warden, 2))
        );
    }

    #[test]
    fn test_prediction_leads_moving_player() {
        let mut c = ctx(Vec2::new(100.0, 0.0));
        let still = predict_aim(Vec2::ZERO, &c, 60.0);
        assert!(still.abs() < 1e-5);
        c.player_vel = Vec2::new(0.0, 1.0);
        let lead = predict_aim(Vec2::ZERO, &c, 60.0);
        // Horizon is capped at 30 ticks, so the lead is atan(30/100)
        assert!((lead - (30.0f32 / 100.0).atan()).abs() < 1e-4);
    }

    #[test]
    fn test_cadence_speeds_up_with_phase() {
        for kind in EnemyKind::BOSSES {
            assert!(attack_cooldown(kind, 3) < attack_cooldown(kind, 2));
            assert!(attack_cooldown(kind, 2) < attack_cooldown(kind, 1));
        }
    }
}
