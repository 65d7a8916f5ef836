//! Combat resolution
//!
//! Damage, status effects, projectile flight and hits, contact damage and
//! death processing. Removal never happens mid-iteration: projectiles are
//! marked spent (life 0) and dropped with `retain`, dead enemies are collected
//! and purged in `resolve_deaths`.

use std::f32::consts::TAU;

use glam::Vec2;

use super::catalog::{EnemyKind, RelicKind, SynergyKind};
use super::collision::{circles_overlap, point_segment_distance, separation_offsets, steer_toward, within};
use super::state::{GameState, Owner, Projectile, ProjectileKind, SimPhase};
use super::encounter;
use super::synergy::is_active;
use crate::events::SimEvent;
use crate::{angle_to, from_angle};

/// Ticks between poison damage ticks
pub const POISON_INTERVAL: u32 = 30;
/// Stun applied by blasts with the Grounded relic
pub const GROUNDED_STUN: u32 = 30;
/// Boomerang projectiles turn back at this remaining life
pub const BOOMERANG_RETURN_LIFE: u32 = 45;
/// Kills per Vampiric Touch heal
pub const VAMPIRIC_KILLS: u32 = 10;

const SHATTER_DAMAGE: i32 = 2;
const FIRESTORM_RADIUS: f32 = 24.0;
const CINDER_BLOOM_SCALE: f32 = 1.25;
const VENOM_SPREAD_RADIUS: f32 = 20.0;
const VENOM_SPREAD_TICKS: u32 = 60;
const PRISM_SHARDS: u32 = 6;
const PRISM_SPEED: f32 = 120.0;
const PRISM_LIFE: u32 = 40;
const SPLIT_COUNT: u32 = 3;
const SPLIT_RADIUS: f32 = 10.0;

/// Damage type, used by on-hit synergy rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Fire,
    Ice,
    Shock,
    Wind,
    Void,
    Radiant,
    Poison,
    Earth,
    /// ShatterShock follow-up (never chains again)
    Shatter,
    Physical,
}

impl From<ProjectileKind> for Element {
    fn from(kind: ProjectileKind) -> Self {
        match kind {
            ProjectileKind::Fire => Element::Fire,
            ProjectileKind::Ice => Element::Ice,
            ProjectileKind::Wind => Element::Wind,
            ProjectileKind::Void => Element::Void,
            ProjectileKind::Radiant | ProjectileKind::Prism => Element::Radiant,
            ProjectileKind::Poison => Element::Poison,
            ProjectileKind::Bolt => Element::Physical,
        }
    }
}

/// Apply damage to the enemy at `idx`; returns damage actually dealt.
///
/// Tanks take half damage (rounded up, minimum 1). Dead enemies are ignored.
pub fn damage_enemy(state: &mut GameState, idx: usize, amount: i32, element: Element) -> i32 {
    let Some(enemy) = state.enemies.get_mut(idx) else {
        return 0;
    };
    if !enemy.is_alive() || amount <= 0 {
        return 0;
    }
    let amount = if enemy.kind == EnemyKind::Tank {
        ((amount + 1) / 2).max(1)
    } else {
        amount
    };
    let dealt = enemy.apply_damage(amount);
    let id = enemy.id;
    let slowed = enemy.slow_timer > 0;
    state.emit(SimEvent::Hit { enemy_id: id });

    if element == Element::Shock && slowed && is_active(state, SynergyKind::ShatterShock) {
        return dealt + damage_enemy(state, idx, SHATTER_DAMAGE, Element::Shatter);
    }
    dealt
}

/// Hit the nearest enemy, then hop to the next nearest, `bounces` times.
///
/// Returns the number of enemies struck; an empty field strikes nothing.
pub fn chain_lightning(
    state: &mut GameState,
    origin: Vec2,
    bounces: u32,
    damage: i32,
    exclude: Option<u32>,
) -> u32 {
    let mut source = origin;
    let mut last = exclude;
    let mut struck = 0;
    for _ in 0..bounces {
        let Some(idx) = state.nearest_enemy(source, last) else {
            break;
        };
        let (id, pos) = (state.enemies[idx].id, state.enemies[idx].pos);
        damage_enemy(state, idx, damage, Element::Shock);
        source = pos;
        last = Some(id);
        struck += 1;
    }
    struck
}

/// Damage every live enemy within `radius` of `center`; returns hit count
pub fn radial_explosion(state: &mut GameState, center: Vec2, radius: f32, damage: i32, element: Element) -> usize {
    let targets: Vec<usize> = state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_alive() && within(center, radius, e.pos))
        .map(|(i, _)| i)
        .collect();
    let grounded = state.has_relic(RelicKind::Grounded);
    for &idx in &targets {
        damage_enemy(state, idx, damage, element);
        if grounded {
            state.enemies[idx].stun = state.enemies[idx].stun.max(GROUNDED_STUN);
        }
    }
    targets.len()
}

/// Damage every live enemy within `radius` of the segment `from`-`to`
pub fn line_strike(state: &mut GameState, from: Vec2, to: Vec2, radius: f32, damage: i32) -> usize {
    let targets: Vec<usize> = state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_alive() && point_segment_distance(e.pos, from, to) <= radius + e.radius)
        .map(|(i, _)| i)
        .collect();
    for &idx in &targets {
        damage_enemy(state, idx, damage, Element::Shock);
    }
    targets.len()
}

/// Slow every live enemy within `radius`
pub fn slow_in_radius(state: &mut GameState, center: Vec2, radius: f32, multiplier: f32, ticks: u32) {
    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        if within(center, radius, enemy.pos) {
            enemy.apply_slow(multiplier, ticks);
        }
    }
}

/// Damage the player (respecting i-frames); returns damage taken
pub fn hurt_player(state: &mut GameState, amount: i32) -> i32 {
    if !state.player.is_alive() {
        return 0;
    }
    let taken = state.player.take_damage(amount, state.config.invulnerability_ticks);
    if taken > 0 {
        state.emit(SimEvent::Hurt { damage: taken });
        if !state.player.is_alive() {
            defeat(state);
        }
    }
    taken
}

fn defeat(state: &mut GameState) {
    if matches!(state.phase, SimPhase::Over | SimPhase::Victory) {
        return;
    }
    log::info!(
        "Run over in room {} after {} kills",
        state.room,
        state.stats.kills
    );
    state.phase = SimPhase::Over;
    state.emit(SimEvent::Defeat);
}

/// Count down enemy status timers and apply poison ticks
pub fn tick_enemy_status(state: &mut GameState) {
    let hellfire = is_active(state, SynergyKind::Hellfire);
    for idx in 0..state.enemies.len() {
        let enemy = &mut state.enemies[idx];
        if !enemy.is_alive() {
            continue;
        }
        if enemy.slow_timer > 0 {
            enemy.slow_timer -= 1;
            if enemy.slow_timer == 0 {
                enemy.slow_mul = 1.0;
            }
        }
        enemy.stun = enemy.stun.saturating_sub(1);
        enemy.shield_timer = enemy.shield_timer.saturating_sub(1);
        enemy.contact_cooldown = enemy.contact_cooldown.saturating_sub(1);

        if enemy.poison_timer == 0 {
            continue;
        }
        enemy.poison_timer -= 1;
        enemy.poison_tick += 1;
        let mut poison_damage = None;
        if enemy.poison_tick >= POISON_INTERVAL {
            enemy.poison_tick = 0;
            poison_damage = Some(enemy.poison_stacks + i32::from(hellfire));
        }
        if enemy.poison_timer == 0 {
            enemy.poison_stacks = 0;
            enemy.poison_tick = 0;
        }
        if let Some(damage) = poison_damage {
            damage_enemy(state, idx, damage, Element::Poison);
        }
    }
}

/// Push overlapping enemies apart and keep them inside the arena
pub fn separate_enemies(state: &mut GameState) {
    let positions: Vec<Vec2> = state.enemies.iter().map(|e| e.pos).collect();
    let offsets = separation_offsets(&positions);
    let (w, h) = (state.config.arena_width, state.config.arena_height);
    for (enemy, offset) in state.enemies.iter_mut().zip(offsets) {
        let pos = enemy.pos + offset;
        let r = enemy.radius;
        enemy.pos = Vec2::new(pos.x.clamp(r, (w - r).max(r)), pos.y.clamp(r, (h - r).max(r)));
    }
}

fn inside(pos: Vec2, width: f32, height: f32) -> bool {
    pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= width && pos.y <= height
}

/// Move player projectiles and resolve their hits
pub fn update_player_projectiles(state: &mut GameState, dt: f32) {
    let mut projectiles = std::mem::take(&mut state.projectiles);
    let (w, h) = (state.config.arena_width, state.config.arena_height);
    let player_pos = state.player.pos;

    for p in projectiles.iter_mut() {
        if p.boomerang && p.life == BOOMERANG_RETURN_LIFE {
            p.vel = from_angle(angle_to(p.pos, player_pos), p.vel.length());
            p.hit_ids.clear();
        }
        p.pos += p.vel * dt;
        p.life = p.life.saturating_sub(1);
        if p.life == 0 || !inside(p.pos, w, h) {
            p.life = 0;
            continue;
        }
        resolve_projectile_hits(state, p);
    }

    projectiles.retain(|p| p.life > 0);
    // Shards spawned during resolution join after the survivors
    projectiles.append(&mut state.projectiles);
    state.projectiles = projectiles;
}

fn resolve_projectile_hits(state: &mut GameState, p: &mut Projectile) {
    for idx in 0..state.enemies.len() {
        let enemy = &state.enemies[idx];
        if !enemy.is_alive()
            || p.hit_ids.contains(&enemy.id)
            || !circles_overlap(p.pos, p.radius, enemy.pos, enemy.radius)
        {
            continue;
        }
        p.hit_ids.push(enemy.id);
        on_projectile_hit(state, idx, p);
        if p.pierce == 0 {
            p.life = 0;
            return;
        }
        p.pierce -= 1;
    }
}

fn on_projectile_hit(state: &mut GameState, idx: usize, p: &Projectile) {
    let (id, pos) = (state.enemies[idx].id, state.enemies[idx].pos);
    if let Some((multiplier, ticks)) = p.slow {
        state.enemies[idx].apply_slow(multiplier, ticks);
    }
    if let Some((stacks, ticks)) = p.poison {
        state.enemies[idx].apply_poison(stacks, ticks);
    }

    let mut damage = p.damage;
    match p.kind {
        ProjectileKind::Fire if is_active(state, SynergyKind::Firestorm) => {
            let radius = if state.has_relic(RelicKind::CinderBloom) {
                FIRESTORM_RADIUS * CINDER_BLOOM_SCALE
            } else {
                FIRESTORM_RADIUS
            };
            radial_explosion(state, pos, radius, 1, Element::Fire);
        }
        ProjectileKind::Poison if is_active(state, SynergyKind::Hellfire) => {
            damage += 1;
        }
        _ => {}
    }

    damage_enemy(state, idx, damage, p.kind.into());

    match p.kind {
        ProjectileKind::Poison if is_active(state, SynergyKind::VenomRend) => {
            for other in state.enemies.iter_mut() {
                if other.id != id && other.is_alive() && within(pos, VENOM_SPREAD_RADIUS, other.pos) {
                    other.apply_poison(1, VENOM_SPREAD_TICKS);
                }
            }
        }
        ProjectileKind::Void if is_active(state, SynergyKind::VoidStorm) => {
            chain_lightning(state, pos, 2, 1, Some(id));
        }
        ProjectileKind::Radiant if is_active(state, SynergyKind::PrismIce) => {
            for i in 0..PRISM_SHARDS {
                let dir = i as f32 / PRISM_SHARDS as f32 * TAU;
                let mut shard = Projectile::new(Owner::Player, ProjectileKind::Prism, pos, dir, PRISM_SPEED, 1)
                    .with_life(PRISM_LIFE);
                shard.hit_ids.push(id);
                state.spawn_projectile(shard);
            }
        }
        _ => {}
    }
}

/// Move enemy projectiles and resolve hits on the player
pub fn update_enemy_projectiles(state: &mut GameState, dt: f32) {
    let (w, h) = (state.config.arena_width, state.config.arena_height);
    let (player_pos, player_radius) = (state.player.pos, state.player.radius);
    let mut blocked = state.player.i_timer > 0 || !state.player.is_alive();
    let mut hit = None;

    for p in state.enemy_projectiles.iter_mut() {
        if let Some(turn) = p.homing {
            p.vel = steer_toward(p.pos, p.vel, player_pos, turn);
        }
        p.pos += p.vel * dt;
        p.life = p.life.saturating_sub(1);
        if p.life == 0 || !inside(p.pos, w, h) {
            p.life = 0;
            continue;
        }
        if !blocked && circles_overlap(p.pos, p.radius, player_pos, player_radius) {
            hit = Some(p.damage);
            blocked = true;
            p.life = 0;
        }
    }
    state.enemy_projectiles.retain(|p| p.life > 0);

    if let Some(damage) = hit {
        hurt_player(state, damage);
    }
}

/// Enemy bodies touching the player deal contact damage
pub fn contact_damage(state: &mut GameState) {
    if state.player.i_timer > 0 || !state.player.is_alive() {
        return;
    }
    let (player_pos, player_radius) = (state.player.pos, state.player.radius);
    let toucher = state.enemies.iter().position(|e| {
        e.is_alive() && e.contact_cooldown == 0 && circles_overlap(e.pos, e.radius, player_pos, player_radius)
    });
    if let Some(idx) = toucher {
        state.enemies[idx].contact_cooldown = state.config.contact_cooldown_ticks;
        let damage = state.config.contact_damage;
        hurt_player(state, damage);
    }
}

/// Remove dead enemies and run their death effects
pub fn resolve_deaths(state: &mut GameState) {
    let dead: Vec<(u32, EnemyKind, Vec2)> = state
        .enemies
        .iter()
        .filter(|e| !e.is_alive())
        .map(|e| (e.id, e.kind, e.pos))
        .collect();
    if dead.is_empty() {
        return;
    }
    state.enemies.retain(|e| e.is_alive());

    let mut final_boss_down = false;
    for (enemy_id, kind, pos) in dead {
        state.stats.kills += 1;
        state.emit(SimEvent::Kill { enemy_id, kind });

        if kind == EnemyKind::Splitter {
            for i in 0..SPLIT_COUNT {
                let offset = from_angle(i as f32 / SPLIT_COUNT as f32 * TAU, SPLIT_RADIUS);
                state.spawn_enemy(EnemyKind::Minion, pos + offset);
            }
        }

        if state.has_relic(RelicKind::VampiricTouch) {
            state.stats.vampiric_kills += 1;
            if state.stats.vampiric_kills >= VAMPIRIC_KILLS {
                state.stats.vampiric_kills = 0;
                state.player.heal(1);
            }
        }

        if kind.is_boss() {
            log::info!("Boss defeated: {} in room {}", kind.name(), state.room);
            state.emit(SimEvent::BossDefeated { kind });
            state.boss_reward_pending = true;
            final_boss_down |= state.room >= state.config.max_rooms;
        }
    }

    // The final boss ends the run even with its summons still alive
    if final_boss_down && state.phase == SimPhase::Play {
        encounter::end_room(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::synergy::activate;

    fn empty_state() -> GameState {
        let mut state = GameState::new(11);
        state.enemies.clear();
        state.projectiles.clear();
        state.enemy_projectiles.clear();
        state.events.clear();
        state
    }

    fn player_shot(pos: Vec2, kind: ProjectileKind) -> Projectile {
        Projectile::new(Owner::Player, kind, pos, 0.0, 60.0, 1)
    }

    #[test]
    fn test_tank_takes_half_damage_rounded_up() {
        let mut state = empty_state();
        state.spawn_enemy(EnemyKind::Tank, Vec2::new(50.0, 50.0));
        let max = state.enemies[0].max_hp;
        assert_eq!(damage_enemy(&mut state, 0, 3, Element::Fire), 2);
        assert_eq!(damage_enemy(&mut state, 0, 1, Element::Fire), 1);
        assert_eq!(state.enemies[0].hp, max - 3);
    }

    #[test]
    fn test_chain_lightning_tolerates_empty_field() {
        let mut state = empty_state();
        assert_eq!(chain_lightning(&mut state, Vec2::ZERO, 3, 2, None), 0);

        state.spawn_enemy(EnemyKind::Tank, Vec2::new(30.0, 30.0));
        // Single target: the chain never hits the same enemy twice in a row
        assert_eq!(chain_lightning(&mut state, Vec2::ZERO, 3, 1, None), 1);
    }

    #[test]
    fn test_shatter_shock_bonus_on_slowed_target() {
        let mut state = empty_state();
        state.spawn_enemy(EnemyKind::Tank, Vec2::new(50.0, 50.0));
        activate(&mut state, SynergyKind::ShatterShock);
        state.enemies[0].apply_slow(0.5, 30);
        let before = state.enemies[0].hp;
        damage_enemy(&mut state, 0, 2, Element::Shock);
        // 2 -> 1 for the tank, shatter 2 -> 1
        assert_eq!(state.enemies[0].hp, before - 2);
    }

    #[test]
    fn test_pierce_zero_removed_after_one_hit() {
        let mut state = empty_state();
        state.spawn_enemy(EnemyKind::Tank, Vec2::new(100.0, 100.0));
        state.spawn_enemy(EnemyKind::Tank, Vec2::new(101.0, 100.0));
        let shot = player_shot(Vec2::new(99.0, 100.0), ProjectileKind::Fire);
        state.spawn_projectile(shot);
        update_player_projectiles(&mut state, 0.0);
        assert!(state.projectiles.is_empty());
        let damaged = state.enemies.iter().filter(|e| e.hp < e.max_hp).count();
        assert_eq!(damaged, 1);
    }

    #[test]
    fn test_pierce_hits_each_enemy_once() {
        let mut state = empty_state();
        state.spawn_enemy(EnemyKind::Tank, Vec2::new(100.0, 100.0));
        state.spawn_enemy(EnemyKind::Tank, Vec2::new(101.0, 100.0));
        let shot = player_shot(Vec2::new(99.0, 100.0), ProjectileKind::Wind).with_pierce(2);
        state.spawn_projectile(shot);
        for _ in 0..5 {
            update_player_projectiles(&mut state, 0.0);
        }
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].pierce, 0);
        for enemy in &state.enemies {
            assert_eq!(enemy.max_hp - enemy.hp, 1);
        }
    }

    #[test]
    fn test_enemy_projectile_respects_iframes() {
        let mut state = empty_state();
        let pos = state.player.pos;
        state.player.i_timer = 10;
        state.spawn_projectile(Projectile::enemy_bolt(pos, 0.0, 0.0, 100));
        update_enemy_projectiles(&mut state, SIM_DT);
        assert_eq!(state.player.hp, state.player.hp_max);
        assert_eq!(state.enemy_projectiles.len(), 1);

        state.player.i_timer = 0;
        update_enemy_projectiles(&mut state, SIM_DT);
        assert_eq!(state.player.hp, state.player.hp_max - 1);
        assert!(state.enemy_projectiles.is_empty());
        assert_eq!(state.player.i_timer, state.config.invulnerability_ticks);
    }

    #[test]
    fn test_contact_cooldown_per_enemy() {
        let mut state = empty_state();
        let pos = state.player.pos;
        state.spawn_enemy(EnemyKind::Grunt, pos);
        contact_damage(&mut state);
        assert_eq!(state.player.hp, state.player.hp_max - 1);
        assert_eq!(state.enemies[0].contact_cooldown, state.config.contact_cooldown_ticks);

        state.player.i_timer = 0;
        contact_damage(&mut state);
        assert_eq!(state.player.hp, state.player.hp_max - 1);
    }

    #[test]
    fn test_splitter_death_spawns_three_minions() {
        let mut state = empty_state();
        state.spawn_enemy(EnemyKind::Splitter, Vec2::new(100.0, 100.0));
        state.enemies[0].hp = 0;
        resolve_deaths(&mut state);
        assert_eq!(state.enemies.len(), 3);
        assert!(state.enemies.iter().all(|e| e.kind == EnemyKind::Minion));
        for enemy in &state.enemies {
            assert!((enemy.pos.distance(Vec2::new(100.0, 100.0)) - SPLIT_RADIUS).abs() < 1e-3);
        }
        assert_eq!(state.stats.kills, 1);
    }

    #[test]
    fn test_lethal_damage_splits_splitter() {
        let mut state = empty_state();
        state.spawn_enemy(EnemyKind::Splitter, Vec2::new(100.0, 100.0));
        state.enemies[0].hp = 1;
        assert_eq!(damage_enemy(&mut state, 0, 1, Element::Fire), 1);
        resolve_deaths(&mut state);
        let minions = state.enemies.iter().filter(|e| e.kind == EnemyKind::Minion).count();
        assert_eq!(minions, 3);
        assert_eq!(state.enemies.len(), 3);
    }

    #[test]
    fn test_final_boss_death_is_victory_with_summons_alive() {
        let mut state = empty_state();
        state.room = state.config.max_rooms;
        crate::sim::encounter::start_room(&mut state);
        state.spawn_enemy(EnemyKind::Voidling, Vec2::new(40.0, 40.0));
        assert_eq!(state.enemies[0].kind, EnemyKind::VoidMonarch);
        state.enemies[0].hp = 0;

        resolve_deaths(&mut state);
        assert_eq!(state.phase, SimPhase::Victory);
        assert!(state.events.contains(&SimEvent::BossDefeated {
            kind: EnemyKind::VoidMonarch
        }));
        assert!(state.events.contains(&SimEvent::Victory));
    }

    #[test]
    fn test_midrun_boss_death_waits_for_room_clear() {
        let mut state = empty_state();
        state.room = 4;
        crate::sim::encounter::start_room(&mut state);
        state.spawn_enemy(EnemyKind::Voidling, Vec2::new(40.0, 40.0));
        state.enemies[0].hp = 0;

        resolve_deaths(&mut state);
        assert_eq!(state.phase, SimPhase::Play);
        assert!(state.boss_reward_pending);
        assert!(!state.events.contains(&SimEvent::Victory));
    }

    #[test]
    fn test_no_victory_after_defeat() {
        let mut state = empty_state();
        state.room = state.config.max_rooms;
        crate::sim::encounter::start_room(&mut state);
        state.enemies[0].hp = 0;
        state.player.hp = 1;
        hurt_player(&mut state, 1);
        resolve_deaths(&mut state);
        assert_eq!(state.phase, SimPhase::Over);
        assert!(!state.events.contains(&SimEvent::Victory));
    }

    #[test]
    fn test_poison_ticks_stacks() {
        let mut state = empty_state();
        state.spawn_enemy(EnemyKind::Tank, Vec2::new(100.0, 100.0));
        state.enemies[0].apply_poison(2, 60);
        let before = state.enemies[0].hp;
        for _ in 0..60 {
            tick_enemy_status(&mut state);
        }
        // Two poison ticks of 2, halved for the tank
        assert_eq!(state.enemies[0].hp, before - 2);
        assert_eq!(state.enemies[0].poison_stacks, 0);
    }

    #[test]
    fn test_player_defeat_sets_phase() {
        let mut state = empty_state();
        state.player.hp = 1;
        hurt_player(&mut state, 1);
        assert_eq!(state.phase, SimPhase::Over);
        assert!(state.events.contains(&SimEvent::Defeat));
    }
}
