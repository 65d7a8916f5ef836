//! Collision detection and response for circle bodies
//!
//! Everything in the arena is a circle: player, enemies, projectiles and blast
//! areas. These helpers are pure; the combat resolver decides what a contact
//! means.

use glam::Vec2;

use crate::{angle_to, from_angle, normalize_angle};

/// Enemies closer than this are pushed apart
pub const SEPARATION_DISTANCE: f32 = 8.0;
/// Push strength per unit of overlap
pub const SEPARATION_FORCE: f32 = 1.5;

/// Strict overlap test for two circles
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// Whether `point` lies within `radius` of `center` (inclusive)
#[inline]
pub fn within(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance_squared(point) <= radius * radius
}

/// Shortest distance from `p` to the segment `a`-`b`
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Pairwise separation offsets for a set of bodies.
///
/// Offsets are computed from the positions as given and returned in the same
/// order; nothing moves until the caller applies them.
pub fn separation_offsets(positions: &[Vec2]) -> Vec<Vec2> {
    let mut offsets = vec![Vec2::ZERO; positions.len()];
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let delta = positions[i] - positions[j];
            let dist = delta.length();
            if dist < SEPARATION_DISTANCE && dist > 0.0 {
                let push = delta * ((SEPARATION_DISTANCE - dist) / dist * SEPARATION_FORCE);
                offsets[i] += push;
                offsets[j] -= push;
            }
        }
    }
    offsets
}

/// Rotate `vel` toward `target` by at most `max_turn` radians, keeping its speed
pub fn steer_toward(pos: Vec2, vel: Vec2, target: Vec2, max_turn: f32) -> Vec2 {
    let speed = vel.length();
    if speed <= f32::EPSILON {
        return vel;
    }
    let heading = vel.y.atan2(vel.x);
    let diff = normalize_angle(angle_to(pos, target) - heading);
    let turn = diff.clamp(-max_turn, max_turn);
    from_angle(heading + turn, speed)
}

/// Step `pos` toward `target` by at most `step`, never overshooting
pub fn move_toward(pos: Vec2, target: Vec2, step: f32) -> Vec2 {
    let delta = target - pos;
    let dist = delta.length();
    if dist <= step || dist <= f32::EPSILON {
        return target;
    }
    pos + delta / dist * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::new(5.0, 0.0), 4.0, Vec2::ZERO, 4.0));
        assert!(!circles_overlap(Vec2::new(8.0, 0.0), 4.0, Vec2::ZERO, 4.0));
        assert!(circles_overlap(Vec2::ZERO, 1.0, Vec2::ZERO, 1.0));
    }

    #[test]
    fn test_point_segment_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!((point_segment_distance(Vec2::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-5);
        assert!((point_segment_distance(Vec2::new(-4.0, 0.0), a, b) - 4.0).abs() < 1e-5);
        assert!((point_segment_distance(Vec2::new(1.0, 1.0), a, a) - 2f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_separation_is_symmetric() {
        let offsets = separation_offsets(&[Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(50.0, 0.0)]);
        assert!(offsets[0].x < 0.0);
        assert!(offsets[1].x > 0.0);
        assert!((offsets[0] + offsets[1]).length() < 1e-5);
        assert_eq!(offsets[2], Vec2::ZERO);
    }

    #[test]
    fn test_steer_toward_limits_turn() {
        let vel = Vec2::new(60.0, 0.0);
        let steered = steer_toward(Vec2::ZERO, vel, Vec2::new(0.0, 100.0), 0.1);
        assert!((steered.length() - 60.0).abs() < 1e-3);
        assert!((steered.y.atan2(steered.x) - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_move_toward_does_not_overshoot() {
        let target = Vec2::new(3.0, 4.0);
        assert_eq!(move_toward(Vec2::ZERO, target, 10.0), target);
        let step = move_toward(Vec2::ZERO, target, 1.0);
        assert!((step.length() - 1.0).abs() < 1e-5);
    }
}
