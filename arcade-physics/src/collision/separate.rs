// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Body versus body separation
//!
//! Resolution happens one axis at a time. The axis with the smaller
//! resolvable overlap goes first; if the pair still intersects afterwards
//! the other axis is tried with the updated positions. Two movable bodies
//! that still penetrate after that are pushed apart along the axis of
//! least penetration, so only a pair involving an immovable body can stay
//! embedded.

use super::circle;
use super::info::{
    axis_overlap, depth_overlap, faces_allow, intersects, is_resolvable, penetrates, Axis, CollisionInfo,
    SEPARATION_EPSILON,
};
use crate::body::{Body, ContactState, Face};

const VELOCITY_EPSILON: f64 = 1e-9;

/// Separate a pair in collide mode
///
/// Returns true if any position or velocity was corrected. Bodies that
/// still intersect afterwards are marked embedded.
pub fn separate(body1: &mut Body, body2: &mut Body, bias: f64, prefer_x: bool) -> bool {
    body1.contact.advance(ContactState::Checked);
    body2.contact.advance(ContactState::Checked);

    if !intersects(body1, body2) {
        return false;
    }

    if body1.is_circle() || body2.is_circle() {
        let resolved = circle::separate_circles(body1, body2, false);
        finish(body1, body2, resolved);
        return resolved;
    }

    let first = {
        let info = CollisionInfo::check_with(body1, body2, bias, prefer_x);
        info.resolving_axis(bias, prefer_x).map(|axis| (axis, info.overlap(axis)))
    };

    let mut resolved = false;
    if let Some((axis, overlap)) = first {
        resolved |= separate_axis(body1, body2, axis, overlap);

        let other = axis.other();
        if penetrates(body1, body2) {
            let overlap = axis_overlap(body1, body2, other);
            if is_resolvable(body1, body2, other, overlap, bias) {
                resolved |= separate_axis(body1, body2, other, overlap);
            }
        }
    }

    if !body1.is_immovable() && !body2.is_immovable() && penetrates(body1, body2) {
        resolved |= push_apart(body1, body2, prefer_x);
    }

    finish(body1, body2, resolved);
    resolved
}

/// Separate two movable bodies along the axis of least penetration
///
/// Motion is ignored; the centres decide the direction. Ties go to Y
/// unless `prefer_x` is set.
fn push_apart(body1: &mut Body, body2: &mut Body, prefer_x: bool) -> bool {
    let order = if prefer_x { [Axis::X, Axis::Y] } else { [Axis::Y, Axis::X] };
    let best = order
        .into_iter()
        .map(|axis| (axis, depth_overlap(body1, body2, axis)))
        .filter(|&(axis, overlap)| overlap.abs() > SEPARATION_EPSILON && faces_allow(body1, body2, axis, overlap))
        .min_by(|a, b| a.1.abs().total_cmp(&b.1.abs()));

    match best {
        Some((axis, overlap)) => {
            log::trace!("pushing apart on {axis:?} by {overlap}");
            separate_axis(body1, body2, axis, overlap)
        }
        None => false,
    }
}

/// Check a pair in overlap mode
///
/// Sets `touching` for the meeting faces but never moves anything. Returns
/// true if the bodies intersect.
pub fn overlap_only(body1: &mut Body, body2: &mut Body, bias: f64, prefer_x: bool) -> bool {
    body1.contact.advance(ContactState::Checked);
    body2.contact.advance(ContactState::Checked);

    if !intersects(body1, body2) {
        return false;
    }

    if body1.is_circle() || body2.is_circle() {
        return circle::separate_circles(body1, body2, true);
    }

    let face = CollisionInfo::check_with(body1, body2, bias, prefer_x).face;
    if face != Face::None {
        body1.touching.set(face);
        body2.touching.set(face.opposite());
    }
    true
}

fn finish(body1: &mut Body, body2: &mut Body, resolved: bool) {
    if resolved {
        body1.contact.advance(ContactState::Separated);
        body2.contact.advance(ContactState::Separated);
    }
    if penetrates(body1, body2) {
        body1.mark_embedded();
        body2.mark_embedded();
    }
}

/// Share of the positional correction taken by each body
///
/// `v1` and `v2` are the velocity components along the separation axis.
/// An immovable body takes nothing; a non-pushable body takes nothing
/// against a pushable partner. Otherwise the faster body (per unit mass)
/// takes more, falling back to inverse mass when speeds are equal.
pub fn correction_shares(body1: &Body, body2: &Body, v1: f64, v2: f64) -> (f64, f64) {
    match (body1.is_immovable(), body2.is_immovable()) {
        (true, true) => return (0.0, 0.0),
        (true, false) => return (0.0, 1.0),
        (false, true) => return (1.0, 0.0),
        (false, false) => {}
    }
    match (body1.pushable, body2.pushable) {
        (false, true) => return (0.0, 1.0),
        (true, false) => return (1.0, 0.0),
        _ => {}
    }

    let (s1, s2) = (v1.abs(), v2.abs());
    if (s1 - s2).abs() <= VELOCITY_EPSILON {
        let inv1 = 1.0 / body1.mass();
        let inv2 = 1.0 / body2.mass();
        let share1 = inv1 / (inv1 + inv2);
        return (share1, 1.0 - share1);
    }
    let w1 = s1 / body1.mass();
    let w2 = s2 / body2.mass();
    let share1 = w1 / (w1 + w2);
    (share1, 1.0 - share1)
}

/// Apply one axis of separation for a resolvable `overlap`
///
/// Body1 moves by `-overlap * share1`, body2 by `+overlap * share2`.
pub fn separate_axis(body1: &mut Body, body2: &mut Body, axis: Axis, overlap: f64) -> bool {
    if overlap.abs() <= SEPARATION_EPSILON {
        return false;
    }

    let face = axis.face_for(overlap);
    body1.touching.set(face);
    body2.touching.set(face.opposite());

    let im1 = body1.is_immovable();
    let im2 = body2.is_immovable();
    if im1 && im2 {
        return false;
    }

    let v1 = axis.get(body1.velocity);
    let v2 = axis.get(body2.velocity);
    let (share1, share2) = correction_shares(body1, body2, v1, v2);

    let p1 = axis.get(body1.position) - overlap * share1;
    axis.set(&mut body1.position, p1);
    let p2 = axis.get(body2.position) + overlap * share2;
    axis.set(&mut body2.position, p2);

    body1.blocked.set(face);
    body2.blocked.set(face.opposite());

    let dir = overlap.signum();
    if im2 {
        if (v1 - v2) * dir > 0.0 {
            let b = axis.get(body1.bounce());
            axis.set(&mut body1.velocity, v2 - (v1 - v2) * b);
        }
        carry(body1, body2, axis, overlap);
    } else if im1 {
        if (v2 - v1) * dir < 0.0 {
            let b = axis.get(body2.bounce());
            axis.set(&mut body2.velocity, v1 - (v2 - v1) * b);
        }
        carry(body2, body1, axis, -overlap);
    } else {
        if v1 * dir > 0.0 {
            let b1 = axis.get(body1.bounce());
            axis.set(&mut body1.velocity, -v1 * b1);
        }
        if v2 * dir < 0.0 {
            let b2 = axis.get(body2.bounce());
            axis.set(&mut body2.velocity, -v2 * b2);
        }
    }
    true
}

/// Move `rider` along with an immovable `platform` it landed on
///
/// `overlap` is from the rider's point of view: positive means the rider
/// was corrected towards negative, i.e. it sits on top of or left of the
/// platform.
fn carry(rider: &mut Body, platform: &Body, axis: Axis, overlap: f64) {
    match axis {
        Axis::Y if overlap > 0.0 => {
            let dx = platform.delta().x * platform.friction.x;
            rider.position.x += dx;
        }
        Axis::X => {
            let dy = platform.delta().y * platform.friction.y;
            rider.position.y += dy;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::OVERLAP_BIAS;
    use crate::math::Vec2;

    fn moving(x: f64, y: f64, size: f64, velocity: Vec2, dt: f64) -> Body {
        let mut body = Body::new(x, y, size, size).unwrap().with_velocity(velocity);
        body.pre_update();
        body.position += velocity * dt;
        body.update_delta();
        body
    }

    #[test]
    fn test_immovable_partner_absorbs_nothing() {
        let mut a = moving(0.0, 0.0, 32.0, Vec2::new(100.0, 0.0), 0.5);
        let mut b = Body::new(40.0, 0.0, 32.0, 32.0).unwrap().with_immovable(true);

        assert!(separate(&mut a, &mut b, OVERLAP_BIAS, false));
        assert_eq!(a.position().x, 8.0);
        assert_eq!(a.velocity.x, 0.0);
        assert_eq!(b.position().x, 40.0);
        assert!(a.blocked().right);
        assert!(b.blocked().left);
        assert!(a.touching().right);
        assert!(!a.embedded_seen);
        assert_eq!(a.contact_state(), ContactState::Separated);
    }

    #[test]
    fn test_equal_speeds_split_evenly() {
        let mut a = moving(0.0, 0.0, 32.0, Vec2::new(100.0, 0.0), 0.2).with_bounce(Vec2::splat(1.0));
        let mut b = moving(60.0, 0.0, 32.0, Vec2::new(-100.0, 0.0), 0.2).with_bounce(Vec2::splat(1.0));

        assert!(separate(&mut a, &mut b, OVERLAP_BIAS, false));
        assert!((a.position().x - 14.0).abs() < 1e-9);
        assert!((b.position().x - 46.0).abs() < 1e-9);
        assert_eq!(a.velocity.x, -100.0);
        assert_eq!(b.velocity.x, 100.0);
    }

    #[test]
    fn test_bounce_reflects_both_movable_bodies() {
        let mut a = moving(0.0, 0.0, 10.0, Vec2::new(40.0, 0.0), 0.125).with_bounce(Vec2::splat(0.5));
        let mut b = moving(16.0, 0.0, 10.0, Vec2::new(-40.0, 0.0), 0.125).with_bounce(Vec2::splat(0.25));

        assert!(separate(&mut a, &mut b, OVERLAP_BIAS, false));
        assert_eq!(a.velocity.x, -20.0);
        assert_eq!(b.velocity.x, 10.0);
        assert!(!penetrates(&a, &b));
    }

    #[test]
    fn test_resting_movable_pair_is_pushed_apart() {
        let mut a = Body::new(0.0, 0.0, 32.0, 32.0).unwrap();
        let mut b = Body::new(10.0, 0.0, 32.0, 32.0).unwrap();

        assert!(separate(&mut a, &mut b, OVERLAP_BIAS, false));
        assert_eq!(a.position().x, -11.0);
        assert_eq!(b.position().x, 21.0);
        assert_eq!(a.position().y, 0.0);
        assert!(a.blocked().right && b.blocked().left);
        assert!(!a.embedded_seen && !b.embedded_seen);
    }

    #[test]
    fn test_deep_overlap_with_immovable_stays_embedded() {
        let mut a = Body::new(0.0, 0.0, 32.0, 32.0).unwrap();
        let mut b = Body::new(10.0, 0.0, 32.0, 32.0).unwrap().with_immovable(true);

        assert!(!separate(&mut a, &mut b, OVERLAP_BIAS, false));
        assert_eq!(a.position().x, 0.0);
        assert!(a.embedded_seen);
    }

    #[test]
    fn test_faster_body_absorbs_more() {
        let a = Body::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let b = Body::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let (s1, s2) = correction_shares(&a, &b, 30.0, -10.0);
        assert!((s1 - 0.75).abs() < 1e-12);
        assert!((s2 - 0.25).abs() < 1e-12);

        // Both at rest: inverse mass decides
        let heavy = Body::new(0.0, 0.0, 1.0, 1.0).unwrap().with_mass(3.0);
        let (s1, s2) = correction_shares(&heavy, &b, 0.0, 0.0);
        assert!((s1 - 0.25).abs() < 1e-12);
        assert!((s2 - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_non_pushable_holds_position() {
        let mut a = Body::new(0.0, 0.0, 1.0, 1.0).unwrap();
        a.pushable = false;
        let b = Body::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert_eq!(correction_shares(&a, &b, 50.0, 0.0), (0.0, 1.0));
    }

    #[test]
    fn test_both_immovable_only_touch() {
        let mut a = moving(0.0, 0.0, 10.0, Vec2::new(10.0, 0.0), 0.2);
        a.immovable = true;
        let mut b = Body::new_static(8.0, 0.0, 10.0, 10.0).unwrap();

        assert!(!separate(&mut a, &mut b, OVERLAP_BIAS, false));
        assert_eq!(a.position().x, 2.0);
        assert!(a.touching().right);
        assert!(a.blocked().none);
        assert!(a.embedded_seen);
    }

    #[test]
    fn test_rider_is_carried_by_platform() {
        let mut platform = Body::new(0.0, 20.0, 100.0, 10.0).unwrap().with_immovable(true);
        platform.pre_update();
        platform.position.x += 5.0;
        platform.update_delta();

        let mut rider = moving(10.0, 8.0, 10.0, Vec2::new(0.0, 20.0), 0.2);
        assert!(separate(&mut rider, &mut platform, OVERLAP_BIAS, false));
        assert_eq!(rider.position(), Vec2::new(15.0, 10.0));
        assert_eq!(rider.velocity.y, 0.0);
        assert!(rider.blocked().down);
    }

    #[test]
    fn test_overlap_mode_never_moves() {
        let mut a = moving(0.0, 0.0, 10.0, Vec2::new(10.0, 0.0), 0.5);
        let mut b = Body::new(13.0, 0.0, 10.0, 10.0).unwrap();

        assert!(overlap_only(&mut a, &mut b, OVERLAP_BIAS, false));
        assert_eq!(a.position().x, 5.0);
        assert_eq!(b.position().x, 13.0);
        assert!(a.touching().right);
        assert!(a.blocked().none);
    }
}
