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
//! Circle contacts
//!
//! Circles are separated along the contact normal instead of per axis.
//! Circle-versus-box uses the closest point on the box to the circle
//! centre.

use super::separate::correction_shares;
use crate::body::{Body, Face};
use crate::math::{Rect, Vec2};

/// Contact between two bodies, at least one of them a circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from body1 towards body2
    pub normal: Vec2,
    /// Penetration depth along the normal
    pub depth: f64,
}

impl Contact {
    /// Face of body1 that the normal points out of
    pub fn face(&self) -> Face {
        if self.normal.x.abs() >= self.normal.y.abs() {
            if self.normal.x > 0.0 {
                Face::Right
            } else {
                Face::Left
            }
        } else if self.normal.y > 0.0 {
            Face::Down
        } else {
            Face::Up
        }
    }
}

/// Compute the contact between two bodies, if they overlap
///
/// Returns `None` when neither body is a circle or they do not overlap.
pub fn contact(body1: &Body, body2: &Body) -> Option<Contact> {
    match (body1.radius(), body2.radius()) {
        (Some(r1), Some(r2)) => {
            let d = body2.center() - body1.center();
            let dist = d.length();
            let depth = r1 + r2 - dist;
            if depth <= 0.0 {
                return None;
            }
            let normal = if dist > 0.0 { d * (1.0 / dist) } else { Vec2::new(0.0, 1.0) };
            Some(Contact { normal, depth })
        }
        (Some(r), None) => circle_box(body1.center(), r, &body2.bounds()),
        (None, Some(r)) => circle_box(body2.center(), r, &body1.bounds()).map(|c| Contact {
            normal: -c.normal,
            depth: c.depth,
        }),
        (None, None) => None,
    }
}

fn circle_box(center: Vec2, radius: f64, rect: &Rect) -> Option<Contact> {
    let closest = rect.closest_point(center);
    let d = closest - center;
    let dist = d.length();

    if dist > 0.0 {
        let depth = radius - dist;
        return (depth > 0.0).then(|| Contact { normal: d * (1.0 / dist), depth });
    }

    // Centre inside the box: push out through the nearest edge
    let edges = [
        (center.x - rect.x, Vec2::new(1.0, 0.0)),
        (rect.right() - center.x, Vec2::new(-1.0, 0.0)),
        (center.y - rect.y, Vec2::new(0.0, 1.0)),
        (rect.bottom() - center.y, Vec2::new(0.0, -1.0)),
    ];
    let (dist, normal) = edges
        .into_iter()
        .fold((f64::INFINITY, Vec2::ZERO), |best, e| if e.0 < best.0 { e } else { best });
    Some(Contact { normal, depth: dist + radius })
}

/// Resolve a circle contact; returns true if the bodies overlap
///
/// In overlap mode only `touching` is written. In collide mode positions
/// are corrected along the normal using the same shares as box separation,
/// and the normal velocities are exchanged with restitution taken from
/// each body's bounce.
pub fn separate_circles(body1: &mut Body, body2: &mut Body, overlap_only: bool) -> bool {
    let Some(contact) = contact(body1, body2) else {
        return false;
    };

    let face = contact.face();
    body1.touching.set(face);
    body2.touching.set(face.opposite());
    if overlap_only {
        return true;
    }

    let n = contact.normal;
    let u1 = body1.velocity.dot(n);
    let u2 = body2.velocity.dot(n);
    let (share1, share2) = correction_shares(body1, body2, u1, u2);
    if share1 == 0.0 && share2 == 0.0 {
        return false;
    }

    body1.position -= n * (contact.depth * share1);
    body2.position += n * (contact.depth * share2);
    body1.blocked.set(face);
    body2.blocked.set(face.opposite());

    // Only approaching pairs exchange momentum
    if u1 - u2 <= 0.0 {
        return true;
    }

    let e1 = restitution(body1, n);
    let e2 = restitution(body2, n);
    match (body1.is_immovable(), body2.is_immovable()) {
        (false, true) => {
            let next = u2 - (u1 - u2) * e1;
            body1.velocity += n * (next - u1);
        }
        (true, false) => {
            let next = u1 - (u2 - u1) * e2;
            body2.velocity += n * (next - u2);
        }
        _ => {
            let (m1, m2) = (body1.mass(), body2.mass());
            let vcm = (m1 * u1 + m2 * u2) / (m1 + m2);
            let elastic1 = ((m1 - m2) * u1 + 2.0 * m2 * u2) / (m1 + m2);
            let elastic2 = ((m2 - m1) * u2 + 2.0 * m1 * u1) / (m1 + m2);
            let next1 = vcm + (elastic1 - vcm) * e1;
            let next2 = vcm + (elastic2 - vcm) * e2;
            body1.velocity += n * (next1 - u1);
            body2.velocity += n * (next2 - u2);
        }
    }
    true
}

fn restitution(body: &Body, normal: Vec2) -> f64 {
    let b = body.bounce();
    normal.x.abs() * b.x + normal.y.abs() * b.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_circle_contact() {
        let a = Body::new_circle(0.0, 0.0, 5.0).unwrap();
        let b = Body::new_circle(8.0, 0.0, 5.0).unwrap();
        let c = contact(&a, &b).unwrap();
        assert_eq!(c.normal, Vec2::new(1.0, 0.0));
        assert!((c.depth - 2.0).abs() < 1e-12);
        assert_eq!(c.face(), Face::Right);
    }

    #[test]
    fn test_circle_box_normal_flips_with_order() {
        let ball = Body::new_circle(0.0, 0.0, 5.0).unwrap();
        let floor = Body::new_static(-50.0, 9.0, 100.0, 10.0).unwrap();
        let c = contact(&ball, &floor).unwrap();
        assert_eq!(c.normal, Vec2::new(0.0, 1.0));
        assert!((c.depth - 1.0).abs() < 1e-12);

        let flipped = contact(&floor, &ball).unwrap();
        assert_eq!(flipped.normal, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_centre_inside_box_uses_nearest_edge() {
        let ball = Body::new_circle(0.0, 0.0, 2.0).unwrap();
        let wall = Body::new_static(1.0, -20.0, 40.0, 40.0).unwrap();
        // Centre (2, 2) is 1 unit past the wall's left edge
        let c = contact(&ball, &wall).unwrap();
        assert_eq!(c.normal, Vec2::new(1.0, 0.0));
        assert!((c.depth - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_elastic_exchange_of_equal_masses() {
        let mut a = Body::new_circle(0.0, 0.0, 5.0)
            .unwrap()
            .with_velocity(Vec2::new(10.0, 0.0))
            .with_bounce(Vec2::splat(1.0));
        let mut b = Body::new_circle(8.0, 0.0, 5.0)
            .unwrap()
            .with_bounce(Vec2::splat(1.0));

        assert!(separate_circles(&mut a, &mut b, false));
        assert!((a.velocity.x - 0.0).abs() < 1e-9);
        assert!((b.velocity.x - 10.0).abs() < 1e-9);
        // a was the only mover, so it absorbs the whole correction
        assert!((a.position().x + 2.0).abs() < 1e-9);
        assert_eq!(b.position().x, 8.0);
    }

    #[test]
    fn test_ball_bounces_off_static_floor() {
        let mut ball = Body::new_circle(0.0, 0.0, 5.0)
            .unwrap()
            .with_velocity(Vec2::new(0.0, 40.0))
            .with_bounce(Vec2::new(0.0, 0.5));
        let mut floor = Body::new_static(-50.0, 9.0, 100.0, 10.0).unwrap();

        assert!(separate_circles(&mut ball, &mut floor, false));
        assert!((ball.position().y + 1.0).abs() < 1e-9);
        assert!((ball.velocity.y + 20.0).abs() < 1e-9);
        assert!(ball.blocked().down);
        assert!(floor.blocked().up);
    }

    #[test]
    fn test_overlap_only_leaves_positions() {
        let mut a = Body::new_circle(0.0, 0.0, 5.0).unwrap();
        let mut b = Body::new_circle(8.0, 0.0, 5.0).unwrap();
        assert!(separate_circles(&mut a, &mut b, true));
        assert_eq!(a.position().x, 0.0);
        assert!(a.touching().right);
        assert!(a.blocked().none);
    }
}
