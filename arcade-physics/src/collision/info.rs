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
//! Pairwise overlap computation
//!
//! Overlap is velocity-aware: the direction a body is pushed out is taken
//! from how the two bodies moved relative to each other this step, not
//! from where their centres are. A body that moved right into a wall is
//! pushed back left even if it travelled past the wall's centre.
//!
//! An overlap is only *resolvable* if it could have been produced by this
//! step's movement: its magnitude must not exceed
//! `|body1.dx| + |body2.dx| + bias`. A body found deeper than that inside
//! an immovable partner is left embedded instead of teleporting across it;
//! two movable bodies fall back to [`depth_overlap`], which ignores motion.

use crate::body::{Body, Face};
use crate::math::{Rect, Vec2};

/// Resolving-axis overlap at or below this counts as edges just touching
pub const TOUCH_EPSILON: f64 = 1e-3;

/// Overlaps at or below this are treated as zero
pub const SEPARATION_EPSILON: f64 = 1e-9;

/// Default slack added to the swept delta when deciding resolvability
pub const OVERLAP_BIAS: f64 = 4.0;

/// Axis of a separation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal
    X,
    /// Vertical
    Y,
}

impl Axis {
    /// The other axis
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Face of body1 hit when it is corrected by `-overlap` on this axis
    pub fn face_for(self, overlap: f64) -> Face {
        match self {
            Axis::X if overlap > 0.0 => Face::Right,
            Axis::X if overlap < 0.0 => Face::Left,
            Axis::Y if overlap > 0.0 => Face::Down,
            Axis::Y if overlap < 0.0 => Face::Up,
            _ => Face::None,
        }
    }

    pub(crate) fn get(self, v: Vec2) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    pub(crate) fn set(self, v: &mut Vec2, value: f64) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
        }
    }
}

/// Strict intersection test between two bodies, honouring circle shapes
pub fn intersects(body1: &Body, body2: &Body) -> bool {
    match (body1.radius(), body2.radius()) {
        (Some(r1), Some(r2)) => {
            let reach = r1 + r2;
            body1.center().distance(body2.center()) < reach
        }
        (Some(r), None) => {
            let c = body1.center();
            body2.bounds().closest_point(c).distance(c) < r
        }
        (None, Some(r)) => {
            let c = body2.center();
            body1.bounds().closest_point(c).distance(c) < r
        }
        (None, None) => body1.bounds().intersects(&body2.bounds()),
    }
}

/// True if the bodies overlap by more than [`TOUCH_EPSILON`]
///
/// Used after separation, where rounding can leave edges a hair inside
/// each other.
pub fn penetrates(body1: &Body, body2: &Body) -> bool {
    if body1.is_circle() || body2.is_circle() {
        return super::circle::contact(body1, body2).map_or(false, |c| c.depth > TOUCH_EPSILON);
    }
    rect_penetrates(&body1.bounds(), &body2.bounds())
}

pub(crate) fn rect_penetrates(a: &Rect, b: &Rect) -> bool {
    let ox = a.right().min(b.right()) - a.x.max(b.x);
    let oy = a.bottom().min(b.bottom()) - a.y.max(b.y);
    ox > TOUCH_EPSILON && oy > TOUCH_EPSILON
}

/// Signed overlap of body1 into body2 on one axis
///
/// Positive means body1 entered body2 from the low side (left or top) and
/// must move towards negative; negative means the opposite. With no
/// relative motion the direction comes from [`depth_overlap`].
pub fn axis_overlap(body1: &Body, body2: &Body, axis: Axis) -> f64 {
    let d1 = axis.get(body1.delta());
    let d2 = axis.get(body2.delta());
    let span1 = span(body1, axis);
    let span2 = span(body2, axis);

    let from_low = if d1 > d2 {
        true
    } else if d1 < d2 {
        false
    } else {
        centre_first(span1, span2)
    };
    directed(span1, span2, from_low)
}

/// Signed overlap of body1 into body2 on one axis, ignoring motion
///
/// The body whose centre is lower on the axis is the one entering from the
/// low side. When the centres coincide the narrower extent counts as
/// lower, so swapping the bodies always flips the sign; only identical
/// intervals give the same answer both ways.
///
/// ```
/// use arcade_physics::body::Body;
/// use arcade_physics::collision::{depth_overlap, Axis};
///
/// let small = Body::new(0.0, 0.0, 10.0, 10.0).unwrap();
/// let large = Body::new(-5.0, -5.0, 20.0, 20.0).unwrap();
/// assert_eq!(depth_overlap(&small, &large, Axis::X), 15.0);
/// assert_eq!(depth_overlap(&large, &small, Axis::X), -15.0);
/// ```
pub fn depth_overlap(body1: &Body, body2: &Body, axis: Axis) -> f64 {
    let span1 = span(body1, axis);
    let span2 = span(body2, axis);
    directed(span1, span2, centre_first(span1, span2))
}

fn span(body: &Body, axis: Axis) -> (f64, f64) {
    match axis {
        Axis::X => (body.position.x, body.right()),
        Axis::Y => (body.position.y, body.bottom()),
    }
}

fn centre_first((min1, max1): (f64, f64), (min2, max2): (f64, f64)) -> bool {
    let (c1, c2) = (min1 + max1, min2 + max2);
    if c1 != c2 {
        c1 < c2
    } else {
        max1 - min1 <= max2 - min2
    }
}

fn directed((min1, max1): (f64, f64), (min2, max2): (f64, f64), from_low: bool) -> f64 {
    if from_low {
        max1 - min2
    } else {
        min1 - max2
    }
}

/// True if `overlap` on `axis` may be corrected this step
///
/// Requires a non-zero overlap within the swept delta plus `bias`, and the
/// meeting faces to be enabled in both bodies' `check_collision`.
pub fn is_resolvable(body1: &Body, body2: &Body, axis: Axis, overlap: f64, bias: f64) -> bool {
    if overlap.abs() <= SEPARATION_EPSILON || !overlap.is_finite() {
        return false;
    }
    let max_overlap = axis.get(body1.delta()).abs() + axis.get(body2.delta()).abs() + bias;
    if overlap.abs() > max_overlap {
        return false;
    }
    faces_allow(body1, body2, axis, overlap)
}

/// True if both bodies' `check_collision` allow the faces meeting on `axis`
pub(crate) fn faces_allow(body1: &Body, body2: &Body, axis: Axis, overlap: f64) -> bool {
    if body1.check_collision.none || body2.check_collision.none {
        return false;
    }
    let face = axis.face_for(overlap);
    body1.check_collision.get(face) && body2.check_collision.get(face.opposite())
}

/// Result of checking one pair of bodies
///
/// Borrowed for the duration of one check; never stored across steps.
#[derive(Debug, Clone, Copy)]
pub struct CollisionInfo<'a> {
    /// First body
    pub body1: &'a Body,
    /// Second body
    pub body2: &'a Body,
    /// Strict intersection
    pub intersects: bool,
    /// Signed X penetration; body1 is corrected by `-overlap_x`
    pub overlap_x: f64,
    /// Signed Y penetration; body1 is corrected by `-overlap_y`
    pub overlap_y: f64,
    /// Face of body1 along the resolving axis
    pub face: Face,
    /// Edges just meeting along the resolving axis
    pub touching: bool,
}

impl<'a> CollisionInfo<'a> {
    /// Check a pair, breaking equal-overlap ties towards the Y axis
    ///
    /// ```
    /// use arcade_physics::body::{Body, Face};
    /// use arcade_physics::collision::CollisionInfo;
    ///
    /// let a = Body::new(0.0, 0.0, 10.0, 10.0).unwrap();
    /// let b = Body::new(8.0, 0.0, 10.0, 10.0).unwrap();
    /// let info = CollisionInfo::check(&a, &b, 4.0);
    /// assert!(info.intersects);
    /// assert_eq!(info.overlap_x, 2.0);
    /// assert_eq!(info.face, Face::Right);
    ///
    /// let swapped = CollisionInfo::check(&b, &a, 4.0);
    /// assert_eq!(swapped.overlap_x, -2.0);
    /// assert_eq!(swapped.face, Face::Left);
    /// ```
    pub fn check(body1: &'a Body, body2: &'a Body, bias: f64) -> Self {
        Self::check_with(body1, body2, bias, false)
    }

    /// Check a pair; `prefer_x` breaks equal-overlap ties towards X
    pub fn check_with(body1: &'a Body, body2: &'a Body, bias: f64, prefer_x: bool) -> Self {
        let mut info = CollisionInfo {
            body1,
            body2,
            intersects: false,
            overlap_x: 0.0,
            overlap_y: 0.0,
            face: Face::None,
            touching: false,
        };

        if !body1.is_valid() || !body2.is_valid() || !intersects(body1, body2) {
            return info;
        }
        info.intersects = true;
        info.overlap_x = axis_overlap(body1, body2, Axis::X);
        info.overlap_y = axis_overlap(body1, body2, Axis::Y);

        if let Some(axis) = info.resolving_axis(bias, prefer_x) {
            let overlap = info.overlap(axis);
            info.face = axis.face_for(overlap);
            info.touching = overlap.abs() <= TOUCH_EPSILON;
        }
        info
    }

    /// Overlap on one axis
    pub fn overlap(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.overlap_x,
            Axis::Y => self.overlap_y,
        }
    }

    /// Axis along which separation should happen first, if any
    ///
    /// The axis with the smaller resolvable overlap wins; equal overlaps go
    /// to Y unless `prefer_x` is set.
    pub fn resolving_axis(&self, bias: f64, prefer_x: bool) -> Option<Axis> {
        if !self.intersects {
            return None;
        }
        let rx = is_resolvable(self.body1, self.body2, Axis::X, self.overlap_x, bias);
        let ry = is_resolvable(self.body1, self.body2, Axis::Y, self.overlap_y, bias);
        match (rx, ry) {
            (true, true) => {
                let ax = self.overlap_x.abs();
                let ay = self.overlap_y.abs();
                if ax < ay || (ax == ay && prefer_x) {
                    Some(Axis::X)
                } else {
                    Some(Axis::Y)
                }
            }
            (true, false) => Some(Axis::X),
            (false, true) => Some(Axis::Y),
            (false, false) => None,
        }
    }
}
