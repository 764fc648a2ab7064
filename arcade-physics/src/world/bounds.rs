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
//! World bounds clamping

use crate::body::{Body, Face, FaceFlags};
use crate::math::Rect;

/// Clamp a body inside `bounds`, returning the sides of the body that hit
///
/// Only sides enabled in `check` collide. The velocity on a clamped axis is
/// reflected by `world_bounce`, falling back to the body's `bounce`.
pub(crate) fn clamp_to_bounds(body: &mut Body, bounds: &Rect, check: &FaceFlags) -> FaceFlags {
    let mut hit = FaceFlags::clear();
    if check.none {
        return hit;
    }
    let bounce = body.world_bounce.unwrap_or_else(|| body.bounce());

    if body.position.x < bounds.x && check.left {
        body.position.x = bounds.x;
        body.velocity.x *= -bounce.x;
        hit.set(Face::Left);
    } else if body.right() > bounds.right() && check.right {
        body.position.x = bounds.right() - body.width();
        body.velocity.x *= -bounce.x;
        hit.set(Face::Right);
    }

    if body.position.y < bounds.y && check.up {
        body.position.y = bounds.y;
        body.velocity.y *= -bounce.y;
        hit.set(Face::Up);
    } else if body.bottom() > bounds.bottom() && check.down {
        body.position.y = bounds.bottom() - body.height();
        body.velocity.y *= -bounce.y;
        hit.set(Face::Down);
    }

    for face in [Face::Up, Face::Down, Face::Left, Face::Right] {
        if hit.get(face) {
            body.blocked.set(face);
        }
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    #[test]
    fn test_clamps_and_bounces() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut body = Body::new(95.0, -3.0, 10.0, 10.0)
            .unwrap()
            .with_velocity(Vec2::new(20.0, -10.0))
            .with_bounce(Vec2::new(0.5, 1.0));

        let hit = clamp_to_bounds(&mut body, &bounds, &FaceFlags::all());
        assert!(hit.right && hit.up);
        assert_eq!(body.position(), Vec2::new(90.0, 0.0));
        assert_eq!(body.velocity, Vec2::new(-10.0, 10.0));
        assert!(body.blocked().right && body.blocked().up);
    }

    #[test]
    fn test_world_bounce_overrides_and_disabled_sides() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut body = Body::new(-5.0, 95.0, 10.0, 10.0).unwrap().with_velocity(Vec2::new(-8.0, 4.0));
        body.world_bounce = Some(Vec2::new(1.0, 1.0));

        let mut check = FaceFlags::all();
        check.down = false;
        let hit = clamp_to_bounds(&mut body, &bounds, &check);
        assert!(hit.left && !hit.down);
        assert_eq!(body.position(), Vec2::new(0.0, 95.0));
        assert_eq!(body.velocity, Vec2::new(8.0, 4.0));
    }

    #[test]
    fn test_inside_bounds_untouched() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut body = Body::new(10.0, 10.0, 10.0, 10.0).unwrap();
        assert!(clamp_to_bounds(&mut body, &bounds, &FaceFlags::all()).none);
        assert!(body.blocked().none);
    }
}
