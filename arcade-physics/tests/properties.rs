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
//! Property tests for the overlap and separation rules

use arcade_physics::collision::{axis_overlap, depth_overlap, intersects, penetrates, separate, Axis, OVERLAP_BIAS};
use arcade_physics::{Body, Vec2, World, WorldConfig};
use proptest::prelude::*;

fn body_strategy() -> impl Strategy<Value = Body> {
    (-100.0..100.0f64, -100.0..100.0f64, 1.0..50.0f64, 1.0..50.0f64)
        .prop_map(|(x, y, w, h)| Body::new(x, y, w, h).unwrap())
}

proptest! {
    #[test]
    fn prop_overlap_is_antisymmetric(a in body_strategy(), b in body_strategy()) {
        prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
        for axis in [Axis::X, Axis::Y] {
            if same_span(&a, &b, axis) {
                continue;
            }
            let forward = axis_overlap(&a, &b, axis);
            let backward = axis_overlap(&b, &a, axis);
            prop_assert!((forward + backward).abs() < 1e-9, "{:?}: {} vs {}", axis, forward, backward);
        }
    }

    #[test]
    fn prop_concentric_boxes_flip_sign(
        cx in -100.0..100.0f64,
        cy in -100.0..100.0f64,
        size_a in 1.0..50.0f64,
        size_b in 1.0..50.0f64,
    ) {
        prop_assume!(size_a != size_b);
        let a = Body::new(cx - size_a / 2.0, cy - size_a / 2.0, size_a, size_a).unwrap();
        let b = Body::new(cx - size_b / 2.0, cy - size_b / 2.0, size_b, size_b).unwrap();

        for axis in [Axis::X, Axis::Y] {
            let forward = depth_overlap(&a, &b, axis);
            let backward = depth_overlap(&b, &a, axis);
            prop_assert!(forward != 0.0);
            prop_assert!((forward + backward).abs() < 1e-9, "{:?}: {} vs {}", axis, forward, backward);
        }
    }

    #[test]
    fn prop_separate_leaves_movable_pairs_apart(a in body_strategy(), b in body_strategy()) {
        let (mut a, mut b) = (a, b);
        separate(&mut a, &mut b, OVERLAP_BIAS, false);
        prop_assert!(!penetrates(&a, &b), "still overlapping: {:?} {:?}", a.bounds(), b.bounds());
    }

    #[test]
    fn prop_immovable_body_is_never_moved(
        a in body_strategy(),
        b in body_strategy(),
        vx in -50.0..50.0f64,
        vy in -50.0..50.0f64,
    ) {
        let mut wall = a.with_immovable(true).with_velocity(Vec2::new(vx, vy));
        let mut mover = b.with_velocity(Vec2::new(-vx, vy * 0.5));
        let position = wall.position();
        let velocity = wall.velocity;

        separate(&mut wall, &mut mover, OVERLAP_BIAS, false);
        separate(&mut mover, &mut wall, OVERLAP_BIAS, false);

        prop_assert_eq!(wall.position(), position);
        prop_assert_eq!(wall.velocity, velocity);
    }

    #[test]
    fn prop_head_on_pairs_end_apart(
        gap in -9.5..5.0f64,
        speed_a in 0.0..10.0f64,
        speed_b in 0.0..5.0f64,
        mass_a in 0.5..10.0f64,
        mass_b in 0.5..10.0f64,
        bounce in 0.0..=1.0f64,
    ) {
        prop_assume!(speed_a + speed_b > gap + 0.01);

        let mut world = World::new(WorldConfig::default().with_variable_step()).unwrap();
        let a = world.add_body(
            Body::new(100.0, 100.0, 10.0, 20.0)
                .unwrap()
                .with_velocity(Vec2::new(speed_a, 0.0))
                .with_mass(mass_a)
                .with_bounce(Vec2::splat(bounce)),
        );
        let b = world.add_body(
            Body::new(110.0 + gap, 100.0, 10.0, 20.0)
                .unwrap()
                .with_velocity(Vec2::new(-speed_b, 0.0))
                .with_mass(mass_b)
                .with_bounce(Vec2::splat(bounce)),
        );
        world.add_collider(a, b, |_, _| {}).unwrap();
        world.advance(1.0).unwrap();

        let (a, b) = (world.body(a).unwrap(), world.body(b).unwrap());
        prop_assert!(!penetrates(a, b), "still overlapping: {:?} {:?}", a.bounds(), b.bounds());
        prop_assert!(!a.embedded() && !b.embedded());
        if gap >= 0.0 {
            // Met this step: both rebound or stop
            prop_assert!(a.velocity.x <= 0.0 && b.velocity.x >= 0.0, "pair still closing: {:?} {:?}", a.velocity, b.velocity);
        }
    }
}

fn same_span(a: &Body, b: &Body, axis: Axis) -> bool {
    match axis {
        Axis::X => a.position().x == b.position().x && a.right() == b.right(),
        Axis::Y => a.position().y == b.position().y && a.bottom() == b.bottom(),
    }
}
