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
//! End-to-end scenarios driven through the world
//!
//! Each test builds a small world, steps it and checks the resulting body
//! state and events.

use arcade_physics::body::ContactState;
use arcade_physics::{Body, PhysicsEvent, Vec2, World};
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn test_body_stops_against_immovable_body() {
    let mut world = World::default();
    let a = world.add_body(
        Body::new(0.0, 0.0, 32.0, 32.0)
            .unwrap()
            .with_velocity(Vec2::new(100.0, 0.0)),
    );
    let b = world.add_body(Body::new(40.0, 0.0, 32.0, 32.0).unwrap().with_immovable(true));
    world.add_collider(a, b, |_, _| {}).unwrap();

    world.advance(0.5).unwrap();

    let body_a = world.body(a).unwrap();
    let body_b = world.body(b).unwrap();
    assert_eq!(body_a.position().x, 8.0, "A should be pushed back to B's left edge");
    assert_eq!(body_a.velocity.x, 0.0, "Bounce 0 should stop A");
    assert!(body_a.blocked().right);
    assert!(body_a.touching().right);
    assert!(body_b.blocked().left);
    assert_eq!(body_b.position().x, 40.0, "Immovable body must not move");
    assert_eq!(body_b.velocity.x, 0.0);
    assert!(!body_a.embedded());
    assert_eq!(body_a.contact_state(), ContactState::Separated);
}

#[test]
fn test_head_on_collision_of_equal_bodies() {
    let mut world = World::default();
    let mut left = Body::new(0.0, 0.0, 32.0, 32.0)
        .unwrap()
        .with_velocity(Vec2::new(100.0, 0.0))
        .with_bounce(Vec2::splat(1.0));
    left.on_collide = true;
    let right = Body::new(60.0, 0.0, 32.0, 32.0)
        .unwrap()
        .with_velocity(Vec2::new(-100.0, 0.0))
        .with_bounce(Vec2::splat(1.0));
    let a = world.add_body(left);
    let b = world.add_body(right);

    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    world.add_collider(a, b, move |_, _| seen.set(seen.get() + 1)).unwrap();

    world.advance(0.2).unwrap();

    let body_a = world.body(a).unwrap();
    let body_b = world.body(b).unwrap();
    // Overlap of 12 split evenly
    assert!((body_a.position().x - 14.0).abs() < 1e-9);
    assert!((body_b.position().x - 46.0).abs() < 1e-9);
    assert_eq!(body_a.velocity.x, -100.0);
    assert_eq!(body_b.velocity.x, 100.0);
    assert_eq!(calls.get(), 1);
    assert_eq!(world.drain_events(), vec![PhysicsEvent::Collide { body1: a, body2: b }]);
}

#[test]
fn test_group_collides_with_itself_once_per_pair() {
    let mut world = World::default();
    let handles: Vec<_> = (0..3)
        .map(|i| {
            let mut body = Body::new(i as f64 * 12.0, 0.0, 10.0, 10.0).unwrap();
            body.on_overlap = true;
            world.add_body(body)
        })
        .collect();
    // Everything overlaps everything
    for &h in &handles {
        world.body_mut(h).unwrap().set_position(Vec2::new(0.0, 0.0));
    }

    world.add_overlap(handles.clone(), handles.clone(), |_, _| {}).unwrap();
    world.advance(1.0 / 60.0).unwrap();

    let events = world.drain_events();
    assert_eq!(events.len(), 3, "Three bodies form three pairs: {events:?}");
    assert_eq!(events[0], PhysicsEvent::Overlap { body1: handles[0], body2: handles[1] });
    assert_eq!(events[1], PhysicsEvent::Overlap { body1: handles[0], body2: handles[2] });
    assert_eq!(events[2], PhysicsEvent::Overlap { body1: handles[1], body2: handles[2] });

    // Overlap mode never moves anything
    for &h in &handles {
        assert_eq!(world.body(h).unwrap().position(), Vec2::ZERO);
    }
}

#[test]
fn test_falling_body_rests_on_static_floor() {
    let mut world = World::new(
        arcade_physics::WorldConfig::default().with_gravity(Vec2::new(0.0, 500.0)),
    )
    .unwrap();
    let player = world.add_body(Body::new(50.0, 0.0, 20.0, 20.0).unwrap());
    let floor = world.add_body(Body::new_static(0.0, 200.0, 300.0, 20.0).unwrap());
    world.add_collider(player, floor, |_, _| {}).unwrap();

    for frame in 0..180 {
        world.step(frame as f64, 1000.0 / 60.0);
    }

    let body = world.body(player).unwrap();
    assert!((body.bottom() - 200.0).abs() < 1e-6, "bottom = {}", body.bottom());
    assert!(body.blocked().down);
    assert!(body.touching().down);
    assert!(!body.embedded());
    assert_eq!(world.body(floor).unwrap().position(), Vec2::new(0.0, 200.0));
}

#[test]
fn test_pushable_crate_is_shoved() {
    let mut world = World::default();
    let mut player = Body::new(0.0, 0.0, 10.0, 10.0)
        .unwrap()
        .with_velocity(Vec2::new(60.0, 0.0));
    player.pushable = false;
    let player = world.add_body(player);
    let crate_box = world.add_body(Body::new(10.5, 0.0, 10.0, 10.0).unwrap());
    world.add_collider(player, crate_box, |_, _| {}).unwrap();

    world.advance(0.1).unwrap();

    // The player keeps its full move, the crate absorbs the overlap
    assert_eq!(world.body(player).unwrap().position().x, 6.0);
    assert!((world.body(crate_box).unwrap().position().x - 16.0).abs() < 1e-9);
}
