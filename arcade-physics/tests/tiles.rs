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
//! Body-versus-tile collision through the world

use arcade_physics::events::PhysicsEvent;
use arcade_physics::tilemap::{GridLayer, Tile, TileLayer};
use arcade_physics::world::Collider;
use arcade_physics::{Body, Vec2, World, WorldConfig};
use std::cell::RefCell;
use std::rc::Rc;

/// 8x4 map of 16px tiles with a solid floor on the bottom row
fn floor_layer() -> GridLayer {
    #[rustfmt::skip]
    let data = [
        -1, -1, -1, -1, -1, -1, -1, -1,
        -1, -1, -1, -1, -1, -1, -1, -1,
        -1, -1, -1, -1, -1, -1, -1, -1,
         1,  1,  1,  1,  1,  1,  1,  1,
    ];
    GridLayer::from_indices(8, 4, 16.0, 16.0, &data, |index| index > 0)
}

fn wall_layer(collide_left: bool) -> GridLayer {
    let mut layer = GridLayer::new(4, 1, 16.0, 16.0);
    layer.set_tile(2, 0, Tile::solid(7));
    layer.set_collision(2, 0, true, true, collide_left, true);
    layer
}

#[test]
fn test_wall_tile_blocks_when_left_side_collides() {
    let mut world = World::default();
    let layer = world.add_layer(wall_layer(true));
    let body = world.add_body(
        Body::new(20.0, 3.0, 10.0, 10.0)
            .unwrap()
            .with_velocity(Vec2::new(60.0, 0.0)),
    );
    world.add_collider(body, layer, |_, _| {}).unwrap();

    world.advance(0.1).unwrap();

    let body = world.body(body).unwrap();
    assert_eq!(body.position().x, 22.0, "Body should stop at the tile's left edge");
    assert!(body.blocked().right);
    assert_eq!(body.velocity.x, 0.0);
}

#[test]
fn test_wall_tile_passes_when_left_side_disabled() {
    let mut world = World::default();
    let layer = world.add_layer(wall_layer(false));
    let body = world.add_body(
        Body::new(20.0, 3.0, 10.0, 10.0)
            .unwrap()
            .with_velocity(Vec2::new(60.0, 0.0)),
    );
    world.add_collider(body, layer, |_, _| {}).unwrap();

    world.advance(0.1).unwrap();

    let body = world.body(body).unwrap();
    assert_eq!(body.position().x, 26.0);
    assert!(body.blocked().none);
}

#[test]
fn test_lands_and_slides_along_tiled_floor() {
    let config = WorldConfig::default().with_gravity(Vec2::new(0.0, 600.0));
    let mut world = World::new(config).unwrap();
    let layer = world.add_layer(floor_layer());
    let player = world.add_body(Body::new(4.0, 20.0, 12.0, 12.0).unwrap());
    world.add_collider(player, layer, |_, _| {}).unwrap();

    for _ in 0..60 {
        world.advance(1.0 / 60.0).unwrap();
    }
    let body = world.body(player).unwrap();
    assert!((body.bottom() - 48.0).abs() < 1e-9, "bottom = {}", body.bottom());
    assert!(body.blocked().down);

    // Walk right across several tile seams without snagging
    world.body_mut(player).unwrap().velocity.x = 120.0;
    for _ in 0..30 {
        world.advance(1.0 / 60.0).unwrap();
    }
    let body = world.body(player).unwrap();
    assert!((body.position().x - 64.0).abs() < 1e-6, "x = {}", body.position().x);
    assert!((body.bottom() - 48.0).abs() < 1e-9);
    assert!(!body.blocked().right);
}

#[test]
fn test_one_way_platform() {
    let mut layer = GridLayer::new(4, 4, 16.0, 16.0);
    layer.set_tile(1, 2, Tile::platform(3));
    let mut world = World::new(WorldConfig::default().with_gravity(Vec2::new(0.0, 400.0))).unwrap();
    let layer = world.add_layer(layer);
    // Starts below the platform moving up fast
    let body = world.add_body(
        Body::new(18.0, 50.0, 10.0, 10.0)
            .unwrap()
            .with_velocity(Vec2::new(0.0, -300.0)),
    );
    world.add_collider(body, layer, |_, _| {}).unwrap();

    let mut passed_through = false;
    for _ in 0..120 {
        world.advance(1.0 / 60.0).unwrap();
        if world.body(body).unwrap().bottom() < 32.0 {
            passed_through = true;
        }
    }
    assert!(passed_through, "Body should jump up through the platform");
    let body = world.body(body).unwrap();
    assert!((body.bottom() - 32.0).abs() < 1e-9, "Body should land on top, bottom = {}", body.bottom());
    assert!(body.blocked().down);
}

#[test]
fn test_tile_events_and_callbacks() {
    let mut world = World::default();
    let layer = world.add_layer(wall_layer(true));
    let mut body = Body::new(20.0, 3.0, 10.0, 10.0)
        .unwrap()
        .with_velocity(Vec2::new(60.0, 0.0));
    body.on_collide = true;
    let handle = world.add_body(body);

    let hits = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&hits);
    world
        .add(Collider::collide(handle, layer).with_tile_callback(move |_, tile| log.borrow_mut().push(tile.index)))
        .unwrap();

    world.advance(0.1).unwrap();

    assert_eq!(*hits.borrow(), vec![7]);
    assert_eq!(
        world.drain_events(),
        vec![PhysicsEvent::TileCollide { body: handle, layer, cell: (2, 0), index: 7 }]
    );
}

#[test]
fn test_tile_overlap_does_not_move() {
    let mut world = World::default();
    let layer = world.add_layer(floor_layer());
    let mut body = Body::new(0.0, 44.0, 10.0, 10.0).unwrap();
    body.on_overlap = true;
    let handle = world.add_body(body);
    world.add_overlap(layer, handle, |_, _| {}).unwrap();

    world.advance(1.0 / 60.0).unwrap();

    assert_eq!(world.body(handle).unwrap().position(), Vec2::new(0.0, 44.0));
    let events = world.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], PhysicsEvent::TileOverlap { cell: (0, 3), index: 1, .. }));
}

#[test]
fn test_body_outside_layer_has_no_candidates() {
    let layer = floor_layer();
    let far = Body::new(500.0, 500.0, 10.0, 10.0).unwrap();
    assert!(layer.cells_under(&far.bounds()).is_none());

    let mut world = World::default();
    let layer = world.add_layer(layer);
    let handle = world.add_body(far);
    assert!(!world.collide(handle, layer));
}

#[test]
fn test_immediate_collide_against_layer() {
    let mut world = World::default();
    let layer = world.add_layer(floor_layer());
    let handle = world.add_body(
        Body::new(4.0, 36.0, 10.0, 10.0)
            .unwrap()
            .with_velocity(Vec2::new(0.0, 16.0)),
    );

    // No collider registered: the step sinks the body 2 into the floor
    world.advance(0.25).unwrap();
    assert_eq!(world.body(handle).unwrap().bottom(), 50.0);
    assert!(world.overlap(handle, layer));
    assert_eq!(world.body(handle).unwrap().bottom(), 50.0, "overlap must not move the body");

    assert!(world.collide(handle, layer));
    let body = world.body(handle).unwrap();
    assert_eq!(body.bottom(), 48.0);
    assert!(body.blocked().down);
}
