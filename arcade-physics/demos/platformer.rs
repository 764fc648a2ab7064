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
//! A small platformer scene
//!
//! A player falls onto a tiled level, walks right, shoves a crate, and
//! rides a moving platform. Positions and events are printed every
//! half second of simulated time.

use arcade_physics::body::Face;
use arcade_physics::{Body, GridLayer, PhysicsEvent, Rect, Tile, Vec2, World, WorldConfig};

const LEVEL: [&str; 8] = [
    "....................",
    "....................",
    "....................",
    "..............====..",
    "....................",
    "....................",
    "#########....#######",
    "#########....#######",
];

fn build_level() -> GridLayer {
    let columns = LEVEL[0].len() as u32;
    let rows = LEVEL.len() as u32;
    let mut layer = GridLayer::new(columns, rows, 32.0, 32.0);
    for (cy, row) in LEVEL.iter().enumerate() {
        for (cx, ch) in row.chars().enumerate() {
            let tile = match ch {
                '#' => Tile::solid(1),
                '=' => Tile::platform(2),
                _ => continue,
            };
            layer.set_tile(cx as i32, cy as i32, tile);
        }
    }
    layer.recalculate_faces();
    layer
}

fn main() {
    println!("Arcade Physics - Platformer Example");
    println!("===================================\n");

    let config = WorldConfig::default()
        .with_gravity(Vec2::new(0.0, 600.0))
        .with_bounds(Rect::new(0.0, 0.0, 640.0, 256.0));
    let mut world = World::new(config).expect("default config is valid");

    let level = world.add_layer(build_level());

    let mut player = Body::new(32.0, 64.0, 20.0, 30.0)
        .expect("valid size")
        .with_velocity(Vec2::new(90.0, 0.0))
        .with_world_bounds(true);
    player.pushable = false;
    player.on_collide = true;
    let player = world.add_body(player);

    let mut crate_body = Body::new(160.0, 160.0, 24.0, 24.0)
        .expect("valid size")
        .with_drag(Vec2::new(4.0, 0.0));
    crate_body.on_collide = true;
    let crate_body = world.add_body(crate_body);

    let lift = Body::new(290.0, 200.0, 64.0, 12.0)
        .expect("valid size")
        .with_immovable(true)
        .with_velocity(Vec2::new(0.0, -30.0))
        .without_gravity();
    let lift = world.add_body(lift);

    world.add_collider(vec![player, crate_body], level, |_, _| {}).expect("bodies exist");
    world
        .add_collider(player, vec![crate_body, lift], |a, b| {
            println!("  contact at x={:.1} / x={:.1}", a.position().x, b.position().x);
        })
        .expect("bodies exist");
    world.add_collider(crate_body, lift, |_, _| {}).expect("bodies exist");

    println!("Level: {} x {} tiles, 3 bodies\n", LEVEL[0].len(), LEVEL.len());

    let frame_ms = 1000.0 / 60.0;
    for frame in 1..=240 {
        world.step(frame as f64 * frame_ms, frame_ms);

        // Walk right while standing on something
        if let Some(body) = world.body_mut(player) {
            if body.blocked().get(Face::Down) {
                body.velocity.x = 90.0;
            }
        }
        // Reverse the lift at the ends of its track
        if let Some(body) = world.body_mut(lift) {
            if body.position().y < 100.0 || body.position().y > 200.0 {
                body.velocity.y = -body.velocity.y;
            }
        }

        for event in world.drain_events() {
            match event {
                PhysicsEvent::WorldBounds { side, .. } => println!("  frame {frame}: player hit the {side:?} bound"),
                PhysicsEvent::Collide { body1, body2 } => {
                    println!("  frame {frame}: collide {body1} / {body2}")
                }
                _ => {}
            }
        }

        if frame % 30 == 0 {
            let p = world.body(player).expect("player is never removed");
            let c = world.body(crate_body).expect("crate is never removed");
            println!(
                "t={:.1}s player=({:6.1}, {:6.1}) on_ground={} crate x={:6.1}",
                world.elapsed(),
                p.position().x,
                p.position().y,
                p.blocked().down,
                c.position().x,
            );
        }
    }

    println!("\nSimulated {} steps", world.step_count());
}
