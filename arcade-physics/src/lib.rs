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
//! # Arcade Physics
//!
//! A 2D arcade physics core: axis-aligned boxes and circles, velocity-aware
//! separation with an overlap bias, and tile-edge collision against tilemap
//! layers.
//!
//! ## Features
//!
//! - **Handle-addressed bodies**: bodies live in a generational arena owned by
//!   the [`World`]; removed handles never resolve again
//! - **Velocity-aware separation**: the push-out direction comes from how the
//!   bodies moved this step, so fast bodies do not pop through thin walls
//! - **Tile faces**: interior tile seams never snag, one-way platforms are a
//!   single flag
//! - **Deterministic**: pairs are checked in a fixed order and events come
//!   out in the order they happened
//! - **Parallelization**: optional Rayon integration for large body counts
//!
//! ## Example
//!
//! ```rust
//! use arcade_physics::{Body, PhysicsEvent, Vec2, World, WorldConfig};
//!
//! let config = WorldConfig::default().with_gravity(Vec2::new(0.0, 600.0));
//! let mut world = World::new(config).unwrap();
//!
//! let mut crate_body = Body::new(100.0, 0.0, 16.0, 16.0).unwrap();
//! crate_body.on_collide = true;
//! let falling = world.add_body(crate_body);
//! let floor = world.add_body(Body::new_static(0.0, 100.0, 400.0, 20.0).unwrap());
//! world.add_collider(falling, floor, |_, _| {}).unwrap();
//!
//! for frame in 0..120 {
//!     world.step(frame as f64 * 16.0, 1000.0 / 60.0);
//! }
//!
//! let body = world.body(falling).unwrap();
//! assert!((body.bottom() - 100.0).abs() < 1e-9);
//! assert!(body.blocked().down);
//! assert!(world
//!     .drain_events()
//!     .contains(&PhysicsEvent::Collide { body1: falling, body2: floor }));
//! ```

#![warn(missing_docs)]

/// Vector and rectangle primitives
pub mod math;

/// Error types
pub mod error;

/// Generational handles and body storage
pub mod arena;

/// Physics bodies and their contact flags
pub mod body;

/// Velocity and position integration
pub mod integration;

/// Narrow-phase checks and separation
pub mod collision;

/// Broad-phase spatial indexes
pub mod broadphase;

/// Tile layers
pub mod tilemap;

/// World configuration
pub mod config;

/// Physics events
pub mod events;

/// The simulation world
pub mod world;

pub use arena::BodyHandle;
pub use body::{Body, Face, FaceFlags};
pub use config::WorldConfig;
pub use error::{PhysicsError, PhysicsResult};
pub use events::PhysicsEvent;
pub use math::{Rect, Vec2};
pub use tilemap::{GridLayer, Tile, TileLayer};
pub use world::{Collider, World};
