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
//! Typed physics events
//!
//! The world queues events while it steps; the host drains them once per
//! frame with [`World::drain_events`](crate::world::World::drain_events).
//! Events carry handles, never references, so they can outlive the step
//! that produced them. A handle in an event may be stale by the time it is
//! read if the body was removed in between.

use crate::arena::BodyHandle;
use crate::body::Face;
use crate::world::LayerId;

/// Something that happened during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsEvent {
    /// Two bodies were separated by a collider
    Collide {
        /// First body of the pair
        body1: BodyHandle,
        /// Second body of the pair
        body2: BodyHandle,
    },
    /// Two bodies overlapped under an overlap collider
    Overlap {
        /// First body of the pair
        body1: BodyHandle,
        /// Second body of the pair
        body2: BodyHandle,
    },
    /// A body was separated from a tile
    TileCollide {
        /// The body
        body: BodyHandle,
        /// Layer holding the tile
        layer: LayerId,
        /// Tile cell `(column, row)`
        cell: (i32, i32),
        /// Tile index
        index: i32,
    },
    /// A body overlapped a colliding tile under an overlap collider
    TileOverlap {
        /// The body
        body: BodyHandle,
        /// Layer holding the tile
        layer: LayerId,
        /// Tile cell `(column, row)`
        cell: (i32, i32),
        /// Tile index
        index: i32,
    },
    /// A body hit the world bounds
    WorldBounds {
        /// The body
        body: BodyHandle,
        /// Side of the body that hit the bounds
        side: Face,
    },
    /// The world was paused
    Pause,
    /// The world was resumed
    Resume,
}

impl PhysicsEvent {
    /// True if the event mentions `handle`
    pub fn involves(&self, handle: BodyHandle) -> bool {
        match *self {
            PhysicsEvent::Collide { body1, body2 } | PhysicsEvent::Overlap { body1, body2 } => {
                body1 == handle || body2 == handle
            }
            PhysicsEvent::TileCollide { body, .. }
            | PhysicsEvent::TileOverlap { body, .. }
            | PhysicsEvent::WorldBounds { body, .. } => body == handle,
            PhysicsEvent::Pause | PhysicsEvent::Resume => false,
        }
    }
}

/// FIFO of events waiting to be drained
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    events: Vec<PhysicsEvent>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event
    pub fn push(&mut self, event: PhysicsEvent) {
        log::trace!("queued {event:?}");
        self.events.push(event);
    }

    /// Take every queued event in the order it was queued
    pub fn drain(&mut self) -> std::vec::Drain<'_, PhysicsEvent> {
        self.events.drain(..)
    }

    /// Queued events without removing them
    pub fn iter(&self) -> impl Iterator<Item = &PhysicsEvent> {
        self.events.iter()
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
