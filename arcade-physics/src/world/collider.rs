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
//! Registered collide/overlap pairings

use crate::arena::BodyHandle;
use crate::body::Body;
use crate::tilemap::Tile;
use std::fmt;

use super::LayerId;

/// Identifier of a registered collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub(crate) usize);

impl ColliderId {
    /// Registration slot
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ColliderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Collider({})", self.0)
    }
}

/// One side of a collider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColliderTarget {
    /// A single body
    Body(BodyHandle),
    /// A group of bodies; a group paired with itself checks every pair once
    Group(Vec<BodyHandle>),
    /// A tile layer
    Layer(LayerId),
}

impl ColliderTarget {
    /// True for tile layer targets
    pub fn is_layer(&self) -> bool {
        matches!(self, ColliderTarget::Layer(_))
    }

    pub(crate) fn bodies(&self) -> &[BodyHandle] {
        match self {
            ColliderTarget::Body(handle) => std::slice::from_ref(handle),
            ColliderTarget::Group(handles) => handles,
            ColliderTarget::Layer(_) => &[],
        }
    }

    pub(crate) fn forget(&mut self, handle: BodyHandle) {
        if let ColliderTarget::Group(handles) = self {
            handles.retain(|&h| h != handle);
        }
    }
}

impl From<BodyHandle> for ColliderTarget {
    fn from(handle: BodyHandle) -> Self {
        ColliderTarget::Body(handle)
    }
}

impl From<Vec<BodyHandle>> for ColliderTarget {
    fn from(handles: Vec<BodyHandle>) -> Self {
        ColliderTarget::Group(handles)
    }
}

impl From<&[BodyHandle]> for ColliderTarget {
    fn from(handles: &[BodyHandle]) -> Self {
        ColliderTarget::Group(handles.to_vec())
    }
}

impl From<LayerId> for ColliderTarget {
    fn from(layer: LayerId) -> Self {
        ColliderTarget::Layer(layer)
    }
}

/// Whether a collider separates bodies or only reports overlaps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderMode {
    /// Separate overlapping pairs
    Collide,
    /// Report overlapping pairs without moving them
    Overlap,
}

/// Called with both bodies after a pair collided or overlapped
pub type PairCallback = Box<dyn FnMut(&Body, &Body)>;

/// Called with the body and tile after a body-tile contact
pub type TileCallback = Box<dyn FnMut(&Body, &Tile)>;

/// Decides whether an intersecting pair is processed at all
pub type ProcessFilter = Box<dyn Fn(&Body, &Body) -> bool>;

/// A pairing checked every step
///
/// ```
/// use arcade_physics::world::{Collider, World};
/// use arcade_physics::body::Body;
///
/// let mut world = World::default();
/// let player = world.add_body(Body::new(0.0, 0.0, 16.0, 16.0).unwrap());
/// let enemies = vec![world.add_body(Body::new(100.0, 0.0, 16.0, 16.0).unwrap())];
///
/// let collider = Collider::overlap(player, enemies)
///     .with_process(|_player, enemy| enemy.enable)
///     .with_callback(|_player, _enemy| println!("hit"));
/// let id = world.add(collider).unwrap();
/// assert!(world.collider(id).unwrap().is_active());
/// ```
pub struct Collider {
    pub(crate) mode: ColliderMode,
    pub(crate) a: ColliderTarget,
    pub(crate) b: ColliderTarget,
    pub(crate) active: bool,
    pub(crate) callback: Option<PairCallback>,
    pub(crate) tile_callback: Option<TileCallback>,
    pub(crate) process: Option<ProcessFilter>,
}

impl Collider {
    /// Collider that separates `a` from `b`
    pub fn collide(a: impl Into<ColliderTarget>, b: impl Into<ColliderTarget>) -> Self {
        Collider::new(ColliderMode::Collide, a.into(), b.into())
    }

    /// Collider that reports overlaps between `a` and `b`
    pub fn overlap(a: impl Into<ColliderTarget>, b: impl Into<ColliderTarget>) -> Self {
        Collider::new(ColliderMode::Overlap, a.into(), b.into())
    }

    fn new(mode: ColliderMode, a: ColliderTarget, b: ColliderTarget) -> Self {
        Collider { mode, a, b, active: true, callback: None, tile_callback: None, process: None }
    }

    /// Call `callback` for every body pair that collided or overlapped
    pub fn with_callback(mut self, callback: impl FnMut(&Body, &Body) + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Call `callback` for every body-tile contact
    pub fn with_tile_callback(mut self, callback: impl FnMut(&Body, &Tile) + 'static) -> Self {
        self.tile_callback = Some(Box::new(callback));
        self
    }

    /// Only process intersecting body pairs for which `filter` returns true
    pub fn with_process(mut self, filter: impl Fn(&Body, &Body) -> bool + 'static) -> Self {
        self.process = Some(Box::new(filter));
        self
    }

    /// Collide or overlap
    pub fn mode(&self) -> ColliderMode {
        self.mode
    }

    /// First target
    pub fn first(&self) -> &ColliderTarget {
        &self.a
    }

    /// Second target
    pub fn second(&self) -> &ColliderTarget {
        &self.b
    }

    /// Inactive colliders are skipped by the step
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn allows(&self, body1: &Body, body2: &Body) -> bool {
        self.process.as_ref().map_or(true, |filter| filter(body1, body2))
    }
}

impl fmt::Debug for Collider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collider")
            .field("mode", &self.mode)
            .field("a", &self.a)
            .field("b", &self.b)
            .field("active", &self.active)
            .field("callback", &self.callback.is_some())
            .field("tile_callback", &self.tile_callback.is_some())
            .field("process", &self.process.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_forgets_removed_handle() {
        let a = BodyHandle::new(0, 0);
        let b = BodyHandle::new(1, 0);
        let mut target = ColliderTarget::from(vec![a, b]);
        target.forget(a);
        assert_eq!(target.bodies(), &[b]);

        let mut single = ColliderTarget::from(a);
        single.forget(a);
        assert_eq!(single.bodies(), &[a]);
    }

    #[test]
    fn test_process_filter_defaults_to_allow() {
        let body = Body::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let open = Collider::collide(BodyHandle::new(0, 0), BodyHandle::new(1, 0));
        assert!(open.allows(&body, &body));

        let closed = open.with_process(|_, _| false);
        assert!(!closed.allows(&body, &body));
    }
}
