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
//! The simulation world
//!
//! [`World`] owns the bodies, tile layers and colliders and runs the step
//! pipeline:
//!
//! 1. pre-update every enabled body (flags reset, previous position stored)
//! 2. integrate velocities and positions
//! 3. record deltas and clamp to the world bounds
//! 4. run every active collider in registration order, rebuilding the
//!    broad-phase index whenever a previous collider moved something
//! 5. post-update (facing, embedded)
//!
//! Events queued during the step are read with [`World::drain_events`].

mod bounds;
mod collider;

pub use collider::{
    Collider, ColliderId, ColliderMode, ColliderTarget, PairCallback, ProcessFilter, TileCallback,
};

use crate::arena::{Arena, BodyHandle};
use crate::body::{Body, ContactState, Face, Transform};
use crate::broadphase::{self, BroadPhase, PairSet};
use crate::collision;
use crate::config::WorldConfig;
use crate::error::{PhysicsError, PhysicsResult};
use crate::events::{EventQueue, PhysicsEvent};
use crate::integration::{validate_timestep, ArcadeIntegrator, Integrator};
use crate::math::{Rect, Vec2};
use crate::tilemap::{Tile, TileLayer};
use std::collections::HashSet;
use std::fmt;

/// Accumulated time within this of a full fixed step still runs it
const STEP_EPSILON: f64 = 1e-9;

/// Identifier of a tile layer added to a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) usize);

impl LayerId {
    /// Registration slot
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Layer({})", self.0)
    }
}

/// Owner of all physics state
///
/// # Examples
///
/// ```
/// use arcade_physics::body::Body;
/// use arcade_physics::math::Vec2;
/// use arcade_physics::world::World;
///
/// let mut world = World::default();
/// let a = world.add_body(Body::new(0.0, 0.0, 32.0, 32.0).unwrap().with_velocity(Vec2::new(100.0, 0.0)));
/// let b = world.add_body(Body::new_static(40.0, 0.0, 32.0, 32.0).unwrap());
/// world.add_collider(a, b, |_, _| {}).unwrap();
///
/// world.advance(0.5).unwrap();
/// assert_eq!(world.body(a).unwrap().position().x, 8.0);
/// assert!(world.body(a).unwrap().blocked().right);
/// ```
pub struct World {
    config: WorldConfig,
    bodies: Arena<Body>,
    layers: Vec<Option<Box<dyn TileLayer>>>,
    colliders: Vec<Option<Collider>>,
    broad_phase: Box<dyn BroadPhase>,
    index_dirty: bool,
    integrator: ArcadeIntegrator,
    events: EventQueue,
    accumulator: f64,
    paused: bool,
    time: f64,
    elapsed: f64,
    step_count: u64,
}

impl Default for World {
    fn default() -> Self {
        World::build(WorldConfig::default())
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("bodies", &self.bodies.len())
            .field("layers", &self.layer_count())
            .field("colliders", &self.collider_count())
            .field("broad_phase", &self.broad_phase.name())
            .field("paused", &self.paused)
            .field("step_count", &self.step_count)
            .finish()
    }
}

impl World {
    /// Create a world after validating `config`
    pub fn new(config: WorldConfig) -> PhysicsResult<Self> {
        config.validate()?;
        Ok(World::build(config))
    }

    fn build(config: WorldConfig) -> Self {
        World {
            broad_phase: broadphase::create(&config.broad_phase),
            integrator: ArcadeIntegrator::new(config.drag_mode),
            config,
            bodies: Arena::new(),
            layers: Vec::new(),
            colliders: Vec::new(),
            index_dirty: true,
            events: EventQueue::new(),
            accumulator: 0.0,
            paused: false,
            time: 0.0,
            elapsed: 0.0,
            step_count: 0,
        }
    }

    /// Current configuration
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Replace the configuration
    ///
    /// The broad-phase index is recreated if its kind changed.
    pub fn set_config(&mut self, config: WorldConfig) -> PhysicsResult<()> {
        config.validate()?;
        if config.broad_phase != self.config.broad_phase {
            self.broad_phase = broadphase::create(&config.broad_phase);
            self.index_dirty = true;
        }
        self.integrator = ArcadeIntegrator::new(config.drag_mode);
        self.config = config;
        Ok(())
    }

    /// Set the world gravity
    pub fn set_gravity(&mut self, gravity: Vec2) -> PhysicsResult<()> {
        if !gravity.is_valid() {
            return Err(PhysicsError::InvalidConfig(format!("gravity must be finite, got {gravity:?}")));
        }
        self.config.gravity = gravity;
        Ok(())
    }

    /// Set the world bounds
    pub fn set_bounds(&mut self, bounds: Rect) -> PhysicsResult<()> {
        let mut config = self.config.clone();
        config.bounds = bounds;
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // Bodies

    /// Add a body and return its handle
    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        self.index_dirty = true;
        self.bodies.insert(body)
    }

    /// Remove a body
    ///
    /// The handle becomes stale immediately and is dropped from every
    /// collider group.
    pub fn remove_body(&mut self, handle: BodyHandle) -> PhysicsResult<Body> {
        let body = self.bodies.remove(handle).ok_or(PhysicsError::StaleHandle(handle))?;
        for collider in self.colliders.iter_mut().flatten() {
            collider.a.forget(handle);
            collider.b.forget(handle);
        }
        self.index_dirty = true;
        Ok(body)
    }

    /// Look up a body
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Look up a body for mutation
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.index_dirty = true;
        self.bodies.get_mut(handle)
    }

    /// Look up a body, failing on stale handles
    pub fn try_body(&self, handle: BodyHandle) -> PhysicsResult<&Body> {
        self.bodies.get(handle).ok_or(PhysicsError::StaleHandle(handle))
    }

    /// True if the handle refers to a live body
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    /// Number of bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Bodies in storage order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.bodies.iter()
    }

    /// Read a body's position and size from the entity it wraps
    pub fn sync_from<T: Transform + ?Sized>(&mut self, handle: BodyHandle, entity: &T) -> PhysicsResult<()> {
        let body = self.bodies.get_mut(handle).ok_or(PhysicsError::StaleHandle(handle))?;
        body.sync_from(entity)?;
        self.index_dirty = true;
        Ok(())
    }

    /// Write a body's simulated position back to the entity it wraps
    pub fn write_back<T: Transform + ?Sized>(&self, handle: BodyHandle, entity: &mut T) -> PhysicsResult<()> {
        let body = self.try_body(handle)?;
        body.write_back(entity);
        Ok(())
    }

    // Layers

    /// Add a tile layer
    pub fn add_layer(&mut self, layer: impl TileLayer + 'static) -> LayerId {
        self.layers.push(Some(Box::new(layer)));
        LayerId(self.layers.len() - 1)
    }

    /// Look up a tile layer
    pub fn layer(&self, id: LayerId) -> Option<&dyn TileLayer> {
        self.layers.get(id.0).and_then(|slot| slot.as_deref())
    }

    /// Swap in new layer data, returning the old layer
    pub fn replace_layer(
        &mut self,
        id: LayerId,
        layer: impl TileLayer + 'static,
    ) -> PhysicsResult<Box<dyn TileLayer>> {
        let slot = self
            .layers
            .get_mut(id.0)
            .filter(|slot| slot.is_some())
            .ok_or(PhysicsError::UnknownLayer(id.0))?;
        slot.replace(Box::new(layer)).ok_or(PhysicsError::UnknownLayer(id.0))
    }

    /// Remove a tile layer; colliders referring to it stop matching
    pub fn remove_layer(&mut self, id: LayerId) -> PhysicsResult<Box<dyn TileLayer>> {
        self.layers
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(PhysicsError::UnknownLayer(id.0))
    }

    /// Number of tile layers
    pub fn layer_count(&self) -> usize {
        self.layers.iter().flatten().count()
    }

    // Colliders

    /// Separate `a` from `b` every step, calling `callback` for each pair
    pub fn add_collider(
        &mut self,
        a: impl Into<ColliderTarget>,
        b: impl Into<ColliderTarget>,
        callback: impl FnMut(&Body, &Body) + 'static,
    ) -> PhysicsResult<ColliderId> {
        self.add(Collider::collide(a, b).with_callback(callback))
    }

    /// Report overlaps between `a` and `b` every step
    pub fn add_overlap(
        &mut self,
        a: impl Into<ColliderTarget>,
        b: impl Into<ColliderTarget>,
        callback: impl FnMut(&Body, &Body) + 'static,
    ) -> PhysicsResult<ColliderId> {
        self.add(Collider::overlap(a, b).with_callback(callback))
    }

    /// Register a fully configured collider
    pub fn add(&mut self, collider: Collider) -> PhysicsResult<ColliderId> {
        self.validate_target(&collider.a)?;
        self.validate_target(&collider.b)?;
        if collider.a.is_layer() && collider.b.is_layer() {
            return Err(PhysicsError::InvalidConfig(
                "a collider cannot pair two tile layers".to_string(),
            ));
        }
        self.colliders.push(Some(collider));
        Ok(ColliderId(self.colliders.len() - 1))
    }

    fn validate_target(&self, target: &ColliderTarget) -> PhysicsResult<()> {
        match target {
            ColliderTarget::Layer(id) => self.layer(*id).map(|_| ()).ok_or(PhysicsError::UnknownLayer(id.0)),
            other => match other.bodies().iter().find(|h| !self.bodies.contains(**h)) {
                Some(&stale) => Err(PhysicsError::StaleHandle(stale)),
                None => Ok(()),
            },
        }
    }

    /// Look up a collider
    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(id.0).and_then(Option::as_ref)
    }

    /// Unregister a collider
    pub fn remove_collider(&mut self, id: ColliderId) -> PhysicsResult<Collider> {
        self.colliders
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(PhysicsError::UnknownCollider(id.0))
    }

    /// Enable or disable a collider without unregistering it
    pub fn set_collider_active(&mut self, id: ColliderId, active: bool) -> PhysicsResult<()> {
        let collider = self
            .colliders
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(PhysicsError::UnknownCollider(id.0))?;
        collider.active = active;
        Ok(())
    }

    /// Number of registered colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.iter().flatten().count()
    }

    // Time

    /// Stop stepping; queues [`PhysicsEvent::Pause`]
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.events.push(PhysicsEvent::Pause);
        }
    }

    /// Resume stepping; queues [`PhysicsEvent::Resume`]
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.accumulator = 0.0;
            self.events.push(PhysicsEvent::Resume);
        }
    }

    /// True while paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Timestamp passed to the last [`World::step`] call
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Simulated seconds so far
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of simulation steps run so far
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Per-frame entry point; returns the number of simulation steps run
    ///
    /// `time` is the host's frame timestamp and `delta_ms` the frame time
    /// in milliseconds. With `fixed_step` the frame time is accumulated and
    /// consumed in steps of `1 / fps`, at most `max_substeps` per call;
    /// otherwise one step of the scaled frame time runs. A negative or
    /// non-finite `delta_ms` is ignored.
    pub fn step(&mut self, time: f64, delta_ms: f64) -> usize {
        if self.paused {
            return 0;
        }
        self.time = time;
        if !(delta_ms.is_finite() && delta_ms >= 0.0) {
            log::warn!("ignoring frame with invalid delta {delta_ms} ms");
            return 0;
        }
        let frame = delta_ms / 1000.0 * self.config.time_scale;

        if !self.config.fixed_step {
            if frame <= 0.0 {
                return 0;
            }
            self.run_step(frame);
            return 1;
        }

        let fixed = self.config.fixed_delta();
        self.accumulator += frame;
        let mut steps = 0;
        while self.accumulator + STEP_EPSILON >= fixed && steps < self.config.max_substeps {
            self.run_step(fixed);
            self.accumulator -= fixed;
            steps += 1;
        }
        if self.accumulator + STEP_EPSILON >= fixed {
            log::debug!(
                "dropping {:.4}s of simulation time after {steps} substeps",
                self.accumulator
            );
            self.accumulator = 0.0;
        }
        self.accumulator = self.accumulator.max(0.0);
        steps as usize
    }

    /// Run exactly one step of `dt` seconds
    ///
    /// Does nothing while paused.
    pub fn advance(&mut self, dt: f64) -> PhysicsResult<()> {
        validate_timestep(dt)?;
        if !self.paused {
            self.run_step(dt);
        }
        Ok(())
    }

    fn run_step(&mut self, dt: f64) {
        for body in self.bodies.values_mut().iter_mut().filter(|b| b.enable) {
            body.pre_update();
        }

        let moved = self.integrator.integrate(self.bodies.values_mut(), dt, self.config.gravity);
        log::trace!("{}: integrated {moved} bodies over {dt}s", self.integrator.name());

        let bounds = self.config.bounds;
        let check = self.config.check_collision;
        for dense in 0..self.bodies.len() {
            let Some(handle) = self.bodies.handle_at(dense) else { continue };
            let body = &mut self.bodies.values_mut()[dense];
            if !body.enable {
                continue;
            }
            body.update_delta();
            if !body.collide_world_bounds {
                continue;
            }
            let hit = bounds::clamp_to_bounds(body, &bounds, &check);
            if body.on_world_bounds {
                for side in [Face::Up, Face::Down, Face::Left, Face::Right] {
                    if hit.get(side) {
                        self.events.push(PhysicsEvent::WorldBounds { body: handle, side });
                    }
                }
            }
        }

        self.index_dirty = true;

        for slot in 0..self.colliders.len() {
            let Some(mut collider) = self.colliders[slot].take() else { continue };
            if collider.active {
                // Earlier colliders may have moved bodies
                self.refresh_index();
                let hits = self.run_collider(&mut collider);
                if collider.mode == ColliderMode::Collide && hits > 0 {
                    self.index_dirty = true;
                }
            }
            self.colliders[slot] = Some(collider);
        }

        for body in self.bodies.values_mut().iter_mut().filter(|b| b.enable) {
            body.post_update();
        }

        self.elapsed += dt;
        self.step_count += 1;
    }

    fn refresh_index(&mut self) {
        if !self.index_dirty {
            return;
        }
        let entries: Vec<(BodyHandle, Rect)> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.enable)
            .map(|(handle, body)| (handle, body.bounds()))
            .collect();
        self.broad_phase.rebuild(&entries);
        self.index_dirty = false;
    }

    // Colliders at work

    /// Run a collider once; returns the number of pairs that collided or overlapped
    fn run_collider(&mut self, collider: &mut Collider) -> usize {
        match (&collider.a, &collider.b) {
            (ColliderTarget::Layer(layer), other) | (other, ColliderTarget::Layer(layer)) => {
                let layer = *layer;
                let handles = other.bodies().to_vec();
                handles
                    .into_iter()
                    .map(|handle| self.body_vs_layer(collider, handle, layer))
                    .sum()
            }
            _ => {
                let pairs = self.candidate_pairs(&collider.a, &collider.b);
                pairs
                    .iter()
                    .filter(|&(a, b)| self.body_vs_body(collider, a, b))
                    .count()
            }
        }
    }

    fn candidate_pairs(&self, a: &ColliderTarget, b: &ColliderTarget) -> PairSet {
        let mut pairs = PairSet::new();
        let targets: HashSet<BodyHandle> = b.bodies().iter().copied().collect();
        let mut found = Vec::new();

        for &handle in a.bodies() {
            let Some(body) = self.bodies.get(handle) else {
                log::debug!("collider skipping stale {handle}");
                continue;
            };
            if !body.enable {
                continue;
            }
            found.clear();
            self.broad_phase.query(body.bounds(), &mut found);
            for &other in &found {
                if other != handle && targets.contains(&other) {
                    pairs.insert(handle, other);
                }
            }
        }
        pairs
    }

    fn body_vs_body(&mut self, collider: &mut Collider, a: BodyHandle, b: BodyHandle) -> bool {
        let Some((body1, body2)) = self.bodies.get_pair_mut(a, b) else {
            log::debug!("skipping pair {a}/{b}: stale handle");
            return false;
        };
        if !body1.enable || !body2.enable {
            return false;
        }
        if !body1.is_valid() || !body2.is_valid() {
            log::warn!("skipping pair {a}/{b}: non-finite body state");
            return false;
        }
        if !body1.can_collide(body2.collision_category) || !body2.can_collide(body1.collision_category) {
            return false;
        }

        body1.contact.advance(ContactState::Candidate);
        body2.contact.advance(ContactState::Candidate);
        if !collision::intersects(body1, body2) {
            body1.contact.advance(ContactState::Checked);
            body2.contact.advance(ContactState::Checked);
            return false;
        }
        if !collider.allows(body1, body2) {
            return false;
        }

        let gravity = self.config.gravity + body1.gravity;
        let prefer_x = self.config.force_x || gravity.y.abs() < gravity.x.abs();
        let bias = self.config.overlap_bias;

        let hit = match collider.mode {
            ColliderMode::Collide => collision::separate(body1, body2, bias, prefer_x),
            ColliderMode::Overlap => collision::overlap_only(body1, body2, bias, prefer_x),
        };
        if !hit {
            return false;
        }
        log::trace!("{:?} {a} with {b}", collider.mode);

        if let Some(callback) = collider.callback.as_mut() {
            callback(body1, body2);
        }
        match collider.mode {
            ColliderMode::Collide if body1.on_collide || body2.on_collide => {
                self.events.push(PhysicsEvent::Collide { body1: a, body2: b });
            }
            ColliderMode::Overlap if body1.on_overlap || body2.on_overlap => {
                self.events.push(PhysicsEvent::Overlap { body1: a, body2: b });
            }
            _ => {}
        }
        true
    }

    fn body_vs_layer(&mut self, collider: &mut Collider, handle: BodyHandle, id: LayerId) -> usize {
        let Some(layer) = self.layers.get(id.0).and_then(|slot| slot.as_deref()) else {
            return 0;
        };
        let Some(body) = self.bodies.get_mut(handle) else {
            log::debug!("collider skipping stale {handle}");
            return 0;
        };
        if !body.enable {
            return 0;
        }
        if !body.is_valid() {
            log::warn!("skipping {handle} against {id}: non-finite body state");
            return 0;
        }
        let Some(range) = layer.cells_under(&body.bounds()) else {
            return 0;
        };

        let tiles: Vec<((i32, i32), Tile, Rect)> = range
            .iter()
            .filter_map(|(cx, cy)| {
                let tile = layer.tile_at(cx, cy)?;
                tile.collides().then(|| ((cx, cy), *tile, layer.cell_rect(cx, cy)))
            })
            .collect();
        if tiles.is_empty() {
            return 0;
        }
        body.contact.advance(ContactState::Candidate);

        let mut hits = 0;
        for &(cell, tile, rect) in &tiles {
            let hit = match collider.mode {
                ColliderMode::Collide => collision::separate_tile(body, &tile, &rect, self.config.tile_bias),
                ColliderMode::Overlap => {
                    body.contact.advance(ContactState::Checked);
                    collision::tile_overlaps(body, &tile, &rect)
                }
            };
            if !hit {
                continue;
            }
            hits += 1;
            if let Some(callback) = collider.tile_callback.as_mut() {
                callback(body, &tile);
            }
            let event = match collider.mode {
                ColliderMode::Collide if body.on_collide => Some(PhysicsEvent::TileCollide {
                    body: handle,
                    layer: id,
                    cell,
                    index: tile.index,
                }),
                ColliderMode::Overlap if body.on_overlap => Some(PhysicsEvent::TileOverlap {
                    body: handle,
                    layer: id,
                    cell,
                    index: tile.index,
                }),
                _ => None,
            };
            if let Some(event) = event {
                self.events.push(event);
            }
        }

        if collider.mode == ColliderMode::Collide {
            let contacts: Vec<(Tile, Rect)> = tiles.iter().map(|&(_, tile, rect)| (tile, rect)).collect();
            collision::mark_if_embedded(body, &contacts);
        }
        hits
    }

    // Immediate checks

    /// Separate `a` from `b` right now; true if any pair collided
    ///
    /// Unknown layers and stale handles simply match nothing.
    pub fn collide(&mut self, a: impl Into<ColliderTarget>, b: impl Into<ColliderTarget>) -> bool {
        self.run_immediate(Collider::collide(a, b))
    }

    /// Test `a` against `b` right now without moving anything
    pub fn overlap(&mut self, a: impl Into<ColliderTarget>, b: impl Into<ColliderTarget>) -> bool {
        self.run_immediate(Collider::overlap(a, b))
    }

    fn run_immediate(&mut self, mut collider: Collider) -> bool {
        if collider.a.is_layer() && collider.b.is_layer() {
            return false;
        }
        self.refresh_index();
        let hits = self.run_collider(&mut collider);
        if collider.mode == ColliderMode::Collide && hits > 0 {
            self.index_dirty = true;
        }
        hits > 0
    }

    // Queries

    /// Enabled bodies whose shape intersects `area`, in storage order
    pub fn overlap_rect(&mut self, area: Rect) -> Vec<BodyHandle> {
        self.refresh_index();
        let mut found = Vec::new();
        self.broad_phase.query(area, &mut found);
        found.retain(|&handle| {
            self.bodies.get(handle).map_or(false, |body| match body.radius() {
                Some(r) => {
                    let c = body.center();
                    area.closest_point(c).distance(c) < r
                }
                None => body.bounds().intersects(&area),
            })
        });
        found
    }

    /// Enabled bodies whose shape intersects a circle, in storage order
    pub fn overlap_circle(&mut self, center: Vec2, radius: f64) -> Vec<BodyHandle> {
        let area = Rect::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0);
        self.refresh_index();
        let mut found = Vec::new();
        self.broad_phase.query(area, &mut found);
        found.retain(|&handle| {
            self.bodies.get(handle).map_or(false, |body| match body.radius() {
                Some(r) => body.center().distance(center) < r + radius,
                None => body.bounds().closest_point(center).distance(center) < radius,
            })
        });
        found
    }

    // Events

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<PhysicsEvent> {
        self.events.drain().collect()
    }

    /// Events waiting to be drained
    pub fn pending_events(&self) -> &EventQueue {
        &self.events
    }
}
