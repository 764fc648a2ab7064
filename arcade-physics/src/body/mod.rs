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
//! Physics bodies
//!
//! A [`Body`] is the per-entity physics state: an axis-aligned box (or a
//! circle inscribed in one) anchored at its top-left corner, with velocity,
//! acceleration, drag, bounce and the per-step contact flags that the
//! collision pipeline writes.
//!
//! Bodies are plain data. The [`World`](crate::world::World) owns them in an
//! arena and drives the per-step lifecycle:
//!
//! 1. [`Body::pre_update`] stores the previous position and clears
//!    `touching`/`blocked`
//! 2. the integrator moves the body
//! 3. [`Body::update_delta`] records this step's movement
//! 4. collision checks read the delta and write flags
//! 5. [`Body::post_update`] finalises `facing` and `embedded`

mod flags;

pub use flags::{ContactState, Face, FaceFlags};

use crate::error::{PhysicsError, PhysicsResult};
use crate::math::{Rect, Vec2};

/// Dynamic bodies are simulated; static bodies never move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKind {
    /// Integrated every step and moved by separation
    #[default]
    Dynamic,
    /// Never integrated, never moved by separation
    Static,
}

/// Capability of an entity that a body can wrap
///
/// The display layer implements this for whatever it renders; the world
/// reads the entity's position into the body and writes the simulated
/// position back after each step.
pub trait Transform {
    /// Top-left position of the entity
    fn position(&self) -> Vec2;

    /// Move the entity
    fn set_position(&mut self, position: Vec2);

    /// Width and height of the entity
    fn size(&self) -> Vec2;
}

/// Per-entity physics state
///
/// # Examples
///
/// ```
/// use arcade_physics::body::Body;
/// use arcade_physics::math::Vec2;
///
/// let body = Body::new(0.0, 0.0, 32.0, 32.0)
///     .unwrap()
///     .with_velocity(Vec2::new(100.0, 0.0))
///     .with_bounce(Vec2::new(0.5, 0.5));
/// assert_eq!(body.bounds().right(), 32.0);
///
/// assert!(Body::new(0.0, 0.0, 0.0, 32.0).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Body {
    kind: BodyKind,
    /// Disabled bodies are neither integrated nor checked
    pub enable: bool,

    pub(crate) position: Vec2,
    pub(crate) prev: Vec2,
    pub(crate) delta: Vec2,
    width: f64,
    height: f64,
    radius: Option<f64>,
    /// Offset of the body's top-left corner from the wrapped entity's position
    pub offset: Vec2,

    /// Velocity in pixels per second
    pub velocity: Vec2,
    /// Acceleration in pixels per second squared
    pub acceleration: Vec2,
    /// Drag coefficient per axis (interpretation depends on the world's drag mode)
    pub drag: Vec2,
    /// Whether drag is applied
    pub allow_drag: bool,
    /// Per-body gravity, added to the world gravity
    pub gravity: Vec2,
    /// Whether world and body gravity apply
    pub allow_gravity: bool,
    /// Absolute velocity limit per axis
    pub max_velocity: Vec2,
    /// Optional limit on the velocity magnitude
    pub max_speed: Option<f64>,
    /// How much of an immovable partner's movement is transferred when riding on it
    pub friction: Vec2,
    bounce: Vec2,
    /// Bounce used against world bounds instead of `bounce`, if set
    pub world_bounce: Option<Vec2>,
    mass: f64,

    /// Immovable bodies are never moved or slowed by separation
    pub immovable: bool,
    /// Non-pushable bodies keep their position against pushable partners
    pub pushable: bool,
    /// Bodies with `moves == false` are not integrated (externally driven)
    pub moves: bool,

    /// Category bits of this body
    pub collision_category: u32,
    /// Categories this body collides with
    pub collision_mask: u32,
    /// Which faces participate in collision
    pub check_collision: FaceFlags,

    /// Clamp to the world bounds
    pub collide_world_bounds: bool,
    /// Queue a world-bounds event when clamped
    pub on_world_bounds: bool,
    /// Queue a collide event when separated from another body
    pub on_collide: bool,
    /// Queue an overlap event when overlapping another body
    pub on_overlap: bool,

    pub(crate) touching: FaceFlags,
    pub(crate) was_touching: FaceFlags,
    pub(crate) blocked: FaceFlags,
    pub(crate) embedded: bool,
    pub(crate) embedded_seen: bool,
    pub(crate) facing: Face,
    pub(crate) speed: f64,
    pub(crate) contact: ContactState,
}

impl Body {
    /// Create a dynamic body with its top-left corner at `(x, y)`
    ///
    /// Fails with [`PhysicsError::InvalidSize`] if either dimension is not a
    /// positive finite number.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> PhysicsResult<Self> {
        validate_size(width, height)?;
        let position = Vec2::new(x, y);
        Ok(Body {
            kind: BodyKind::Dynamic,
            enable: true,
            position,
            prev: position,
            delta: Vec2::ZERO,
            width,
            height,
            radius: None,
            offset: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            drag: Vec2::ZERO,
            allow_drag: true,
            gravity: Vec2::ZERO,
            allow_gravity: true,
            max_velocity: Vec2::splat(10_000.0),
            max_speed: None,
            friction: Vec2::new(1.0, 0.0),
            bounce: Vec2::ZERO,
            world_bounce: None,
            mass: 1.0,
            immovable: false,
            pushable: true,
            moves: true,
            collision_category: 0x0001,
            collision_mask: u32::MAX,
            check_collision: FaceFlags::all(),
            collide_world_bounds: false,
            on_world_bounds: false,
            on_collide: false,
            on_overlap: false,
            touching: FaceFlags::clear(),
            was_touching: FaceFlags::clear(),
            blocked: FaceFlags::clear(),
            embedded: false,
            embedded_seen: false,
            facing: Face::None,
            speed: 0.0,
            contact: ContactState::Idle,
        })
    }

    /// Create a static body: never integrated, never moved by separation
    pub fn new_static(x: f64, y: f64, width: f64, height: f64) -> PhysicsResult<Self> {
        let mut body = Body::new(x, y, width, height)?;
        body.kind = BodyKind::Static;
        body.immovable = true;
        body.pushable = false;
        body.moves = false;
        body.allow_gravity = false;
        Ok(body)
    }

    /// Create a circular body whose bounding box has its top-left at `(x, y)`
    pub fn new_circle(x: f64, y: f64, radius: f64) -> PhysicsResult<Self> {
        let mut body = Body::new(x, y, radius * 2.0, radius * 2.0)?;
        body.radius = Some(radius);
        Ok(body)
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the acceleration
    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Set the drag
    pub fn with_drag(mut self, drag: Vec2) -> Self {
        self.drag = drag;
        self
    }

    /// Set the bounce, clamped into `[0, 1]` per axis
    pub fn with_bounce(mut self, bounce: Vec2) -> Self {
        self.set_bounce(bounce);
        self
    }

    /// Mark the body immovable
    pub fn with_immovable(mut self, immovable: bool) -> Self {
        self.immovable = immovable;
        self
    }

    /// Set the mass
    ///
    /// # Panics
    ///
    /// Panics if the mass is not positive and finite. Use [`Body::set_mass`]
    /// for a fallible version.
    pub fn with_mass(mut self, mass: f64) -> Self {
        assert!(mass > 0.0 && mass.is_finite(), "Mass must be positive and finite");
        self.mass = mass;
        self
    }

    /// Disable world and body gravity for this body
    pub fn without_gravity(mut self) -> Self {
        self.allow_gravity = false;
        self
    }

    /// Clamp the body to the world bounds
    pub fn with_world_bounds(mut self, emit_event: bool) -> Self {
        self.collide_world_bounds = true;
        self.on_world_bounds = emit_event;
        self
    }

    /// Body kind
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// True for static bodies
    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    /// True if separation may never move this body
    pub fn is_immovable(&self) -> bool {
        self.immovable || self.is_static()
    }

    /// Top-left position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Position at the start of the current step
    pub fn prev(&self) -> Vec2 {
        self.prev
    }

    /// Teleport the body, discarding this step's movement
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.prev = position;
        self.delta = Vec2::ZERO;
    }

    /// Movement applied by the integrator during the current step
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Width of the bounding box
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height of the bounding box
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Resize the body, keeping its top-left corner
    ///
    /// Resizing turns a circle back into a box.
    pub fn set_size(&mut self, width: f64, height: f64) -> PhysicsResult<()> {
        validate_size(width, height)?;
        self.width = width;
        self.height = height;
        self.radius = None;
        Ok(())
    }

    /// Turn the body into a circle of the given radius
    pub fn set_circle(&mut self, radius: f64) -> PhysicsResult<()> {
        validate_size(radius * 2.0, radius * 2.0)?;
        self.width = radius * 2.0;
        self.height = radius * 2.0;
        self.radius = Some(radius);
        Ok(())
    }

    /// True if the body is a circle
    pub fn is_circle(&self) -> bool {
        self.radius.is_some()
    }

    /// Circle radius, if the body is a circle
    pub fn radius(&self) -> Option<f64> {
        self.radius
    }

    /// Bounding box at the current position
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }

    /// Centre of the bounding box
    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.position.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.position.y + self.height
    }

    /// Bounce per axis
    pub fn bounce(&self) -> Vec2 {
        self.bounce
    }

    /// Set the bounce, clamped into `[0, 1]` per axis
    pub fn set_bounce(&mut self, bounce: Vec2) {
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        self.bounce = Vec2::new(clamp(bounce.x), clamp(bounce.y));
    }

    /// Mass used for pushing priority
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Set the mass
    pub fn set_mass(&mut self, mass: f64) -> PhysicsResult<()> {
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        self.mass = mass;
        Ok(())
    }

    /// Faces touching another body or tile this step
    pub fn touching(&self) -> FaceFlags {
        self.touching
    }

    /// `touching` as it was at the end of the previous step
    pub fn was_touching(&self) -> FaceFlags {
        self.was_touching
    }

    /// Faces whose motion was prevented this step
    pub fn blocked(&self) -> FaceFlags {
        self.blocked
    }

    /// True while the body is still overlapping something after separation
    pub fn embedded(&self) -> bool {
        self.embedded
    }

    /// Direction of the most recent movement
    pub fn facing(&self) -> Face {
        self.facing
    }

    /// Velocity magnitude after the last integration
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Pipeline state reached during the current step
    pub fn contact_state(&self) -> ContactState {
        self.contact
    }

    /// True if this body accepts collisions from a body of `category`
    pub fn can_collide(&self, category: u32) -> bool {
        (self.collision_mask & category) != 0
    }

    /// True if position and velocity are finite
    pub fn is_valid(&self) -> bool {
        self.position.is_valid() && self.velocity.is_valid()
    }

    /// Start-of-step reset
    ///
    /// Stores the previous position and clears `touching`/`blocked`.
    /// `embedded` is left alone; it is recomputed in [`Body::post_update`].
    pub fn pre_update(&mut self) {
        self.was_touching = self.touching;
        self.touching.reset();
        self.blocked.reset();
        self.embedded_seen = false;
        self.contact = ContactState::Idle;
        self.prev = self.position;
    }

    /// Record this step's movement; run after integration
    pub fn update_delta(&mut self) {
        self.delta = self.position - self.prev;
    }

    /// End-of-step bookkeeping: facing direction and embedded state
    pub fn post_update(&mut self) {
        let delta = self.position - self.prev;
        if delta.x < 0.0 {
            self.facing = Face::Left;
        } else if delta.x > 0.0 {
            self.facing = Face::Right;
        }
        if delta.y < 0.0 {
            self.facing = Face::Up;
        } else if delta.y > 0.0 {
            self.facing = Face::Down;
        }

        self.embedded = self.embedded_seen;
        self.embedded_seen = false;
    }

    /// Mark the body embedded for this step
    pub(crate) fn mark_embedded(&mut self) {
        self.embedded = true;
        self.embedded_seen = true;
    }

    /// Read the wrapped entity's position and size
    pub fn sync_from<T: Transform + ?Sized>(&mut self, entity: &T) -> PhysicsResult<()> {
        let size = entity.size();
        if !self.is_circle() {
            validate_size(size.x, size.y)?;
            self.width = size.x;
            self.height = size.y;
        }
        self.set_position(entity.position() + self.offset);
        Ok(())
    }

    /// Write the simulated position back to the wrapped entity
    pub fn write_back<T: Transform + ?Sized>(&self, entity: &mut T) {
        entity.set_position(self.position - self.offset);
    }
}

fn validate_size(width: f64, height: f64) -> PhysicsResult<()> {
    if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
        Ok(())
    } else {
        Err(PhysicsError::InvalidSize { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sprite {
        pos: Vec2,
        size: Vec2,
    }

    impl Transform for Sprite {
        fn position(&self) -> Vec2 {
            self.pos
        }
        fn set_position(&mut self, position: Vec2) {
            self.pos = position;
        }
        fn size(&self) -> Vec2 {
            self.size
        }
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        assert!(Body::new(0.0, 0.0, 0.0, 10.0).is_err());
        assert!(Body::new(0.0, 0.0, 10.0, -1.0).is_err());
        assert!(Body::new(0.0, 0.0, f64::NAN, 10.0).is_err());
        assert!(Body::new_circle(0.0, 0.0, 0.0).is_err());
        assert!(Body::new(0.0, 0.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn test_bounce_is_clamped() {
        let body = Body::new(0.0, 0.0, 1.0, 1.0).unwrap().with_bounce(Vec2::new(2.0, -1.0));
        assert_eq!(body.bounce(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_invalid_mass_rejected() {
        let mut body = Body::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert_eq!(body.set_mass(0.0), Err(PhysicsError::InvalidMass(0.0)));
        assert!(body.set_mass(2.5).is_ok());
        assert_eq!(body.mass(), 2.5);
    }

    #[test]
    #[should_panic(expected = "Mass must be positive and finite")]
    fn test_with_mass_panics_on_zero() {
        let _ = Body::new(0.0, 0.0, 1.0, 1.0).unwrap().with_mass(0.0);
    }

    #[test]
    fn test_static_body_is_immovable() {
        let body = Body::new_static(0.0, 0.0, 10.0, 10.0).unwrap();
        assert!(body.is_static());
        assert!(body.is_immovable());
        assert!(!body.moves);
    }

    #[test]
    fn test_pre_update_resets_flags_but_keeps_embedded() {
        let mut body = Body::new(0.0, 0.0, 10.0, 10.0).unwrap();
        body.touching.set(Face::Left);
        body.blocked.set(Face::Down);
        body.mark_embedded();

        body.pre_update();
        assert!(body.touching().none);
        assert!(body.blocked().none);
        assert!(body.was_touching().left);
        assert!(body.embedded());

        // Not re-marked during this step, so it resolves at post_update
        body.post_update();
        assert!(!body.embedded());
    }

    #[test]
    fn test_facing_follows_movement() {
        let mut body = Body::new(0.0, 0.0, 10.0, 10.0).unwrap();
        body.pre_update();
        body.position.x -= 3.0;
        body.update_delta();
        body.post_update();
        assert_eq!(body.facing(), Face::Left);
        assert_eq!(body.delta(), Vec2::new(-3.0, 0.0));
    }

    #[test]
    fn test_circle_bounds() {
        let body = Body::new_circle(10.0, 10.0, 5.0).unwrap();
        assert!(body.is_circle());
        assert_eq!(body.bounds(), Rect::new(10.0, 10.0, 10.0, 10.0));
        assert_eq!(body.center(), Vec2::new(15.0, 15.0));
    }

    #[test]
    fn test_transform_sync_with_offset() {
        let mut sprite = Sprite { pos: Vec2::new(100.0, 50.0), size: Vec2::new(16.0, 24.0) };
        let mut body = Body::new(0.0, 0.0, 1.0, 1.0).unwrap();
        body.offset = Vec2::new(2.0, 4.0);

        body.sync_from(&sprite).unwrap();
        assert_eq!(body.position(), Vec2::new(102.0, 54.0));
        assert_eq!(body.width(), 16.0);

        body.position.x += 10.0;
        body.write_back(&mut sprite);
        assert_eq!(sprite.pos, Vec2::new(110.0, 50.0));
    }
}
