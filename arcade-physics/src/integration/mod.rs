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
//! Step integration for arcade bodies
//!
//! Each step advances every enabled, dynamic, moving body by one fixed
//! timestep using semi-implicit Euler:
//!
//! ```text
//! v' = v + (a + g) * dt
//! v' = drag(v', dt)            // see DragMode
//! v' = clamp(v', max_velocity, max_speed)
//! p' = p + v' * dt
//! ```
//!
//! Integration runs before any collision work; the previous position is
//! stored by [`Body::pre_update`](crate::body::Body::pre_update) so that the
//! collision pipeline can reason about this step's movement.
//!
//! # Timestep Guidelines
//!
//! - Arcade games normally run at a fixed 1/60 s step
//! - Large steps let fast bodies move further than the overlap bias allows,
//!   so separation may ignore them; keep `dt` well under the time a body
//!   needs to cross its own width

use crate::body::Body;
use crate::error::{PhysicsError, PhysicsResult};
use crate::math::Vec2;
use serde::{Deserialize, Serialize};

mod arcade;

pub use arcade::ArcadeIntegrator;

/// How a body's `drag` slows it down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    /// `v *= 1 - drag * dt`, never reversing the sign of `v`
    #[default]
    Proportional,
    /// Subtract `drag * dt` towards zero, only while the axis has no acceleration
    Linear,
    /// `v *= drag^dt`; `drag` is the fraction of velocity kept after one second
    Damping,
}

/// Velocity below which damping snaps to rest
const DAMPING_REST_SPEED: f64 = 0.001;

/// Validate a timestep in seconds
///
/// ```
/// use arcade_physics::integration::validate_timestep;
///
/// assert!(validate_timestep(1.0 / 60.0).is_ok());
/// assert!(validate_timestep(0.0).is_err());
/// assert!(validate_timestep(f64::NAN).is_err());
/// ```
pub fn validate_timestep(dt: f64) -> PhysicsResult<()> {
    if dt > 0.0 && dt.is_finite() {
        Ok(())
    } else {
        Err(PhysicsError::InvalidTimestep(dt))
    }
}

/// Apply drag to one velocity component
pub fn apply_drag(velocity: f64, drag: f64, acceleration: f64, dt: f64, mode: DragMode) -> f64 {
    if drag <= 0.0 || velocity == 0.0 {
        return velocity;
    }
    match mode {
        DragMode::Proportional => velocity * (1.0 - drag * dt).max(0.0),
        DragMode::Linear => {
            if acceleration != 0.0 {
                return velocity;
            }
            let amount = drag * dt;
            if velocity - amount > 0.0 {
                velocity - amount
            } else if velocity + amount < 0.0 {
                velocity + amount
            } else {
                0.0
            }
        }
        DragMode::Damping => {
            let damped = velocity * drag.powf(dt);
            if damped.abs() < DAMPING_REST_SPEED {
                0.0
            } else {
                damped
            }
        }
    }
}

/// Advance one body by `dt` seconds
///
/// Returns `false` (leaving the body untouched) if the body is skipped:
/// disabled, static, not moving, or the update would produce a non-finite
/// state.
pub fn integrate_body(body: &mut Body, dt: f64, world_gravity: Vec2, drag_mode: DragMode) -> bool {
    if !body.enable || body.is_static() || !body.moves {
        return false;
    }

    let gravity = if body.allow_gravity {
        world_gravity + body.gravity
    } else {
        Vec2::ZERO
    };

    let mut velocity = body.velocity + (body.acceleration + gravity) * dt;

    if body.allow_drag {
        velocity.x = apply_drag(velocity.x, body.drag.x, body.acceleration.x, dt, drag_mode);
        velocity.y = apply_drag(velocity.y, body.drag.y, body.acceleration.y, dt, drag_mode);
    }

    // Checked before clamping: f64::max/min would swallow a NaN
    if !velocity.is_valid() {
        log::warn!("integration produced non-finite velocity {:?}; body left unchanged", velocity);
        return false;
    }

    let limit = body.max_velocity.abs();
    velocity.x = velocity.x.max(-limit.x).min(limit.x);
    velocity.y = velocity.y.max(-limit.y).min(limit.y);

    let mut speed = velocity.length();
    if let Some(max_speed) = body.max_speed {
        if speed > max_speed {
            velocity = velocity.normalized() * max_speed;
            speed = max_speed;
        }
    }

    let position = body.position + velocity * dt;

    if !position.is_valid() || !velocity.is_valid() {
        log::warn!(
            "integration produced non-finite state (pos={:?}, vel={:?}); body left unchanged",
            position,
            velocity
        );
        return false;
    }

    body.velocity = velocity;
    body.speed = speed;
    body.position = position;
    true
}

/// A strategy for advancing every body by one step
pub trait Integrator: Send + Sync {
    /// Name of this integrator
    fn name(&self) -> &str;

    /// Advance all eligible bodies by `dt` seconds
    ///
    /// Returns the number of bodies that moved.
    fn integrate(&self, bodies: &mut [Body], dt: f64, gravity: Vec2) -> usize;
}
