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
//! World configuration
//!
//! [`WorldConfig`] can be built in code with the `with_*` methods or
//! deserialized from any serde format. Only `validate()` decides whether a
//! configuration is usable; [`World::new`](crate::world::World::new) calls it.
//!
//! # Environment overrides
//!
//! [`WorldConfig::from_env`] starts from the defaults and applies:
//!
//! - `ARCADE_PHYSICS_FPS`: fixed-step rate, e.g. `120`
//! - `ARCADE_PHYSICS_BROAD_PHASE`: `sort_and_sweep`, `spatial_hash` or
//!   `spatial_hash:<cell size>`

use crate::body::FaceFlags;
use crate::collision::{OVERLAP_BIAS, TILE_BIAS};
use crate::error::{PhysicsError, PhysicsResult};
use crate::integration::DragMode;
use crate::math::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`WorldConfig::fps`]
pub const FPS_ENV_VAR: &str = "ARCADE_PHYSICS_FPS";

/// Environment variable overriding [`WorldConfig::broad_phase`]
pub const BROAD_PHASE_ENV_VAR: &str = "ARCADE_PHYSICS_BROAD_PHASE";

/// Which broad-phase index the world builds each step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BroadPhaseKind {
    /// Uniform grid hashed by cell coordinate
    SpatialHash {
        /// Cell edge length in world units
        cell_size: f64,
    },
    /// Intervals sorted on X
    SortAndSweep,
}

impl Default for BroadPhaseKind {
    fn default() -> Self {
        BroadPhaseKind::SpatialHash { cell_size: 64.0 }
    }
}

impl BroadPhaseKind {
    fn parse(value: &str) -> PhysicsResult<Self> {
        let value = value.trim();
        match value.split_once(':') {
            Some(("spatial_hash", size)) => {
                let cell_size = size.trim().parse::<f64>().map_err(|e| {
                    PhysicsError::InvalidConfig(format!("{BROAD_PHASE_ENV_VAR}: bad cell size {size:?}: {e}"))
                })?;
                Ok(BroadPhaseKind::SpatialHash { cell_size })
            }
            None if value == "spatial_hash" => Ok(BroadPhaseKind::default()),
            None if value == "sort_and_sweep" => Ok(BroadPhaseKind::SortAndSweep),
            _ => Err(PhysicsError::InvalidConfig(format!(
                "{BROAD_PHASE_ENV_VAR}: unknown broad-phase {value:?}"
            ))),
        }
    }
}

/// Settings for a [`World`](crate::world::World)
///
/// # Examples
///
/// ```
/// use arcade_physics::config::{BroadPhaseKind, WorldConfig};
/// use arcade_physics::math::Vec2;
///
/// let config = WorldConfig::default()
///     .with_gravity(Vec2::new(0.0, 300.0))
///     .with_fps(120.0)
///     .with_broad_phase(BroadPhaseKind::SortAndSweep);
/// assert!(config.validate().is_ok());
///
/// assert!(WorldConfig::default().with_fps(0.0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World gravity in pixels per second squared
    pub gravity: Vec2,
    /// World bounds used by bodies with `collide_world_bounds`
    pub bounds: Rect,
    /// Which sides of the bounds collide
    pub check_collision: FaceFlags,
    /// Fixed-step rate in steps per second
    pub fps: f64,
    /// Run an accumulator of fixed steps instead of one variable step
    pub fixed_step: bool,
    /// Most fixed steps run by a single call to `step`
    pub max_substeps: u32,
    /// Multiplier applied to incoming frame time
    pub time_scale: f64,
    /// Slack added to the swept delta when deciding whether to separate
    pub overlap_bias: f64,
    /// Deepest tile penetration resolved in one step
    pub tile_bias: f64,
    /// Resolve X first when both axes overlap equally
    pub force_x: bool,
    /// Broad-phase index
    pub broad_phase: BroadPhaseKind,
    /// Drag model
    pub drag_mode: DragMode,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            gravity: Vec2::ZERO,
            bounds: Rect::new(0.0, 0.0, 800.0, 600.0),
            check_collision: FaceFlags::all(),
            fps: 60.0,
            fixed_step: true,
            max_substeps: 8,
            time_scale: 1.0,
            overlap_bias: OVERLAP_BIAS,
            tile_bias: TILE_BIAS,
            force_x: false,
            broad_phase: BroadPhaseKind::default(),
            drag_mode: DragMode::default(),
        }
    }
}

impl WorldConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> PhysicsResult<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup, as [`WorldConfig::from_env`] does
    pub fn with_overrides<F>(mut self, lookup: F) -> PhysicsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(fps) = lookup(FPS_ENV_VAR) {
            self.fps = fps.trim().parse::<f64>().map_err(|e| {
                PhysicsError::InvalidConfig(format!("{FPS_ENV_VAR}: bad value {fps:?}: {e}"))
            })?;
        }
        if let Some(kind) = lookup(BROAD_PHASE_ENV_VAR) {
            self.broad_phase = BroadPhaseKind::parse(&kind)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Set the world gravity
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the world bounds
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the fixed-step rate
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Run one variable step per frame instead of fixed steps
    pub fn with_variable_step(mut self) -> Self {
        self.fixed_step = false;
        self
    }

    /// Set the time scale
    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Set the overlap bias
    pub fn with_overlap_bias(mut self, bias: f64) -> Self {
        self.overlap_bias = bias;
        self
    }

    /// Set the tile bias
    pub fn with_tile_bias(mut self, bias: f64) -> Self {
        self.tile_bias = bias;
        self
    }

    /// Resolve X first on equal overlaps
    pub fn with_force_x(mut self, force_x: bool) -> Self {
        self.force_x = force_x;
        self
    }

    /// Choose the broad-phase index
    pub fn with_broad_phase(mut self, kind: BroadPhaseKind) -> Self {
        self.broad_phase = kind;
        self
    }

    /// Choose the drag model
    pub fn with_drag_mode(mut self, mode: DragMode) -> Self {
        self.drag_mode = mode;
        self
    }

    /// Length of one fixed step in seconds
    pub fn fixed_delta(&self) -> f64 {
        1.0 / self.fps
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> PhysicsResult<()> {
        let fail = |msg: String| -> PhysicsResult<()> { Err(PhysicsError::InvalidConfig(msg)) };

        if !self.gravity.is_valid() {
            return fail(format!("gravity must be finite, got {:?}", self.gravity));
        }
        if !self.bounds.is_valid() || self.bounds.width < 0.0 || self.bounds.height < 0.0 {
            return fail(format!("bounds must be finite with non-negative size, got {:?}", self.bounds));
        }
        if !(self.fps > 0.0 && self.fps.is_finite()) {
            return fail(format!("fps must be positive and finite, got {}", self.fps));
        }
        if self.max_substeps == 0 {
            return fail("max_substeps must be at least 1".to_string());
        }
        if !(self.time_scale >= 0.0 && self.time_scale.is_finite()) {
            return fail(format!("time_scale must be non-negative and finite, got {}", self.time_scale));
        }
        if !(self.overlap_bias >= 0.0 && self.overlap_bias.is_finite()) {
            return fail(format!("overlap_bias must be non-negative, got {}", self.overlap_bias));
        }
        if !(self.tile_bias >= 0.0 && self.tile_bias.is_finite()) {
            return fail(format!("tile_bias must be non-negative, got {}", self.tile_bias));
        }
        if let BroadPhaseKind::SpatialHash { cell_size } = self.broad_phase {
            if !(cell_size > 0.0 && cell_size.is_finite()) {
                return fail(format!("spatial hash cell_size must be positive, got {cell_size}"));
            }
        }
        Ok(())
    }
}
