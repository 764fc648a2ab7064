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
//! Error types
//!
//! Only construction and configuration paths return errors. The simulation
//! step itself never fails: malformed pairs are skipped and logged so that a
//! bad frame cannot halt the host loop.

use crate::arena::BodyHandle;
use thiserror::Error;

/// Errors reported by body creation, world configuration and handle lookups
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// Body width or height is not a positive finite number
    #[error("invalid body size {width}x{height}: dimensions must be positive and finite")]
    InvalidSize {
        /// Requested width
        width: f64,
        /// Requested height
        height: f64,
    },

    /// Body mass is not a positive finite number
    #[error("invalid mass {0}: must be positive and finite")]
    InvalidMass(f64),

    /// Timestep is non-positive, NaN or infinite
    #[error("invalid timestep {0}: must be positive and finite")]
    InvalidTimestep(f64),

    /// Handle refers to a body that has been removed
    #[error("stale body handle {0}")]
    StaleHandle(BodyHandle),

    /// Tile layer id is not registered with the world
    #[error("unknown tile layer {0}")]
    UnknownLayer(usize),

    /// Collider id is not registered with the world
    #[error("unknown collider {0}")]
    UnknownCollider(usize),

    /// World configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used across the crate
pub type PhysicsResult<T> = Result<T, PhysicsError>;
