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
//! Default arcade integrator
//!
//! With the `parallel` feature the per-body update runs on the Rayon pool.
//! Bodies are independent during integration, so the parallel and
//! sequential paths produce identical results.

use super::{integrate_body, DragMode, Integrator};
use crate::body::Body;
use crate::math::Vec2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Bodies below this count are integrated sequentially even with `parallel`
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 512;

/// Semi-implicit Euler integrator with configurable drag
///
/// # Example
///
/// ```
/// use arcade_physics::body::Body;
/// use arcade_physics::integration::{ArcadeIntegrator, DragMode, Integrator};
/// use arcade_physics::math::Vec2;
///
/// let integrator = ArcadeIntegrator::new(DragMode::Proportional);
/// let mut bodies = vec![Body::new(0.0, 0.0, 8.0, 8.0).unwrap()];
/// let moved = integrator.integrate(&mut bodies, 1.0 / 60.0, Vec2::new(0.0, 600.0));
/// assert_eq!(moved, 1);
/// assert!(bodies[0].velocity.y > 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ArcadeIntegrator {
    drag_mode: DragMode,
}

impl ArcadeIntegrator {
    /// Create an integrator using the given drag mode
    pub fn new(drag_mode: DragMode) -> Self {
        ArcadeIntegrator { drag_mode }
    }

    /// Drag mode in use
    pub fn drag_mode(&self) -> DragMode {
        self.drag_mode
    }
}

impl Integrator for ArcadeIntegrator {
    fn name(&self) -> &str {
        "Arcade Euler"
    }

    #[cfg(feature = "parallel")]
    fn integrate(&self, bodies: &mut [Body], dt: f64, gravity: Vec2) -> usize {
        let drag_mode = self.drag_mode;
        if bodies.len() < PARALLEL_THRESHOLD {
            return bodies
                .iter_mut()
                .map(|body| integrate_body(body, dt, gravity, drag_mode))
                .filter(|&moved| moved)
                .count();
        }
        bodies
            .par_iter_mut()
            .map(|body| integrate_body(body, dt, gravity, drag_mode) as usize)
            .sum()
    }

    #[cfg(not(feature = "parallel"))]
    fn integrate(&self, bodies: &mut [Body], dt: f64, gravity: Vec2) -> usize {
        let drag_mode = self.drag_mode;
        bodies
            .iter_mut()
            .map(|body| integrate_body(body, dt, gravity, drag_mode))
            .filter(|&moved| moved)
            .count()
    }
}
