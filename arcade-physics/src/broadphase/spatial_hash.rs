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
//! Uniform-grid spatial hash

use super::{BroadPhase, Entries};
use crate::arena::BodyHandle;
use crate::math::Rect;
use std::collections::HashMap;

/// Boxes covering more cells than this are kept in a separate list
const MAX_CELLS_PER_ENTRY: i64 = 1024;

/// Unbounded spatial hash over square cells
///
/// Each box is inserted into every cell it touches. Very large boxes (a
/// level-wide floor, say) are kept aside and checked linearly instead of
/// being smeared over thousands of cells.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f64,
    inv_cell_size: f64,
    cells: HashMap<(i32, i32), Vec<u32>>,
    oversized: Vec<u32>,
    entries: Entries,
}

impl SpatialHash {
    /// Create an empty hash
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not positive and finite.
    pub fn new(cell_size: f64) -> Self {
        assert!(cell_size > 0.0 && cell_size.is_finite(), "Cell size must be positive and finite");
        SpatialHash {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            oversized: Vec::new(),
            entries: Entries::default(),
        }
    }

    /// Cell edge length
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    fn cell_range(&self, rect: &Rect) -> (i32, i32, i32, i32) {
        let to_cell = |v: f64| (v * self.inv_cell_size).floor().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
        (to_cell(rect.x), to_cell(rect.y), to_cell(rect.right()), to_cell(rect.bottom()))
    }

    fn cell_count(range: (i32, i32, i32, i32)) -> i64 {
        let (x0, y0, x1, y1) = range;
        (x1 as i64 - x0 as i64 + 1) * (y1 as i64 - y0 as i64 + 1)
    }
}

impl Default for SpatialHash {
    fn default() -> Self {
        SpatialHash::new(64.0)
    }
}

impl BroadPhase for SpatialHash {
    fn name(&self) -> &str {
        "spatial-hash"
    }

    fn rebuild(&mut self, entries: &[(BodyHandle, Rect)]) {
        for cell in self.cells.values_mut() {
            cell.clear();
        }
        self.oversized.clear();
        self.entries.load(entries, "spatial-hash");

        for (i, rect) in self.entries.rects.iter().enumerate() {
            let range = self.cell_range(rect);
            if Self::cell_count(range) > MAX_CELLS_PER_ENTRY {
                self.oversized.push(i as u32);
                continue;
            }
            let (x0, y0, x1, y1) = range;
            for cy in y0..=y1 {
                for cx in x0..=x1 {
                    self.cells.entry((cx, cy)).or_default().push(i as u32);
                }
            }
        }
        self.cells.retain(|_, cell| !cell.is_empty());
    }

    fn query(&self, area: Rect, out: &mut Vec<BodyHandle>) {
        if !area.is_valid() {
            return;
        }
        let range = self.cell_range(&area);
        let mut candidates = self.oversized.clone();

        if Self::cell_count(range) > self.cells.len() as i64 {
            // Cheaper to walk the occupied cells than the query area
            let (x0, y0, x1, y1) = range;
            for (&(cx, cy), cell) in &self.cells {
                if cx >= x0 && cx <= x1 && cy >= y0 && cy <= y1 {
                    candidates.extend_from_slice(cell);
                }
            }
        } else {
            let (x0, y0, x1, y1) = range;
            for cy in y0..=y1 {
                for cx in x0..=x1 {
                    if let Some(cell) = self.cells.get(&(cx, cy)) {
                        candidates.extend_from_slice(cell);
                    }
                }
            }
        }
        self.entries.emit(candidates, &area, out);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
