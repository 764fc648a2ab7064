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
//! Sort-and-sweep on the X axis

use super::{BroadPhase, Entries};
use crate::arena::BodyHandle;
use crate::math::Rect;

/// Intervals sorted by their left edge
///
/// A query binary-searches the window of intervals that can reach the
/// query's X range, using the widest stored box to bound how far left an
/// overlapping interval may start.
#[derive(Debug, Clone, Default)]
pub struct SortAndSweep {
    /// Entry indices sorted by left edge
    order: Vec<u32>,
    max_width: f64,
    entries: Entries,
}

impl SortAndSweep {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    fn min_x(&self, i: u32) -> f64 {
        self.entries.rects[i as usize].x
    }
}

impl BroadPhase for SortAndSweep {
    fn name(&self) -> &str {
        "sort-and-sweep"
    }

    fn rebuild(&mut self, entries: &[(BodyHandle, Rect)]) {
        self.entries.load(entries, "sort-and-sweep");
        let rects = &self.entries.rects;

        self.order.clear();
        self.order.extend(0..rects.len() as u32);
        self.order.sort_by(|&a, &b| rects[a as usize].x.total_cmp(&rects[b as usize].x));
        self.max_width = rects.iter().map(|r| r.width).fold(0.0, f64::max);
    }

    fn query(&self, area: Rect, out: &mut Vec<BodyHandle>) {
        if !area.is_valid() {
            return;
        }
        let lo = area.x - self.max_width;
        let start = self.order.partition_point(|&i| self.min_x(i) < lo);
        let end = self.order.partition_point(|&i| self.min_x(i) <= area.right());
        let candidates = self.order[start..end.max(start)].to_vec();
        self.entries.emit(candidates, &area, out);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
