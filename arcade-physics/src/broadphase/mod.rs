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
//! Broad-phase candidate generation
//!
//! A broad-phase index is rebuilt from the bodies' bounding boxes once per
//! step and then queried with rectangles. Queries are conservative: every
//! stored box that overlaps the query rectangle, edges included, is
//! returned. The narrow-phase filters out the false positives.
//!
//! Results always come back in insertion order with no duplicates, so the
//! order in which pairs are checked (and events are queued) does not depend
//! on hashing or on the index implementation.

mod spatial_hash;
mod sweep;

pub use spatial_hash::SpatialHash;
pub use sweep::SortAndSweep;

use crate::arena::BodyHandle;
use crate::config::BroadPhaseKind;
use crate::math::Rect;
use std::collections::HashSet;

/// Spatial index over body bounding boxes
pub trait BroadPhase: Send + Sync {
    /// Name of the index, for logging
    fn name(&self) -> &str;

    /// Replace the index contents
    ///
    /// Entries with non-finite rectangles are skipped.
    fn rebuild(&mut self, entries: &[(BodyHandle, Rect)]);

    /// Append every stored handle whose box overlaps `area` (inclusive)
    ///
    /// Appended handles are deduplicated and in insertion order.
    fn query(&self, area: Rect, out: &mut Vec<BodyHandle>);

    /// Number of indexed entries
    fn len(&self) -> usize;

    /// True if nothing is indexed
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Create the index selected by the world configuration
pub fn create(kind: &BroadPhaseKind) -> Box<dyn BroadPhase> {
    match *kind {
        BroadPhaseKind::SpatialHash { cell_size } => Box::new(SpatialHash::new(cell_size)),
        BroadPhaseKind::SortAndSweep => Box::new(SortAndSweep::new()),
    }
}

/// Ordered set of unordered pairs
///
/// `(a, b)` and `(b, a)` count as the same pair; the first orientation seen
/// is kept. Self-pairs are rejected.
///
/// ```
/// use arcade_physics::arena::BodyHandle;
/// use arcade_physics::broadphase::PairSet;
///
/// let a = BodyHandle::new(0, 0);
/// let b = BodyHandle::new(1, 0);
/// let mut pairs = PairSet::new();
/// assert!(pairs.insert(b, a));
/// assert!(!pairs.insert(a, b));
/// assert!(!pairs.insert(a, a));
/// assert_eq!(pairs.iter().collect::<Vec<_>>(), vec![(b, a)]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct PairSet {
    seen: HashSet<(BodyHandle, BodyHandle)>,
    pairs: Vec<(BodyHandle, BodyHandle)>,
}

impl PairSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair; returns false for self-pairs and pairs already present
    pub fn insert(&mut self, a: BodyHandle, b: BodyHandle) -> bool {
        if a == b {
            return false;
        }
        let key = if a < b { (a, b) } else { (b, a) };
        if !self.seen.insert(key) {
            return false;
        }
        self.pairs.push((a, b));
        true
    }

    /// Check whether a pair is present in either orientation
    pub fn contains(&self, a: BodyHandle, b: BodyHandle) -> bool {
        let key = if a < b { (a, b) } else { (b, a) };
        self.seen.contains(&key)
    }

    /// Pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, BodyHandle)> + '_ {
        self.pairs.iter().copied()
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if empty
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Remove all pairs, keeping allocations
    pub fn clear(&mut self) {
        self.seen.clear();
        self.pairs.clear();
    }
}

/// Shared storage for index implementations: finite entries in insertion order
#[derive(Debug, Default, Clone)]
struct Entries {
    handles: Vec<BodyHandle>,
    rects: Vec<Rect>,
}

impl Entries {
    fn load(&mut self, source: &[(BodyHandle, Rect)], index: &str) {
        self.handles.clear();
        self.rects.clear();
        for &(handle, rect) in source {
            if !rect.is_valid() {
                log::warn!("{index}: skipping {handle} with non-finite bounds {rect:?}");
                continue;
            }
            self.handles.push(handle);
            self.rects.push(rect);
        }
        log::debug!("{index}: rebuilt with {} entries", self.handles.len());
    }

    fn len(&self) -> usize {
        self.handles.len()
    }

    /// Emit the overlapping subset of `candidates` (entry indices) in order
    fn emit(&self, mut candidates: Vec<u32>, area: &Rect, out: &mut Vec<BodyHandle>) {
        candidates.sort_unstable();
        candidates.dedup();
        out.extend(
            candidates
                .into_iter()
                .map(|i| i as usize)
                .filter(|&i| self.rects[i].overlaps_inclusive(area))
                .map(|i| self.handles[i]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(i: u32) -> BodyHandle {
        BodyHandle::new(i, 0)
    }

    fn scene() -> Vec<(BodyHandle, Rect)> {
        vec![
            (handle(3), Rect::new(0.0, 0.0, 10.0, 10.0)),
            (handle(1), Rect::new(10.0, 0.0, 10.0, 10.0)),
            (handle(2), Rect::new(200.0, 200.0, 50.0, 50.0)),
            (handle(0), Rect::new(-500.0, -500.0, 1000.0, 5.0)),
            (handle(4), Rect::new(f64::NAN, 0.0, 1.0, 1.0)),
        ]
    }

    fn check_index(index: &mut dyn BroadPhase) {
        index.rebuild(&scene());
        assert_eq!(index.len(), 4, "{} should skip non-finite entries", index.name());

        let mut out = Vec::new();
        index.query(Rect::new(5.0, 5.0, 1.0, 1.0), &mut out);
        assert_eq!(out, vec![handle(3)]);

        out.clear();
        // Shares an edge with both small boxes
        index.query(Rect::new(9.0, 10.0, 2.0, 2.0), &mut out);
        assert_eq!(out, vec![handle(3), handle(1)]);

        out.clear();
        index.query(Rect::new(-1000.0, -1000.0, 2000.0, 2000.0), &mut out);
        assert_eq!(out, vec![handle(3), handle(1), handle(2), handle(0)]);

        out.clear();
        index.query(Rect::new(1000.0, 1000.0, 5.0, 5.0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_spatial_hash_queries() {
        check_index(&mut SpatialHash::new(16.0));
    }

    #[test]
    fn test_sort_and_sweep_queries() {
        check_index(&mut SortAndSweep::new());
    }

    #[test]
    fn test_pair_set_order() {
        let mut pairs = PairSet::new();
        pairs.insert(handle(2), handle(1));
        pairs.insert(handle(0), handle(3));
        pairs.insert(handle(1), handle(2));
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(handle(3), handle(0)));
        assert_eq!(
            pairs.iter().collect::<Vec<_>>(),
            vec![(handle(2), handle(1)), (handle(0), handle(3))]
        );
        pairs.clear();
        assert!(pairs.is_empty());
    }
}
