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
//! Dense generational arena
//!
//! Values live in one contiguous array so that per-step passes (integration,
//! flag resets, write-back) walk memory linearly. A sparse slot table maps
//! handles to dense indices and tracks generations; removal swaps the last
//! value into the hole.
//!
//! # Memory Layout
//!
//! ```text
//! slots:   [gen0/idx2, gen1/free, gen0/idx0, gen0/idx1]   // indexed by handle
//! values:  [v2, v3, v0]                                  // dense, iteration order
//! handles: [h2, h3, h0]                                  // dense -> handle
//! ```

use super::BodyHandle;

#[derive(Debug, Clone, Copy)]
struct Slot {
    generation: u32,
    dense: Option<usize>,
}

/// Arena storing values densely behind generational handles
///
/// # Example
///
/// ```
/// use arcade_physics::arena::Arena;
///
/// let mut arena = Arena::new();
/// let a = arena.insert("a");
/// let b = arena.insert("b");
/// assert_eq!(arena.get(a), Some(&"a"));
///
/// arena.remove(a);
/// assert!(arena.get(a).is_none());
/// assert_eq!(arena.len(), 1);
/// assert_eq!(arena.get(b), Some(&"b"));
/// ```
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot>,
    free: Vec<u32>,
    values: Vec<T>,
    handles: Vec<BodyHandle>,
}

impl<T> Arena<T> {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty arena with room for `capacity` values
    pub fn with_capacity(capacity: usize) -> Self {
        Arena {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            values: Vec::with_capacity(capacity),
            handles: Vec::with_capacity(capacity),
        }
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the arena holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Insert a value and return its handle
    ///
    /// Freed slots are reused with a bumped generation.
    pub fn insert(&mut self, value: T) -> BodyHandle {
        let dense = self.values.len();
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.dense = Some(dense);
                BodyHandle::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, dense: Some(dense) });
                BodyHandle::new(index, 0)
            }
        };
        self.values.push(value);
        self.handles.push(handle);

        debug_assert_eq!(self.values.len(), self.handles.len());
        handle
    }

    /// Remove the value behind `handle`
    ///
    /// Returns `None` for stale or unknown handles.
    pub fn remove(&mut self, handle: BodyHandle) -> Option<T> {
        let dense = self.dense_index(handle)?;

        let slot = &mut self.slots[handle.index() as usize];
        slot.dense = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());

        // Swap with last element to avoid shifting
        let last = self.values.len() - 1;
        if dense != last {
            let moved = self.handles[last];
            self.slots[moved.index() as usize].dense = Some(dense);
        }
        self.handles.swap_remove(dense);
        let value = self.values.swap_remove(dense);

        debug_assert_eq!(self.values.len(), self.handles.len());
        Some(value)
    }

    /// Dense index for a live handle
    pub fn dense_index(&self, handle: BodyHandle) -> Option<usize> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.dense
    }

    /// Check if a handle refers to a live value
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.dense_index(handle).is_some()
    }

    /// Shared access by handle
    pub fn get(&self, handle: BodyHandle) -> Option<&T> {
        let dense = self.dense_index(handle)?;
        Some(&self.values[dense])
    }

    /// Mutable access by handle
    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut T> {
        let dense = self.dense_index(handle)?;
        Some(&mut self.values[dense])
    }

    /// Mutable access to two distinct values at once
    ///
    /// Returns `None` if either handle is stale or both refer to the same value.
    pub fn get_pair_mut(&mut self, a: BodyHandle, b: BodyHandle) -> Option<(&mut T, &mut T)> {
        let ia = self.dense_index(a)?;
        let ib = self.dense_index(b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (left, right) = self.values.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.values.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }

    /// Handle stored at a dense index
    pub fn handle_at(&self, dense: usize) -> Option<BodyHandle> {
        self.handles.get(dense).copied()
    }

    /// Live handles in dense (iteration) order
    pub fn handles(&self) -> &[BodyHandle] {
        &self.handles
    }

    /// Dense value slice
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Mutable dense value slice, for bulk per-step passes
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Iterate over `(handle, value)` pairs in dense order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &T)> + '_ {
        self.handles.iter().copied().zip(self.values.iter())
    }

    /// Remove every value, invalidating all outstanding handles
    pub fn clear(&mut self) {
        for handle in self.handles.drain(..) {
            let slot = &mut self.slots[handle.index() as usize];
            slot.dense = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(handle.index());
        }
        self.values.clear();
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
