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
//! Per-face flags and per-step contact state

use serde::{Deserialize, Serialize};

/// One face of an axis-aligned box, or no face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Face {
    /// No face
    #[default]
    None,
    /// Top face (towards negative y)
    Up,
    /// Bottom face (towards positive y)
    Down,
    /// Left face (towards negative x)
    Left,
    /// Right face (towards positive x)
    Right,
}

impl Face {
    /// The face on the partner that meets this face
    ///
    /// ```
    /// use arcade_physics::body::Face;
    /// assert_eq!(Face::Up.opposite(), Face::Down);
    /// assert_eq!(Face::None.opposite(), Face::None);
    /// ```
    pub fn opposite(self) -> Face {
        match self {
            Face::None => Face::None,
            Face::Up => Face::Down,
            Face::Down => Face::Up,
            Face::Left => Face::Right,
            Face::Right => Face::Left,
        }
    }

    /// True for the two horizontal faces
    pub fn is_horizontal(self) -> bool {
        matches!(self, Face::Left | Face::Right)
    }
}

/// Up/down/left/right booleans plus a `none` summary
///
/// Used for `touching`, `blocked` and `check_collision`. For the first two,
/// `none` is true while no face is set. For `check_collision`, `none`
/// disables collision on every face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceFlags {
    /// Summary flag
    pub none: bool,
    /// Top face
    pub up: bool,
    /// Bottom face
    pub down: bool,
    /// Left face
    pub left: bool,
    /// Right face
    pub right: bool,
}

impl FaceFlags {
    /// No face set (`none == true`)
    pub const fn clear() -> Self {
        FaceFlags { none: true, up: false, down: false, left: false, right: false }
    }

    /// Every face enabled (`none == false`), the default for `check_collision`
    pub const fn all() -> Self {
        FaceFlags { none: false, up: true, down: true, left: true, right: true }
    }

    /// Reset to [`FaceFlags::clear`]
    pub fn reset(&mut self) {
        *self = FaceFlags::clear();
    }

    /// Set one face, clearing `none`
    pub fn set(&mut self, face: Face) {
        match face {
            Face::None => return,
            Face::Up => self.up = true,
            Face::Down => self.down = true,
            Face::Left => self.left = true,
            Face::Right => self.right = true,
        }
        self.none = false;
    }

    /// Read one face
    pub fn get(&self, face: Face) -> bool {
        match face {
            Face::None => self.none,
            Face::Up => self.up,
            Face::Down => self.down,
            Face::Left => self.left,
            Face::Right => self.right,
        }
    }

    /// True if any directional face is set
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

impl Default for FaceFlags {
    fn default() -> Self {
        FaceFlags::clear()
    }
}

/// Where a body is in the collision pipeline during the current step
///
/// Reset to `Idle` at the start of each step. The furthest state reached
/// is kept, so a body separated by one pair stays `Separated` even if a
/// later pair only checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ContactState {
    /// Not matched by any broad-phase query this step
    #[default]
    Idle,
    /// Matched by the broad-phase
    Candidate,
    /// Narrow-phase ran; no correction applied
    Checked,
    /// A separation correction was applied
    Separated,
}

impl ContactState {
    /// Advance to `next` unless the body already reached a later state
    pub fn advance(&mut self, next: ContactState) {
        if next > *self {
            *self = next;
        }
    }
}
