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
//! Narrow-phase collision
//!
//! Pairwise checks and separation for bodies and tiles. These functions
//! operate on bodies directly and know nothing about the world; the
//! [`World`](crate::world::World) feeds them candidate pairs from the
//! broad-phase.

mod circle;
mod info;
mod separate;
mod tile;

pub use circle::{contact, separate_circles, Contact};
pub use info::{
    axis_overlap, depth_overlap, intersects, is_resolvable, penetrates, Axis, CollisionInfo, OVERLAP_BIAS,
    SEPARATION_EPSILON, TOUCH_EPSILON,
};
pub use separate::{correction_shares, overlap_only, separate, separate_axis};
pub use tile::{separate_tile, tile_overlap_x, tile_overlap_y, tile_overlaps, TILE_BIAS};

pub(crate) use tile::mark_if_embedded;
