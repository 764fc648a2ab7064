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
//! Body ownership
//!
//! The world owns every body in an [`Arena`] and hands out [`BodyHandle`]s.
//! Removing a body frees its slot immediately, so stale handles held by
//! colliders or candidate lists simply fail to resolve.

mod handle;
mod storage;

pub use handle::BodyHandle;
pub use storage::Arena;
