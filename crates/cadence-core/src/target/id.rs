// Copyright 2025 eraflo
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

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque, stable identifier for a scheduling target.
///
/// It combines an index with a generation count. When a target is released
/// its index can be recycled, but the generation is bumped, so a stale
/// `TargetId` never compares equal to the target that reused the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId {
    /// The slot index of the target.
    pub index: u32,
    /// A generation counter that is incremented each time the index is recycled.
    pub generation: u32,
}

impl TargetId {
    /// The null target. Never handed out by a [`TargetAllocator`](super::TargetAllocator)
    /// and rejected by every scheduling call.
    pub const INVALID: TargetId = TargetId {
        index: u32::MAX,
        generation: u32::MAX,
    };

    /// Creates an id from an index and a generation.
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Builds an id from a host-issued 64-bit value.
    ///
    /// The low 32 bits become the index and the high 32 bits the generation,
    /// so `TargetId::from_raw(id.to_raw()) == id`.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self {
            index: raw as u32,
            generation: (raw >> 32) as u32,
        }
    }

    /// Packs the id into a single 64-bit value.
    #[inline]
    pub const fn to_raw(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Returns `false` for [`TargetId::INVALID`].
    #[inline]
    pub const fn is_valid(self) -> bool {
        !(self.index == u32::MAX && self.generation == u32::MAX)
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "target#{}v{}", self.index, self.generation)
        } else {
            write!(f, "target#invalid")
        }
    }
}
