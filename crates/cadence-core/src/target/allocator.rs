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

//! Generational issuing of target ids.

use super::id::TargetId;

/// Hands out [`TargetId`]s and recycles released slots.
///
/// The allocator keeps a dense list of slots and a free list. Releasing a
/// target pushes its index on the free list; the next allocation pops it and
/// bumps the generation, which keeps ids unique for the lifetime of their
/// registration even though indices are reused.
#[derive(Debug, Clone, Default)]
pub struct TargetAllocator {
    /// Every slot ever created, with its current id and whether it is alive.
    slots: Vec<(TargetId, bool)>,
    /// Indices available for reuse.
    freed: Vec<u32>,
}

impl TargetAllocator {
    /// Creates a new, empty allocator.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            freed: Vec::new(),
        }
    }

    /// Allocates a new or recycled `TargetId`.
    pub fn allocate(&mut self) -> TargetId {
        if let Some(index) = self.freed.pop() {
            let (id_slot, alive) = &mut self.slots[index as usize];
            id_slot.generation = id_slot.generation.wrapping_add(1);
            // Skip the one generation that would spell the null target.
            if !id_slot.is_valid() {
                id_slot.generation = 0;
            }
            *alive = true;
            *id_slot
        } else {
            let id = TargetId::new(self.slots.len() as u32, 0);
            self.slots.push((id, true));
            id
        }
    }

    /// Releases a target so its slot can be recycled.
    ///
    /// Returns `false` if the id was stale or already released. Releasing a
    /// target does not touch the scheduler; unschedule its timers first.
    pub fn release(&mut self, id: TargetId) -> bool {
        match self.slots.get_mut(id.index as usize) {
            Some((slot_id, alive)) if *alive && slot_id.generation == id.generation => {
                *alive = false;
                self.freed.push(id.index);
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if `id` refers to a currently allocated target.
    pub fn is_alive(&self, id: TargetId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|(slot_id, alive)| *alive && slot_id.generation == id.generation)
    }

    /// Returns the number of live targets.
    pub fn alive_count(&self) -> usize {
        self.slots.len() - self.freed.len()
    }

    /// Returns the total number of slots (both alive and released).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
