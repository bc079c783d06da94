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

//! Target identity.
//!
//! A target is whatever owns a group of timers: a game object, a subsystem, a
//! script instance. The scheduler only ever compares and hashes a [`TargetId`];
//! it never looks through it, so any host-side object model can sit behind it.

mod allocator;
mod id;

pub use self::allocator::TargetAllocator;
pub use self::id::TargetId;
