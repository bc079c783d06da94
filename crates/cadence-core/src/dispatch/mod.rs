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

//! Cross-thread hand-off of work to the main (update) thread.
//!
//! The scheduler itself is single-threaded. The [`MainThreadQueue`] is the one
//! structure shared with other threads: any thread can push a closure through
//! a [`MainThreadHandle`], and the thread driving the frame loop drains and
//! runs the queued closures once per tick.

mod queue;

pub use self::queue::{MainThreadFn, MainThreadHandle, MainThreadQueue};
