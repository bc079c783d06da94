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

//! Per-tick statistics.

use std::time::Duration;

/// What a single `update` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Targets walked, paused ones included.
    pub targets_visited: usize,
    /// Callback invocations across all timers.
    pub timers_fired: usize,
    /// Main-thread functions drained and run at the end of the tick.
    pub functions_performed: usize,
    /// Wall-clock time spent inside `update`.
    pub duration: Duration,
}
