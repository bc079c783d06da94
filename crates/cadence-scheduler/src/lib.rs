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

//! # Cadence Scheduler
//!
//! The engine heartbeat: a single-threaded, cooperative dispatcher that fires
//! delayed and repeating timers once per frame, honours per-target pausing,
//! tolerates callbacks that reshape its own work-list mid-tick, and runs work
//! handed over from other threads at a fixed point of every tick.

#![warn(missing_docs)]

mod entry;
mod report;
mod scheduler;
mod timer;

pub use report::TickReport;
pub use scheduler::Scheduler;
pub use timer::{TimerCallback, TimerInfo};

pub use cadence_core::{
    MainThreadHandle, PausedMismatchPolicy, Repeat, SchedulerConfig, SchedulerError,
    SchedulerResult, TargetAllocator, TargetId, TimerSettings,
};
