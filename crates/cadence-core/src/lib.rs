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

//! # Cadence Core
//!
//! Foundational crate containing the identity types, timer settings, error
//! types and cross-thread primitives shared by the Cadence scheduler and the
//! applications that drive it.

#![warn(missing_docs)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod target;
pub mod timing;
pub mod utils;

pub use config::{PausedMismatchPolicy, SchedulerConfig};
pub use dispatch::{MainThreadFn, MainThreadHandle, MainThreadQueue};
pub use error::{SchedulerError, SchedulerResult};
pub use target::{TargetAllocator, TargetId};
pub use timing::{Repeat, TimerSettings};
pub use utils::stopwatch::Stopwatch;
