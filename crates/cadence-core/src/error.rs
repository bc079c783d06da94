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

//! Error types for scheduling contracts and configuration.

use crate::target::TargetId;
use thiserror::Error;

/// A violated scheduling contract or a configuration failure.
///
/// Scheduling calls treat the contract variants as programming errors: they
/// are asserted in strict mode and logged-and-ignored otherwise. They are only
/// returned as values from the `try_*` entry points.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The null target was passed where a real target is required.
    #[error("target must not be the invalid target")]
    InvalidTarget,
    /// An empty key was passed.
    #[error("timer key must not be empty")]
    EmptyKey,
    /// A target was re-scheduled with a paused flag different from its entry's.
    #[error("{target} has paused={existing} but was scheduled with paused={requested}")]
    PausedStateMismatch {
        /// The target whose entry already exists.
        target: TargetId,
        /// The entry's current paused flag.
        existing: bool,
        /// The paused flag passed to the scheduling call.
        requested: bool,
    },
    /// `update` was called from inside a timer callback.
    #[error("update must not be called while a tick is in progress")]
    ReentrantUpdate,
    /// The configuration could not be parsed.
    #[error("invalid scheduler configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias for fallible scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
