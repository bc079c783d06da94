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

//! Scheduler configuration.

use crate::error::SchedulerResult;
use serde::{Deserialize, Serialize};

/// What to do when an existing target is scheduled with a different paused flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PausedMismatchPolicy {
    /// Keep the entry's paused state; the timer is still scheduled.
    #[default]
    KeepExisting,
    /// Switch the entry to the requested paused state.
    AdoptRequested,
}

/// Configuration for the Scheduler.
///
/// Every field has a default, so a JSON document only needs the keys it
/// overrides:
///
/// ```rust
/// use cadence_core::{PausedMismatchPolicy, SchedulerConfig};
///
/// let config = SchedulerConfig::from_json_str(r#"{ "paused_mismatch": "adopt_requested" }"#).unwrap();
/// assert_eq!(config.paused_mismatch, PausedMismatchPolicy::AdoptRequested);
/// assert!(config.log_reschedule);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Panic on contract violations (empty key, invalid target, paused
    /// mismatch) instead of logging and ignoring them.
    /// Defaults to `true` in debug builds only.
    pub strict_contracts: bool,
    /// Resolution of a paused-state mismatch when `strict_contracts` is off.
    pub paused_mismatch: PausedMismatchPolicy,
    /// Log at debug level when a duplicate schedule updates an interval in place.
    pub log_reschedule: bool,
}

impl SchedulerConfig {
    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> SchedulerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// A configuration that never panics on contract violations.
    pub fn lenient() -> Self {
        Self {
            strict_contracts: false,
            ..Self::default()
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            strict_contracts: cfg!(debug_assertions),
            paused_mismatch: PausedMismatchPolicy::KeepExisting,
            log_reschedule: true,
        }
    }
}
