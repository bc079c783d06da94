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

//! Timer settings shared by every scheduling call.
//!
//! All time values are seconds as `f32`. Comparisons against intervals and
//! delays are exact (`>=` / `<=`, no epsilon), so float accumulation error is
//! accepted rather than corrected.

use serde::{Deserialize, Serialize};

/// How many times a timer fires after its first firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Repeat {
    /// Fires until unscheduled.
    #[default]
    Forever,
    /// Fires once, then `n` more times, then unschedules itself.
    Times(u32),
}

impl Repeat {
    /// Returns `true` once a timer that fired `times_executed` times has used
    /// up its budget.
    #[inline]
    pub fn is_exhausted(self, times_executed: u32) -> bool {
        match self {
            Repeat::Forever => false,
            Repeat::Times(repeats) => times_executed > repeats,
        }
    }

    /// Total number of firings, or `None` for [`Repeat::Forever`].
    pub fn total_fires(self) -> Option<u64> {
        match self {
            Repeat::Forever => None,
            Repeat::Times(repeats) => Some(u64::from(repeats) + 1),
        }
    }
}

/// Interval, repeat budget, initial delay and initial paused state of a timer.
///
/// ```rust
/// use cadence_core::{Repeat, TimerSettings};
///
/// let settings = TimerSettings::every(0.5).repeat(Repeat::Times(3)).delay(1.0);
/// assert_eq!(settings.interval, 0.5);
/// assert_eq!(settings.repeat.total_fires(), Some(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSettings {
    /// Seconds between firings. `0.0` or less fires on every tick with the
    /// tick's accumulated time as the delta.
    pub interval: f32,
    /// Repeat budget.
    pub repeat: Repeat,
    /// One-time offset before the first firing. `0.0` disables it.
    pub delay: f32,
    /// Paused state used when this call creates the target's entry.
    pub paused: bool,
}

impl TimerSettings {
    /// A timer firing every `interval` seconds until unscheduled.
    pub const fn every(interval: f32) -> Self {
        Self {
            interval,
            repeat: Repeat::Forever,
            delay: 0.0,
            paused: false,
        }
    }

    /// A timer firing on every tick until unscheduled.
    pub const fn every_tick() -> Self {
        Self::every(0.0)
    }

    /// A single firing after `delay` seconds.
    pub const fn once(delay: f32) -> Self {
        Self {
            interval: 0.0,
            repeat: Repeat::Times(0),
            delay,
            paused: false,
        }
    }

    /// Sets the repeat budget.
    pub const fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Sets the initial delay.
    pub const fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the paused state for a newly created target entry.
    pub const fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self::every_tick()
    }
}
