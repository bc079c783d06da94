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

//! A single schedulable unit of delayed and repeating work.

use crate::scheduler::Scheduler;
use cadence_core::{Repeat, TimerSettings};
use std::fmt;

/// The function run when a timer fires.
///
/// It receives the scheduler, so it can schedule, unschedule or pause from
/// inside a firing, and the delta time of the firing in seconds.
pub type TimerCallback = Box<dyn FnMut(&mut Scheduler, f32)>;

/// One firing consumed from a timer.
///
/// The timer's bookkeeping has already been updated when this is handed out,
/// so the callback can fail without leaving the timer half-advanced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Firing {
    /// Delta time handed to the callback.
    pub delta: f32,
    /// The repeat budget is used up; the timer must be cancelled after this firing.
    pub exhausted: bool,
    /// Another firing may be due in the same tick.
    pub more: bool,
}

/// A read-only snapshot of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerInfo {
    /// Seconds between firings.
    pub interval: f32,
    /// Initial delay, `0.0` when none was configured.
    pub delay: f32,
    /// Whether the initial delay is still ahead.
    pub delay_pending: bool,
    /// Repeat budget.
    pub repeat: Repeat,
    /// Number of times the timer fired so far.
    pub times_executed: u32,
    /// `false` until the timer has seen its first tick.
    pub started: bool,
}

/// A timer bound to one key of one target.
///
/// Time is accumulated in `elapsed`, which stays `None` until the first tick.
/// That first tick only starts the clock; it never fires.
pub(crate) struct Timer {
    key: String,
    interval: f32,
    delay: f32,
    delay_pending: bool,
    repeat: Repeat,
    elapsed: Option<f32>,
    times_executed: u32,
    /// Interval locked in for the current tick's catch-up loop.
    tick_interval: Option<f32>,
    /// Moved out while the callback runs.
    pub(crate) callback: Option<TimerCallback>,
}

impl Timer {
    pub(crate) fn new(key: String, settings: &TimerSettings, callback: TimerCallback) -> Self {
        let mut timer = Self {
            key,
            interval: 0.0,
            delay: 0.0,
            delay_pending: false,
            repeat: Repeat::Forever,
            elapsed: None,
            times_executed: 0,
            tick_interval: None,
            callback: Some(callback),
        };
        timer.configure(settings.interval, settings.repeat, settings.delay);
        timer
    }

    /// Sets interval, repeat budget and delay, and rewinds the clock.
    pub(crate) fn configure(&mut self, interval: f32, repeat: Repeat, delay: f32) {
        self.elapsed = None;
        self.interval = interval;
        self.delay = delay;
        self.delay_pending = delay > 0.0;
        self.repeat = repeat;
        self.tick_interval = None;
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn interval(&self) -> f32 {
        self.interval
    }

    /// Changes the interval without touching the clock or the repeat budget.
    /// Takes effect from the next tick.
    pub(crate) fn set_interval(&mut self, interval: f32) {
        self.interval = interval;
    }

    pub(crate) fn info(&self) -> TimerInfo {
        TimerInfo {
            interval: self.interval,
            delay: self.delay,
            delay_pending: self.delay_pending,
            repeat: self.repeat,
            times_executed: self.times_executed,
            started: self.elapsed.is_some(),
        }
    }

    /// Adds `dt` to the clock for a new tick.
    ///
    /// Returns `false` on the very first tick, which only starts the clock.
    pub(crate) fn advance(&mut self, dt: f32) -> bool {
        self.tick_interval = None;
        match self.elapsed {
            None => {
                self.elapsed = Some(0.0);
                self.times_executed = 0;
                false
            }
            Some(elapsed) => {
                self.elapsed = Some(elapsed + dt);
                true
            }
        }
    }

    /// Consumes the next firing due in this tick, if any.
    ///
    /// The pending delay is consumed first and fires with the delay as its
    /// delta. Regular firings then use the interval, or the whole accumulated
    /// time when the interval is not positive. The interval is read once per
    /// tick, so re-scheduling from inside a callback changes the next tick.
    pub(crate) fn next_firing(&mut self) -> Option<Firing> {
        let elapsed = self.elapsed?;

        if self.delay_pending {
            if elapsed < self.delay {
                return None;
            }
            self.elapsed = Some(elapsed - self.delay);
            self.times_executed = self.times_executed.saturating_add(1);
            self.delay_pending = false;
            let exhausted = self.repeat.is_exhausted(self.times_executed);
            return Some(Firing {
                delta: self.delay,
                exhausted,
                more: !exhausted,
            });
        }

        let interval = *self.tick_interval.get_or_insert(if self.interval > 0.0 {
            self.interval
        } else {
            elapsed
        });
        if elapsed < interval {
            return None;
        }

        let remaining = elapsed - interval;
        self.elapsed = Some(remaining);
        self.times_executed = self.times_executed.saturating_add(1);
        let exhausted = self.repeat.is_exhausted(self.times_executed);
        Some(Firing {
            delta: interval,
            exhausted,
            more: !exhausted && remaining > 0.0,
        })
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("key", &self.key)
            .field("interval", &self.interval)
            .field("delay", &self.delay)
            .field("delay_pending", &self.delay_pending)
            .field("repeat", &self.repeat)
            .field("elapsed", &self.elapsed)
            .field("times_executed", &self.times_executed)
            .field("firing", &self.callback.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn timer(settings: TimerSettings) -> Timer {
        Timer::new("test".to_string(), &settings, Box::new(|_, _| {}))
    }

    /// Runs one tick the way the scheduler does, without callbacks.
    fn tick(timer: &mut Timer, dt: f32) -> Vec<Firing> {
        let mut firings = Vec::new();
        if !timer.advance(dt) {
            return firings;
        }
        while let Some(firing) = timer.next_firing() {
            firings.push(firing);
            if firing.exhausted || !firing.more {
                break;
            }
        }
        firings
    }

    #[test]
    fn first_tick_only_starts_the_clock() {
        let mut t = timer(TimerSettings::every(0.5));
        assert!(!t.info().started);
        assert!(tick(&mut t, 10.0).is_empty(), "Initialization tick must not fire");
        assert!(t.info().started);
        assert_eq!(t.info().times_executed, 0);
    }

    #[test]
    fn catches_up_several_intervals_in_one_tick() {
        let mut t = timer(TimerSettings::every(0.25));
        tick(&mut t, 0.0);

        let firings = tick(&mut t, 0.8);
        assert_eq!(firings.len(), 3);
        for firing in &firings {
            assert_relative_eq!(firing.delta, 0.25);
        }
        assert_eq!(t.info().times_executed, 3);
        assert!(firings[2].more, "A remainder is left over for a later tick");
    }

    #[test]
    fn exact_multiple_stops_when_nothing_remains() {
        let mut t = timer(TimerSettings::every(0.5));
        tick(&mut t, 0.0);
        let firings = tick(&mut t, 1.0);
        assert_eq!(firings.len(), 2);
        assert!(!firings[1].more);
    }

    #[test]
    fn zero_interval_fires_once_per_tick_with_accumulated_time() {
        let mut t = timer(TimerSettings::every_tick());
        tick(&mut t, 0.0);

        let firings = tick(&mut t, 0.016);
        assert_eq!(firings.len(), 1);
        assert_relative_eq!(firings[0].delta, 0.016);

        let firings = tick(&mut t, 0.033);
        assert_eq!(firings.len(), 1);
        assert_relative_eq!(firings[0].delta, 0.033);
    }

    #[test]
    fn delay_fires_first_with_the_delay_as_delta() {
        let mut t = timer(TimerSettings::every(1.0).delay(0.5));
        tick(&mut t, 0.0);
        assert!(tick(&mut t, 0.25).is_empty());

        let firings = tick(&mut t, 0.5);
        assert_eq!(firings.len(), 1);
        assert_relative_eq!(firings[0].delta, 0.5);
        assert!(!t.info().delay_pending);

        let firings = tick(&mut t, 1.0);
        assert_eq!(firings.len(), 1);
        assert_relative_eq!(firings[0].delta, 1.0);
    }

    #[test]
    fn delay_then_interval_in_the_same_tick() {
        let mut t = timer(TimerSettings::every(0.5).delay(1.0));
        tick(&mut t, 0.0);
        let deltas: Vec<f32> = tick(&mut t, 2.0).iter().map(|f| f.delta).collect();
        assert_eq!(deltas, vec![1.0, 0.5, 0.5]);
    }

    #[test]
    fn finite_repeat_reports_exhaustion_on_the_last_firing() {
        let mut t = timer(TimerSettings::every(0.25).repeat(Repeat::Times(2)));
        tick(&mut t, 0.0);

        let firings = tick(&mut t, 10.0);
        assert_eq!(firings.len(), 3, "Times(2) fires three times in total");
        assert!(firings[2].exhausted);
        assert!(!firings[1].exhausted);
    }

    #[test]
    fn once_fires_a_single_time_after_its_delay() {
        let mut t = timer(TimerSettings::once(0.5));
        tick(&mut t, 0.0);
        let firings = tick(&mut t, 0.75);
        assert_eq!(firings.len(), 1);
        assert!(firings[0].exhausted);
        assert_relative_eq!(firings[0].delta, 0.5);
    }

    #[test]
    fn interval_change_applies_from_the_next_tick() {
        let mut t = timer(TimerSettings::every(1.0));
        tick(&mut t, 0.0);
        assert!(t.advance(2.0));
        assert!(t.next_firing().is_some());
        t.set_interval(0.25);
        let second = t.next_firing().expect("Second interval of the tick is due");
        assert_relative_eq!(second.delta, 1.0);

        let firings = tick(&mut t, 0.5);
        assert_eq!(firings.len(), 2);
        assert_relative_eq!(firings[0].delta, 0.25);
    }

    #[test]
    fn configure_rewinds_the_clock() {
        let mut t = timer(TimerSettings::every(1.0));
        tick(&mut t, 0.0);
        tick(&mut t, 1.0);
        t.configure(2.0, Repeat::Times(0), 0.0);
        assert!(!t.info().started);
        assert_eq!(t.interval(), 2.0);
        assert!(tick(&mut t, 5.0).is_empty());
    }
}
