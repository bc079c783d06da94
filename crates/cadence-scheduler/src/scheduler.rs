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

//! The per-frame timer scheduler.
//!
//! The [`Scheduler`] owns every timer, grouped by [`TargetId`], and fires them
//! from [`Scheduler::update`], which the host calls once per frame from a
//! single thread. Callbacks get `&mut Scheduler` back, so they may schedule,
//! unschedule or pause anything, themselves included, while the tick is
//! walking the very lists they change.
//!
//! # Mutation during a tick
//!
//! The walk keeps a cursor into the target map and one into the current
//! target's timer list. Removing anything before a cursor shifts it back.
//! The timer that is firing is never dropped from under its callback: if it is
//! unscheduled it moves aside and is freed once the callback returns. Likewise
//! the target being visited is only erased after its visit ends.

use crate::entry::{EntryState, TargetEntry};
use crate::report::TickReport;
use crate::timer::{Timer, TimerCallback, TimerInfo};
use cadence_core::{
    MainThreadHandle, MainThreadQueue, PausedMismatchPolicy, SchedulerConfig, SchedulerError,
    SchedulerResult, Stopwatch, TargetId, TimerSettings,
};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

type TargetMap = IndexMap<TargetId, TargetEntry, ahash::RandomState>;

/// Where `update` is in the target map.
#[derive(Debug, Clone, Copy)]
struct Walk {
    /// Position of the target being visited, or of the next one between visits.
    position: usize,
    target: Option<TargetId>,
}

/// Single-threaded, cooperative dispatcher of delayed and repeating timers.
///
/// Everything except [`perform_function_in_main_thread`](Self::perform_function_in_main_thread)
/// and the [`MainThreadHandle`] must be used from the thread that calls
/// [`update`](Self::update); the type is not `Sync`.
///
/// # Example
///
/// ```rust
/// use cadence_scheduler::{Scheduler, TargetAllocator, TimerSettings};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let mut targets = TargetAllocator::new();
/// let player = targets.allocate();
/// let mut scheduler = Scheduler::new();
///
/// let regenerated = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&regenerated);
/// scheduler.schedule(player, "hp-regen", TimerSettings::every(1.0), move |_, _| {
///     counter.set(counter.get() + 1);
/// });
///
/// scheduler.update(0.016); // starts the clock
/// scheduler.update(1.0);
/// assert_eq!(regenerated.get(), 1);
/// ```
pub struct Scheduler {
    config: SchedulerConfig,
    entries: TargetMap,
    walk: Option<Walk>,
    main_thread: MainThreadQueue,
    last_tick: TickReport,
    tick_count: u64,
}

impl Scheduler {
    /// Creates a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Creates a scheduler with the given configuration.
    pub fn with_config(config: SchedulerConfig) -> Self {
        log::info!(
            "Scheduler created (strict_contracts={}, paused_mismatch={:?}).",
            config.strict_contracts,
            config.paused_mismatch
        );
        Self {
            config,
            entries: TargetMap::default(),
            walk: None,
            main_thread: MainThreadQueue::new(),
            last_tick: TickReport::default(),
            tick_count: 0,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    // --- Scheduling ---

    /// Schedules `callback` under `key` for `target`.
    ///
    /// The first timer of a target creates its entry with `settings.paused`.
    /// Scheduling a key that already exists for the target does not add a
    /// second timer: the existing one keeps its callback, clock and repeat
    /// budget and only takes the new interval.
    ///
    /// An invalid target or an empty key is a contract violation and the call
    /// is ignored. A `settings.paused` that differs from the entry's state is
    /// a contract violation too; in lenient mode the timer is still scheduled
    /// and [`PausedMismatchPolicy`] decides the entry's state.
    pub fn schedule<F>(
        &mut self,
        target: TargetId,
        key: impl Into<String>,
        settings: TimerSettings,
        callback: F,
    ) where
        F: FnMut(&mut Scheduler, f32) + 'static,
    {
        let key = key.into();
        if let Err(err) = validate(target, &key) {
            self.report_violation(&err);
            return;
        }

        let existing = self.entries.get(&target).map(|entry| entry.paused);
        if let Some(existing) = existing.filter(|&paused| paused != settings.paused) {
            self.report_violation(&SchedulerError::PausedStateMismatch {
                target,
                existing,
                requested: settings.paused,
            });
            if self.config.paused_mismatch == PausedMismatchPolicy::AdoptRequested {
                self.set_paused(target, settings.paused);
            }
        }

        self.insert_timer(target, key, &settings, Box::new(callback));
    }

    /// Like [`schedule`](Self::schedule), but returns contract violations
    /// instead of asserting or logging them. Nothing is scheduled on error.
    pub fn try_schedule<F>(
        &mut self,
        target: TargetId,
        key: impl Into<String>,
        settings: TimerSettings,
        callback: F,
    ) -> SchedulerResult<()>
    where
        F: FnMut(&mut Scheduler, f32) + 'static,
    {
        let key = key.into();
        validate(target, &key)?;
        if let Some(entry) = self.entries.get(&target) {
            if entry.paused != settings.paused {
                return Err(SchedulerError::PausedStateMismatch {
                    target,
                    existing: entry.paused,
                    requested: settings.paused,
                });
            }
        }
        self.insert_timer(target, key, &settings, Box::new(callback));
        Ok(())
    }

    /// Schedules a timer that fires every `interval` seconds until unscheduled.
    pub fn schedule_every<F>(
        &mut self,
        target: TargetId,
        key: impl Into<String>,
        interval: f32,
        paused: bool,
        callback: F,
    ) where
        F: FnMut(&mut Scheduler, f32) + 'static,
    {
        self.schedule(
            target,
            key,
            TimerSettings::every(interval).paused(paused),
            callback,
        );
    }

    fn insert_timer(
        &mut self,
        target: TargetId,
        key: String,
        settings: &TimerSettings,
        callback: TimerCallback,
    ) {
        let log_reschedule = self.config.log_reschedule;
        let entry = self.entries.entry(target).or_insert_with(|| {
            log::debug!("Scheduler: registered {target}.");
            TargetEntry::new(target, settings.paused)
        });

        if let Some(timer) = entry.find_mut(&key) {
            if log_reschedule {
                log::debug!(
                    "Scheduler: '{key}' already scheduled on {target}. Updating interval from {:.4} to {:.4}.",
                    timer.interval(),
                    settings.interval
                );
            }
            timer.set_interval(settings.interval);
            return;
        }

        // An entry emptied during its own visit is revived by a new timer.
        entry.state = EntryState::Live;
        entry.push(Timer::new(key, settings, callback));
    }

    /// Cancels the timer registered under `key` for `target`.
    ///
    /// Unknown targets and keys are ignored. A timer cancelled from inside its
    /// own callback never fires again and is freed when the callback returns.
    pub fn unschedule(&mut self, key: &str, target: TargetId) {
        if !target.is_valid() || key.is_empty() {
            return;
        }
        let Some(entry) = self.entries.get_mut(&target) else {
            return;
        };
        if entry.remove(key) && entry.is_empty() {
            self.release_entry(target);
        }
    }

    /// Cancels every timer of `target` without firing them.
    pub fn unschedule_all_for_target(&mut self, target: TargetId) {
        if !target.is_valid() {
            return;
        }
        let Some(entry) = self.entries.get_mut(&target) else {
            return;
        };
        let cancelled = entry.remove_all();
        log::debug!("Scheduler: cancelled {cancelled} timer(s) of {target}.");
        self.release_entry(target);
    }

    /// Cancels every timer of every target without firing them.
    pub fn unschedule_all(&mut self) {
        let targets: Vec<TargetId> = self.entries.keys().copied().collect();
        for target in targets {
            self.unschedule_all_for_target(target);
        }
    }

    /// Erases an entry that has no timers left, or marks it for erasure if
    /// `update` is visiting it.
    fn release_entry(&mut self, target: TargetId) {
        if self.is_current_target(target) {
            if let Some(entry) = self.entries.get_mut(&target) {
                entry.state = EntryState::PendingRemoval;
            }
            return;
        }

        if let Some((position, _, entry)) = self.entries.shift_remove_full(&target) {
            log::debug!("Scheduler: removed {}.", entry.target);
            if let Some(walk) = self.walk.as_mut() {
                if position < walk.position {
                    walk.position -= 1;
                }
            }
        }
    }

    // --- Queries ---

    /// Returns `true` if a live timer is registered under `key` for `target`.
    ///
    /// A timer cancelled during its own firing is already reported as unscheduled.
    pub fn is_scheduled(&self, key: &str, target: TargetId) -> bool {
        self.entries
            .get(&target)
            .is_some_and(|entry| entry.find(key).is_some())
    }

    /// Returns a snapshot of the timer registered under `key` for `target`.
    pub fn timer_info(&self, key: &str, target: TargetId) -> Option<TimerInfo> {
        self.entries
            .get(&target)
            .and_then(|entry| entry.find(key))
            .map(Timer::info)
    }

    /// Returns the number of timers registered for `target`.
    pub fn timer_count(&self, target: TargetId) -> usize {
        self.entries
            .get(&target)
            .map_or(0, |entry| entry.timers.len())
    }

    /// Returns the number of targets with an entry.
    pub fn target_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the registered targets in the order `update` visits them.
    pub fn targets(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.entries.keys().copied()
    }

    /// Returns `true` while `update` is walking the timers.
    pub fn is_updating(&self) -> bool {
        self.walk.is_some()
    }

    /// Returns what the last `update` did.
    pub fn last_tick(&self) -> &TickReport {
        &self.last_tick
    }

    /// Returns the number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // --- Pausing ---

    /// Pauses `target`. Its timers stay scheduled but neither fire nor
    /// accumulate time until it is resumed.
    pub fn pause_target(&mut self, target: TargetId) {
        self.set_paused(target, true);
    }

    /// Resumes `target`.
    pub fn resume_target(&mut self, target: TargetId) {
        self.set_paused(target, false);
    }

    /// Returns `true` if `target` is registered and paused.
    pub fn is_target_paused(&self, target: TargetId) -> bool {
        self.entries.get(&target).is_some_and(|entry| entry.paused)
    }

    /// Pauses every running target and returns the ones this call paused.
    ///
    /// Targets that were already paused are not included, so passing the
    /// result to [`resume_targets`](Self::resume_targets) restores exactly the
    /// state from before this call.
    pub fn pause_all_targets(&mut self) -> HashSet<TargetId> {
        let mut paused = HashSet::new();
        for (target, entry) in self.entries.iter_mut() {
            if !entry.paused {
                entry.paused = true;
                paused.insert(*target);
            }
        }
        log::debug!("Scheduler: paused {} target(s).", paused.len());
        paused
    }

    /// Resumes each of `targets`. Unknown targets are ignored.
    pub fn resume_targets(&mut self, targets: impl IntoIterator<Item = TargetId>) {
        for target in targets {
            self.resume_target(target);
        }
    }

    fn set_paused(&mut self, target: TargetId, paused: bool) {
        if let Some(entry) = self.entries.get_mut(&target) {
            entry.paused = paused;
        }
    }

    // --- Main-thread functions ---

    /// Queues `function` to run at the end of a later `update`.
    ///
    /// Functions run in submission order, each exactly once. One queued while
    /// the queue is being drained, for instance by another queued function,
    /// runs on the following tick.
    pub fn perform_function_in_main_thread<F>(&self, function: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.main_thread.submit(function);
    }

    /// Returns a handle that other threads can use to queue main-thread functions.
    pub fn main_thread_handle(&self) -> MainThreadHandle {
        self.main_thread.handle()
    }

    /// Drops every queued main-thread function without running it.
    pub fn clear_pending_functions(&self) -> usize {
        let dropped = self.main_thread.clear();
        if dropped > 0 {
            log::debug!("Scheduler: dropped {dropped} pending main-thread function(s).");
        }
        dropped
    }

    /// Returns the number of queued main-thread functions.
    pub fn pending_functions(&self) -> usize {
        self.main_thread.pending()
    }

    fn perform_pending_functions(&mut self) -> usize {
        let batch = self.main_thread.drain();
        let count = batch.len();
        if count > 0 {
            log::trace!("Scheduler: performing {count} main-thread function(s).");
        }
        for function in batch {
            function();
        }
        count
    }

    // --- Tick ---

    /// Advances every running timer by `dt` seconds, firing those that are
    /// due, then runs the queued main-thread functions.
    ///
    /// A panic raised by a callback propagates out of this call. The scheduler
    /// is left consistent, so the host may catch it and keep ticking.
    pub fn update(&mut self, dt: f32) {
        if self.walk.is_some() {
            self.report_violation(&SchedulerError::ReentrantUpdate);
            return;
        }

        let stopwatch = Stopwatch::new();
        let mut report = TickReport::default();
        self.walk = Some(Walk {
            position: 0,
            target: None,
        });

        while let Some(target) = self.visit_next() {
            report.targets_visited += 1;
            report.timers_fired += self.run_target(target, dt);
            self.end_visit(target);
        }
        self.walk = None;

        report.functions_performed = self.perform_pending_functions();
        report.duration = stopwatch.elapsed();
        self.tick_count += 1;
        log::trace!(
            "Scheduler tick {}: {} target(s), {} firing(s), {} function(s) in {:?}.",
            self.tick_count,
            report.targets_visited,
            report.timers_fired,
            report.functions_performed,
            report.duration
        );
        self.last_tick = report;
    }

    /// Makes the entry at the walk position current.
    fn visit_next(&mut self) -> Option<TargetId> {
        let walk = self.walk.as_mut()?;
        let (&target, entry) = self.entries.get_index_mut(walk.position)?;
        walk.target = Some(target);
        entry.state = EntryState::Live;
        entry.start_visit();
        Some(target)
    }

    /// Leaves the current entry, erasing it if it was emptied during the visit.
    fn end_visit(&mut self, target: TargetId) {
        let erase = self
            .entries
            .get(&target)
            .is_some_and(|entry| entry.state == EntryState::PendingRemoval && entry.is_empty());
        let Some(walk) = self.walk.as_mut() else {
            return;
        };
        walk.target = None;
        if erase {
            self.entries.shift_remove_index(walk.position);
            log::debug!("Scheduler: removed {target} after its visit.");
        } else {
            walk.position += 1;
        }
    }

    fn is_current_target(&self, target: TargetId) -> bool {
        self.walk.and_then(|walk| walk.target) == Some(target)
    }

    fn run_target(&mut self, target: TargetId, dt: f32) -> usize {
        if self.entries.get(&target).map_or(true, |entry| entry.paused) {
            return 0;
        }

        let mut fired = 0;
        while let Some(index) = self
            .entries
            .get_mut(&target)
            .and_then(TargetEntry::begin_timer)
        {
            fired += self.run_timer(target, index, dt);
            if let Some(salvaged) = self
                .entries
                .get_mut(&target)
                .and_then(TargetEntry::finish_timer)
            {
                log::trace!(
                    "Scheduler: freed '{}' of {target} after its firing.",
                    salvaged.key()
                );
            }
        }
        fired
    }

    /// Advances one timer and fires it as many times as are due.
    fn run_timer(&mut self, target: TargetId, index: usize, dt: f32) -> usize {
        let started = match self.entries.get_mut(&target) {
            Some(entry) => entry.timers[index].advance(dt),
            None => false,
        };
        if !started {
            return 0;
        }

        let mut fired = 0;
        loop {
            let Some(entry) = self.entries.get_mut(&target) else {
                break;
            };
            // Stop as soon as the target was emptied or this timer was
            // cancelled by an earlier firing in the same tick.
            if entry.state == EntryState::PendingRemoval {
                break;
            }
            let Some(index) = entry.current_index() else {
                break;
            };
            let timer = &mut entry.timers[index];
            let Some(firing) = timer.next_firing() else {
                break;
            };
            let Some(mut callback) = timer.callback.take() else {
                break;
            };
            fired += 1;

            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| callback(&mut *self, firing.delta)));
            let live = self.restore_callback(target, callback);

            if let Err(payload) = outcome {
                log::warn!("Scheduler: a timer of {target} panicked. Unwinding out of update.");
                self.abandon_walk(target);
                panic::resume_unwind(payload);
            }

            if firing.exhausted {
                if live {
                    self.cancel_current(target);
                }
                break;
            }
            if !firing.more {
                break;
            }
        }
        fired
    }

    /// Puts the callback back into its timer. Returns `false` if the timer
    /// was cancelled while firing, in which case the callback is dropped here.
    fn restore_callback(&mut self, target: TargetId, callback: TimerCallback) -> bool {
        let Some(entry) = self.entries.get_mut(&target) else {
            return false;
        };
        match entry.current_index() {
            Some(index) => {
                entry.timers[index].callback = Some(callback);
                true
            }
            None => false,
        }
    }

    /// Cancels the timer that is firing, once its repeat budget is used up.
    fn cancel_current(&mut self, target: TargetId) {
        let key = self.entries.get(&target).and_then(|entry| {
            entry
                .current_index()
                .map(|index| entry.timers[index].key().to_owned())
        });
        if let Some(key) = key {
            self.unschedule(&key, target);
        }
    }

    /// Closes the visit of `target` and the walk itself after a callback panicked.
    fn abandon_walk(&mut self, target: TargetId) {
        if let Some(entry) = self.entries.get_mut(&target) {
            drop(entry.finish_timer());
            entry.start_visit();
        }
        self.end_visit(target);
        self.walk = None;
    }

    // --- Lifecycle ---

    /// Cancels every timer without firing it. Also run when the scheduler is dropped.
    pub fn teardown(&mut self) {
        let cancelled: usize = self.entries.values().map(|entry| entry.timers.len()).sum();
        let targets = self.entries.len();
        self.unschedule_all();
        if cancelled > 0 {
            log::info!(
                "Scheduler torn down: cancelled {cancelled} timer(s) across {targets} target(s)."
            );
        }
    }

    fn report_violation(&self, err: &SchedulerError) {
        if self.config.strict_contracts {
            panic!("Scheduler contract violated: {err}");
        }
        log::error!("Scheduler contract violated: {err}");
    }
}

fn validate(target: TargetId, key: &str) -> SchedulerResult<()> {
    if !target.is_valid() {
        return Err(SchedulerError::InvalidTarget);
    }
    if key.is_empty() {
        return Err(SchedulerError::EmptyKey);
    }
    Ok(())
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .field("targets", &self.entries.len())
            .field("updating", &self.walk.is_some())
            .field("pending_functions", &self.main_thread.pending())
            .field("tick_count", &self.tick_count)
            .finish_non_exhaustive()
    }
}
