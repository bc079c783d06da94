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

//! Per-target timer bookkeeping.

use crate::timer::Timer;
use cadence_core::TargetId;

/// Whether an entry may still be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryState {
    Live,
    /// Emptied while `update` was visiting it; erased once the visit ends.
    PendingRemoval,
}

/// The timer the current visit is firing.
#[derive(Debug)]
pub(crate) enum CurrentTimer {
    Idle,
    /// Still in the live list, at `next_index - 1`.
    Live,
    /// Unscheduled from inside its own firing. Kept alive until the firing
    /// returns, then dropped.
    PendingRemoval(Timer),
}

/// The timers of one target, in registration order, plus the cursor state
/// that lets the list change while `update` walks it.
#[derive(Debug)]
pub(crate) struct TargetEntry {
    pub(crate) target: TargetId,
    pub(crate) timers: Vec<Timer>,
    pub(crate) paused: bool,
    pub(crate) state: EntryState,
    /// Index of the next timer to visit. Removals before it shift it back.
    next_index: usize,
    current: CurrentTimer,
}

impl TargetEntry {
    pub(crate) fn new(target: TargetId, paused: bool) -> Self {
        Self {
            target,
            timers: Vec::new(),
            paused,
            state: EntryState::Live,
            next_index: 0,
            current: CurrentTimer::Idle,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub(crate) fn find(&self, key: &str) -> Option<&Timer> {
        self.timers.iter().find(|timer| timer.key() == key)
    }

    pub(crate) fn find_mut(&mut self, key: &str) -> Option<&mut Timer> {
        self.timers.iter_mut().find(|timer| timer.key() == key)
    }

    pub(crate) fn push(&mut self, timer: Timer) {
        self.timers.push(timer);
    }

    /// Removes the timer registered under `key`. Returns `false` if there is none.
    ///
    /// If that timer is the one currently firing, it is moved aside instead of
    /// dropped so the firing can finish.
    pub(crate) fn remove(&mut self, key: &str) -> bool {
        let Some(index) = self.timers.iter().position(|timer| timer.key() == key) else {
            return false;
        };

        let timer = self.timers.remove(index);
        if self.current_index() == Some(index) {
            self.current = CurrentTimer::PendingRemoval(timer);
        }
        if index < self.next_index {
            self.next_index -= 1;
        }
        true
    }

    /// Removes every timer. Returns how many were removed.
    pub(crate) fn remove_all(&mut self) -> usize {
        let removed = self.timers.len();
        if let Some(index) = self.current_index() {
            let timer = self.timers.remove(index);
            self.current = CurrentTimer::PendingRemoval(timer);
        }
        self.timers.clear();
        self.next_index = 0;
        removed
    }

    /// Rewinds the cursor to the first timer.
    pub(crate) fn start_visit(&mut self) {
        self.next_index = 0;
        self.current = CurrentTimer::Idle;
    }

    /// Moves the cursor to the next timer and marks it as firing.
    pub(crate) fn begin_timer(&mut self) -> Option<usize> {
        if self.next_index >= self.timers.len() {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;
        self.current = CurrentTimer::Live;
        Some(index)
    }

    /// Ends the current timer's turn, handing back the timer if it was
    /// unscheduled while firing.
    pub(crate) fn finish_timer(&mut self) -> Option<Timer> {
        match std::mem::replace(&mut self.current, CurrentTimer::Idle) {
            CurrentTimer::PendingRemoval(timer) => Some(timer),
            CurrentTimer::Idle | CurrentTimer::Live => None,
        }
    }

    /// Index of the timer currently firing, if it is still live.
    pub(crate) fn current_index(&self) -> Option<usize> {
        match self.current {
            CurrentTimer::Live => Some(self.next_index - 1),
            CurrentTimer::Idle | CurrentTimer::PendingRemoval(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::TimerSettings;

    fn entry_with(keys: &[&str]) -> TargetEntry {
        let mut entry = TargetEntry::new(TargetId::new(0, 0), false);
        for key in keys {
            entry.push(Timer::new(
                key.to_string(),
                &TimerSettings::every(1.0),
                Box::new(|_, _| {}),
            ));
        }
        entry
    }

    fn keys(entry: &TargetEntry) -> Vec<&str> {
        entry.timers.iter().map(|timer| timer.key()).collect()
    }

    #[test]
    fn removing_the_firing_timer_salvages_it() {
        let mut entry = entry_with(&["a", "b", "c"]);
        entry.start_visit();
        assert_eq!(entry.begin_timer(), Some(0));
        assert_eq!(entry.begin_timer(), Some(1));

        assert!(entry.remove("b"));
        assert_eq!(entry.current_index(), None, "Salvaged timer is no longer live");
        assert_eq!(keys(&entry), vec!["a", "c"]);

        let salvaged = entry.finish_timer().expect("Removed timer is handed back");
        assert_eq!(salvaged.key(), "b");
        assert_eq!(entry.begin_timer(), Some(1), "Iteration continues with 'c'");
        assert_eq!(entry.timers[1].key(), "c");
    }

    #[test]
    fn removing_an_earlier_timer_keeps_the_cursor_on_the_same_timer() {
        let mut entry = entry_with(&["a", "b", "c"]);
        entry.start_visit();
        entry.begin_timer();
        entry.begin_timer();

        assert!(entry.remove("a"));
        assert_eq!(entry.current_index(), Some(0));
        assert_eq!(entry.timers[0].key(), "b");
        assert!(entry.finish_timer().is_none());
        assert_eq!(entry.begin_timer(), Some(1));
        assert_eq!(entry.timers[1].key(), "c");
        assert_eq!(entry.begin_timer(), None);
    }

    #[test]
    fn removing_a_later_timer_skips_it() {
        let mut entry = entry_with(&["a", "b", "c"]);
        entry.start_visit();
        entry.begin_timer();
        assert!(entry.remove("c"));
        entry.finish_timer();
        assert_eq!(entry.begin_timer(), Some(1));
        assert_eq!(entry.begin_timer(), None);
    }

    #[test]
    fn remove_all_while_firing_salvages_the_current_timer() {
        let mut entry = entry_with(&["a", "b"]);
        entry.start_visit();
        entry.begin_timer();

        assert_eq!(entry.remove_all(), 2);
        assert!(entry.is_empty());
        assert!(entry.finish_timer().is_some());
        assert_eq!(entry.begin_timer(), None);
    }

    #[test]
    fn unknown_key_is_not_removed() {
        let mut entry = entry_with(&["a"]);
        assert!(!entry.remove("missing"));
        assert!(entry.find("a").is_some());
        assert!(entry.find_mut("missing").is_none());
    }
}
