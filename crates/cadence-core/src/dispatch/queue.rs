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

/// A zero-argument closure queued for execution on the main thread.
pub type MainThreadFn = Box<dyn FnOnce() + Send + 'static>;

/// A cloneable, thread-safe submission point into a [`MainThreadQueue`].
///
/// Handles are `Send + Sync`; give one to every worker that needs to hand
/// results back to the main thread.
#[derive(Debug, Clone)]
pub struct MainThreadHandle {
    sender: flume::Sender<MainThreadFn>,
}

impl MainThreadHandle {
    /// Queues `function` to run during a later drain on the main thread.
    ///
    /// Returns `false` (and logs) if the queue has been dropped, in which case
    /// the closure is discarded without running.
    pub fn perform<F>(&self, function: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        log::trace!("Queueing a function for the main thread.");

        if let Err(e) = self.sender.send(Box::new(function)) {
            log::warn!("Failed to queue main-thread function: {e}. Queue likely dropped.");
            return false;
        }
        true
    }

    /// Returns the number of closures currently waiting.
    pub fn pending(&self) -> usize {
        self.sender.len()
    }
}

/// FIFO queue of closures submitted from any thread and run on the main thread.
///
/// Backed by an unbounded channel. [`drain`](MainThreadQueue::drain) takes the
/// whole backlog in one step, so closures that queue more work while the
/// drained batch is running land in the next batch instead of extending the
/// current one.
#[derive(Debug)]
pub struct MainThreadQueue {
    sender: flume::Sender<MainThreadFn>,
    receiver: flume::Receiver<MainThreadFn>,
}

impl MainThreadQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("Main-thread queue initialized.");
        Self { sender, receiver }
    }

    /// Returns a new submission handle for this queue.
    pub fn handle(&self) -> MainThreadHandle {
        MainThreadHandle {
            sender: self.sender.clone(),
        }
    }

    /// Queues `function` from the owning thread.
    pub fn submit<F>(&self, function: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // The queue holds its own receiver, so the send cannot fail here.
        let _ = self.sender.send(Box::new(function));
    }

    /// Removes and returns every closure queued so far, in submission order.
    ///
    /// Run the returned closures after this call returns; nothing here holds
    /// a lock while they execute.
    pub fn drain(&self) -> Vec<MainThreadFn> {
        self.receiver.drain().collect()
    }

    /// Drops every queued closure without running it. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        self.receiver.drain().count()
    }

    /// Returns the number of closures currently waiting.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for MainThreadQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> MainThreadFn) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |value: u32| -> MainThreadFn {
            let sink = Arc::clone(&sink);
            Box::new(move || sink.lock().unwrap().push(value))
        };
        (log, make)
    }

    #[test]
    fn queue_starts_empty() {
        let queue = MainThreadQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.pending(), 0);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn drain_preserves_submission_order() {
        let queue = MainThreadQueue::new();
        let (log, make) = recorder();
        let handle = queue.handle();

        handle.perform(make(1));
        queue.submit(make(2));
        handle.perform(make(3));
        assert_eq!(handle.pending(), 3);

        for function in queue.drain() {
            function();
        }
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
        assert!(queue.is_empty(), "Drain should leave nothing behind");
    }

    #[test]
    fn work_queued_while_running_a_batch_waits_for_the_next_drain() {
        let queue = MainThreadQueue::new();
        let (log, make) = recorder();
        let handle = queue.handle();
        let late = make(2);
        let early_sink = Arc::clone(&log);
        let inner_handle = handle.clone();

        handle.perform(move || {
            early_sink.lock().unwrap().push(1);
            inner_handle.perform(late);
        });

        for function in queue.drain() {
            function();
        }
        assert_eq!(*log.lock().unwrap(), vec![1]);
        assert_eq!(queue.pending(), 1, "Nested submission belongs to the next batch");

        for function in queue.drain() {
            function();
        }
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn clear_discards_without_running() {
        let queue = MainThreadQueue::new();
        let (log, make) = recorder();
        queue.submit(make(1));
        queue.submit(make(2));

        assert_eq!(queue.clear(), 2);
        assert!(queue.drain().is_empty());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn submit_from_threads() {
        let queue = MainThreadQueue::new();
        let (log, make) = recorder();

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let handle = queue.handle();
                let function = make(i);
                thread::spawn(move || {
                    assert!(handle.perform(function), "Queue is alive");
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("Worker thread panicked");
        }

        let drained = queue.drain();
        assert_eq!(drained.len(), 4);
        for function in drained {
            function();
        }
        let mut seen = log.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn perform_after_queue_drop_reports_failure() {
        let queue = MainThreadQueue::new();
        let handle = queue.handle();
        drop(queue);
        assert!(!handle.perform(|| {}));
    }
}
