/********************************************************************************
 * Copyright (c) 2025 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Cooperative scheduler for periodic callbacks.
//!
//! One daemon thread owns a min-heap of `(deadline, period, callback)`
//! entries. Callbacks run on the daemon thread and must be non-blocking;
//! SAMPLE subscriptions use them only to post a tick into the publisher's
//! dispatch queue.

use gnmi_wire::{Code, Status};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const TIMER_THREAD_NAME: &str = "gnmi-timer";

type TimerCallback = Arc<dyn Fn() + Send + Sync>;

struct TimerEntry {
    deadline: Instant,
    period: Duration,
    callback: TimerCallback,
    cancelled: Arc<AtomicBool>,
    seq: u64,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    // Reversed so the BinaryHeap surfaces the earliest deadline first.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct DaemonState {
    queue: BinaryHeap<TimerEntry>,
    shutdown: bool,
    next_seq: u64,
}

struct DaemonShared {
    state: Mutex<DaemonState>,
    wakeup: Condvar,
}

/// Cancellation handle for one periodic timer.
///
/// Cancelling only sets a flag; the entry is dropped when it next reaches the
/// top of the heap.
#[derive(Clone)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// The process-wide periodic scheduler.
pub struct TimerDaemon {
    shared: Arc<DaemonShared>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Default for TimerDaemon {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerDaemon {
    pub fn new() -> Self {
        let shared = Arc::new(DaemonShared {
            state: Mutex::new(DaemonState {
                queue: BinaryHeap::new(),
                shutdown: false,
                next_seq: 0,
            }),
            wakeup: Condvar::new(),
        });

        let loop_shared = shared.clone();
        let worker = thread::Builder::new()
            .name(TIMER_THREAD_NAME.to_string())
            .spawn(move || Self::run(loop_shared))
            .expect("Failed to spawn timer daemon thread");

        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Schedules `callback` to first fire `delay_ms` from now and every
    /// `period_ms` after that.
    pub fn request_periodic_timer(
        &self,
        delay_ms: u64,
        period_ms: u64,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Result<TimerHandle, Status> {
        if period_ms == 0 {
            return Err(Status::fail_with_code(
                Code::InvalidArgument,
                "timer period must be non-zero",
            ));
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let mut state = self.shared.state.lock().expect("timer state lock poisoned");
        if state.shutdown {
            return Err(Status::fail_with_code(
                Code::Internal,
                "timer daemon is stopped",
            ));
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.queue.push(TimerEntry {
            deadline: Instant::now() + Duration::from_millis(delay_ms),
            period: Duration::from_millis(period_ms),
            callback: Arc::new(callback),
            cancelled: cancelled.clone(),
            seq,
        });
        drop(state);
        self.shared.wakeup.notify_one();

        Ok(TimerHandle { cancelled })
    }

    fn run(shared: Arc<DaemonShared>) {
        let mut state = shared.state.lock().expect("timer state lock poisoned");
        loop {
            if state.shutdown {
                break;
            }

            let now = Instant::now();
            let Some((due, cancelled, deadline)) = state.queue.peek().map(|top| {
                (
                    top.deadline <= now,
                    top.cancelled.load(Ordering::Relaxed),
                    top.deadline,
                )
            }) else {
                state = shared.wakeup.wait(state).expect("timer state lock poisoned");
                continue;
            };

            if cancelled {
                state.queue.pop();
                continue;
            }

            if due {
                let entry = state
                    .queue
                    .pop()
                    .expect("peeked entry is still at the top");
                drop(state);

                (entry.callback)();

                // Reschedule off the previous deadline so the cadence does
                // not drift, clamping when behind by more than one period.
                let mut next = entry.deadline + entry.period;
                let after_fire = Instant::now();
                if next + entry.period < after_fire {
                    next = after_fire;
                }

                state = shared.state.lock().expect("timer state lock poisoned");
                state.queue.push(TimerEntry {
                    deadline: next,
                    period: entry.period,
                    callback: entry.callback,
                    cancelled: entry.cancelled,
                    seq: entry.seq,
                });
                continue;
            }

            let (guard, _timed_out) = shared
                .wakeup
                .wait_timeout(state, deadline - now)
                .expect("timer state lock poisoned");
            state = guard;
        }
    }
}

impl Drop for TimerDaemon {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().expect("timer state lock poisoned");
            state.shutdown = true;
        }
        self.shared.wakeup.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TimerDaemon;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn fires_within_one_tick_of_the_expected_count() {
        let daemon = TimerDaemon::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        let _handle = daemon
            .request_periodic_timer(0, 20, move || {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .expect("timer should start");

        std::thread::sleep(Duration::from_millis(210));
        let count = fired.load(Ordering::Relaxed);

        // Run duration 210ms at a 20ms period: expect 210/20 = 10 (+ the
        // immediate first fire), within the +-1 contract.
        assert!((9..=12).contains(&count), "unexpected fire count {count}");
    }

    #[test]
    fn cancel_stops_future_fires() {
        let daemon = TimerDaemon::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        let handle = daemon
            .request_periodic_timer(0, 10, move || {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .expect("timer should start");

        std::thread::sleep(Duration::from_millis(35));
        handle.cancel();
        let at_cancel = fired.load(Ordering::Relaxed);
        std::thread::sleep(Duration::from_millis(50));

        assert!(handle.is_cancelled());
        assert!(fired.load(Ordering::Relaxed) <= at_cancel + 1);
    }

    #[test]
    fn zero_period_is_rejected() {
        let daemon = TimerDaemon::new();

        let result = daemon.request_periodic_timer(0, 0, || {});

        assert!(result.is_err());
    }

    #[test]
    fn delay_defers_the_first_fire() {
        let daemon = TimerDaemon::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        let _handle = daemon
            .request_periodic_timer(80, 10, move || {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .expect("timer should start");

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(fired.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn drop_joins_the_daemon_thread() {
        let daemon = TimerDaemon::new();
        let _handle = daemon.request_periodic_timer(1000, 1000, || {});

        drop(daemon);
    }
}
