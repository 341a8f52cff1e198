//! TimerRescheduler - 時刻順に Executable を再投入する
//!
//! # 実装詳細
//! - BinaryHeap を min-heap として使い、fire_at が早いものから取り出す
//! - `add()` は push して Notify で待機中の `run()` を起こすだけ（ブロックしない）
//! - 期限が来たら scheduled_time を更新して Scheduler に投入
//! - Scheduler が満杯なら `retry_delay` 後にもう一度試す

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, watch};
use tracing::debug;

use crate::executable::Executable;
use crate::ports::clock::{after, elapsed};
use crate::ports::{Clock, Rescheduler, Scheduler};

/// Heap entry. `seq` keeps insertion order among equal fire times.
struct ScheduledExecutable {
    fire_at: DateTime<Utc>,
    seq: u64,
    executable: Arc<Executable>,
}

impl PartialEq for ScheduledExecutable {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl Eq for ScheduledExecutable {}

impl PartialOrd for ScheduledExecutable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledExecutable {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering: earlier times have higher priority
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct TimerState {
    heap: BinaryHeap<ScheduledExecutable>,
    next_seq: u64,
}

impl TimerState {
    fn push(&mut self, executable: Arc<Executable>, fire_at: DateTime<Utc>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(ScheduledExecutable {
            fire_at,
            seq,
            executable,
        });
    }
}

pub struct TimerRescheduler {
    state: Mutex<TimerState>,
    notify: Notify,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    retry_delay: Duration,
}

impl TimerRescheduler {
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

    pub fn new(scheduler: Arc<dyn Scheduler>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(TimerState::default()),
            notify: Notify::new(),
            scheduler,
            clock,
            retry_delay: Self::DEFAULT_RETRY_DELAY,
        }
    }

    /// Delay before retrying an entry the scheduler declined.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn len(&self) -> usize {
        self.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().heap.is_empty()
    }

    pub fn next_fire_time(&self) -> Option<DateTime<Utc>> {
        self.lock().heap.peek().map(|entry| entry.fire_at)
    }

    /// Resubmit every entry whose time has come. Returns how many were accepted.
    ///
    /// Terminal executables are dropped; declined ones are pushed back.
    pub fn promote_due(&self) -> usize {
        let now = self.clock.now();
        let due = {
            let mut state = self.lock();
            let mut due = Vec::new();
            while state.heap.peek().is_some_and(|entry| entry.fire_at <= now) {
                if let Some(entry) = state.heap.pop() {
                    due.push(entry.executable);
                }
            }
            due
        };

        let mut submitted = 0;
        for executable in due {
            if executable.state().is_terminal() {
                continue;
            }
            executable.set_scheduled_time(now);
            if self.scheduler.try_submit(Arc::clone(&executable)) {
                submitted += 1;
            } else {
                debug!(task_id = %executable.task().task_id(), "scheduler full, deferring resubmission");
                self.lock().push(executable, after(now, self.retry_delay));
            }
        }
        submitted
    }

    /// Pump loop. Returns once `shutdown` turns true or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            self.promote_due();

            let wait = self
                .next_fire_time()
                .map(|fire_at| elapsed(self.clock.now(), fire_at));
            let sleep = async {
                match wait {
                    Some(d) => tokio::time::sleep(d).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = self.notify.notified() => {}
                _ = sleep => {}
            }
        }

        // Queued executables hold this rescheduler; drop them so neither side leaks.
        let dropped = std::mem::take(&mut self.lock().heap);
        if !dropped.is_empty() {
            debug!(pending = dropped.len(), "timer stopped, dropping pending entries");
        }
    }

    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Rescheduler for TimerRescheduler {
    fn add(&self, executable: Arc<Executable>, fire_at: DateTime<Utc>) {
        self.lock().push(executable, fire_at);
        // Notify outside the lock
        self.notify.notify_one();
    }
}
