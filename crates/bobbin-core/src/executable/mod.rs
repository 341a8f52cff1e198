//! Executable: one persisted task plus its execution / retry / lifecycle state.
//!
//! The owner drives attempts serially:
//! `execute` -> `handle_err` -> `ack` or `nack`.
//! `abort` / `cancel` may be called from any thread at any time; they do not
//! interrupt an in-flight attempt but turn every later call into a no-op.

mod backoff;
pub mod classify;
mod factory;
mod latency;


pub use backoff::ReschedulePolicy;
pub use classify::RetryablePredicate;
pub use factory::{BuildError, ExecutableFactory, ExecutableFactoryBuilder};
pub use latency::AttemptLatency;

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::config::ExecutableConfig;
use crate::domain::{
    CallerInfo, CallerType, ErrorClass, ExecutableMetrics, ExecutableState, ExecutionContext,
    MetricTag, NamespaceName, Priority, ReaderId, TaskEnvelope, TaskError,
};
use crate::ports::clock::{after, elapsed, millis};
use crate::ports::{Clock, Executor, Rescheduler, Scheduler};

/// Mutable part of an executable, guarded by a single lock.
///
/// The lock is held only for field reads/updates, never across the executor call.
#[derive(Debug)]
struct ExecutableInner {
    state: ExecutableState,
    attempt: u32,
    scheduled_time: DateTime<Utc>,
    acked_at: Option<DateTime<Utc>>,
    tags: Vec<MetricTag>,
    latency: AttemptLatency,
    last_attempt_user_latency: Duration,
    in_memory_no_user_latency: Duration,
}

pub struct Executable {
    reader_id: ReaderId,
    task: TaskEnvelope,
    namespace_name: NamespaceName,
    priority: Priority,
    load_time: DateTime<Utc>,

    executor: Arc<dyn Executor>,
    scheduler: Arc<dyn Scheduler>,
    rescheduler: Arc<dyn Rescheduler>,
    clock: Arc<dyn Clock>,
    config: Arc<ExecutableConfig>,
    is_retryable: RetryablePredicate,

    inner: Mutex<ExecutableInner>,
}

impl Executable {
    pub fn reader_id(&self) -> ReaderId {
        self.reader_id
    }

    pub fn task(&self) -> &TaskEnvelope {
        &self.task
    }

    pub fn namespace_name(&self) -> &NamespaceName {
        &self.namespace_name
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// When this executable was created from its persisted task.
    pub fn load_time(&self) -> DateTime<Utc> {
        self.load_time
    }

    pub fn state(&self) -> ExecutableState {
        self.lock().state
    }

    /// Attempts made so far, starting at 1.
    pub fn attempt(&self) -> u32 {
        self.lock().attempt
    }

    pub fn scheduled_time(&self) -> DateTime<Utc> {
        self.lock().scheduled_time
    }

    /// Mark when the next attempt became eligible to run.
    pub fn set_scheduled_time(&self, scheduled_time: DateTime<Utc>) {
        self.lock().scheduled_time = scheduled_time;
    }

    /// Tags reported by the executor on the last attempt.
    pub fn tags(&self) -> Vec<MetricTag> {
        self.lock().tags.clone()
    }

    pub fn last_attempt_user_latency(&self) -> Duration {
        self.lock().last_attempt_user_latency
    }

    /// Queue-internal latency of the last attempt (schedule + attempt - user).
    pub fn in_memory_no_user_latency(&self) -> Duration {
        self.lock().in_memory_no_user_latency
    }

    /// Ack time minus the task's visibility time, once acked.
    pub fn queue_latency(&self) -> Option<Duration> {
        self.lock()
            .acked_at
            .map(|acked_at| elapsed(self.task.visibility_time(), acked_at))
    }

    pub fn metrics(&self) -> ExecutableMetrics {
        let inner = self.lock();
        ExecutableMetrics {
            tags: inner.tags.clone(),
            attempt: inner.attempt,
            schedule_latency: inner.latency.schedule,
            attempt_latency: inner.latency.attempt,
            user_latency: inner.latency.user,
            in_memory_no_user_latency: inner.in_memory_no_user_latency,
        }
    }

    /// Run one attempt.
    ///
    /// No-op once the executable is terminal. Panics raised by the executor
    /// are contained and returned as errors.
    pub async fn execute(&self) -> Result<(), TaskError> {
        let (ctx, start) = {
            let mut inner = self.lock();
            if inner.state != ExecutableState::Pending {
                return Ok(());
            }

            let ctx = ExecutionContext::new(
                CallerInfo {
                    caller_name: self.namespace_name.clone(),
                    caller_type: CallerType::from_priority(self.priority),
                },
                inner.attempt,
            );
            inner.attempt += 1;

            let start = self.clock.now();
            inner.latency.schedule = elapsed(inner.scheduled_time, start);
            (ctx, start)
        };

        // The call itself may panic before a future exists, so it runs inside the guard.
        let response = AssertUnwindSafe(async { self.executor.execute(&ctx, &self.task).await })
            .catch_unwind()
            .await;
        let end = self.clock.now();

        let (tags, namespace_active, result) = match response {
            Ok(response) => (response.tags, response.namespace_active, response.result),
            Err(payload) => {
                let err = classify::from_panic(payload);
                error!(
                    task_id = %self.task.task_id(),
                    namespace = %self.namespace_name,
                    category = %self.task.category(),
                    error = %err,
                    "panic during task execution"
                );
                (Vec::new(), true, Err(err))
            }
        };

        let mut inner = self.lock();
        inner.latency.attempt = elapsed(start, end);
        inner.latency.user = ctx.user_latency();
        inner.last_attempt_user_latency = inner.latency.user;
        inner.in_memory_no_user_latency = inner.latency.in_memory_no_user();
        inner.tags = tags;
        if !namespace_active {
            inner.attempt = 1;
        }
        result
    }

    /// Classify an attempt error.
    ///
    /// `Ok(())` means nothing is left to do and the caller should ack.
    /// Otherwise the same error is returned and the caller should nack.
    pub fn handle_err(&self, err: TaskError) -> Result<(), TaskError> {
        let attempt = self.attempt();
        let task_id = self.task.task_id();
        let namespace = &self.namespace_name;

        match err.class() {
            ErrorClass::Resolved => {
                if matches!(err, TaskError::CorruptedData(_)) {
                    info!(%task_id, %namespace, attempt, error = %err, "dropping corrupted task");
                } else {
                    debug!(%task_id, %namespace, attempt, error = %err, "task resolved without further attempts");
                }
            }
            ErrorClass::WaitForCondition => {
                debug!(%task_id, %namespace, attempt, error = %err, "task waiting on external condition");
            }
            ErrorClass::Transient => {
                if attempt > self.config.critical_retry_attempts {
                    error!(%task_id, %namespace, attempt, error = %err, kind = err.kind(), "critical error processing task, retrying");
                } else {
                    warn!(%task_id, %namespace, attempt, error = %err, kind = err.kind(), "fail to process task");
                }
            }
        }

        classify::resolve(err)
    }

    /// Whether an enclosing retry loop should try again.
    /// Always false once aborted or cancelled.
    pub fn is_retryable_error(&self, err: &TaskError) -> bool {
        if self.state().is_force_terminated() {
            return false;
        }
        (self.is_retryable)(err)
    }

    pub fn ack(&self) {
        let mut inner = self.lock();
        if inner.state != ExecutableState::Pending {
            return;
        }
        let now = self.clock.now();
        inner.state = ExecutableState::Acked;
        inner.acked_at = Some(now);

        debug!(
            task_id = %self.task.task_id(),
            namespace = %self.namespace_name,
            category = %self.task.category(),
            attempt = inner.attempt,
            in_memory_no_user_latency_ms = millis(inner.in_memory_no_user_latency),
            queue_latency_ms = millis(elapsed(self.task.visibility_time(), now)),
            "task acked"
        );
    }

    /// Pick where the next attempt comes from.
    ///
    /// Wait-for-condition errors always go to the rescheduler. Anything else is
    /// offered to the scheduler first and falls back to the rescheduler when
    /// the scheduler declines. State stays `Pending`.
    pub fn nack(self: &Arc<Self>, err: &TaskError) {
        if self.state() != ExecutableState::Pending {
            return;
        }

        if !classify::skips_resubmit(err) {
            self.set_scheduled_time(self.clock.now());
            if self.scheduler.try_submit(Arc::clone(self)) {
                debug!(task_id = %self.task.task_id(), error = %err, "task resubmitted");
                return;
            }
        }

        self.reschedule_with(self.config.policy_for(err));
    }

    /// Hand the executable to the rescheduler with a backoff delay.
    pub fn reschedule(self: &Arc<Self>) {
        if self.state() != ExecutableState::Pending {
            return;
        }
        self.reschedule_with(&self.config.reschedule_policy);
    }

    pub fn abort(&self) {
        self.force_terminate(ExecutableState::Aborted);
    }

    pub fn cancel(&self) {
        self.force_terminate(ExecutableState::Cancelled);
    }

    fn force_terminate(&self, target: ExecutableState) {
        let mut inner = self.lock();
        if inner.state != ExecutableState::Pending {
            return;
        }
        inner.state = target;
        debug!(task_id = %self.task.task_id(), state = ?target, "task force terminated");
    }

    fn reschedule_with(self: &Arc<Self>, policy: &ReschedulePolicy) {
        let delay = policy.next_delay(self.attempt());
        let fire_at = after(self.clock.now(), delay);
        debug!(
            task_id = %self.task.task_id(),
            delay_ms = millis(delay),
            "task rescheduled"
        );
        self.rescheduler.add(Arc::clone(self), fire_at);
    }

    fn lock(&self) -> MutexGuard<'_, ExecutableInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executable")
            .field("reader_id", &self.reader_id)
            .field("task_id", &self.task.task_id())
            .field("category", &self.task.category())
            .field("namespace", &self.namespace_name)
            .field("priority", &self.priority)
            .field("inner", &*self.lock())
            .finish_non_exhaustive()
    }
}
