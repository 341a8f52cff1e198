//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{
    ExecutionContext, NamespaceId, ReaderId, RunId, TaskCategory, TaskEnvelope, TaskError,
    TaskId, WorkflowId, WorkflowKey,
};
use crate::executable::{Executable, ExecutableFactory, ExecutableFactoryBuilder};
use crate::impls::InMemoryNamespaceRegistry;
use crate::ports::{
    Clock, EventClock, ExecuteResponse, Executor, NamespaceEntry, Rescheduler, Scheduler,
};

type Step = Box<dyn FnOnce(&ExecutionContext) -> ExecuteResponse + Send>;

/// Executor that replays queued steps in order.
#[derive(Default)]
pub struct ScriptedExecutor {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn push<F>(&self, step: F)
    where
        F: FnOnce(&ExecutionContext) -> ExecuteResponse + Send + 'static,
    {
        self.steps.lock().unwrap().push_back(Box::new(step));
    }

    pub fn respond(&self, response: ExecuteResponse) {
        self.push(move |_| response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn execute(&self, ctx: &ExecutionContext, _task: &TaskEnvelope) -> ExecuteResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(step) => step(ctx),
            None => ExecuteResponse::err(TaskError::other("unexpected executor call")),
        }
    }
}

/// Scheduler that records submissions and accepts or declines on demand.
pub struct RecordingScheduler {
    accept: AtomicBool,
    submitted: Mutex<Vec<TaskId>>,
}

impl RecordingScheduler {
    pub fn new(accept: bool) -> Self {
        Self {
            accept: AtomicBool::new(accept),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<TaskId> {
        self.submitted.lock().unwrap().clone()
    }
}

impl Scheduler for RecordingScheduler {
    fn try_submit(&self, executable: Arc<Executable>) -> bool {
        self.submitted.lock().unwrap().push(executable.task().task_id());
        self.accept.load(Ordering::SeqCst)
    }
}

/// Rescheduler that records what it was asked to fire, and when.
#[derive(Default)]
pub struct RecordingRescheduler {
    added: Mutex<Vec<(TaskId, DateTime<Utc>)>>,
}

impl RecordingRescheduler {
    pub fn added(&self) -> Vec<(TaskId, DateTime<Utc>)> {
        self.added.lock().unwrap().clone()
    }
}

impl Rescheduler for RecordingRescheduler {
    fn add(&self, executable: Arc<Executable>, fire_at: DateTime<Utc>) {
        self.added
            .lock()
            .unwrap()
            .push((executable.task().task_id(), fire_at));
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

/// One fully wired set of doubles.
pub struct Harness {
    pub clock: Arc<EventClock>,
    pub executor: Arc<ScriptedExecutor>,
    pub scheduler: Arc<RecordingScheduler>,
    pub rescheduler: Arc<RecordingRescheduler>,
    pub registry: Arc<InMemoryNamespaceRegistry>,
    pub namespace_id: NamespaceId,
    next_task_id: AtomicUsize,
}

impl Harness {
    pub fn new() -> Self {
        let registry = InMemoryNamespaceRegistry::new();
        let namespace_id = NamespaceId::generate();
        registry.insert(NamespaceEntry::local(namespace_id, "test-namespace", "active"));

        Self {
            clock: Arc::new(EventClock::new(start_time())),
            executor: Arc::new(ScriptedExecutor::default()),
            scheduler: Arc::new(RecordingScheduler::new(true)),
            rescheduler: Arc::new(RecordingRescheduler::default()),
            registry: Arc::new(registry),
            namespace_id,
            next_task_id: AtomicUsize::new(1),
        }
    }

    pub fn builder(&self) -> ExecutableFactoryBuilder {
        ExecutableFactory::builder()
            .executor(self.executor.clone())
            .scheduler(self.scheduler.clone())
            .rescheduler(self.rescheduler.clone())
            .clock(self.clock.clone())
            .namespace_registry(self.registry.clone())
    }

    pub fn factory(&self) -> ExecutableFactory {
        self.builder().build().unwrap()
    }

    pub fn task(&self) -> TaskEnvelope {
        let id = self.next_task_id.fetch_add(1, Ordering::SeqCst) as i64;
        TaskEnvelope::new(
            WorkflowKey::new(self.namespace_id, WorkflowId::new("workflow"), RunId::generate()),
            TaskId::new(id),
            TaskCategory::Transfer,
            self.clock.now(),
        )
    }

    pub fn new_executable(&self) -> Arc<Executable> {
        self.factory()
            .new_executable(ReaderId::DEFAULT, self.task())
            .unwrap()
    }
}
