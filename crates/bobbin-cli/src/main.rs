//! bobbin demo
//!
//! Loads a few tasks, runs them through a worker group and lets failed
//! attempts come back through the scheduler or the timer rescheduler.
//!
//! ```text
//! bobbin-cli [config.json]
//! RUST_LOG=bobbin_core=debug bobbin-cli
//! ```

mod worker;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bobbin_core::domain::{
    ExecutionContext, MetricTag, NamespaceId, ReaderId, RunId, TaskCategory, TaskEnvelope,
    TaskError, TaskId, WORKFLOW_CACHE_LATENCY, WorkflowId, WorkflowKey,
};
use bobbin_core::impls::{
    ChannelScheduler, ExecutorRegistry, InMemoryNamespaceRegistry, StandardPriorityAssigner,
    StaticClusterMetadata, TimerRescheduler,
};
use bobbin_core::ports::clock::millis;
use bobbin_core::ports::{Clock, ExecuteResponse, Executor, NamespaceEntry, Scheduler, SystemClock};
use bobbin_core::{ExecutableConfig, ExecutableFactory};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::worker::WorkerGroup;

const CLUSTER: &str = "local";
const WORKERS: usize = 2;

#[derive(Debug, Deserialize)]
struct GreetPayload {
    name: String,
}

/// Fails the first `n` calls, then greets.
struct FlakyGreeter {
    remaining_failures: AtomicU32,
}

impl FlakyGreeter {
    fn new(n: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(n),
        }
    }
}

#[async_trait]
impl Executor for FlakyGreeter {
    async fn execute(&self, ctx: &ExecutionContext, task: &TaskEnvelope) -> ExecuteResponse {
        let payload: GreetPayload = match serde_json::from_value(task.payload().clone()) {
            Ok(payload) => payload,
            Err(e) => {
                return ExecuteResponse::err(TaskError::CorruptedData(format!(
                    "payload decode: {e}"
                )));
            }
        };

        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return ExecuteResponse::err(TaskError::ResourceExhausted(format!(
                "intentional failure (left={left})"
            )));
        }

        // stands in for loading workflow state
        let started = Instant::now();
        tokio::time::sleep(Duration::from_millis(20)).await;
        ctx.record_latency(WORKFLOW_CACHE_LATENCY, started.elapsed());

        info!(task_id = %task.task_id(), attempt = ctx.attempt(), "hello, {}", payload.name);
        ExecuteResponse::ok().with_tags(vec![MetricTag::new("task_type", "greet")])
    }
}

/// Reports "not ready" on the first call for every task.
#[derive(Default)]
struct TimerGate {
    seen: std::sync::Mutex<std::collections::HashSet<TaskId>>,
}

#[async_trait]
impl Executor for TimerGate {
    async fn execute(&self, _ctx: &ExecutionContext, task: &TaskEnvelope) -> ExecuteResponse {
        let first = self
            .seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(task.task_id());
        let tags = vec![MetricTag::new("task_type", "user_timer")];
        if first {
            ExecuteResponse::err(TaskError::Retry).with_tags(tags)
        } else {
            ExecuteResponse::ok().with_tags(tags)
        }
    }
}

fn load_config() -> Result<ExecutableConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            let config = ExecutableConfig::from_json(&json)?;
            info!(%path, "config loaded");
            Ok(config)
        }
        None => Ok(ExecutableConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bobbin_cli=info,bobbin_core=debug")),
        )
        .init();

    let config = load_config()?;

    // (A) namespace metadata
    let namespace_id = NamespaceId::generate();
    let registry = Arc::new(InMemoryNamespaceRegistry::new());
    registry.insert(NamespaceEntry::local(namespace_id, "demo", CLUSTER));
    let cluster = Arc::new(StaticClusterMetadata::new(CLUSTER));

    // (B) executors per category
    let mut executors = ExecutorRegistry::new();
    executors.register(TaskCategory::Transfer, Arc::new(FlakyGreeter::new(2)))?;
    executors.register(TaskCategory::Timer, Arc::new(TimerGate::default()))?;

    // (C) scheduler / rescheduler
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (scheduler, receiver) = ChannelScheduler::new(16);
    let scheduler = Arc::new(scheduler);
    let timer = Arc::new(
        TimerRescheduler::new(scheduler.clone(), clock.clone())
            .with_retry_delay(Duration::from_millis(100)),
    );

    let factory = ExecutableFactory::builder()
        .executor(Arc::new(executors))
        .scheduler(scheduler.clone())
        .rescheduler(timer.clone())
        .priority_assigner(Arc::new(StandardPriorityAssigner::new(
            registry.clone(),
            cluster,
        )))
        .clock(clock.clone())
        .namespace_registry(registry)
        .config(config)
        .build()?;

    // (D) background loops
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let pump = timer.clone();
    let timer_join = tokio::spawn(async move { pump.run(shutdown_rx).await });

    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let workers = WorkerGroup::spawn(WORKERS, receiver, done_tx);

    // (E) load tasks
    let tasks = [
        (TaskCategory::Transfer, serde_json::json!({ "name": "bobbin" })),
        (TaskCategory::Transfer, serde_json::json!({ "name": "spindle" })),
        (TaskCategory::Transfer, serde_json::json!({ "nom": "broken" })),
        (TaskCategory::Timer, serde_json::Value::Null),
    ];
    let total = tasks.len();
    for (i, (category, payload)) in tasks.into_iter().enumerate() {
        let task = TaskEnvelope::new(
            WorkflowKey::new(namespace_id, WorkflowId::new(format!("wf-{i}")), RunId::generate()),
            TaskId::new(i as i64 + 1),
            category,
            clock.now(),
        )
        .with_payload(payload);

        let executable = factory.new_executable(ReaderId::DEFAULT, task)?;
        if !scheduler.try_submit(executable.clone()) {
            executable.reschedule();
        }
    }

    // (F) wait for every task to finish
    let mut finished = 0;
    let deadline = tokio::time::sleep(Duration::from_secs(60));
    tokio::pin!(deadline);
    while finished < total {
        tokio::select! {
            next = done_rx.recv() => {
                let Some(executable) = next else { break };
                finished += 1;
                let metrics = executable.metrics();
                info!(
                    task_id = %executable.task().task_id(),
                    category = %executable.task().category(),
                    state = ?executable.state(),
                    attempt = metrics.attempt,
                    in_memory_no_user_latency_ms = millis(metrics.in_memory_no_user_latency),
                    queue_latency_ms = executable.queue_latency().map(millis),
                    tags = ?metrics.tags,
                    "task finished"
                );
            }
            _ = &mut deadline => {
                info!(finished, total, "gave up waiting");
                break;
            }
        }
    }

    // (G) graceful shutdown
    workers.shutdown_and_join().await;
    let _ = shutdown_tx.send(true);
    let _ = timer_join.await;
    info!(finished, total, pending_timers = timer.len(), "done");
    Ok(())
}
