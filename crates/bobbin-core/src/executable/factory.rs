//! ExecutableFactory - 共有コンポーネントのワイヤリング
//!
//! # Fail-fast 設計
//! - 必須の collaborator が欠けていれば build() が BuildError を返す
//! - 設定値の検証も build() 時に行う
//! - namespace が解決できなければ Executable を作らない（リトライしない）

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::classify::{self, RetryablePredicate};
use super::{AttemptLatency, Executable, ExecutableInner};
use crate::config::{ConfigError, ExecutableConfig};
use crate::domain::{ExecutableState, ReaderId, RegistryError, TaskEnvelope, TaskError};
use crate::impls::NoopPriorityAssigner;
use crate::ports::{
    Clock, Executor, NamespaceRegistry, PriorityAssigner, Rescheduler, Scheduler, SystemClock,
};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Builds executables that share one set of collaborators.
///
/// # 使用例
/// ```ignore
/// let factory = ExecutableFactory::builder()
///     .executor(executor)
///     .scheduler(scheduler)
///     .rescheduler(rescheduler)
///     .namespace_registry(registry)
///     .build()?;
/// let executable = factory.new_executable(ReaderId::DEFAULT, task)?;
/// ```
#[derive(Clone)]
pub struct ExecutableFactory {
    executor: Arc<dyn Executor>,
    scheduler: Arc<dyn Scheduler>,
    rescheduler: Arc<dyn Rescheduler>,
    priority_assigner: Arc<dyn PriorityAssigner>,
    clock: Arc<dyn Clock>,
    namespace_registry: Arc<dyn NamespaceRegistry>,
    config: Arc<ExecutableConfig>,
    is_retryable: RetryablePredicate,
}

impl ExecutableFactory {
    pub fn builder() -> ExecutableFactoryBuilder {
        ExecutableFactoryBuilder::new()
    }

    pub fn config(&self) -> &ExecutableConfig {
        &self.config
    }

    /// Wrap a dequeued task.
    ///
    /// Fails when the task's namespace cannot be resolved.
    pub fn new_executable(
        &self,
        reader_id: ReaderId,
        task: TaskEnvelope,
    ) -> Result<Arc<Executable>, RegistryError> {
        let namespace_name = self.namespace_registry.namespace_name(&task.namespace_id())?;
        let priority = self.priority_assigner.assign(&task);
        let now = self.clock.now();

        debug!(
            task_id = %task.task_id(),
            namespace = %namespace_name,
            category = %task.category(),
            ?priority,
            %reader_id,
            "executable created"
        );

        Ok(Arc::new(Executable {
            reader_id,
            task,
            namespace_name,
            priority,
            load_time: now,
            executor: Arc::clone(&self.executor),
            scheduler: Arc::clone(&self.scheduler),
            rescheduler: Arc::clone(&self.rescheduler),
            clock: Arc::clone(&self.clock),
            config: Arc::clone(&self.config),
            is_retryable: Arc::clone(&self.is_retryable),
            inner: Mutex::new(ExecutableInner {
                state: ExecutableState::Pending,
                attempt: 1,
                scheduled_time: now,
                acked_at: None,
                tags: Vec::new(),
                latency: AttemptLatency::default(),
                last_attempt_user_latency: Default::default(),
                in_memory_no_user_latency: Default::default(),
            }),
        }))
    }
}

impl fmt::Debug for ExecutableFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableFactory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ExecutableFactory`].
///
/// Executor, scheduler, rescheduler and namespace registry are required.
/// The clock defaults to the system clock, priority to `NoopPriorityAssigner`,
/// config to `ExecutableConfig::default()`, and every error is retryable.
pub struct ExecutableFactoryBuilder {
    executor: Option<Arc<dyn Executor>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    rescheduler: Option<Arc<dyn Rescheduler>>,
    priority_assigner: Option<Arc<dyn PriorityAssigner>>,
    clock: Option<Arc<dyn Clock>>,
    namespace_registry: Option<Arc<dyn NamespaceRegistry>>,
    config: ExecutableConfig,
    is_retryable: Option<RetryablePredicate>,
}

impl ExecutableFactoryBuilder {
    pub fn new() -> Self {
        Self {
            executor: None,
            scheduler: None,
            rescheduler: None,
            priority_assigner: None,
            clock: None,
            namespace_registry: None,
            config: ExecutableConfig::default(),
            is_retryable: None,
        }
    }

    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn rescheduler(mut self, rescheduler: Arc<dyn Rescheduler>) -> Self {
        self.rescheduler = Some(rescheduler);
        self
    }

    pub fn priority_assigner(mut self, assigner: Arc<dyn PriorityAssigner>) -> Self {
        self.priority_assigner = Some(assigner);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn namespace_registry(mut self, registry: Arc<dyn NamespaceRegistry>) -> Self {
        self.namespace_registry = Some(registry);
        self
    }

    pub fn config(mut self, config: ExecutableConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the retryable-error predicate.
    pub fn retryable_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&TaskError) -> bool + Send + Sync + 'static,
    {
        self.is_retryable = Some(Arc::new(predicate));
        self
    }

    pub fn build(self) -> Result<ExecutableFactory, BuildError> {
        self.config.validate()?;
        Ok(ExecutableFactory {
            executor: self.executor.ok_or(BuildError::MissingCollaborator("executor"))?,
            scheduler: self.scheduler.ok_or(BuildError::MissingCollaborator("scheduler"))?,
            rescheduler: self
                .rescheduler
                .ok_or(BuildError::MissingCollaborator("rescheduler"))?,
            namespace_registry: self
                .namespace_registry
                .ok_or(BuildError::MissingCollaborator("namespace_registry"))?,
            priority_assigner: self
                .priority_assigner
                .unwrap_or_else(|| Arc::new(NoopPriorityAssigner)),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            config: Arc::new(self.config),
            is_retryable: self
                .is_retryable
                .unwrap_or_else(|| Arc::new(classify::default_is_retryable)),
        })
    }
}

impl Default for ExecutableFactoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
