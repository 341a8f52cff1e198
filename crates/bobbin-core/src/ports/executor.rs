//! Executor port - task category ごとのビジネスロジック
//!
//! Executable は Executor を 1 つだけ保持し、具体的な task 種別で分岐しません。

use async_trait::async_trait;

use crate::domain::{ExecutionContext, MetricTag, TaskEnvelope, TaskError};

/// Result of one executor call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteResponse {
    /// Observability labels describing what was done.
    pub tags: Vec<MetricTag>,

    /// Whether the owning namespace is active in this cluster.
    pub namespace_active: bool,

    pub result: Result<(), TaskError>,
}

impl ExecuteResponse {
    /// Active namespace, no tags, successful.
    pub fn ok() -> Self {
        Self {
            tags: Vec::new(),
            namespace_active: true,
            result: Ok(()),
        }
    }

    /// Active namespace, no tags, failed with `err`.
    pub fn err(err: TaskError) -> Self {
        Self {
            tags: Vec::new(),
            namespace_active: true,
            result: Err(err),
        }
    }

    pub fn with_tags(mut self, tags: Vec<MetricTag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_namespace_active(mut self, active: bool) -> Self {
        self.namespace_active = active;
        self
    }
}

/// Performs the business effect of a task.
///
/// Called at least once per task, possibly many times, so implementations must
/// be idempotent. Implementations may panic; the executable contains it.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, ctx: &ExecutionContext, task: &TaskEnvelope) -> ExecuteResponse;
}
