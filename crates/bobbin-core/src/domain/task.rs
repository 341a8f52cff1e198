//! Persisted task identity as seen by the execution core.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{NamespaceId, RunId, TaskId, WorkflowId};

/// Category of a persisted task. Each category has its own executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Transfer,
    Timer,
    Replication,
    Visibility,
    Archival,
    Outbound,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Transfer => "transfer",
            TaskCategory::Timer => "timer",
            TaskCategory::Replication => "replication",
            TaskCategory::Visibility => "visibility",
            TaskCategory::Archival => "archival",
            TaskCategory::Outbound => "outbound",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the workflow run a task belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowKey {
    pub namespace_id: NamespaceId,
    pub workflow_id: WorkflowId,
    pub run_id: RunId,
}

impl WorkflowKey {
    pub fn new(namespace_id: NamespaceId, workflow_id: WorkflowId, run_id: RunId) -> Self {
        Self {
            namespace_id,
            workflow_id,
            run_id,
        }
    }
}

/// One durably persisted unit of work.
///
/// The envelope is immutable: the executable wrapping it only reads it,
/// and the per-category executor decides what the payload means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    key: WorkflowKey,
    task_id: TaskId,
    category: TaskCategory,
    visibility_time: DateTime<Utc>,
    #[serde(default)]
    payload: serde_json::Value,
}

impl TaskEnvelope {
    pub fn new(
        key: WorkflowKey,
        task_id: TaskId,
        category: TaskCategory,
        visibility_time: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            task_id,
            category,
            visibility_time,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn key(&self) -> &WorkflowKey {
        &self.key
    }

    pub fn namespace_id(&self) -> NamespaceId {
        self.key.namespace_id
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn category(&self) -> TaskCategory {
        self.category
    }

    /// When the task became (or becomes) due.
    pub fn visibility_time(&self) -> DateTime<Utc> {
        self.visibility_time
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }
}
