//! Errors - エラー型と分類
//!
//! `TaskError` は 1 回の attempt が返しうる全てのエラーです。
//! `ErrorClass` はそれを運用上の扱い（ack / 待って再実行 / すぐ再実行）に分類します。

use thiserror::Error;

use super::ids::NamespaceId;
use super::task::TaskCategory;

/// ErrorClass は実行エラーの分類
///
/// - Resolved: 対象が既に存在しない・破損している等、再実行しても意味がない（ack する）
/// - WaitForCondition: 外部条件待ち（すぐ再投入せず、必ず rescheduler で遅延させる）
/// - Transient: それ以外（scheduler に空きがあればすぐ再投入）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Resolved,
    WaitForCondition,
    Transient,
}

/// Error reported by (or on behalf of) one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("entity not found: {0}")]
    NotFound(String),

    #[error("task discarded")]
    Discarded,

    #[error("task version mismatch")]
    VersionMismatch,

    #[error("corrupted task data: {0}")]
    CorruptedData(String),

    #[error("task should be retried later")]
    Retry,

    #[error("dependent task is not completed")]
    DependencyTaskNotCompleted,

    #[error(
        "namespace {namespace} is not active in cluster {current_cluster} (active cluster: {active_cluster})"
    )]
    NamespaceNotActive {
        namespace: String,
        current_cluster: String,
        active_cluster: String,
    },

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("no executor registered for task category={0}")]
    ExecutorNotFound(TaskCategory),

    #[error("panic during task execution: {0}")]
    Panic(String),

    #[error("{0}")]
    Other(String),
}

impl TaskError {
    pub fn other(message: impl Into<String>) -> Self {
        TaskError::Other(message.into())
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            TaskError::NotFound(_)
            | TaskError::Discarded
            | TaskError::VersionMismatch
            | TaskError::CorruptedData(_) => ErrorClass::Resolved,
            TaskError::Retry | TaskError::DependencyTaskNotCompleted => {
                ErrorClass::WaitForCondition
            }
            TaskError::NamespaceNotActive { .. }
            | TaskError::ResourceExhausted(_)
            | TaskError::ExecutorNotFound(_)
            | TaskError::Panic(_)
            | TaskError::Other(_) => ErrorClass::Transient,
        }
    }

    /// Stable label for logs and metric tags.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::NotFound(_) => "not_found",
            TaskError::Discarded => "discarded",
            TaskError::VersionMismatch => "version_mismatch",
            TaskError::CorruptedData(_) => "corrupted_data",
            TaskError::Retry => "retry",
            TaskError::DependencyTaskNotCompleted => "dependency_task_not_completed",
            TaskError::NamespaceNotActive { .. } => "namespace_not_active",
            TaskError::ResourceExhausted(_) => "resource_exhausted",
            TaskError::ExecutorNotFound(_) => "executor_not_found",
            TaskError::Panic(_) => "panic",
            TaskError::Other(_) => "other",
        }
    }
}

/// Errors from the namespace registry and the executor registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("namespace not found: {0}")]
    NamespaceNotFound(NamespaceId),

    #[error("registry unavailable: {0}")]
    Unavailable(String),

    #[error("{0} is already registered")]
    AlreadyRegistered(String),
}
