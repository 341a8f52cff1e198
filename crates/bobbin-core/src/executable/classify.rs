//! Error classification: what an attempt's error means for the task.
//!
//! Pure functions only. Logging and retry side effects live on `Executable`.

use std::any::Any;
use std::sync::Arc;

use crate::domain::{ErrorClass, TaskError};

/// Predicate consulted by retry loops wrapped around an executable.
pub type RetryablePredicate = Arc<dyn Fn(&TaskError) -> bool + Send + Sync>;

/// Default policy: every error may be retried.
pub fn default_is_retryable(_err: &TaskError) -> bool {
    true
}

/// `Ok(())` when the error needs no further attempts, otherwise the same error.
pub fn resolve(err: TaskError) -> Result<(), TaskError> {
    match err.class() {
        ErrorClass::Resolved => Ok(()),
        ErrorClass::WaitForCondition | ErrorClass::Transient => Err(err),
    }
}

/// Errors that cannot change by resubmitting right away.
pub fn skips_resubmit(err: &TaskError) -> bool {
    err.class() == ErrorClass::WaitForCondition
}

/// Convert a panic payload from the executor into a task error.
///
/// A `TaskError::CorruptedData` or `serde_json::Error` payload means the task
/// data itself is bad and is kept as `CorruptedData`; anything else becomes
/// `Panic` with the payload's message.
pub fn from_panic(payload: Box<dyn Any + Send>) -> TaskError {
    let payload = match payload.downcast::<TaskError>() {
        Ok(err) => {
            return match *err {
                TaskError::CorruptedData(msg) => TaskError::CorruptedData(msg),
                other => TaskError::Panic(other.to_string()),
            };
        }
        Err(payload) => payload,
    };
    if let Some(err) = payload.downcast_ref::<serde_json::Error>() {
        return TaskError::CorruptedData(err.to_string());
    }
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        return TaskError::Panic((*msg).to_string());
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return TaskError::Panic(msg.clone());
    }
    TaskError::Panic("unknown panic payload".to_string())
}
