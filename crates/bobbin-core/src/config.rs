//! Executable configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::TaskError;
use crate::executable::ReschedulePolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid reschedule policy: {0}")]
    InvalidPolicy(String),

    #[error("config decode: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutableConfig {
    /// Backoff for generic failures.
    pub reschedule_policy: ReschedulePolicy,

    /// Backoff for tasks that reported they are not ready yet.
    pub task_not_ready_policy: ReschedulePolicy,

    /// Backoff for tasks waiting on another task to complete.
    pub dependency_not_completed_policy: ReschedulePolicy,

    /// Failures past this many attempts are logged at error level.
    pub critical_retry_attempts: u32,
}

impl ExecutableConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reschedule_policy.validate()?;
        self.task_not_ready_policy.validate()?;
        self.dependency_not_completed_policy.validate()
    }

    /// Policy used to back off after `err`.
    pub fn policy_for(&self, err: &TaskError) -> &ReschedulePolicy {
        match err {
            TaskError::Retry => &self.task_not_ready_policy,
            TaskError::DependencyTaskNotCompleted => &self.dependency_not_completed_policy,
            _ => &self.reschedule_policy,
        }
    }
}

impl Default for ExecutableConfig {
    fn default() -> Self {
        Self {
            reschedule_policy: ReschedulePolicy::default(),
            task_not_ready_policy: ReschedulePolicy::new(
                Duration::from_secs(3),
                1.5,
                Duration::from_secs(600),
            )
            .with_jitter(0.15),
            dependency_not_completed_policy: ReschedulePolicy::new(
                Duration::from_secs(3),
                1.5,
                Duration::from_secs(300),
            )
            .with_jitter(0.15),
            critical_retry_attempts: 30,
        }
    }
}
