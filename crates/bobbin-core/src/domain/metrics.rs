//! Observability labels and per-attempt measurements.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A single (key, value) observability label reported by an executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTag {
    pub key: String,
    pub value: String,
}

impl MetricTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Snapshot of the most recently completed attempt.
///
/// Latencies are overwritten on every attempt, never summed across attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutableMetrics {
    pub tags: Vec<MetricTag>,
    pub attempt: u32,
    pub schedule_latency: Duration,
    pub attempt_latency: Duration,
    pub user_latency: Duration,
    pub in_memory_no_user_latency: Duration,
}
