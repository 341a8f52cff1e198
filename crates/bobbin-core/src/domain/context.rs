//! Request context threaded through one executor call.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::ids::NamespaceName;
use super::priority::CallerType;

/// Latency key for time spent loading workflow state through the execution cache.
pub const WORKFLOW_CACHE_LATENCY: &str = "workflow_execution_cache_latency";

/// Who is making downstream calls on behalf of this attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerInfo {
    pub caller_name: NamespaceName,
    pub caller_type: CallerType,
}

/// Context handed to the executor for a single attempt.
///
/// Carries the caller classification for rate limiting further down the call
/// chain, and collects latencies the executor attributes to user-visible work.
/// Every duration recorded here counts as user latency and is subtracted from
/// the attempt's in-memory latency.
#[derive(Debug)]
pub struct ExecutionContext {
    caller: CallerInfo,
    attempt: u32,
    latencies: Mutex<HashMap<&'static str, Duration>>,
}

impl ExecutionContext {
    pub fn new(caller: CallerInfo, attempt: u32) -> Self {
        Self {
            caller,
            attempt,
            latencies: Mutex::new(HashMap::new()),
        }
    }

    pub fn caller_info(&self) -> &CallerInfo {
        &self.caller
    }

    pub fn caller_type(&self) -> CallerType {
        self.caller.caller_type
    }

    /// Attempt number this context was built for.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Add `duration` under `key`. Repeated calls accumulate.
    pub fn record_latency(&self, key: &'static str, duration: Duration) {
        let mut latencies = self.latencies();
        *latencies.entry(key).or_default() += duration;
    }

    pub fn latency(&self, key: &str) -> Duration {
        self.latencies().get(key).copied().unwrap_or_default()
    }

    /// Sum of everything recorded, across keys.
    pub fn user_latency(&self) -> Duration {
        self.latencies().values().sum()
    }

    fn latencies(&self) -> MutexGuard<'_, HashMap<&'static str, Duration>> {
        self.latencies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
