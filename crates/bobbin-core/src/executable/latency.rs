//! Latency accounting for a single attempt.

use std::time::Duration;

/// Measurements taken around one executor call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptLatency {
    /// Attempt start minus the time the executable became eligible to run.
    pub schedule: Duration,

    /// Wall time spent inside the executor call.
    pub attempt: Duration,

    /// Time the executor attributed to user-visible downstream work.
    pub user: Duration,
}

impl AttemptLatency {
    /// Time attributable to the queueing system itself:
    /// schedule + attempt - user, floored at zero.
    pub fn in_memory_no_user(&self) -> Duration {
        (self.schedule + self.attempt).saturating_sub(self.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_latency_is_subtracted() {
        let latency = AttemptLatency {
            schedule: Duration::from_millis(100),
            attempt: Duration::from_secs(1),
            user: Duration::from_millis(500),
        };
        assert_eq!(latency.in_memory_no_user(), Duration::from_millis(600));
    }

    #[test]
    fn over_reported_user_latency_floors_at_zero() {
        let latency = AttemptLatency {
            schedule: Duration::ZERO,
            attempt: Duration::from_millis(10),
            user: Duration::from_millis(50),
        };
        assert_eq!(latency.in_memory_no_user(), Duration::ZERO);
    }
}
