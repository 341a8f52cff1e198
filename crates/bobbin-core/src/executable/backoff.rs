//! Reschedule policy: decides backoff delays.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::ports::clock::millis;

/// Exponential backoff with a cap and upward-only jitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReschedulePolicy {
    /// Delay before the first retry.
    pub initial_interval_ms: u64,

    /// Growth factor per attempt.
    pub backoff_coefficient: f64,

    /// Upper bound for the pre-jitter delay.
    pub maximum_interval_ms: u64,

    /// Up to this fraction of the delay is added at random.
    #[serde(default)]
    pub jitter_coefficient: f64,
}

impl ReschedulePolicy {
    pub fn new(initial: Duration, coefficient: f64, maximum: Duration) -> Self {
        Self {
            initial_interval_ms: millis(initial),
            backoff_coefficient: coefficient,
            maximum_interval_ms: millis(maximum),
            jitter_coefficient: 0.0,
        }
    }

    pub fn with_jitter(mut self, jitter_coefficient: f64) -> Self {
        self.jitter_coefficient = jitter_coefficient;
        self
    }

    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn maximum_interval(&self) -> Duration {
        Duration::from_millis(self.maximum_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_interval_ms == 0 {
            return Err(ConfigError::InvalidPolicy("initial_interval_ms must be > 0".into()));
        }
        if self.maximum_interval_ms < self.initial_interval_ms {
            return Err(ConfigError::InvalidPolicy(
                "maximum_interval_ms must be >= initial_interval_ms".into(),
            ));
        }
        if !self.backoff_coefficient.is_finite() || self.backoff_coefficient < 1.0 {
            return Err(ConfigError::InvalidPolicy("backoff_coefficient must be >= 1.0".into()));
        }
        if !self.jitter_coefficient.is_finite() || !(0.0..1.0).contains(&self.jitter_coefficient) {
            return Err(ConfigError::InvalidPolicy(
                "jitter_coefficient must be in [0.0, 1.0)".into(),
            ));
        }
        Ok(())
    }

    /// Delay before the next attempt, without jitter.
    ///
    /// `attempt` is the number of attempts made so far (1-indexed):
    /// initial * coefficient^(attempt - 1), capped at the maximum interval.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let initial = self.initial_interval().as_secs_f64();
        let max = self.maximum_interval();
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = initial * self.backoff_coefficient.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .map(|d| d.min(max))
            .unwrap_or(max)
            .max(Duration::from_millis(1))
    }

    /// Delay before the next attempt, with jitter applied.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        if self.jitter_coefficient <= 0.0 {
            return base;
        }
        let factor = 1.0 + rand::thread_rng().gen_range(0.0..self.jitter_coefficient);
        Duration::try_from_secs_f64(base.as_secs_f64() * factor).unwrap_or(base)
    }
}

impl Default for ReschedulePolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 1.1, Duration::from_secs(300)).with_jitter(0.15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> ReschedulePolicy {
        ReschedulePolicy::new(Duration::from_secs(2), 2.0, Duration::from_secs(20))
    }

    #[test]
    fn default_policy_is_valid() {
        assert!(ReschedulePolicy::default().validate().is_ok());
    }

    #[test]
    fn exponential_backoff_increases_until_cap() {
        let policy = no_jitter();

        assert_eq!(policy.next_delay(1), Duration::from_secs(2));
        assert_eq!(policy.next_delay(2), Duration::from_secs(4));
        assert_eq!(policy.next_delay(3), Duration::from_secs(8));
        assert_eq!(policy.next_delay(4), Duration::from_secs(16));
        assert_eq!(policy.next_delay(5), Duration::from_secs(20));
        assert_eq!(policy.next_delay(500), Duration::from_secs(20));
    }

    #[test]
    fn attempt_zero_uses_initial_interval() {
        assert_eq!(no_jitter().next_delay(0), Duration::from_secs(2));
    }

    #[test]
    fn base_delay_never_decreases() {
        let policy = ReschedulePolicy::default();
        let mut prev = Duration::ZERO;
        for attempt in 1..200 {
            let d = policy.base_delay(attempt);
            assert!(d >= prev, "attempt {attempt}: {d:?} < {prev:?}");
            prev = d;
        }
    }

    #[test]
    fn jitter_only_adds() {
        let policy = no_jitter().with_jitter(0.5);
        for _ in 0..100 {
            let d = policy.next_delay(1);
            assert!(d >= Duration::from_secs(2));
            assert!(d < Duration::from_secs(3));
        }
    }

    #[test]
    fn invalid_policies_are_rejected() {
        let mut p = no_jitter();
        p.backoff_coefficient = 0.5;
        assert!(p.validate().is_err());

        let mut p = no_jitter();
        p.initial_interval_ms = 0;
        assert!(p.validate().is_err());

        let p = no_jitter().with_jitter(f64::NAN);
        assert!(p.validate().is_err());
    }

    #[test]
    fn huge_intervals_saturate() {
        let policy = ReschedulePolicy::new(Duration::from_secs(1), 1.5, Duration::MAX);
        assert_eq!(policy.maximum_interval_ms, u64::MAX);
        assert_eq!(policy.initial_interval_ms, 1_000);
    }
}
