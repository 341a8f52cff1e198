//! Scheduler / Rescheduler ports
//!
//! どちらも外部で同期される共有コンポーネントで、呼び出しはブロックしません。

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::executable::Executable;

/// Bounded-concurrency dispatcher.
pub trait Scheduler: Send + Sync {
    /// Offer an executable for immediate execution.
    /// Returns false when saturated or shut down; never blocks.
    fn try_submit(&self, executable: Arc<Executable>) -> bool;
}

/// Deferred resubmission facility.
pub trait Rescheduler: Send + Sync {
    /// Resubmit `executable` to a scheduler no earlier than `fire_at`.
    fn add(&self, executable: Arc<Executable>, fire_at: DateTime<Utc>);
}
