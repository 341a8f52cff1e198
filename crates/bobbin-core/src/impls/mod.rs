//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **NoopPriorityAssigner / StandardPriorityAssigner**: 優先度の割り当て
//! - **InMemoryNamespaceRegistry / StaticClusterMetadata**: 開発用・テスト用のメタデータ
//! - **ExecutorRegistry**: category ごとの Executor 振り分け
//! - **ChannelScheduler**: bounded channel による即時再投入
//! - **TimerRescheduler**: 時刻指定の遅延再投入

pub mod channel_scheduler;
pub mod executor_registry;
pub mod namespace;
pub mod priority;
pub mod timer_rescheduler;

pub use self::channel_scheduler::ChannelScheduler;
pub use self::executor_registry::ExecutorRegistry;
pub use self::namespace::{InMemoryNamespaceRegistry, StaticClusterMetadata};
pub use self::priority::{NoopPriorityAssigner, StandardPriorityAssigner};
pub use self::timer_rescheduler::TimerRescheduler;
