//! Ports - 抽象化レイヤー
//!
//! Executable が依存する外部コンポーネントの「ポート」を定義します。
//! 実装はすべて注入され、テストごとに差し替えられます。
//!
//! - 時刻: Clock
//! - 業務ロジック: Executor
//! - 再投入: Scheduler（即時）/ Rescheduler（遅延）
//! - 分類: PriorityAssigner
//! - メタデータ: NamespaceRegistry / ClusterMetadata

pub mod clock;
pub mod executor;
pub mod namespace;
pub mod priority;
pub mod scheduler;

pub use self::clock::{Clock, EventClock, SystemClock};
pub use self::executor::{ExecuteResponse, Executor};
pub use self::namespace::{ClusterMetadata, NamespaceEntry, NamespaceRegistry};
pub use self::priority::PriorityAssigner;
pub use self::scheduler::{Rescheduler, Scheduler};
