//! bobbin-core
//!
//! Task execution core for a workflow orchestration service.
//!
//! Each persisted task loaded from a queue is wrapped in an [`Executable`],
//! which owns its attempt counter, lifecycle state, latency accounting and
//! retry routing.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, state, priority, errors, context, metrics）
//! - **ports**: 抽象化レイヤー（Executor, Scheduler, Rescheduler, Clock, NamespaceRegistry, など）
//! - **executable**: Executable 本体（execute / handle_err / ack / nack / reschedule）と factory
//! - **config**: backoff などの設定
//! - **impls**: ports の実装（TimerRescheduler, ChannelScheduler, ExecutorRegistry, など）

pub mod config;
pub mod domain;
pub mod executable;
pub mod impls;
pub mod ports;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, ExecutableConfig};
pub use domain::{ErrorClass, ExecutableState, RegistryError, TaskEnvelope, TaskError};
pub use executable::{BuildError, Executable, ExecutableFactory, ReschedulePolicy};
