//! Domain model (IDs, task identity, lifecycle state, errors, context, ...).

pub mod context;
pub mod errors;
pub mod ids;
pub mod metrics;
pub mod priority;
pub mod state;
pub mod task;

pub use context::{CallerInfo, ExecutionContext, WORKFLOW_CACHE_LATENCY};
pub use errors::{ErrorClass, RegistryError, TaskError};
pub use ids::{NamespaceId, NamespaceName, ReaderId, RunId, TaskId, WorkflowId};
pub use metrics::{ExecutableMetrics, MetricTag};
pub use priority::{CallerType, Priority};
pub use state::ExecutableState;
pub use task::{TaskCategory, TaskEnvelope, WorkflowKey};
