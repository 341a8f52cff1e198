//! PriorityAssigner 実装

use std::sync::Arc;

use crate::domain::{Priority, TaskCategory, TaskEnvelope};
use crate::ports::{ClusterMetadata, NamespaceRegistry, PriorityAssigner};

/// Treats every task as high priority.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPriorityAssigner;

impl PriorityAssigner for NoopPriorityAssigner {
    fn assign(&self, _task: &TaskEnvelope) -> Priority {
        Priority::High
    }
}

/// Namespace-aware assigner.
///
/// Tasks of namespaces that are standby here (or cannot be resolved) are low
/// priority; the rest get their category's default.
pub struct StandardPriorityAssigner {
    namespace_registry: Arc<dyn NamespaceRegistry>,
    cluster_metadata: Arc<dyn ClusterMetadata>,
}

impl StandardPriorityAssigner {
    pub fn new(
        namespace_registry: Arc<dyn NamespaceRegistry>,
        cluster_metadata: Arc<dyn ClusterMetadata>,
    ) -> Self {
        Self {
            namespace_registry,
            cluster_metadata,
        }
    }

    fn category_priority(category: TaskCategory) -> Priority {
        match category {
            TaskCategory::Transfer | TaskCategory::Timer | TaskCategory::Outbound => {
                Priority::High
            }
            TaskCategory::Visibility | TaskCategory::Archival | TaskCategory::Replication => {
                Priority::Low
            }
        }
    }
}

impl PriorityAssigner for StandardPriorityAssigner {
    fn assign(&self, task: &TaskEnvelope) -> Priority {
        let Ok(entry) = self.namespace_registry.namespace_by_id(&task.namespace_id()) else {
            return Priority::Low;
        };
        if !entry.is_active_in(self.cluster_metadata.current_cluster_name()) {
            return Priority::Low;
        }
        Self::category_priority(task.category())
    }
}
