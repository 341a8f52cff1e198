//! NamespaceRegistry / ClusterMetadata ports
//!
//! 読み取り専用で、多数の Executable から並行に使われます。

use std::sync::Arc;

use crate::domain::{NamespaceId, NamespaceName, RegistryError};

/// Cached registry record for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    pub id: NamespaceId,
    pub name: NamespaceName,
    pub active_cluster: String,
    pub clusters: Vec<String>,
}

impl NamespaceEntry {
    /// Single-cluster namespace active in `cluster`.
    pub fn local(id: NamespaceId, name: impl Into<String>, cluster: impl Into<String>) -> Self {
        let cluster = cluster.into();
        Self {
            id,
            name: NamespaceName::new(name),
            active_cluster: cluster.clone(),
            clusters: vec![cluster],
        }
    }

    pub fn is_active_in(&self, cluster: &str) -> bool {
        self.active_cluster == cluster
    }
}

pub trait NamespaceRegistry: Send + Sync {
    fn namespace_by_id(&self, id: &NamespaceId) -> Result<Arc<NamespaceEntry>, RegistryError>;

    fn namespace_name(&self, id: &NamespaceId) -> Result<NamespaceName, RegistryError> {
        Ok(self.namespace_by_id(id)?.name.clone())
    }
}

pub trait ClusterMetadata: Send + Sync {
    fn current_cluster_name(&self) -> &str;
}
