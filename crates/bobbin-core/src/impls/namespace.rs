//! InMemoryNamespaceRegistry / StaticClusterMetadata - 開発用・テスト用

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::{NamespaceId, RegistryError};
use crate::ports::{ClusterMetadata, NamespaceEntry, NamespaceRegistry};

/// Namespace registry backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryNamespaceRegistry {
    entries: RwLock<HashMap<NamespaceId, Arc<NamespaceEntry>>>,
}

impl InMemoryNamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry (e.g. after a failover).
    pub fn insert(&self, entry: NamespaceEntry) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.id, Arc::new(entry));
    }
}

impl NamespaceRegistry for InMemoryNamespaceRegistry {
    fn namespace_by_id(&self, id: &NamespaceId) -> Result<Arc<NamespaceEntry>, RegistryError> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or(RegistryError::NamespaceNotFound(*id))
    }
}

/// Cluster metadata with a fixed current cluster.
#[derive(Debug, Clone)]
pub struct StaticClusterMetadata {
    current_cluster: String,
}

impl StaticClusterMetadata {
    pub fn new(current_cluster: impl Into<String>) -> Self {
        Self {
            current_cluster: current_cluster.into(),
        }
    }
}

impl ClusterMetadata for StaticClusterMetadata {
    fn current_cluster_name(&self) -> &str {
        &self.current_cluster
    }
}
