//! Lazy, alias-keyed connection registry.

use std::collections::HashMap;
use std::sync::Arc;

use tagcache_core::{CacheConfig, CacheError, CacheResult};
use tagcache_store::{Connector, StoreBackend};
use tokio::sync::RwLock;

/// Owns one live backend handle per configured alias.
///
/// Handles are created on first use and reused for the lifetime of the
/// enclosing cache instance; they are never shared across instances.
/// Creation happens under the write guard, so two tasks racing on the
/// same alias cannot both connect.
pub struct ConnectionRegistry {
    config: CacheConfig,
    connector: Arc<dyn Connector>,
    connections: RwLock<HashMap<String, Arc<dyn StoreBackend>>>,
}

impl ConnectionRegistry {
    pub fn new(config: CacheConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// The handle for `alias`, connecting on first use.
    ///
    /// Fails with [`CacheError::MissingConfig`] when the alias has no
    /// configuration entry.
    pub async fn connection(&self, alias: &str) -> CacheResult<Arc<dyn StoreBackend>> {
        if let Some(backend) = self.connections.read().await.get(alias) {
            return Ok(Arc::clone(backend));
        }

        let mut connections = self.connections.write().await;
        // Re-check: another task may have connected while we waited.
        if let Some(backend) = connections.get(alias) {
            return Ok(Arc::clone(backend));
        }

        let entry = self
            .config
            .get(alias)
            .ok_or_else(|| CacheError::MissingConfig {
                alias: alias.to_string(),
            })?;
        let backend = self.connector.connect(entry).await?;
        tracing::debug!(alias, backend = backend.kind(), "connection established");
        connections.insert(alias.to_string(), Arc::clone(&backend));
        Ok(backend)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
