//! In-memory store backend.
//!
//! Used by tests and local development. One `MemoryBackend` models one
//! backend server connection: a flat key space behind an `RwLock`, with
//! the connection's namespace prefix applied to every key exactly as a
//! networked backend would.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tagcache_core::{BackendError, BackendResult, CacheValue, ConnectionConfig};

use crate::backend::{namespaced, Connector, StoreBackend};

/// Passthrough operations the memory backend understands.
const SUPPORTED_OPS: &[&str] = &["ping", "db_size", "flush_db", "exists", "keys"];

/// In-memory implementation of [`StoreBackend`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    namespace: Option<String>,
    entries: RwLock<HashMap<String, CacheValue>>,
}

impl MemoryBackend {
    pub fn new(namespace: Option<String>) -> Self {
        Self {
            namespace,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn key(&self, key: &str) -> String {
        namespaced(self.namespace.as_deref(), key)
    }

    /// Number of live entries, for test assertions.
    pub fn len(&self) -> usize {
        self.entries.read().expect("entries lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> BackendResult<Option<CacheValue>> {
        let entries = self.entries.read().expect("entries lock poisoned");
        Ok(entries.get(&self.key(key)).cloned())
    }

    async fn get_many(&self, keys: &[String]) -> BackendResult<Vec<Option<CacheValue>>> {
        let entries = self.entries.read().expect("entries lock poisoned");
        Ok(keys
            .iter()
            .map(|key| entries.get(&self.key(key)).cloned())
            .collect())
    }

    async fn set(&self, key: &str, value: &CacheValue) -> BackendResult<bool> {
        let mut entries = self.entries.write().expect("entries lock poisoned");
        entries.insert(self.key(key), value.clone());
        Ok(true)
    }

    async fn delete(&self, key: &str) -> BackendResult<bool> {
        let mut entries = self.entries.write().expect("entries lock poisoned");
        Ok(entries.remove(&self.key(key)).is_some())
    }

    async fn delete_many(&self, keys: &[String]) -> BackendResult<u64> {
        let mut entries = self.entries.write().expect("entries lock poisoned");
        let mut deleted = 0;
        for key in keys {
            if entries.remove(&self.key(key)).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    fn supports(&self, operation: &str) -> bool {
        SUPPORTED_OPS.contains(&operation)
    }

    async fn invoke(&self, operation: &str, args: &[CacheValue]) -> BackendResult<CacheValue> {
        match operation {
            "ping" => Ok(CacheValue::Scalar("PONG".to_string())),
            "db_size" => {
                let entries = self.entries.read().expect("entries lock poisoned");
                Ok(CacheValue::Scalar(entries.len().to_string()))
            }
            "flush_db" => {
                let mut entries = self.entries.write().expect("entries lock poisoned");
                entries.clear();
                Ok(CacheValue::Scalar("OK".to_string()))
            }
            "exists" => {
                let key = args
                    .first()
                    .and_then(CacheValue::as_scalar)
                    .ok_or_else(|| BackendError::Protocol {
                        reason: "exists requires a key argument".to_string(),
                    })?;
                let entries = self.entries.read().expect("entries lock poisoned");
                let found = entries.contains_key(&self.key(key));
                Ok(CacheValue::Scalar(if found { "1" } else { "0" }.to_string()))
            }
            "keys" => {
                let entries = self.entries.read().expect("entries lock poisoned");
                let mut keys: Vec<String> = entries.keys().cloned().collect();
                keys.sort();
                Ok(CacheValue::List(keys))
            }
            other => Err(BackendError::Protocol {
                reason: format!("unsupported operation \"{other}\""),
            }),
        }
    }
}

/// Connector producing fresh [`MemoryBackend`] handles.
///
/// Tracks how many connections it has created so tests can assert the
/// registry's connect-once discipline.
#[derive(Debug, Default)]
pub struct MemoryConnector {
    connects: AtomicUsize,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many connections this connector has established.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, config: &ConnectionConfig) -> BackendResult<Arc<dyn StoreBackend>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(host = %config.host, port = config.port, db = config.db, "opening memory backend");
        Ok(Arc::new(MemoryBackend::new(config.namespace.clone())))
    }
}
