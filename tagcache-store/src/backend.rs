//! Store backend and connector traits.
//!
//! A [`StoreBackend`] is the minimal key-value surface the cache façade
//! requires: point and batched reads, writes, deletes, and a narrow,
//! validated escape hatch for backend-specific operations. Anything the
//! façade does not define is reached through [`StoreBackend::invoke`]
//! after an explicit [`StoreBackend::supports`] check - there is no
//! reflective method forwarding.

use std::sync::Arc;

use async_trait::async_trait;
use tagcache_core::{BackendResult, CacheValue, ConnectionConfig};

/// Minimal backend surface required by the cache façade.
///
/// Implementations must be thread-safe; the façade shares one handle
/// per alias across all operations on a cache instance.
///
/// # Return conventions
///
/// `set`/`delete` return `Ok(false)` when the backend reports the
/// operation as unsuccessful without a transport failure (for example,
/// deleting a key that does not exist); `delete_many` reports how many
/// keys it removed. Transport and encoding failures are `Err`.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Short name for this backend kind, used in error messages.
    fn kind(&self) -> &'static str;

    /// Get a single value. Absent keys read as `None`, never an error.
    async fn get(&self, key: &str) -> BackendResult<Option<CacheValue>>;

    /// Batched read. The result is position-aligned with `keys`;
    /// absent keys read as `None`.
    async fn get_many(&self, keys: &[String]) -> BackendResult<Vec<Option<CacheValue>>>;

    /// Write a single value.
    async fn set(&self, key: &str, value: &CacheValue) -> BackendResult<bool>;

    /// Delete a single key. `Ok(false)` if the key was absent.
    async fn delete(&self, key: &str) -> BackendResult<bool>;

    /// Batched delete. Returns the number of keys that were deleted;
    /// keys that were already absent simply do not count.
    async fn delete_many(&self, keys: &[String]) -> BackendResult<u64>;

    /// Whether this backend exposes the named passthrough operation.
    fn supports(&self, operation: &str) -> bool;

    /// Invoke a passthrough operation by name.
    ///
    /// Callers must check [`StoreBackend::supports`] first; invoking an
    /// unsupported operation is a protocol error.
    async fn invoke(&self, operation: &str, args: &[CacheValue]) -> BackendResult<CacheValue>;
}

impl std::fmt::Debug for dyn StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreBackend")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

/// Factory for backend connections, injected into the connection
/// registry so the façade never names a concrete backend type.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish a connection described by `config`.
    async fn connect(&self, config: &ConnectionConfig) -> BackendResult<Arc<dyn StoreBackend>>;
}

/// Apply a connection's namespace prefix to a key.
pub(crate) fn namespaced(namespace: Option<&str>, key: &str) -> String {
    match namespace {
        Some(prefix) => format!("{prefix}{key}"),
        None => key.to_string(),
    }
}
