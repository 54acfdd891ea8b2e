//! tagcache - tag-indexed caching façade
//!
//! Groups cache entries under named tags so a whole logical group can
//! be retrieved or invalidated together, on top of key-value backends
//! with no native tagging. The tag index is itself stored in the
//! backend: each tag is a key whose value is the ordered list of its
//! member keys.
//!
//! # Architecture
//!
//! - [`TagCache`] - the façade: active-alias selection, the tag index
//!   engine, and passthrough dispatch.
//! - [`ConnectionRegistry`] - lazy, alias-keyed backend handles.
//! - [`AliasResult`] - fan-out aggregation: one active alias comes back
//!   unwrapped, several come back keyed by alias.
//! - Backends plug in through `tagcache_store`'s `StoreBackend` and
//!   `Connector` traits.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use tagcache::{CacheConfig, ConnectionConfig, MemoryConnector, TagCache};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> tagcache::CacheResult<()> {
//! let mut aliases = HashMap::new();
//! aliases.insert("cache1".to_string(), ConnectionConfig::new("127.0.0.1", 6379));
//! let cache = TagCache::new(
//!     CacheConfig::new(aliases)?,
//!     Arc::new(MemoryConnector::new()),
//! );
//!
//! cache.open_connections(&["cache1"]).await?;
//! cache.set_by_tag(&["users"], "user:1", "Alice").await?;
//! let users = cache.get_by_tag(&["users"]).await?;
//! assert!(users.into_single().is_some());
//! cache.delete_by_tag(&["users"]).await?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod cache;
pub mod instance;
pub mod registry;

pub use aggregate::AliasResult;
pub use cache::{TagCache, TagValues};
pub use instance::{create, instance, reset_instance};
pub use registry::ConnectionRegistry;

// Re-export the types callers need to configure and extend the cache.
pub use tagcache_core::{
    BackendError, BackendResult, CacheConfig, CacheError, CacheResult, CacheValue,
    ConnectionConfig,
};
pub use tagcache_store::{Connector, MemoryBackend, MemoryConnector, StoreBackend};

#[cfg(feature = "redis")]
pub use tagcache_store::{RedisBackend, RedisConnector};
