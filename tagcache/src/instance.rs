//! Optional process-wide cache instance.
//!
//! Most callers should construct a [`TagCache`] and thread it through
//! their own context. For hosts that want one shared instance, this
//! module keeps a single optional holder with explicit create, fetch
//! and reset operations so tests can tear it down.

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use tagcache_core::{CacheConfig, CacheError, CacheResult};
use tagcache_store::Connector;

use crate::cache::TagCache;

static INSTANCE: Lazy<RwLock<Option<Arc<TagCache>>>> = Lazy::new(|| RwLock::new(None));

/// Create the process-wide instance, replacing any previous one.
pub fn create(config: CacheConfig, connector: Arc<dyn Connector>) -> Arc<TagCache> {
    let cache = Arc::new(TagCache::new(config, connector));
    *INSTANCE.write().expect("instance lock poisoned") = Some(Arc::clone(&cache));
    cache
}

/// Fetch the process-wide instance with the given aliases opened.
///
/// Fails with [`CacheError::NoInstance`] before [`create`] has run, and
/// propagates alias errors from
/// [`TagCache::open_connections`].
pub async fn instance(aliases: &[&str]) -> CacheResult<Arc<TagCache>> {
    let cache = INSTANCE
        .read()
        .expect("instance lock poisoned")
        .clone()
        .ok_or(CacheError::NoInstance)?;
    cache.open_connections(aliases).await?;
    Ok(cache)
}

/// Drop the process-wide instance. Intended for tests.
pub fn reset_instance() {
    *INSTANCE.write().expect("instance lock poisoned") = None;
}
