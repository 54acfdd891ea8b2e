//! The tag-indexed cache façade.
//!
//! A [`TagCache`] groups primary cache entries under named tags so a
//! whole group can be retrieved or invalidated at once, on top of
//! backends that have no native tagging. Each tag is stored as an
//! ordinary backend key whose value is the ordered list of member keys.
//!
//! Every operation fans out over the active alias set selected by the
//! most recent [`TagCache::open_connections`] call, sequentially:
//! aliases in order, tags in order within an alias. Later tag
//! operations on a connection may observe state written by earlier ones
//! in the same call, so this ordering is part of the contract.
//!
//! # Consistency
//!
//! The read-modify-write on a tag's member list is not atomic with
//! respect to other writers of the same tag; concurrent adds can lose
//! an update. The index errs toward over-inclusion: a stale entry only
//! causes a redundant future delete, never data loss. See the method
//! docs for which failures fold into a `bool` and which unwind.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use tagcache_core::{CacheConfig, CacheError, CacheResult, CacheValue};
use tagcache_store::{Connector, StoreBackend};

use crate::aggregate::AliasResult;
use crate::registry::ConnectionRegistry;

/// Values of the member keys of one or more tags, keyed by tag name.
pub type TagValues = HashMap<String, Vec<CacheValue>>;

/// Tag-indexed caching façade over one or more backend connections.
pub struct TagCache {
    registry: ConnectionRegistry,
    active: RwLock<Vec<String>>,
}

impl std::fmt::Debug for TagCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagCache")
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl TagCache {
    /// Build a cache instance over a validated configuration.
    ///
    /// Connections are not opened here; call
    /// [`TagCache::open_connections`] to select the active alias set.
    pub fn new(config: CacheConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            registry: ConnectionRegistry::new(config, connector),
            active: RwLock::new(Vec::new()),
        }
    }

    /// Select the alias set all subsequent operations fan out over.
    ///
    /// Ensures a live connection per alias (connecting lazily via the
    /// registry), then REPLACES the previous active set. Duplicate
    /// aliases collapse to their first occurrence. Fails with
    /// [`CacheError::EmptyAlias`] on an empty slice and
    /// [`CacheError::MissingConfig`] on an unconfigured alias, leaving
    /// the previous active set in place.
    pub async fn open_connections(&self, aliases: &[&str]) -> CacheResult<()> {
        if aliases.is_empty() {
            return Err(CacheError::EmptyAlias);
        }

        let selected = dedupe_preserving_order(aliases);
        for alias in &selected {
            self.registry.connection(alias).await?;
        }

        *self.active.write().expect("active alias lock poisoned") = selected;
        Ok(())
    }

    /// The currently active aliases, in selection order.
    pub fn active_aliases(&self) -> Vec<String> {
        self.active.read().expect("active alias lock poisoned").clone()
    }

    /// The backend handle for `alias`, connecting on first use.
    ///
    /// Does not change the active alias set; use it for direct reads
    /// beside the tag operations.
    pub async fn connection(&self, alias: &str) -> CacheResult<Arc<dyn StoreBackend>> {
        self.registry.connection(alias).await
    }

    async fn active_connections(&self) -> CacheResult<Vec<(String, Arc<dyn StoreBackend>)>> {
        let aliases = self.active_aliases();
        let mut connections = Vec::with_capacity(aliases.len());
        for alias in aliases {
            let backend = self.registry.connection(&alias).await?;
            connections.push((alias, backend));
        }
        Ok(connections)
    }

    /// Read a tag's member-key list. An absent tag reads as empty.
    async fn tag_members(backend: &dyn StoreBackend, tag: &str) -> CacheResult<Vec<String>> {
        Ok(backend
            .get(tag)
            .await?
            .map(CacheValue::into_list)
            .unwrap_or_default())
    }

    /// Delete every member key of the given tags, then the tags
    /// themselves, on every active connection.
    ///
    /// Best-effort: an individual delete failure flips the result to
    /// `false` (and logs) but the walk continues, so one unreachable
    /// key cannot block invalidation of the rest. Member keys that no
    /// longer exist are NOT failures: the index is routinely
    /// over-inclusive (repeated sets, members shared with an already
    /// invalidated tag), and a stale entry costs nothing to "delete"
    /// again. Member-list reads still unwind on backend errors.
    pub async fn delete_by_tag(&self, tags: &[&str]) -> CacheResult<bool> {
        let mut all_deleted = true;
        for (alias, backend) in self.active_connections().await? {
            for &tag in tags {
                let members = Self::tag_members(backend.as_ref(), tag).await?;
                if !members.is_empty() {
                    if let Err(error) = backend.delete_many(&members).await {
                        tracing::warn!(%alias, tag, %error, "member key delete failed");
                        all_deleted = false;
                    }
                }
                match backend.delete(tag).await {
                    Ok(true) => {}
                    Ok(false) => {
                        all_deleted = false;
                    }
                    Err(error) => {
                        tracing::warn!(%alias, tag, %error, "tag key delete failed");
                        all_deleted = false;
                    }
                }
            }
        }
        Ok(all_deleted)
    }

    /// Read the values of every member key of the given tags.
    ///
    /// Member keys missing from the primary store are skipped, and a
    /// tag with no members yields an empty vec. With exactly one
    /// active alias the per-tag mapping comes back unwrapped.
    pub async fn get_by_tag(&self, tags: &[&str]) -> CacheResult<AliasResult<TagValues>> {
        let mut results: BTreeMap<String, TagValues> = BTreeMap::new();
        for (alias, backend) in self.active_connections().await? {
            let mut per_tag = TagValues::new();
            for &tag in tags {
                let members = Self::tag_members(backend.as_ref(), tag).await?;
                let values = if members.is_empty() {
                    Vec::new()
                } else {
                    backend
                        .get_many(&members)
                        .await?
                        .into_iter()
                        .flatten()
                        .collect()
                };
                per_tag.insert(tag.to_string(), values);
            }
            results.insert(alias, per_tag);
        }
        Ok(AliasResult::from_results(results))
    }

    /// Register keys under the given tags without writing their values.
    ///
    /// Per connection and tag: snapshot the member list, append every
    /// key absent from that snapshot, and write the list back only if
    /// something was appended. Membership is tested against the
    /// snapshot, not the list being built, so duplicates within `keys`
    /// are appended as-is. Not atomic across concurrent writers of the
    /// same tag.
    pub async fn add_key_to_tag(&self, tags: &[&str], keys: &[&str]) -> CacheResult<bool> {
        for (_alias, backend) in self.active_connections().await? {
            for &tag in tags {
                let snapshot = Self::tag_members(backend.as_ref(), tag).await?;
                let mut merged = snapshot.clone();
                let mut appended = false;
                for &key in keys {
                    if !snapshot.iter().any(|member| member == key) {
                        merged.push(key.to_string());
                        appended = true;
                    }
                }
                if appended {
                    backend.set(tag, &CacheValue::List(merged)).await?;
                }
            }
        }
        Ok(true)
    }

    /// Write `key -> value` and register `key` under the given tags.
    pub async fn set_by_tag(
        &self,
        tags: &[&str],
        key: &str,
        value: impl Into<CacheValue>,
    ) -> CacheResult<bool> {
        let entries = [(key.to_string(), value.into())];
        self.set_entries_by_tag(tags, &entries).await
    }

    /// Write several entries and register their keys under the given
    /// tags.
    ///
    /// Per connection: each tag's member list is read, extended with
    /// every entry key UNCONDITIONALLY (no membership check - repeated
    /// sets duplicate index entries, which only cost redundant deletes
    /// later), and written back; the index write's `bool` result is
    /// deliberately not checked, asymmetric from [`Self::delete_by_tag`].
    /// Then the primary entries are written; any primary write
    /// reporting failure flips the result to `false`.
    pub async fn set_entries_by_tag(
        &self,
        tags: &[&str],
        entries: &[(String, CacheValue)],
    ) -> CacheResult<bool> {
        let mut all_written = true;
        for (_alias, backend) in self.active_connections().await? {
            for &tag in tags {
                let mut members = Self::tag_members(backend.as_ref(), tag).await?;
                members.extend(entries.iter().map(|(key, _)| key.clone()));
                let _ = backend.set(tag, &CacheValue::List(members)).await?;
            }
            for (key, value) in entries {
                if !backend.set(key, value).await? {
                    all_written = false;
                }
            }
        }
        Ok(all_written)
    }

    /// Forward a backend-specific operation to every active connection.
    ///
    /// Each backend is checked for the capability first; an unsupported
    /// operation fails with [`CacheError::UnknownOperation`] naming the
    /// backend kind and the operation, before anything is invoked on
    /// that connection.
    pub async fn invoke(
        &self,
        operation: &str,
        args: &[CacheValue],
    ) -> CacheResult<AliasResult<CacheValue>> {
        let mut results = BTreeMap::new();
        for (alias, backend) in self.active_connections().await? {
            if !backend.supports(operation) {
                return Err(CacheError::UnknownOperation {
                    backend: backend.kind().to_string(),
                    operation: operation.to_string(),
                });
            }
            results.insert(alias, backend.invoke(operation, args).await?);
        }
        Ok(AliasResult::from_results(results))
    }
}

/// Collapse duplicate aliases to their first occurrence, keeping order.
fn dedupe_preserving_order(aliases: &[&str]) -> Vec<String> {
    let mut selected: Vec<String> = Vec::with_capacity(aliases.len());
    for &alias in aliases {
        if !selected.iter().any(|a| a == alias) {
            selected.push(alias.to_string());
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap as StdHashMap;
    use tagcache_core::ConnectionConfig;
    use tagcache_store::MemoryConnector;

    fn cache_with_aliases(aliases: &[&str]) -> TagCache {
        let mut config = StdHashMap::new();
        for (i, alias) in aliases.iter().enumerate() {
            config.insert(
                (*alias).to_string(),
                ConnectionConfig::new("127.0.0.1", 6379 + i as u16),
            );
        }
        TagCache::new(
            CacheConfig::new(config).unwrap(),
            Arc::new(MemoryConnector::new()),
        )
    }

    #[tokio::test]
    async fn open_with_empty_alias_list_fails() {
        let cache = cache_with_aliases(&["cache1"]);
        assert!(matches!(
            cache.open_connections(&[]).await,
            Err(CacheError::EmptyAlias)
        ));
    }

    #[tokio::test]
    async fn open_with_unconfigured_alias_fails() {
        let cache = cache_with_aliases(&["cache1"]);
        let err = cache.open_connections(&["nope"]).await.unwrap_err();
        assert!(matches!(err, CacheError::MissingConfig { alias } if alias == "nope"));
    }

    #[tokio::test]
    async fn open_deduplicates_aliases_preserving_order() {
        let cache = cache_with_aliases(&["a", "b"]);
        cache.open_connections(&["b", "a", "b"]).await.unwrap();
        assert_eq!(cache.active_aliases(), vec!["b".to_string(), "a".to_string()]);
    }

    #[tokio::test]
    async fn failed_open_keeps_previous_active_set() {
        let cache = cache_with_aliases(&["a"]);
        cache.open_connections(&["a"]).await.unwrap();
        assert!(cache.open_connections(&["missing"]).await.is_err());
        assert_eq!(cache.active_aliases(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn add_checks_membership_against_snapshot_not_merged_list() {
        let cache = cache_with_aliases(&["cache1"]);
        cache.open_connections(&["cache1"]).await.unwrap();

        // Both copies pass the snapshot check in a single call.
        cache
            .add_key_to_tag(&["users"], &["user:1", "user:1"])
            .await
            .unwrap();

        // A second call sees them in the snapshot and appends nothing.
        cache.add_key_to_tag(&["users"], &["user:1"]).await.unwrap();

        let backend = cache.registry.connection("cache1").await.unwrap();
        let members = backend.get("users").await.unwrap().unwrap().into_list();
        assert_eq!(members, vec!["user:1".to_string(), "user:1".to_string()]);
    }

    proptest! {
        #[test]
        fn dedupe_keeps_first_occurrence_order(
            aliases in prop::collection::vec("[a-c]", 0..8)
        ) {
            let borrowed: Vec<&str> = aliases.iter().map(String::as_str).collect();
            let selected = dedupe_preserving_order(&borrowed);

            // Every input alias survives exactly once.
            for alias in &aliases {
                prop_assert_eq!(selected.iter().filter(|a| *a == alias).count(), 1);
            }
            // Order of first occurrences is preserved.
            let mut firsts = Vec::new();
            for alias in &aliases {
                if !firsts.contains(alias) {
                    firsts.push(alias.clone());
                }
            }
            prop_assert_eq!(selected, firsts);
        }
    }

    #[tokio::test]
    async fn operations_over_empty_active_set_are_neutral() {
        let cache = cache_with_aliases(&["cache1"]);

        assert!(cache.delete_by_tag(&["users"]).await.unwrap());
        assert!(cache.add_key_to_tag(&["users"], &["k"]).await.unwrap());
        let result = cache.get_by_tag(&["users"]).await.unwrap();
        assert_eq!(result, AliasResult::PerAlias(BTreeMap::new()));
    }
}
