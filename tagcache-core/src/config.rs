//! Configuration types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

/// Connection parameters for one backend alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Logical database index within the backend server.
    #[serde(default)]
    pub db: i64,
    /// Optional prefix applied to every key on this connection.
    #[serde(default)]
    pub namespace: Option<String>,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            db: 0,
            namespace: None,
        }
    }

    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// Mapping from alias to connection parameters.
///
/// Immutable after construction; an empty mapping is rejected because a
/// cache instance without a single configured backend can never serve a
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheConfig {
    aliases: HashMap<String, ConnectionConfig>,
}

impl CacheConfig {
    /// Build a config from an alias map. Fails on an empty map.
    pub fn new(aliases: HashMap<String, ConnectionConfig>) -> CacheResult<Self> {
        if aliases.is_empty() {
            return Err(CacheError::EmptyConfig);
        }
        Ok(Self { aliases })
    }

    /// Parse a config from its JSON representation.
    pub fn from_json(json: &str) -> CacheResult<Self> {
        let aliases: HashMap<String, ConnectionConfig> =
            serde_json::from_str(json).map_err(|e| CacheError::Backend(
                crate::error::BackendError::Serialization {
                    reason: e.to_string(),
                },
            ))?;
        Self::new(aliases)
    }

    /// Look up the configuration entry for an alias.
    pub fn get(&self, alias: &str) -> Option<&ConnectionConfig> {
        self.aliases.get(alias)
    }

    /// Whether an alias has a configuration entry.
    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    /// Iterate over configured aliases.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
