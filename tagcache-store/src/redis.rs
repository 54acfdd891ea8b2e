//! Redis-backed store (feature `redis`).
//!
//! Values are carried as JSON: a scalar round-trips as a JSON string
//! and a member-key list as a JSON array, so the tag index survives in
//! a form other clients can read. A raw non-JSON payload written by
//! another client degrades gracefully to a scalar.

use std::sync::Arc;

use ::async_trait::async_trait;
use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, Client};
use tagcache_core::{BackendError, BackendResult, CacheValue, ConnectionConfig};

use crate::backend::{namespaced, Connector, StoreBackend};

const SUPPORTED_OPS: &[&str] = &["ping", "db_size", "flush_db", "exists", "keys"];

fn protocol_err(e: ::redis::RedisError) -> BackendError {
    BackendError::Protocol {
        reason: e.to_string(),
    }
}

fn encode(value: &CacheValue) -> BackendResult<String> {
    serde_json::to_string(value).map_err(|e| BackendError::Serialization {
        reason: e.to_string(),
    })
}

fn decode(raw: String) -> CacheValue {
    serde_json::from_str(&raw).unwrap_or(CacheValue::Scalar(raw))
}

/// Redis implementation of [`StoreBackend`].
///
/// Holds one multiplexed connection; redis commands take the connection
/// by `&mut`, so each call clones the (cheap) handle.
pub struct RedisBackend {
    namespace: Option<String>,
    connection: MultiplexedConnection,
}

impl RedisBackend {
    fn key(&self, key: &str) -> String {
        namespaced(self.namespace.as_deref(), key)
    }
}

#[async_trait]
impl StoreBackend for RedisBackend {
    fn kind(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> BackendResult<Option<CacheValue>> {
        let mut con = self.connection.clone();
        let raw: Option<String> = con.get(self.key(key)).await.map_err(protocol_err)?;
        Ok(raw.map(decode))
    }

    async fn get_many(&self, keys: &[String]) -> BackendResult<Vec<Option<CacheValue>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut con = self.connection.clone();
        let mut cmd = ::redis::cmd("MGET");
        for key in keys {
            cmd.arg(self.key(key));
        }
        let raw: Vec<Option<String>> = cmd.query_async(&mut con).await.map_err(protocol_err)?;
        Ok(raw.into_iter().map(|v| v.map(decode)).collect())
    }

    async fn set(&self, key: &str, value: &CacheValue) -> BackendResult<bool> {
        let mut con = self.connection.clone();
        let encoded = encode(value)?;
        let _: () = con
            .set(self.key(key), encoded)
            .await
            .map_err(protocol_err)?;
        Ok(true)
    }

    async fn delete(&self, key: &str) -> BackendResult<bool> {
        let mut con = self.connection.clone();
        let removed: i64 = con.del(self.key(key)).await.map_err(protocol_err)?;
        Ok(removed > 0)
    }

    async fn delete_many(&self, keys: &[String]) -> BackendResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut con = self.connection.clone();
        let mut cmd = ::redis::cmd("DEL");
        for key in keys {
            cmd.arg(self.key(key));
        }
        let removed: u64 = cmd.query_async(&mut con).await.map_err(protocol_err)?;
        Ok(removed)
    }

    fn supports(&self, operation: &str) -> bool {
        SUPPORTED_OPS.contains(&operation)
    }

    async fn invoke(&self, operation: &str, args: &[CacheValue]) -> BackendResult<CacheValue> {
        let mut con = self.connection.clone();
        match operation {
            "ping" => {
                let reply: String = ::redis::cmd("PING")
                    .query_async(&mut con)
                    .await
                    .map_err(protocol_err)?;
                Ok(CacheValue::Scalar(reply))
            }
            "db_size" => {
                let size: i64 = ::redis::cmd("DBSIZE")
                    .query_async(&mut con)
                    .await
                    .map_err(protocol_err)?;
                Ok(CacheValue::Scalar(size.to_string()))
            }
            "flush_db" => {
                let reply: String = ::redis::cmd("FLUSHDB")
                    .query_async(&mut con)
                    .await
                    .map_err(protocol_err)?;
                Ok(CacheValue::Scalar(reply))
            }
            "exists" => {
                let key = args
                    .first()
                    .and_then(CacheValue::as_scalar)
                    .ok_or_else(|| BackendError::Protocol {
                        reason: "exists requires a key argument".to_string(),
                    })?;
                let found: i64 = con.exists(self.key(key)).await.map_err(protocol_err)?;
                Ok(CacheValue::Scalar(found.to_string()))
            }
            "keys" => {
                let pattern = args
                    .first()
                    .and_then(CacheValue::as_scalar)
                    .unwrap_or("*");
                let keys: Vec<String> = con
                    .keys(self.key(pattern))
                    .await
                    .map_err(protocol_err)?;
                Ok(CacheValue::List(keys))
            }
            other => Err(BackendError::Protocol {
                reason: format!("unsupported operation \"{other}\""),
            }),
        }
    }
}

/// Connector establishing [`RedisBackend`] connections.
#[derive(Debug, Default)]
pub struct RedisConnector;

impl RedisConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for RedisConnector {
    async fn connect(&self, config: &ConnectionConfig) -> BackendResult<Arc<dyn StoreBackend>> {
        let url = format!("redis://{}:{}/{}", config.host, config.port, config.db);
        let connect_failed = |reason: String| BackendError::Connect {
            host: config.host.clone(),
            port: config.port,
            reason,
        };

        let client = Client::open(url).map_err(|e| connect_failed(e.to_string()))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| connect_failed(e.to_string()))?;

        tracing::debug!(host = %config.host, port = config.port, db = config.db, "opened redis backend");
        Ok(Arc::new(RedisBackend {
            namespace: config.namespace.clone(),
            connection,
        }))
    }
}
