//! tagcache store - backend abstraction and implementations
//!
//! Defines the [`StoreBackend`] trait the cache façade operates
//! against, the [`Connector`] factory it uses to open connections
//! lazily, an in-memory backend for tests and local development, and an
//! optional Redis backend behind the `redis` feature.

pub mod backend;
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis;

pub use backend::{Connector, StoreBackend};
pub use memory::{MemoryBackend, MemoryConnector};

#[cfg(feature = "redis")]
pub use crate::redis::{RedisBackend, RedisConnector};
