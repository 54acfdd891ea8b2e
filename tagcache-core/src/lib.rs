//! tagcache core - shared types for the tagcache workspace
//!
//! Defines the configuration, value and error types used by both the
//! backend abstraction (`tagcache-store`) and the caller-facing façade
//! (`tagcache`). This crate performs no I/O.

pub mod config;
pub mod error;
pub mod value;

pub use config::{CacheConfig, ConnectionConfig};
pub use error::{BackendError, BackendResult, CacheError, CacheResult};
pub use value::CacheValue;
