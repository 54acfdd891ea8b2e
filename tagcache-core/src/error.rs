//! Error types for tagcache operations

use thiserror::Error;

/// Errors produced by a store backend.
///
/// Backends translate their transport- and encoding-level failures into
/// this enum so the façade never depends on a concrete client's error
/// type.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Failed to connect to {host}:{port}: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Protocol error: {reason}")]
    Protocol { reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced to callers of the cache façade.
///
/// All variants unwind the whole call at the point of detection; the
/// one deliberate exception is the best-effort delete walk inside
/// `delete_by_tag`, which folds individual backend delete failures into
/// a boolean result instead of raising.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Construction was attempted with an empty configuration.
    #[error("Empty cache configuration")]
    EmptyConfig,

    /// The process-wide instance was requested before being created.
    #[error("Cache instance has not been created yet")]
    NoInstance,

    /// An operation was given an empty alias list.
    #[error("Empty connection alias list")]
    EmptyAlias,

    /// An alias has no matching configuration entry.
    #[error("No configuration entry for alias \"{alias}\"")]
    MissingConfig { alias: String },

    /// A passthrough call named an operation the backend does not expose.
    #[error("Backend \"{backend}\" does not support operation \"{operation}\"")]
    UnknownOperation { backend: String, operation: String },

    /// A backend call failed outright.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Result alias for façade operations.
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_names_the_alias() {
        let err = CacheError::MissingConfig {
            alias: "sessions".to_string(),
        };
        assert!(err.to_string().contains("\"sessions\""));
    }

    #[test]
    fn unknown_operation_names_backend_and_operation() {
        let err = CacheError::UnknownOperation {
            backend: "memory".to_string(),
            operation: "bitcount".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("memory"));
        assert!(msg.contains("bitcount"));
    }

    #[test]
    fn backend_error_converts_into_cache_error() {
        let backend = BackendError::Protocol {
            reason: "short read".to_string(),
        };
        let err: CacheError = backend.into();
        assert!(matches!(err, CacheError::Backend(_)));
    }
}
