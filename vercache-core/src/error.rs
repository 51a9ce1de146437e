//! Error types for vercache operations

use thiserror::Error;

/// Failures reported by the key-value store collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// `dsn` is stored with its password masked.
    #[error("Invalid store DSN {dsn}: {reason}")]
    InvalidDsn { dsn: String, reason: String },

    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Store command {command} failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Whether the failure is an infrastructure hiccup a caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all vercache errors.
///
/// `Encode` and `Decode` mean the caller's data is bad; `Store` means the
/// store is unreachable or refused the command. They never wrap each other.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("JSON encode error: {reason}")]
    Encode { reason: String },

    #[error("JSON decode error: {reason}")]
    Decode { reason: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl CacheError {
    /// True for encode and decode failures.
    pub fn is_codec(&self) -> bool {
        matches!(self, CacheError::Encode { .. } | CacheError::Decode { .. })
    }

    /// True for failures raised by the store collaborator.
    pub fn is_store(&self) -> bool {
        matches!(self, CacheError::Store(_))
    }
}

/// Result type alias for vercache operations.
pub type CacheResult<T> = Result<T, CacheError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_command_failed() {
        let err = StoreError::CommandFailed {
            command: "SCAN".to_string(),
            reason: "ERR invalid cursor".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("SCAN"));
        assert!(msg.contains("invalid cursor"));
    }

    #[test]
    fn test_store_error_transient() {
        let unavailable = StoreError::Unavailable {
            reason: "connection refused".to_string(),
        };
        assert!(unavailable.is_transient());
        assert!(!StoreError::LockPoisoned.is_transient());
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "scan_count".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("scan_count"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_cache_error_classification() {
        let encode = CacheError::Encode {
            reason: "unsupported type".to_string(),
        };
        let decode = CacheError::Decode {
            reason: "expected value".to_string(),
        };
        let store = CacheError::from(StoreError::LockPoisoned);

        assert!(encode.is_codec() && !encode.is_store());
        assert!(decode.is_codec() && !decode.is_store());
        assert!(store.is_store() && !store.is_codec());
    }

    #[test]
    fn test_cache_error_from_variants() {
        let config = CacheError::from(ConfigError::MissingRequired {
            field: "dsn".to_string(),
        });
        assert!(matches!(config, CacheError::Config(_)));

        let store = CacheError::from(StoreError::Unavailable {
            reason: "timeout".to_string(),
        });
        assert!(matches!(store, CacheError::Store(_)));
    }
}
