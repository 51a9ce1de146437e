//! vercache Core - Keys, Codec, Configuration and Errors
//!
//! Pure building blocks shared by every vercache crate. Nothing in here
//! talks to a store.

pub mod codec;
mod config;
mod error;
mod key;

pub use codec::{decode, decode_as, encode};
pub use config::{redact_dsn, CacheConfig, DEFAULT_SCAN_COUNT};
pub use error::{CacheError, CacheResult, ConfigError, StoreError};
pub use key::{KeyScheme, Version, DEFAULT_KEY_PREFIX, DEFAULT_VERSION};

/// Expiration in seconds, enforced by the store.
pub type ExpireSecs = u64;
