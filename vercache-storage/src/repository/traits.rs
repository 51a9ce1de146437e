//! Byte-level repository contract.
//!
//! A repository stores opaque byte payloads under fully-qualified keys. It
//! never looks inside a payload; JSON handling lives one layer up in the
//! cache facade.

use std::collections::HashMap;

use async_trait::async_trait;
use vercache_core::{CacheResult, ExpireSecs};

/// Store-backed cache repository.
///
/// Every method acquires a store connection for exactly the duration of the
/// call and releases it on every exit path. Store failures are returned as
/// [`vercache_core::CacheError::Store`]; nothing is retried here.
///
/// # Pattern Syntax
///
/// [`delete_pattern`](CacheRepository::delete_pattern) uses the store's glob
/// matcher:
/// - `h?llo` matches `hello`, `hallo` and `hxllo`
/// - `h*llo` matches `hllo` and `heeeello`
/// - `h[ae]llo` matches `hello` and `hallo`, but not `hillo`
/// - `h[^e]llo` matches `hallo`, `hbllo`, ... but not `hello`
/// - `h[a-b]llo` matches `hallo` and `hbllo`
/// - `\` escapes the character that follows it
#[async_trait]
pub trait CacheRepository: Send + Sync {
    /// Set `key` to `value`, expiring after `expire` seconds.
    async fn set(&self, key: &str, value: &[u8], expire: ExpireSecs) -> CacheResult<()>;

    /// Set `key` only if it does not exist, as one atomic store command.
    ///
    /// Returns `false` when the key already exists, `true` when written.
    async fn set_if_absent(&self, key: &str, value: &[u8], expire: ExpireSecs)
        -> CacheResult<bool>;

    /// Write every pair with the same expiration, all or nothing.
    async fn set_many(
        &self,
        data: &HashMap<String, Vec<u8>>,
        expire: ExpireSecs,
    ) -> CacheResult<()>;

    /// Read the value at `key`, or `None` if it does not exist.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Read several keys. The result has the same length and order as `keys`.
    async fn get_many(&self, keys: &[String]) -> CacheResult<Vec<Option<Vec<u8>>>>;

    /// Remove `key`. Returns 1 if it existed, 0 otherwise.
    async fn delete(&self, key: &str) -> CacheResult<u64>;

    /// Remove several keys. Returns how many actually existed.
    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64>;

    /// Remove every key matching `pattern`. Returns how many were removed.
    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64>;

    /// Check that the store answers.
    async fn health_check(&self) -> CacheResult<bool>;
}
