//! JSON-aware cache contract.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use vercache_core::{CacheResult, ExpireSecs, Version};

/// Versioned JSON cache over logical keys.
///
/// Every operation takes an optional `version` that overrides the configured
/// default for that call only. Absent keys are `None`, never an error.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Encode `value` and store it under `key`.
    async fn set<T>(
        &self,
        key: &str,
        value: &T,
        expire: ExpireSecs,
        version: Option<&Version>,
    ) -> CacheResult<()>
    where
        T: Serialize + ?Sized + Sync;

    /// Store `value` only if `key` is not already set.
    async fn set_if_absent<T>(
        &self,
        key: &str,
        value: &T,
        expire: ExpireSecs,
        version: Option<&Version>,
    ) -> CacheResult<bool>
    where
        T: Serialize + ?Sized + Sync;

    /// Encode every value, then write the whole batch atomically.
    async fn set_many<T>(
        &self,
        data: &HashMap<String, T>,
        expire: ExpireSecs,
        version: Option<&Version>,
    ) -> CacheResult<()>
    where
        T: Serialize + Sync;

    async fn get(&self, key: &str, version: Option<&Version>) -> CacheResult<Option<Value>>;

    /// Read several keys, aligned with `keys`.
    ///
    /// Fails as a whole if any stored value does not decode.
    async fn get_many(
        &self,
        keys: &[String],
        version: Option<&Version>,
    ) -> CacheResult<Vec<Option<Value>>>;

    async fn delete(&self, key: &str, version: Option<&Version>) -> CacheResult<u64>;

    async fn delete_many(&self, keys: &[String], version: Option<&Version>) -> CacheResult<u64>;

    /// Remove every key whose logical part matches the glob `pattern`.
    async fn delete_pattern(&self, pattern: &str, version: Option<&Version>) -> CacheResult<u64>;
}
