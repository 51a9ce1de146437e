//! Versioned JSON cache over any [`CacheRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use vercache_core::{
    decode, decode_as, encode, CacheConfig, CacheResult, ExpireSecs, KeyScheme, Version,
};

use super::traits::Cache;
use crate::repository::{CacheRepository, RedisRepository};

/// JSON cache facade.
///
/// Derives `{prefix}:{version}:{key}` store keys from logical keys, encodes
/// values as compact JSON and delegates to the repository. The key scheme is
/// fixed at construction; per-call versions override only the version segment.
///
/// # Example
///
/// ```ignore
/// let cache = JsonCache::connect(&CacheConfig::from_env()?).await?;
///
/// cache.set("user:42", &json!({"name": "Ada"}), 300, None).await?;
/// let user = cache.get("user:42", None).await?;
///
/// // Drop every user entry cached under version 1
/// cache.delete_pattern("user:*", Some(&Version::from(1))).await?;
/// ```
#[derive(Debug)]
pub struct JsonCache<R>
where
    R: CacheRepository,
{
    repository: Arc<R>,
    keys: KeyScheme,
}

impl<R> Clone for JsonCache<R>
where
    R: CacheRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            keys: self.keys.clone(),
        }
    }
}

impl<R> JsonCache<R>
where
    R: CacheRepository,
{
    pub fn new(repository: R, keys: KeyScheme) -> Self {
        Self::from_shared(Arc::new(repository), keys)
    }

    /// Build a facade over a repository shared with other facades.
    pub fn from_shared(repository: Arc<R>, keys: KeyScheme) -> Self {
        Self { repository, keys }
    }

    /// Facade with the `cache` prefix and version 1.
    pub fn with_defaults(repository: R) -> Self {
        Self::new(repository, KeyScheme::default())
    }

    pub fn key_scheme(&self) -> &KeyScheme {
        &self.keys
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// The store key a logical key maps to.
    pub fn make_key(&self, key: &str, version: Option<&Version>) -> String {
        self.keys.make_key(key, version)
    }

    /// Read `key` and decode it into `T`.
    ///
    /// A stored value whose shape does not fit `T` is a decode error.
    pub async fn get_as<T>(&self, key: &str, version: Option<&Version>) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let store_key = self.make_key(key, version);
        match self.repository.get(&store_key).await? {
            Some(payload) => decode_as(&payload).map(Some),
            None => Ok(None),
        }
    }

    /// Typed counterpart of [`Cache::get_many`].
    pub async fn get_many_as<T>(
        &self,
        keys: &[String],
        version: Option<&Version>,
    ) -> CacheResult<Vec<Option<T>>>
    where
        T: DeserializeOwned,
    {
        let store_keys = self.keys.make_keys(keys, version);
        self.repository
            .get_many(&store_keys)
            .await?
            .into_iter()
            .map(|payload| payload.map(|p| decode_as(&p)).transpose())
            .collect()
    }

    /// Check that the backing store answers.
    pub async fn health_check(&self) -> CacheResult<bool> {
        self.repository.health_check().await
    }
}

impl JsonCache<RedisRepository> {
    /// Connect to the store named by `config` and build a facade for it.
    ///
    /// # Errors
    ///
    /// Returns a config error if `config` does not validate, or a store error
    /// if the DSN is malformed or the server cannot be reached.
    pub async fn connect(config: &CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        let repository = RedisRepository::connect(&config.dsn)
            .await?
            .with_scan_count(config.scan_count);
        Ok(Self::new(repository, config.key_scheme()))
    }
}

#[async_trait]
impl<R> Cache for JsonCache<R>
where
    R: CacheRepository,
{
    async fn set<T>(
        &self,
        key: &str,
        value: &T,
        expire: ExpireSecs,
        version: Option<&Version>,
    ) -> CacheResult<()>
    where
        T: Serialize + ?Sized + Sync,
    {
        let payload = encode(value)?;
        let store_key = self.make_key(key, version);
        tracing::debug!(key = %store_key, expire, "Cache set");
        self.repository.set(&store_key, &payload, expire).await
    }

    async fn set_if_absent<T>(
        &self,
        key: &str,
        value: &T,
        expire: ExpireSecs,
        version: Option<&Version>,
    ) -> CacheResult<bool>
    where
        T: Serialize + ?Sized + Sync,
    {
        let payload = encode(value)?;
        let store_key = self.make_key(key, version);
        let written = self
            .repository
            .set_if_absent(&store_key, &payload, expire)
            .await?;
        tracing::debug!(key = %store_key, written, "Cache set_if_absent");
        Ok(written)
    }

    async fn set_many<T>(
        &self,
        data: &HashMap<String, T>,
        expire: ExpireSecs,
        version: Option<&Version>,
    ) -> CacheResult<()>
    where
        T: Serialize + Sync,
    {
        // Encode everything first so a bad value never reaches the store.
        let mut encoded = HashMap::with_capacity(data.len());
        for (key, value) in data {
            encoded.insert(self.make_key(key, version), encode(value)?);
        }
        tracing::debug!(keys = encoded.len(), expire, "Cache set_many");
        self.repository.set_many(&encoded, expire).await
    }

    async fn get(&self, key: &str, version: Option<&Version>) -> CacheResult<Option<Value>> {
        let store_key = self.make_key(key, version);
        let payload = self.repository.get(&store_key).await?;
        tracing::debug!(key = %store_key, hit = payload.is_some(), "Cache get");
        payload.map(|p| decode(&p)).transpose()
    }

    async fn get_many(
        &self,
        keys: &[String],
        version: Option<&Version>,
    ) -> CacheResult<Vec<Option<Value>>> {
        let store_keys = self.keys.make_keys(keys, version);
        let payloads = self.repository.get_many(&store_keys).await?;
        tracing::debug!(
            keys = store_keys.len(),
            hits = payloads.iter().filter(|p| p.is_some()).count(),
            "Cache get_many"
        );
        payloads
            .into_iter()
            .map(|payload| payload.map(|p| decode(&p)).transpose())
            .collect()
    }

    async fn delete(&self, key: &str, version: Option<&Version>) -> CacheResult<u64> {
        let store_key = self.make_key(key, version);
        let removed = self.repository.delete(&store_key).await?;
        tracing::debug!(key = %store_key, removed, "Cache delete");
        Ok(removed)
    }

    async fn delete_many(&self, keys: &[String], version: Option<&Version>) -> CacheResult<u64> {
        let store_keys = self.keys.make_keys(keys, version);
        let removed = self.repository.delete_many(&store_keys).await?;
        tracing::debug!(keys = store_keys.len(), removed, "Cache delete_many");
        Ok(removed)
    }

    async fn delete_pattern(&self, pattern: &str, version: Option<&Version>) -> CacheResult<u64> {
        let store_pattern = self.make_key(pattern, version);
        self.repository.delete_pattern(&store_pattern).await
    }
}
