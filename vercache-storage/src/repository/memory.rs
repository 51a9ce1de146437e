//! In-process repository for tests and local development.
//!
//! Entries live in a `HashMap` behind an `RwLock`. Expirations are honoured
//! lazily: an expired entry is invisible to reads, and every operation that
//! takes the write lock sweeps expired entries out of the map. Pattern deletes
//! use [`GlobPattern`], which mirrors the store's matcher.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use vercache_core::{CacheResult, ExpireSecs, StoreError, DEFAULT_SCAN_COUNT};

use super::pattern::GlobPattern;
use super::traits::CacheRepository;

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// In-memory [`CacheRepository`].
///
/// Cloning shares the underlying map, so clones observe each other's writes.
#[derive(Debug, Clone)]
pub struct MemoryRepository {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    scan_count: usize,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            scan_count: DEFAULT_SCAN_COUNT,
        }
    }

    /// Set how many keys a pattern delete removes per batch.
    pub fn with_scan_count(mut self, scan_count: usize) -> Self {
        self.scan_count = scan_count.max(1);
        self
    }

    /// Number of live entries.
    pub fn len(&self) -> CacheResult<usize> {
        let now = Utc::now();
        let entries = self.read()?;
        Ok(entries.values().filter(|e| e.is_live(now)).count())
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Remaining time to live of `key`, or `None` if it does not exist.
    pub fn ttl(&self, key: &str) -> CacheResult<Option<Duration>> {
        let now = Utc::now();
        let entries = self.read()?;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .and_then(|e| (e.expires_at - now).to_std().ok()))
    }

    /// Remove every entry.
    pub fn clear(&self) -> CacheResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn read(&self) -> CacheResult<RwLockReadGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .read()
            .map_err(|_| StoreError::LockPoisoned.into())
    }

    fn write(&self) -> CacheResult<RwLockWriteGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned.into())
    }
}

/// Resolve an expiration the way the store does: zero is rejected.
fn expiry_deadline(
    command: &str,
    expire: ExpireSecs,
    now: DateTime<Utc>,
) -> CacheResult<DateTime<Utc>> {
    let invalid = || StoreError::CommandFailed {
        command: command.to_string(),
        reason: format!("invalid expire time {}", expire),
    };
    if expire == 0 {
        return Err(invalid().into());
    }
    let secs = i64::try_from(expire).map_err(|_| invalid())?;
    chrono::Duration::try_seconds(secs)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| invalid().into())
}

/// Drop every entry whose expiration has passed.
fn purge_expired(entries: &mut HashMap<String, Entry>, now: DateTime<Utc>) {
    entries.retain(|_, entry| entry.is_live(now));
}

/// Remove `key` if it holds a live entry, reporting whether it did.
fn remove_live(entries: &mut HashMap<String, Entry>, key: &str, now: DateTime<Utc>) -> bool {
    match entries.remove(key) {
        Some(entry) => entry.is_live(now),
        None => false,
    }
}

#[async_trait]
impl CacheRepository for MemoryRepository {
    async fn set(&self, key: &str, value: &[u8], expire: ExpireSecs) -> CacheResult<()> {
        let now = Utc::now();
        let expires_at = expiry_deadline("SET", expire, now)?;
        let mut entries = self.write()?;
        purge_expired(&mut entries, now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &[u8],
        expire: ExpireSecs,
    ) -> CacheResult<bool> {
        let now = Utc::now();
        let expires_at = expiry_deadline("SET", expire, now)?;
        let mut entries = self.write()?;
        purge_expired(&mut entries, now);
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at,
            },
        );
        Ok(true)
    }

    async fn set_many(
        &self,
        data: &HashMap<String, Vec<u8>>,
        expire: ExpireSecs,
    ) -> CacheResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let expires_at = expiry_deadline("SET", expire, now)?;
        let mut entries = self.write()?;
        purge_expired(&mut entries, now);
        for (key, value) in data {
            entries.insert(
                key.clone(),
                Entry {
                    value: value.clone(),
                    expires_at,
                },
            );
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = Utc::now();
        let entries = self.read()?;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn get_many(&self, keys: &[String]) -> CacheResult<Vec<Option<Vec<u8>>>> {
        let now = Utc::now();
        let entries = self.read()?;
        Ok(keys
            .iter()
            .map(|key| {
                entries
                    .get(key)
                    .filter(|e| e.is_live(now))
                    .map(|e| e.value.clone())
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        let now = Utc::now();
        let mut entries = self.write()?;
        Ok(u64::from(remove_live(&mut entries, key, now)))
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        let now = Utc::now();
        let mut entries = self.write()?;
        let removed = keys
            .iter()
            .filter(|key| remove_live(&mut entries, key, now))
            .count();
        Ok(removed as u64)
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let glob = GlobPattern::new(pattern)?;
        let now = Utc::now();

        let matching: Vec<String> = {
            let mut entries = self.write()?;
            purge_expired(&mut entries, now);
            entries
                .keys()
                .filter(|key| glob.matches(key))
                .cloned()
                .collect()
        };

        let mut removed = 0u64;
        for batch in matching.chunks(self.scan_count) {
            let mut entries = self.write()?;
            removed += batch
                .iter()
                .filter(|key| remove_live(&mut entries, key, now))
                .count() as u64;
            tracing::trace!(
                pattern = glob.as_str(),
                batch = batch.len(),
                "Deleted pattern batch"
            );
        }

        tracing::debug!(pattern = glob.as_str(), removed, "Pattern delete finished");
        Ok(removed)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let _entries = self.read()?;
        Ok(true)
    }
}
