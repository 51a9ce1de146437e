//! Redis-backed repository.
//!
//! Built on the `redis` crate's [`ConnectionManager`], a multiplexed handle
//! that reconnects on its own. The manager is created once at startup and
//! passed in; every operation clones it for its own duration, so the handle
//! is released on every exit path, including errors and cancellation.
//!
//! # Commands
//!
//! | operation        | command(s)                                   |
//! |------------------|----------------------------------------------|
//! | `set`            | `SET key value EX expire`                    |
//! | `set_if_absent`  | `SET key value NX EX expire`                 |
//! | `set_many`       | `MULTI`, `SET key value EX expire` ..., `EXEC` |
//! | `get`            | `GET`                                        |
//! | `get_many`       | `MGET`                                       |
//! | `delete(_many)`  | `DEL`                                        |
//! | `delete_pattern` | `SCAN cursor MATCH pattern COUNT n` + `DEL`  |

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};
use vercache_core::{
    redact_dsn, CacheError, CacheResult, ExpireSecs, StoreError, DEFAULT_SCAN_COUNT,
};

use super::traits::CacheRepository;

/// Map a driver error onto the store taxonomy.
///
/// Transport-level failures become [`StoreError::Unavailable`]; anything the
/// server answered with becomes [`StoreError::CommandFailed`].
fn store_error(command: &str, err: RedisError) -> CacheError {
    let reason = err.to_string();
    let store = if err.is_io_error()
        || err.is_timeout()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
    {
        StoreError::Unavailable { reason }
    } else {
        StoreError::CommandFailed {
            command: command.to_string(),
            reason,
        }
    };
    store.into()
}

/// [`CacheRepository`] backed by a Redis server.
#[derive(Clone)]
pub struct RedisRepository {
    connection: ConnectionManager,
    scan_count: usize,
}

impl fmt::Debug for RedisRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisRepository")
            .field("connection", &"<ConnectionManager>")
            .field("scan_count", &self.scan_count)
            .finish()
    }
}

impl RedisRepository {
    /// Wrap an existing connection manager.
    ///
    /// Share one manager between every repository that talks to the same
    /// server; it is cheap to clone and safe for concurrent use.
    pub fn new(connection: ConnectionManager) -> Self {
        Self {
            connection,
            scan_count: DEFAULT_SCAN_COUNT,
        }
    }

    /// Open a client for `dsn` and build a connection manager for it.
    ///
    /// The password in `dsn` never appears in errors or log events.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidDsn`] if the DSN cannot be parsed
    /// - [`StoreError::Unavailable`] if the server cannot be reached
    pub async fn connect(dsn: &str) -> CacheResult<Self> {
        let client = redis::Client::open(dsn).map_err(|e| StoreError::InvalidDsn {
            dsn: redact_dsn(dsn),
            reason: e.to_string(),
        })?;
        let addr = client.get_connection_info().addr.to_string();

        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| StoreError::Unavailable {
                reason: format!("failed to connect to {}: {}", addr, e),
            })?;

        tracing::debug!(%addr, "Connected to Redis");
        Ok(Self::new(connection))
    }

    /// Set the COUNT hint sent with every SCAN.
    pub fn with_scan_count(mut self, scan_count: usize) -> Self {
        self.scan_count = scan_count.max(1);
        self
    }

    /// Remaining time to live of `key`.
    ///
    /// `None` if the key does not exist or carries no expiration.
    pub async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>> {
        let mut conn = self.connection();
        // -2 for a missing key, -1 for a key without expiration.
        let secs: i64 = redis::cmd("TTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("TTL", e))?;
        Ok(u64::try_from(secs).ok().map(Duration::from_secs))
    }

    /// Acquire a connection handle scoped to the caller.
    fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }
}

#[async_trait]
impl CacheRepository for RedisRepository {
    async fn set(&self, key: &str, value: &[u8], expire: ExpireSecs) -> CacheResult<()> {
        let mut conn = self.connection();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(expire)
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("SET", e))?;
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &[u8],
        expire: ExpireSecs,
    ) -> CacheResult<bool> {
        let mut conn = self.connection();
        // Nil reply when the key already exists.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(expire)
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("SET", e))?;
        Ok(reply.is_some())
    }

    async fn set_many(
        &self,
        data: &HashMap<String, Vec<u8>>,
        expire: ExpireSecs,
    ) -> CacheResult<()> {
        if data.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in data {
            pipe.cmd("SET")
                .arg(key)
                .arg(value.as_slice())
                .arg("EX")
                .arg(expire)
                .ignore();
        }

        let mut conn = self.connection();
        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("EXEC", e))?;

        tracing::debug!(keys = data.len(), expire, "Wrote batch");
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.connection();
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(|e| store_error("GET", e))?;
        Ok(value)
    }

    async fn get_many(&self, keys: &[String]) -> CacheResult<Vec<Option<Vec<u8>>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.connection();
        let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("MGET", e))?;
        Ok(values)
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.connection();
        let removed: u64 = conn.del(key).await.map_err(|e| store_error("DEL", e))?;
        Ok(removed)
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection();
        let removed: u64 = conn.del(keys).await.map_err(|e| store_error("DEL", e))?;
        Ok(removed)
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let mut conn = self.connection();
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<Vec<u8>>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(self.scan_count)
                .query_async(&mut conn)
                .await
                .map_err(|e| store_error("SCAN", e))?;

            if !keys.is_empty() {
                let batch: u64 = redis::cmd("DEL")
                    .arg(&keys)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| store_error("DEL", e))?;
                removed += batch;
                tracing::trace!(pattern, cursor = next, batch, "Deleted pattern batch");
            }

            // SCAN is complete once the cursor wraps back to 0.
            if next == 0 {
                break;
            }
            cursor = next;
        }

        tracing::debug!(pattern, removed, "Pattern delete finished");
        Ok(removed)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.connection();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("PING", e))?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_maps_server_errors_to_command_failed() {
        let err = RedisError::from((
            redis::ErrorKind::ResponseError,
            "WRONGTYPE",
            "bad".to_string(),
        ));
        let mapped = store_error("GET", err);
        assert!(matches!(
            mapped,
            CacheError::Store(StoreError::CommandFailed { ref command, .. }) if command == "GET"
        ));
    }

    #[test]
    fn test_store_error_maps_io_to_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let mapped = store_error("SET", RedisError::from(io));
        match mapped {
            CacheError::Store(store) => assert!(store.is_transient()),
            other => panic!("expected store error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_dsn_error_hides_password() {
        let err = RedisRepository::connect("redis://:hunter2@localhost:notaport/0")
            .await
            .expect_err("must fail");
        assert!(!err.to_string().contains("hunter2"));
        assert!(!format!("{:?}", err).contains("hunter2"));
        match err {
            CacheError::Store(StoreError::InvalidDsn { dsn, .. }) => {
                assert_eq!(dsn, "redis://:***@localhost:notaport/0");
            }
            other => panic!("expected invalid DSN, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_dsn() {
        let err = RedisRepository::connect("not-a-dsn")
            .await
            .expect_err("must fail");
        assert!(matches!(
            err,
            CacheError::Store(StoreError::InvalidDsn { .. })
        ));
    }
}
