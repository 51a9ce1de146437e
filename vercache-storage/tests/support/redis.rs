use vercache_storage::{CacheConfig, JsonCache, RedisRepository};
use vercache_test_utils::fixtures::unique_prefix;

/// DSN of the Redis server used by integration tests.
pub fn test_dsn() -> String {
    std::env::var("VERCACHE_TEST_DSN").unwrap_or_else(|_| "redis://127.0.0.1:6379/15".to_string())
}

/// Facade over the test server, namespaced to a fresh prefix.
pub async fn test_cache(label: &str) -> JsonCache<RedisRepository> {
    vercache_test_utils::init_test_tracing();
    let config = CacheConfig::new(test_dsn())
        .with_key_prefix(unique_prefix(label))
        .with_scan_count(10);
    JsonCache::connect(&config)
        .await
        .expect("Failed to connect to test Redis")
}
