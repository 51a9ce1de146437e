//! vercache Test Utilities
//!
//! Shared test infrastructure for the vercache workspace:
//! - Proptest generators for keys, versions and JSON values
//! - Fixtures that build caches over the in-memory repository
//! - Assertions for the error taxonomy
//! - Tracing setup for test binaries

pub use vercache_core::{
    CacheConfig, CacheError, CacheResult, ExpireSecs, KeyScheme, StoreError, Version,
};
pub use vercache_storage::{Cache, CacheRepository, JsonCache, MemoryRepository};

use uuid::Uuid;

// ============================================================================
// TRACING
// ============================================================================

/// Install a fmt subscriber that writes through the test harness.
///
/// Honours `RUST_LOG`; defaults to `vercache_storage=debug`. Safe to call
/// from every test, only the first call installs anything.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vercache_storage=debug,warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for cache inputs.

    use super::*;
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    /// Logical key with no glob metacharacters.
    pub fn arb_logical_key() -> impl Strategy<Value = String> {
        "[a-z0-9_:-]{1,32}"
    }

    /// Numeric or label version. Labels never parse as integers.
    pub fn arb_version() -> impl Strategy<Value = Version> {
        prop_oneof![
            (0i64..10_000).prop_map(Version::Number),
            "[a-z][a-z0-9_.-]{0,8}".prop_map(Version::Label),
        ]
    }

    /// Expiration the store accepts.
    pub fn arb_expire() -> impl Strategy<Value = ExpireSecs> {
        1u64..=86_400
    }

    /// JSON scalar. Floats are multiples of 1/8 so they survive a text
    /// round trip exactly.
    pub fn arb_json_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            (-1_000_000i32..1_000_000).prop_map(|n| Value::from(f64::from(n) / 8.0)),
            "[ -~]{0,16}".prop_map(Value::String),
        ]
    }

    /// Arbitrary nested JSON document.
    pub fn arb_json_value() -> impl Strategy<Value = Value> {
        arb_json_scalar().prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::hash_map("[a-z_]{1,8}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
            ]
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built caches and keys.

    use super::*;

    /// Cache with the default scheme over a fresh in-memory repository.
    pub fn memory_cache() -> JsonCache<MemoryRepository> {
        JsonCache::with_defaults(MemoryRepository::new())
    }

    /// Cache with a custom scheme over a fresh in-memory repository.
    pub fn memory_cache_with(
        prefix: &str,
        version: impl Into<Version>,
    ) -> JsonCache<MemoryRepository> {
        JsonCache::new(MemoryRepository::new(), KeyScheme::new(prefix, version))
    }

    /// Prefix unique to one test run, so tests sharing a store never collide.
    pub fn unique_prefix(label: &str) -> String {
        format!("test-{}-{}", label, Uuid::new_v4().simple())
    }

    /// Owned key list from string literals.
    pub fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over the error taxonomy.

    use super::*;

    /// Assert the result failed with an encode error.
    pub fn assert_encode_error<T: std::fmt::Debug>(result: &CacheResult<T>) {
        match result {
            Err(CacheError::Encode { .. }) => {}
            other => panic!("expected encode error, got {:?}", other),
        }
    }

    /// Assert the result failed with a decode error.
    pub fn assert_decode_error<T: std::fmt::Debug>(result: &CacheResult<T>) {
        match result {
            Err(CacheError::Decode { .. }) => {}
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    /// Assert the result failed in the store, not in the codec.
    pub fn assert_store_error<T: std::fmt::Debug>(result: &CacheResult<T>) {
        match result {
            Err(CacheError::Store(_)) => {}
            other => panic!("expected store error, got {:?}", other),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
