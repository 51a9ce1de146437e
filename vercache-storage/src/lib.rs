//! vercache Storage - Repositories and the Versioned JSON Cache
//!
//! Two layers:
//! - [`repository`]: byte-level store contract with Redis and in-memory
//!   backends
//! - [`cache`]: JSON-aware facade with namespaced, versioned keys

pub mod cache;
pub mod repository;

pub use cache::{Cache, JsonCache};
pub use repository::{CacheRepository, GlobPattern, MemoryRepository, RedisRepository};

// Re-export core types so most callers need a single dependency.
pub use vercache_core::{
    CacheConfig, CacheError, CacheResult, ConfigError, ExpireSecs, KeyScheme, StoreError,
    Version,
};
