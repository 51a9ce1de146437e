//! JSON cache facade.
//!
//! The facade turns logical keys into `{prefix}:{version}:{key}` store keys
//! and JSON values into bytes, then hands both to a [`CacheRepository`].
//!
//! # Error Separation
//!
//! Encode and decode failures are [`CacheError::Encode`] and
//! [`CacheError::Decode`]; anything the repository reports stays a
//! [`CacheError::Store`]. A caller can always tell bad data from a bad store.
//!
//! [`CacheRepository`]: crate::repository::CacheRepository
//! [`CacheError::Encode`]: vercache_core::CacheError::Encode
//! [`CacheError::Decode`]: vercache_core::CacheError::Decode
//! [`CacheError::Store`]: vercache_core::CacheError::Store

pub mod json_cache;
pub mod traits;

pub use json_cache::JsonCache;
pub use traits::Cache;
