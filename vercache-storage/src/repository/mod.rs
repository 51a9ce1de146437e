//! Byte-level repositories.
//!
//! [`CacheRepository`] is the contract; [`RedisRepository`] is the production
//! backend and [`MemoryRepository`] an in-process stand-in for tests and
//! single-process use.

pub mod memory;
pub mod pattern;
pub mod redis;
pub mod traits;

pub use memory::MemoryRepository;
pub use pattern::GlobPattern;
pub use redis::RedisRepository;
pub use traits::CacheRepository;
