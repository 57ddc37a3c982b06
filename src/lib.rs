//! Tempus Cache - an in-process concurrent key-value cache
//!
//! Per-entry TTL expiration (lazy on read, active via a background sweep)
//! combined with capacity-bounded LRU eviction.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::JanitorState;
