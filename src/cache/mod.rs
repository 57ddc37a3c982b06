//! Cache Module
//!
//! In-memory caching with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub(crate) use entry::CacheEntry;
pub(crate) use lru::{NodeId, RecencyList};
pub use stats::CacheStats;
pub use store::Cache;
