//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Lookups and deletes never fail; errors only come from construction,
/// configuration loading and lifecycle misuse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// `stop` was called on a cache that is already stopped
    #[error("Cache already stopped")]
    AlreadyStopped,

    /// A sweep interval was configured outside of a Tokio runtime
    #[error("Background sweep requires a Tokio runtime: {0}")]
    RuntimeUnavailable(String),

    /// A configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
