//! Background Tasks Module
//!
//! # Tasks
//! - Expiration sweep: removes expired cache entries at a configured interval

mod janitor;

pub use janitor::JanitorState;
pub(crate) use janitor::{Janitor, Sweep};
