//! Cache Module
//!
//! Provides in-memory caching with per-entry TTL expiration.

mod engine;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use engine::{AnyValue, Cache};
pub use entry::CacheEntry;
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use store::CacheStore;
