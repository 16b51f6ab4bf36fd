//! TTL Cache - An embeddable in-process key-value cache
//!
//! Every entry carries an absolute expiration instant. Expired entries are
//! never returned and are removed lazily on read, by a manual sweep, or by an
//! optional background reaper that stops when the cache is dropped.

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{AnyValue, Cache, CacheStatsSnapshot};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
