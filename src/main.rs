//! TTL Cache demo driver
//!
//! Exercises the public cache API: stores a few values of unrelated types,
//! reads and deletes them, then keeps adding entries while the reaper sweeps
//! expired ones in the background.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::{AnyValue, Cache, CacheConfig, CacheError};

/// Main entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache (starting the reaper when configured)
/// 4. Exercise set / get / delete / size
/// 5. Add one entry per second until Ctrl+C, logging stats
/// 6. Drop the cache, which stops the reaper
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info,ttl_cache_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: default_ttl={:?}, sweep_interval={:?}",
        config.default_ttl, config.sweep_interval
    );

    let cache: Cache<String, AnyValue> = Cache::from_config(&config);

    cache.set("greeting".to_string(), Arc::new("hello"));
    cache.set_with_ttl("answer".to_string(), Arc::new(42_u32), Duration::from_secs(2));

    let answer = cache
        .get("answer")
        .context("freshly set key should be readable")?
        .downcast::<u32>()
        .map_err(|_| anyhow::anyhow!("answer holds an unexpected type"))?;
    info!("answer = {}", answer);

    match cache.get("missing") {
        Ok(_) => warn!("missing key unexpectedly found"),
        Err(CacheError::NotFound) => info!("missing: not found"),
    }

    cache.delete("greeting").context("greeting should be deletable")?;
    if let Err(err) = cache.delete("greeting") {
        info!("second delete of greeting: {}", err);
    }
    info!("size = {}", cache.size());

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut next = 0_u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let key = format!("item{next}");
                cache.set(key.clone(), Arc::new(format!("value{next}")));
                next += 1;

                let stats = serde_json::to_string(&cache.stats())?;
                info!("added {}, size = {}, stats = {}", key, cache.size(), stats);
            }
            result = signal::ctrl_c() => {
                result.context("failed to listen for Ctrl+C")?;
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    drop(cache);
    info!("Cache released");
    Ok(())
}
