//! Tempus Cache demo
//!
//! Stores a short-lived and a permanent entry, waits past the short TTL and
//! reports what survived.

use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tempus_cache::{Cache, CacheConfig};

const DEMO_SWEEP_INTERVAL: Duration = Duration::from_secs(1);
const SESSION_TTL: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tempus_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = CacheConfig::from_env();
    if !config.sweep_enabled() {
        config = config.with_sweep_interval(DEMO_SWEEP_INTERVAL);
    }
    info!(
        "Configuration loaded: max_entries={}, sweep_interval={:?}",
        config.max_entries, config.sweep_interval
    );

    let cache: Cache<String, String> = Cache::new(config).context("failed to create cache")?;

    cache.set("session:42".to_string(), "alice".to_string(), SESSION_TTL);
    cache.set("motd".to_string(), "hello".to_string(), Duration::ZERO);
    info!("session:42 before expiry: {:?}", cache.get("session:42"));

    tokio::time::sleep(SESSION_TTL + DEMO_SWEEP_INTERVAL).await;

    info!("Entries left after sweep: {}", cache.len());
    info!("session:42 after expiry: {:?}", cache.get("session:42"));
    info!("motd: {:?}", cache.get("motd"));

    let stats = serde_json::to_string_pretty(&cache.stats()).context("failed to encode stats")?;
    println!("{}", stats);

    cache.stop()?;
    info!("Cache stopped");
    Ok(())
}
