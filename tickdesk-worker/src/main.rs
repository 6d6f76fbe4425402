//! # tickdesk Worker
//!
//! Runs the deadline-expiry sweeper: a fixed-period background loop that
//! transitions overdue pending tickets to `missed`, independent of request
//! traffic.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tickdesk-worker
//! ```
//!
//! ## Environment
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `SWEEP_INTERVAL_SECS`: seconds between sweep cycles (default: 60)

use tickdesk_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
use tickdesk_worker::sweep::{ExpirySweeper, SweeperConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickdesk_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "tickdesk worker v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

    let period_secs = std::env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .map(|v| v.parse::<u64>())
        .transpose()
        .map_err(|_| anyhow::anyhow!("SWEEP_INTERVAL_SECS must be an integer"))?;

    let pool = create_pool(DatabaseConfig {
        url: database_url,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let sweeper = ExpirySweeper::new(pool, SweeperConfig::from_period_secs(period_secs));
    let shutdown = sweeper.shutdown_token();

    let sweeper_handle = tokio::spawn(async move { sweeper.run().await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping sweeper...");
    shutdown.cancel();
    sweeper_handle.await?;

    tracing::info!("Worker exited cleanly");
    Ok(())
}
