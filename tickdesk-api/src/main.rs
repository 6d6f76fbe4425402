//! # tickdesk API Server
//!
//! HTTP server for tickdesk: identity flows (registration, login, password
//! recovery with one-time codes, token introspection), owner-scoped ticket
//! CRUD, and the admin user-management surface.
//!
//! The deadline-expiry sweep runs separately in `tickdesk-worker`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tickdesk-api
//! ```

use std::sync::Arc;

use tickdesk_api::{
    app::{build_router, AppState},
    config::Config,
};
use tickdesk_shared::db::{migrations::run_migrations, pool};
use tickdesk_shared::notify::email::HttpEmailDispatcher;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickdesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "tickdesk API server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&db).await?;

    let dispatcher = Arc::new(HttpEmailDispatcher::new(
        config.mail.endpoint.clone(),
        config.mail.sender.clone(),
        config.mail.server_token.clone(),
    ));

    let bind_address = config.bind_address();
    let state = AppState::new(db, config, dispatcher);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    Ok(())
}
