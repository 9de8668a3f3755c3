use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod classifier;
mod config;
mod handlers;
mod metrics;
mod models;
mod store;

use config::Config;
use handlers::AppState;
use metrics::Metrics;
use store::{CounterStore, PgCounterStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering.
    // Default to INFO level, can be overridden with RUST_LOG env var.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,catchall_tracker=debug")),
        )
        .init();

    tracing::info!("Starting catchall-tracker");

    let config = Config::from_env();

    tracing::info!("Connecting to PostgreSQL...");
    let store = Arc::new(PgCounterStore::connect(&config.db).await?);

    let metrics = Arc::new(Metrics::new()?);
    tracing::info!(
        registered = metrics.registry().gather().len(),
        "Metrics registry created"
    );

    // The single shared store handle for the process, injected into handlers
    // rather than held as global state.
    let state = web::Data::new(AppState {
        store: store.clone() as Arc<dyn CounterStore>,
        metrics,
    });

    tracing::info!(addr = %config.listen_addr, "Starting HTTP server");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(&config.listen_addr)?
    .run()
    .await?;

    // Graceful teardown once the server has drained.
    tracing::info!("Shutting down, closing database pool");
    store.close().await;

    Ok(())
}
