//! # Microblog Binary
//!
//! Assembles the store, the media store and the HTTP router from settings
//! and serves until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::handlers::AppState;
use api_adapters::{build_router, RouterOptions};
use configs::{LogSettings, Settings};
use secrecy::ExposeSecret;
use services::MicroblogService;
use storage_adapters::{LocalMediaStore, SqliteStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);
    settings.log_summary();

    // 1. Relational store, migrated on connect
    let store = SqliteStore::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await
    .context("connecting to the database")?;

    // 2. Blob store for uploads
    let media = LocalMediaStore::new(settings.media.root.clone(), &settings.media.url_prefix)
        .await
        .context("preparing the media directory")?;

    // 3. Service and router
    let state = AppState {
        service: MicroblogService::new(Arc::new(store), Arc::new(media)),
    };
    let app = build_router(
        state,
        &RouterOptions {
            static_dir: settings.server.static_dir.clone(),
            max_upload_bytes: settings.media.max_upload_bytes,
            cors_allow_any_origin: settings.server.cors_allow_any_origin,
        },
    );

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "microblog listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("microblog stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
