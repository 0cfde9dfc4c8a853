//! diary-api: REST server for diary entries.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost:5432/diary-app cargo run
//!
//! curl -X POST http://localhost:3000/api/entries \
//!   -H "Content-Type: application/json" \
//!   -d '{"title": "My first thought", "body": "I imagine she has a beautiful smile..."}'
//!
//! curl "http://localhost:3000/api/entries?search=smile"
//! curl "http://localhost:3000/api/entries?startDate=2026-01-01&endDate=2026-01-31"
//! ```
//!
//! Configuration is described in [`diary_api::config`].

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use diary_api::api::build_router;
use diary_api::config::{ServerConfig, StorageBackend};
use diary_api::database::{DatabaseManager, EntryStore, InMemoryEntryStore};
use diary_api::service::EntryService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,diary_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let (store, db): (Arc<dyn EntryStore>, Option<DatabaseManager>) = match config.storage {
        StorageBackend::Postgres => {
            let db = DatabaseManager::new(&config.database)
                .await
                .context("failed to connect to database")?;
            db.run_migrations()
                .await
                .context("failed to apply entries schema")?;
            (Arc::new(db.entry_store()), Some(db))
        }
        StorageBackend::Memory => {
            info!("Using in-memory entry store; entries are lost on exit");
            (Arc::new(InMemoryEntryStore::new()), None)
        }
    };

    let app = build_router(EntryService::new(store));

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;

    info!("Backend server running on: http://{}", bind_addr);
    info!(
        "Entries endpoint: http://localhost:{}/api/entries",
        config.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(db) = db {
        db.close().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
