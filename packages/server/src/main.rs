use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemFileStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vilaagro_server::config::AppConfig;
use vilaagro_server::state::AppState;
use vilaagro_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    seed::ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;
    seed::bootstrap_admin(&db, &config.bootstrap).await?;

    let file_store = FilesystemFileStore::new(
        PathBuf::from(&config.storage.data_dir),
        config.storage.max_upload_size,
    )
    .await
    .context("Failed to initialize file storage")?;
    info!(path = %config.storage.data_dir, "File storage ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config,
        file_store: Arc::new(file_store),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
