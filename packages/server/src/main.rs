use std::net::SocketAddr;
use std::sync::Arc;

use catalog_server::build_router;
use catalog_server::config::AppConfig;
use catalog_server::database::init_db;
use catalog_server::state::AppState;
use common::storage::FilesystemBlobStore;
use tracing::{Level, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    info!("Database ready");

    let blob_store =
        FilesystemBlobStore::open_dir(&config.storage.blob_dir, config.storage.max_blob_size)
            .await?;
    info!("Blob store at {}", blob_store.root().display());

    if config.auth.recovery.secret.is_some() {
        warn!(
            target: "audit",
            username = %config.auth.recovery.username,
            "Recovery credential is enabled"
        );
    }
    info!(
        episode_policy = ?config.moderation.episode_policy,
        like_mode = ?config.engagement.like_mode,
        "Catalog policies"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        config,
        blob_store: Arc::new(blob_store),
    };
    let app = build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
