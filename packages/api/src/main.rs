use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::FilesystemMediaStore;
use tracing::{Level, info};

use hammer_api::config::AppConfig;
use hammer_api::state::AppState;
use hammer_api::{database, fixtures, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    info!("Database ready");

    let media = FilesystemMediaStore::new(config.storage.media_dir.clone(), config.storage.max_image_size)
        .await
        .with_context(|| format!("Failed to open media directory {}", config.storage.media_dir.display()))?;

    if config.seed.demo_data {
        if seed::is_empty(&db).await? {
            // Files left over from an earlier database are unreachable.
            let stale = fixtures::remove_fixture_files(&config.storage.media_dir).await?;
            info!(stale, "Removed stale fixture files");
            seed::seed_fixtures(&db, &media)
                .await
                .map_err(|e| anyhow::anyhow!("Seeding demo data failed: {e:?}"))?;
        } else {
            info!("Database already populated, skipping demo data");
        }
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config,
        media: Arc::new(media),
    };
    let app = hammer_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
