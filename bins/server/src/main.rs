//! Mediahub API Server
//!
//! Main entry point for the Mediahub upload service.

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediahub_api::{AppState, create_router, serve_local_storage};
use mediahub_core::storage::{Backend, StorageProvider};
use mediahub_db::connect;
use mediahub_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mediahub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect(&config.database).await?;
    info!("Connected to database");

    // Build the storage backend
    let provider = StorageProvider::from_settings(&config.storage)?;
    let backend = Backend::from_provider(&provider)?;
    info!(
        driver = provider.name(),
        public_url = provider.public_url(),
        "Storage backend configured"
    );

    // Create application state
    let state = AppState::new(db, backend, config.upload.clone());

    // Create router
    let mut app = create_router(state);
    if let StorageProvider::LocalFs { root, public_url } = &provider {
        match mount_path(public_url) {
            Some(mount) => {
                info!(mount, root = %root.display(), "Serving local storage");
                app = serve_local_storage(app, mount, root);
            }
            None => warn!(public_url = %public_url, "Local storage URL has no path, not serving files"),
        }
    }

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Path component of the local public URL, e.g. `/storage`.
fn mount_path(public_url: &str) -> Option<&str> {
    let rest = public_url
        .split_once("://")
        .map_or(public_url, |(_, rest)| rest);
    let path = rest.find('/').map(|i| &rest[i..])?.trim_end_matches('/');
    (!path.is_empty()).then_some(path)
}
