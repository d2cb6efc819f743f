//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The admin upload routes
//! - The principal extractor
//! - The response envelope

pub mod middleware;
pub mod response;
pub mod routes;

use std::path::Path;
use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use mediahub_core::storage::Backend;
use mediahub_shared::UploadSettings;

/// Multipart framing and base64 inflation on top of the largest surface limit.
const BODY_OVERHEAD: usize = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Configured storage backend.
    pub storage: Arc<Backend>,
    /// Upload surface limits.
    pub upload: Arc<UploadSettings>,
}

impl AppState {
    /// Create application state.
    #[must_use]
    pub fn new(db: DatabaseConnection, storage: Backend, upload: UploadSettings) -> Self {
        Self {
            db: Arc::new(db),
            storage: Arc::new(storage),
            upload: Arc::new(upload),
        }
    }

    fn body_limit(&self) -> usize {
        let largest = usize::try_from(self.upload.image.limit_size).unwrap_or(usize::MAX);
        // base64 bodies are 4/3 of the payload
        largest.saturating_mul(4) / 3 + BODY_OVERHEAD
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.body_limit();

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve the local storage root as static files under `mount`.
pub fn serve_local_storage(router: Router, mount: &str, root: &Path) -> Router {
    router.nest_service(mount, ServeDir::new(root))
}
