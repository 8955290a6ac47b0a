//! HTTP gateway: routes, shared state, and the server loop.

pub mod error;
pub mod handlers;

use crate::config::Config;
use crate::relay::{DocumentStore, ExportWriter, UploadStorage};
use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;

pub use error::ApiError;

/// Per-process state shared by every request. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub index: Arc<str>,
    pub uploads: Arc<UploadStorage>,
    pub exports: Arc<ExportWriter>,
    pub cleanup_uploads: bool,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            index: Arc::from(config.store.index.as_str()),
            uploads: Arc::new(UploadStorage::new(config.uploads_dir())),
            exports: Arc::new(ExportWriter::new(config.export_dir())),
            cleanup_uploads: config.uploads.cleanup,
        }
    }
}

pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/file/{id}", get(handlers::export))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &Config, store: Arc<dyn DocumentStore>) -> Result<()> {
    let state = AppState::new(config, store);
    tokio::fs::create_dir_all(state.uploads.base_dir())
        .await
        .context("Failed to create uploads directory")?;
    tokio::fs::create_dir_all(state.exports.dir())
        .await
        .context("Failed to create export directory")?;

    let app = create_router(state, config.server.max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Server is running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
        .context("HTTP server error")?;
    Ok(())
}
