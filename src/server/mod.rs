//! HTTP upload service around [`XmpExtractor`].
//!
//! - `POST /upload` takes a multipart form with a `pdf` file field and answers
//!   with the packet as an `application/xml` attachment.
//! - `GET /health` answers `{"ok":true}`.
//! - Everything else is served from [`ServerConfig::public_dir`].
//!
//! Each upload is written to its own temporary file inside
//! [`ServerConfig::upload_dir`]; the file is removed when the request finishes,
//! whatever the outcome.

mod error;
mod handlers;

pub use error::{AppError, AppResult};
pub use handlers::output_file_name;

use crate::{XmpExtractor, DEFAULT_MAX_FILE_SIZE};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

// ── Configuration ────────────────────────────────────────────────────────────

/// Settings for the upload service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory that receives in-flight uploads.
    pub upload_dir: PathBuf,
    /// Static assets served for any path without a route.
    pub public_dir: PathBuf,
    /// Largest accepted PDF, in bytes.
    pub max_upload_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            upload_dir: std::env::temp_dir(),
            public_dir: PathBuf::from("public"),
            max_upload_bytes: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// ── Service context ──────────────────────────────────────────────────────────

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub extractor: Arc<XmpExtractor>,
}

impl AppState {
    pub fn new(config: ServerConfig, extractor: XmpExtractor) -> Self {
        Self {
            config: Arc::new(config),
            extractor: Arc::new(extractor),
        }
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/health", get(handlers::health))
        .fallback_service(ServeDir::new(&state.config.public_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: ServerConfig, extractor: XmpExtractor) -> std::io::Result<()> {
    std::fs::create_dir_all(&config.upload_dir)?;

    let addr = config.socket_addr();
    info!(
        upload_dir = %config.upload_dir.display(),
        public_dir = %config.public_dir.display(),
        max_upload_bytes = config.max_upload_bytes,
        "starting XMP extraction service"
    );

    let app = router(AppState::new(config, extractor));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
