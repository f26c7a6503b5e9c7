//! Marcus Web Server
//!
//! HTTP API with tower middleware for CORS, tracing, and compression.

use std::sync::Arc;

use axum::{Router, http::Method};
use marcus_core::Settings;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod backend;
pub mod error;
pub mod extract;
pub mod routes;
pub mod server;

pub use backend::{BackendError, ElasticsearchBackend, SearchBackend};
pub use error::{AppError, ErrorResponse};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn SearchBackend>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(backend: Arc<dyn SearchBackend>, settings: Settings) -> Self {
        Self {
            backend,
            settings: Arc::new(settings),
        }
    }
}

/// Create a new router with middleware.
///
/// # Errors
///
/// Returns an error if the configured CORS origin is not a valid header
/// value.
pub fn create_router(state: AppState) -> Result<Router, Error> {
    let cors = match state.settings.server.cors_origin.as_deref() {
        Some(origin) => {
            info!("Creating router with CORS origin: {}", origin);
            CorsLayer::new().allow_origin(origin.parse::<::axum::http::HeaderValue>()?)
        }
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([Method::GET, Method::POST])
    .allow_headers(Any);

    let router = routes::create_router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(cors),
    );

    Ok(router)
}

/// Web server errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid header value
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] ::axum::http::header::InvalidHeaderValue),

    /// Backend construction failed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
