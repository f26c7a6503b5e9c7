//! HTTP routes
//!
//! ## Route Structure
//!
//! - `GET|POST /search` - Forward a search to Elasticsearch
//! - `GET|POST /discover` - Page through collections without facets
//! - `GET|POST /suggest` - Completion suggestions as a JSON array of strings
//! - `GET /health` - Health check endpoint
//!
//! `POST` takes the same parameters as a form-encoded body. Other methods
//! get `405 Method Not Allowed`.

use axum::{Router, routing::get};

use crate::AppState;

pub mod discover;
pub mod health;
pub mod search;
pub mod suggest;

/// Create the API router with all endpoints registered.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/search", get(search::search).post(search::search))
        .route("/discover", get(discover::discover).post(discover::discover))
        .route("/suggest", get(suggest::suggest).post(suggest::suggest))
}
