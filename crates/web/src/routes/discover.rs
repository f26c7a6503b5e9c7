//! Discovery endpoint: GET|POST /discover

use axum::{extract::State, response::Response};
use marcus_core::DiscoverRequest;
use tracing::info;

use crate::AppState;
use crate::error::Result;
use crate::extract::Params;
use crate::routes::search::render_json;

/// GET|POST /discover - Page through the requested collections, or the
/// configured default indices, with an optional `query_string`.
pub async fn discover(State(state): State<AppState>, Params(params): Params) -> Result<Response> {
    let request = DiscoverRequest::from_query_params(&params)?;
    let indices = if request.indices.is_empty() {
        &state.settings.search.default_indices
    } else {
        &request.indices
    };

    info!(
        indices = ?indices,
        from = request.state.offset(),
        size = request.state.page_size(),
        "Discover"
    );

    let response = state.backend.search(indices, &request.to_query_body()).await?;
    render_json(&response, request.pretty)
}
