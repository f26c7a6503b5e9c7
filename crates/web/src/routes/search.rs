//! Search endpoint: GET|POST /search

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
};
use marcus_core::SearchRequest;
use serde_json::Value;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, Result};
use crate::extract::Params;

/// GET|POST /search - Build the Elasticsearch body from the request
/// parameters, forward it and pass the response through.
pub async fn search(State(state): State<AppState>, Params(params): Params) -> Result<Response> {
    let request = SearchRequest::from_query_params(&params)?;
    let body = request.to_query_body(&state.settings.search)?;
    let indices = request.effective_indices(&state.settings.search);

    info!(
        service = %request.service,
        indices = ?indices,
        query = request.state.query_string().unwrap_or_default(),
        "Search"
    );

    let response = state.backend.search(indices, &body).await?;
    render_json(&response, request.pretty)
}

/// Serialize a JSON response, indented when `pretty` is set.
///
/// # Errors
///
/// Returns an internal error if the value cannot be serialized.
pub fn render_json(value: &Value, pretty: bool) -> Result<Response> {
    if !pretty {
        return Ok(Json(value).into_response());
    }
    let text = serde_json::to_string_pretty(value).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], text).into_response())
}
