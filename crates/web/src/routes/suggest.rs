//! Suggestion endpoint: GET|POST /suggest

use axum::{extract::State, response::Json};
use marcus_core::{ResultExt, SuggestRequest, extract_suggestions};

use crate::AppState;
use crate::error::Result;
use crate::extract::Params;

/// GET|POST /suggest - Sorted completion suggestions for `q`.
///
/// An empty `q` yields an empty list without contacting the backend. A
/// response without suggestions is logged and also yields an empty list.
pub async fn suggest(
    State(state): State<AppState>,
    Params(params): Params,
) -> Result<Json<Vec<String>>> {
    let request = SuggestRequest::from_query_params(&params)?;
    if request.text.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }

    let body = request.to_query_body(state.settings.search.suggest_size);
    let indices = if request.indices.is_empty() {
        &state.settings.search.default_indices
    } else {
        &request.indices
    };

    let response = state.backend.search(indices, &body).await?;
    Ok(Json(extract_suggestions(&response).or_default_logged("Unusable suggestion response")))
}
