//! `/discover` requests: plain paged browsing of one or more collections,
//! without facets, sorting or service-specific scoring.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::params;
use crate::query_params::QueryParams;
use crate::result::Result;
use crate::state::SearchState;

/// Everything the `/discover` endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverRequest {
    pub state: SearchState,
    pub indices: Vec<String>,
    pub types: Vec<String>,
    pub pretty: bool,
}

impl DiscoverRequest {
    /// # Errors
    ///
    /// Returns a client error when `from`, `size` or an index name is
    /// malformed.
    pub fn from_query_params(params: &QueryParams) -> Result<Self> {
        // discovery ignores facets, dates and sort
        let mut paging = QueryParams::new();
        for key in [params::QUERY_STRING, params::FROM, params::SIZE] {
            if let Some(value) = params.get(key) {
                paging.push(key, value);
            }
        }
        let state = SearchState::from_query_params(&paging)?;

        Ok(Self {
            state,
            indices: params::index_names(params)?,
            types: params::list_values(params, params::INDEX_TYPES),
            pretty: params.get(params::PRETTY_PRINT).is_some_and(params::is_truthy),
        })
    }

    /// A `_search` body: `query_string` when `q` is set, else `match_all`,
    /// restricted to the requested types and paged.
    #[must_use]
    pub fn to_query_body(&self) -> Value {
        let scoring = self.state.query_string().map_or_else(
            || json!({ "match_all": {} }),
            |q| json!({ "query_string": { "query": q.trim(), "default_operator": "and" } }),
        );

        let mut query = Map::new();
        query.insert("must".into(), json!([scoring]));
        if !self.types.is_empty() {
            query.insert("filter".into(), json!([{ "terms": { "type": self.types } }]));
        }

        let body = json!({
            "query": { "bool": query },
            "from": self.state.offset(),
            "size": self.state.page_size(),
        });
        debug!(%body, "Built discovery body");
        body
    }
}
