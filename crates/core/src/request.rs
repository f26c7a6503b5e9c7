//! `/search` requests and the Elasticsearch bodies built from them.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::aggregations::{AggregationSpec, build_aggregations};
use crate::date_range::DateRange;
use crate::filters::{build_bool_filters, build_filter_map};
use crate::fuzzify::fuzzify;
use crate::params;
use crate::query_params::QueryParams;
use crate::result::Result;
use crate::service::{INDEX_BOOST_FACTOR, ServiceName};
use crate::settings::SearchSettings;
use crate::sort::SortSpec;
use crate::state::SearchState;

/// Everything the `/search` endpoint accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub state: SearchState,
    pub indices: Vec<String>,
    pub types: Vec<String>,
    pub aggregations: Vec<AggregationSpec>,
    pub service: ServiceName,
    pub pretty: bool,
    pub index_boost: Option<String>,
}

impl SearchRequest {
    /// Parse and validate the `/search` query parameters.
    ///
    /// # Errors
    ///
    /// Returns a client error when paging, sort, date, aggregation, index or
    /// service parameters are malformed.
    pub fn from_query_params(params: &QueryParams) -> Result<Self> {
        let state = SearchState::from_query_params(params)?;

        // validate early so bad input is a 400 rather than a backend error
        SortSpec::parse(state.sort_by().unwrap_or_default())?;
        DateRange::parse(state.from_date(), state.to_date())?;

        let aggregations = params
            .get(params::AGGREGATIONS)
            .map(AggregationSpec::parse_list)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            state,
            indices: params::index_names(params)?,
            types: params::list_values(params, params::INDEX_TYPES),
            aggregations,
            service: params.get(params::SERVICE).unwrap_or_default().parse()?,
            pretty: params.get(params::PRETTY_PRINT).is_some_and(params::is_truthy),
            index_boost: params
                .get_non_empty(params::INDEX_BOOST)
                .map(|v| v.trim().to_string()),
        })
    }

    /// Indices to search: the requested ones, else the configured defaults.
    #[must_use]
    pub fn effective_indices<'a>(&'a self, settings: &'a SearchSettings) -> &'a [String] {
        if self.indices.is_empty() {
            &settings.default_indices
        } else {
            &self.indices
        }
    }

    /// The query string after fuzzification and service-specific rewriting.
    #[must_use]
    pub fn prepared_query(&self, settings: &SearchSettings) -> Option<String> {
        let raw = self.state.query_string()?;
        let fuzzified = settings
            .fuzzify
            .map_or_else(|| raw.to_string(), |mode| fuzzify(raw, mode));
        let prepared = self.service.prepare_query(&fuzzified);
        let prepared = prepared.trim();
        (!prepared.is_empty()).then(|| prepared.to_string())
    }

    /// Build the body of an Elasticsearch `_search` request.
    ///
    /// # Errors
    ///
    /// Returns a client error when the sort or date parameters are malformed.
    pub fn to_query_body(&self, settings: &SearchSettings) -> Result<Value> {
        let prepared = self.prepared_query(settings);
        let scoring = self.service.build_query(prepared.as_deref());

        let selected = build_filter_map(self.state.selected_filters());
        let date_range = DateRange::parse(self.state.from_date(), self.state.to_date())?;
        let filters = build_bool_filters(
            &selected,
            &self.aggregations,
            (!date_range.is_unbounded()).then_some(&date_range),
        );

        let mut body = Map::new();
        let mut query = Map::new();
        query.insert("must".into(), json!([scoring]));
        if !self.types.is_empty() {
            // mapping types are gone; collections index the type as a keyword field
            query.insert(
                "filter".into(),
                json!([{ "terms": { "type": self.types } }]),
            );
        }
        if filters.top.has_clauses() {
            let clauses = query
                .entry("filter")
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(clauses) = clauses {
                clauses.push(filters.top.to_json());
            }
        }
        body.insert("query".into(), json!({ "bool": query }));
        if filters.post.has_clauses() {
            body.insert("post_filter".into(), filters.post.to_json());
        }

        body.insert("from".into(), json!(self.state.offset()));
        body.insert("size".into(), json!(self.state.page_size()));

        if let Some(sort) = SortSpec::parse(self.state.sort_by().unwrap_or_default())? {
            body.insert("sort".into(), json!([sort.to_json()]));
        }
        if !self.aggregations.is_empty() {
            body.insert(
                "aggs".into(),
                Value::Object(build_aggregations(&self.aggregations, &selected)),
            );
        }
        if let Some(highlight) = self.service.highlight() {
            body.insert("highlight".into(), highlight);
        }
        if let Some(index) = self
            .index_boost
            .as_deref()
            .filter(|_| self.service.supports_index_boost())
        {
            body.insert(
                "indices_boost".into(),
                json!([{ index: INDEX_BOOST_FACTOR }]),
            );
        }

        let body = Value::Object(body);
        debug!(service = %self.service, %body, "Built search body");
        Ok(body)
    }

    /// Parameters echoed back next to the results.
    #[must_use]
    pub fn echo(&self) -> Value {
        json!({
            params::QUERY_STRING: self.state.query_string(),
            params::INDICES: self.indices,
            params::INDEX_TYPES: self.types,
            params::FROM: self.state.offset(),
            params::SIZE: self.state.page_size(),
            params::SORT: self.state.sort_by(),
            params::SELECTED_FILTERS: self.state.selected_filters(),
            params::FROM_DATE: self.state.from_date(),
            params::TO_DATE: self.state.to_date(),
            params::SERVICE: self.service.as_str(),
        })
    }
}
