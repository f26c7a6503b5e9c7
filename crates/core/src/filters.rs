//! Facet filters selected by the user.
//!
//! Filters arrive as `field#value` strings. They are grouped per field and
//! turned into two Elasticsearch bool queries:
//!
//! - the *top filter* narrows both hits and aggregations (AND facets,
//!   excluded `-field` facets, the date range);
//! - the *post filter* narrows hits only (facets whose aggregation uses the
//!   `OR` operator), so the other values of an OR facet keep their counts.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};
use tracing::warn;

use crate::aggregations::AggregationSpec;
use crate::date_range::DateRange;

const KEY_VALUE_SEPARATOR: char = '#';
const EXCLUDE_PREFIX: char = '-';

/// Selected values grouped by field, e.g.
/// `{"subject.exact": ["Flyfoto", "Birkeland"], "type": ["Brev"]}`.
pub type FilterMap = BTreeMap<String, Vec<String>>;

/// Group `field#value` entries by field. Each entry is split at its last
/// `#`; entries without one are skipped.
#[must_use]
pub fn build_filter_map<S: AsRef<str>>(selected_filters: &[S]) -> FilterMap {
    let mut filters = FilterMap::new();
    for entry in selected_filters {
        let entry = entry.as_ref();
        let Some((key, value)) = entry.rsplit_once(KEY_VALUE_SEPARATOR) else {
            warn!("Skipping filter without '{KEY_VALUE_SEPARATOR}' separator: [{entry}]");
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            warn!("Skipping filter with empty field or value: [{entry}]");
            continue;
        }
        filters
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }
    filters
}

/// Clauses of an Elasticsearch `bool` query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Value>,
    pub must_not: Vec<Value>,
    pub should: Vec<Value>,
}

impl BoolQuery {
    #[must_use]
    pub fn has_clauses(&self) -> bool {
        !(self.must.is_empty() && self.must_not.is_empty() && self.should.is_empty())
    }

    /// Render as `{"bool": {...}}`. When `should` clauses are present at
    /// least one of them has to match.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        if !self.must.is_empty() {
            body.insert("must".into(), Value::Array(self.must.clone()));
        }
        if !self.must_not.is_empty() {
            body.insert("must_not".into(), Value::Array(self.must_not.clone()));
        }
        if !self.should.is_empty() {
            body.insert("should".into(), Value::Array(self.should.clone()));
            body.insert("minimum_should_match".into(), json!(1));
        }
        json!({ "bool": body })
    }
}

/// The two filters derived from the selected facets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolFilters {
    pub top: BoolQuery,
    pub post: BoolQuery,
}

fn term(field: &str, value: &str) -> Value {
    json!({ "term": { field: value } })
}

fn terms(field: &str, values: &[String]) -> Value {
    json!({ "terms": { field: values } })
}

/// Split the selected facets into top and post filters according to the
/// aggregation operators, and append the date range to the top filter.
#[must_use]
pub fn build_bool_filters(
    filters: &FilterMap,
    aggregations: &[AggregationSpec],
    date_range: Option<&DateRange>,
) -> BoolFilters {
    let mut out = BoolFilters::default();
    for (field, values) in filters.iter().filter(|(_, v)| !v.is_empty()) {
        if AggregationSpec::has_or_operator(aggregations, field) {
            out.post.must.push(terms(field, values));
        } else if let Some(excluded) = field.strip_prefix(EXCLUDE_PREFIX) {
            out.top.must_not.push(terms(excluded, values));
        } else {
            out.top
                .must
                .extend(values.iter().map(|value| term(field, value)));
        }
    }
    if let Some(range) = date_range {
        out.top.should.extend(range.overlap_clauses());
    }
    out
}

/// Post filter built from every selected facet except `skip_field`. Used as
/// the per-aggregation filter of OR facets.
#[must_use]
pub fn post_filter_excluding(
    filters: &FilterMap,
    aggregations: &[AggregationSpec],
    skip_field: &str,
) -> BoolQuery {
    let others: FilterMap = filters
        .iter()
        .filter(|(field, _)| field.as_str() != skip_field)
        .map(|(field, values)| (field.clone(), values.clone()))
        .collect();
    build_bool_filters(&others, aggregations, None).post
}
