//! Aggregation (facet) settings sent by the UI in the `aggs` parameter.
//!
//! The parameter is a JSON array of objects such as
//! `[{"field": "status", "size": 15, "operator": "AND", "order": "term_asc"},
//!   {"field": "created", "type": "date_histogram", "interval": "year"}]`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::error::Error;
use crate::filters::{FilterMap, post_filter_excluding};
use crate::result::Result;

/// Name of the per-aggregation filter attached to OR facets.
pub const AGGS_FILTER_KEY: &str = "aggs_filter";

/// Interval names Elasticsearch only accepts as `calendar_interval`.
const CALENDAR_INTERVALS: [&str; 16] = [
    "year", "1y", "quarter", "1q", "month", "1M", "week", "1w", "day", "1d", "hour", "1h",
    "minute", "1m", "second", "1s",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_doc_count: Option<u64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BucketOrder {
    CountAsc,
    CountDesc,
    KeyAsc,
    KeyDesc,
}

impl BucketOrder {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "count_asc" => Some(Self::CountAsc),
            "count_desc" => Some(Self::CountDesc),
            "term_asc" | "key_asc" => Some(Self::KeyAsc),
            "term_desc" | "key_desc" => Some(Self::KeyDesc),
            _ => None,
        }
    }

    fn to_json(self) -> Value {
        match self {
            Self::CountAsc => json!({ "_count": "asc" }),
            Self::CountDesc => json!({ "_count": "desc" }),
            Self::KeyAsc => json!({ "_key": "asc" }),
            Self::KeyDesc => json!({ "_key": "desc" }),
        }
    }

    /// Order used when buckets are counted through the `aggs_filter`
    /// sub-aggregation. Key orders are unaffected.
    fn to_sub_filter_json(order: Option<Self>) -> Value {
        match order {
            Some(Self::CountAsc) => json!({ AGGS_FILTER_KEY: "asc" }),
            Some(key_order @ (Self::KeyAsc | Self::KeyDesc)) => key_order.to_json(),
            Some(Self::CountDesc) | None => json!({ AGGS_FILTER_KEY: "desc" }),
        }
    }
}

impl AggregationSpec {
    /// Parse the `aggs` parameter. Objects without a `field` are skipped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAggregations` when the input is not a JSON array of
    /// objects or an object has fields of the wrong type.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| Error::invalid_aggregations(format!("{e} in [{raw}]")))?;
        let Value::Array(items) = value else {
            return Err(Error::invalid_aggregations(format!(
                "expected JSON array of objects but found [{raw}]"
            )));
        };
        let mut specs = Vec::with_capacity(items.len());
        for item in items {
            let Value::Object(object) = item else {
                return Err(Error::invalid_aggregations(format!(
                    "expected an object but found [{item}]"
                )));
            };
            if !object.contains_key("field") {
                warn!("Skipping aggregation without a field: {:?}", object);
                continue;
            }
            let spec: Self = serde_json::from_value(Value::Object(object))
                .map_err(|e| Error::invalid_aggregations(e.to_string()))?;
            specs.push(spec);
        }
        Ok(specs)
    }

    /// Whether the aggregation on `field` combines its selected values with OR.
    #[must_use]
    pub fn has_or_operator(specs: &[Self], field: &str) -> bool {
        specs.iter().any(|spec| {
            spec.field == field
                && spec
                    .operator
                    .as_deref()
                    .is_some_and(|op| op.trim().eq_ignore_ascii_case("or"))
        })
    }

    #[must_use]
    pub fn is_date_histogram(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("date_histogram"))
    }

    fn bucket_order(&self) -> Option<BucketOrder> {
        let raw = self.order.as_deref()?;
        let order = BucketOrder::parse(raw);
        if order.is_none() {
            warn!("Ignoring unknown order '{}' for aggregation on '{}'", raw, self.field);
        }
        order
    }

    fn date_histogram(&self) -> Value {
        let mut body = Map::new();
        body.insert("field".into(), json!(self.field));
        if let Some(format) = &self.format {
            body.insert("format".into(), json!(format));
        }
        if let Some(interval) = &self.interval {
            let key = if CALENDAR_INTERVALS.contains(&interval.as_str()) {
                "calendar_interval"
            } else {
                "fixed_interval"
            };
            body.insert(key.into(), json!(interval));
        }
        if let Some(min_doc_count) = self.min_doc_count {
            body.insert("min_doc_count".into(), json!(min_doc_count));
        }
        if self.order.is_some() {
            let order = match self.bucket_order() {
                Some(order @ (BucketOrder::CountAsc | BucketOrder::CountDesc | BucketOrder::KeyDesc)) => order,
                _ => BucketOrder::KeyAsc,
            };
            body.insert("order".into(), order.to_json());
        }
        json!({ "date_histogram": body })
    }

    fn terms(&self, sub_filter: Option<Value>) -> Value {
        let mut body = Map::new();
        body.insert("field".into(), json!(self.field));
        if let Some(size) = self.size {
            body.insert("size".into(), json!(size));
        }
        if let Some(min_doc_count) = self.min_doc_count {
            body.insert("min_doc_count".into(), json!(min_doc_count));
        }
        let order = self.bucket_order();
        match &sub_filter {
            Some(_) => {
                body.insert("order".into(), BucketOrder::to_sub_filter_json(order));
            }
            None => {
                if let Some(order) = order {
                    body.insert("order".into(), order.to_json());
                }
            }
        }
        let mut aggregation = Map::new();
        aggregation.insert("terms".into(), Value::Object(body));
        if let Some(filter) = sub_filter {
            aggregation.insert(
                "aggs".into(),
                json!({ AGGS_FILTER_KEY: { "filter": filter } }),
            );
        }
        Value::Object(aggregation)
    }
}

/// Build the `aggs` section of a search body, one aggregation per spec,
/// named after its field.
///
/// When facets are selected, each terms aggregation gets an `aggs_filter`
/// sub-aggregation holding the OR filters of the *other* selected facets, and
/// its buckets are ordered by that sub-aggregation's count.
#[must_use]
pub fn build_aggregations(specs: &[AggregationSpec], selected: &FilterMap) -> Map<String, Value> {
    specs
        .iter()
        .map(|spec| {
            let body = if spec.is_date_histogram() {
                spec.date_histogram()
            } else {
                let sub_filter = (!selected.is_empty())
                    .then(|| post_filter_excluding(selected, specs, &spec.field))
                    .filter(crate::filters::BoolQuery::has_clauses)
                    .map(|filter| filter.to_json());
                spec.terms(sub_filter)
            };
            (spec.field.clone(), body)
        })
        .collect()
}
