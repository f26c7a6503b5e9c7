//! Completion suggestions for the `/suggest` endpoint.

use std::collections::BTreeSet;

use serde_json::{Value, json};

use crate::error::Error;
use crate::params;
use crate::query_params::QueryParams;
use crate::result::Result;

const SUGGEST_FIELD: &str = "suggest";
const SUGGESTION_NAME: &str = "completion_suggestion";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestRequest {
    pub text: String,
    pub indices: Vec<String>,
    /// Maximum number of suggestions; the configured default when absent.
    pub size: Option<u64>,
}

impl SuggestRequest {
    /// # Errors
    ///
    /// Returns `InvalidParameter` when `size` is not a positive integer or an
    /// index name is not usable.
    pub fn from_query_params(params: &QueryParams) -> Result<Self> {
        let size = params
            .get_non_empty(params::SIZE)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|size| *size > 0)
                    .ok_or_else(|| {
                        Error::invalid_parameter(params::SIZE, raw, "expected a positive integer")
                    })
            })
            .transpose()?;
        Ok(Self {
            text: params.get(params::QUERY_STRING).unwrap_or_default().to_string(),
            indices: params::index_names(params)?,
            size,
        })
    }

    /// A `_search` body holding only the completion suggester.
    #[must_use]
    pub fn to_query_body(&self, default_size: u64) -> Value {
        json!({
            "size": 0,
            "_source": false,
            "suggest": {
                SUGGESTION_NAME: {
                    "prefix": self.text,
                    "completion": {
                        "field": SUGGEST_FIELD,
                        "size": self.size.unwrap_or(default_size),
                        "skip_duplicates": true
                    }
                }
            }
        })
    }
}

/// Sorted, de-duplicated option texts from a suggester response.
///
/// # Errors
///
/// Returns `JsonParseFailed` when the response has no completion suggestion.
pub fn extract_suggestions(response: &Value) -> Result<Vec<String>> {
    let entries = response
        .get("suggest")
        .and_then(|suggest| suggest.get(SUGGESTION_NAME))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            Error::json_parse_failed(format!("response has no '{SUGGESTION_NAME}' suggestion"))
        })?;

    let texts: BTreeSet<&str> = entries
        .iter()
        .filter_map(|entry| entry.get("options").and_then(Value::as_array))
        .flatten()
        .filter_map(|option| option.get("text").and_then(Value::as_str))
        .collect();

    Ok(texts.into_iter().map(str::to_string).collect())
}
