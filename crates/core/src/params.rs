//! Request parameter names shared by the UI, the address bar and the gateway.

use crate::error::Error;
use crate::query_params::QueryParams;
use crate::result::Result;

pub const SERVICE: &str = "service";
pub const QUERY_STRING: &str = "q";
pub const SELECTED_FILTERS: &str = "filter";
/// Bracketed alias some HTTP clients emit for repeated `filter` keys.
pub const SELECTED_FILTERS_ALIAS: &str = "filter[]";
pub const AGGREGATIONS: &str = "aggs";
pub const INDICES: &str = "index";
pub const INDEX_TYPES: &str = "type";
pub const FROM: &str = "from";
pub const SIZE: &str = "size";
pub const FROM_DATE: &str = "from_date";
pub const TO_DATE: &str = "to_date";
pub const SORT: &str = "sort";
pub const PRETTY_PRINT: &str = "pretty";
pub const INDEX_BOOST: &str = "index_boost";

pub const DEFAULT_FROM: u64 = 0;
pub const DEFAULT_SIZE: u64 = 10;

/// Date fields used by the date range filter.
pub mod date_field {
    pub const CREATED: &str = "created";
    pub const MADE_BEFORE: &str = "madeBefore";
    pub const MADE_AFTER: &str = "madeAfter";
}

/// Interpret a boolean-ish parameter value (`true`, `1`, `yes`).
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
}

/// Characters Elasticsearch never allows in an index name. `/`, `?` and `#`
/// would also change the meaning of the backend URL.
const FORBIDDEN_INDEX_CHARS: &[char] = &['/', '\\', '?', '#', '"', '<', '>', '|', ' ', ',', ':'];

/// Check one index name before it becomes a backend URL path segment.
/// Wildcards such as `marcus-*` stay allowed.
///
/// # Errors
///
/// Returns `InvalidParameter` for names Elasticsearch would reject or that
/// address an API endpoint (`_search`, `_all`, `..`).
pub fn validate_index_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("index name is empty")
    } else if name == "." || name == ".." {
        Some("index name cannot be '.' or '..'")
    } else if name.starts_with(['_', '-', '+']) {
        Some("index name cannot start with '_', '-' or '+'")
    } else if name
        .chars()
        .any(|c| c.is_control() || FORBIDDEN_INDEX_CHARS.contains(&c))
    {
        Some("index name contains a forbidden character")
    } else {
        None
    };
    reason.map_or(Ok(()), |reason| {
        Err(Error::invalid_parameter(INDICES, name, reason))
    })
}

/// Every value of a repeatable `key`, split on commas and trimmed, with
/// blanks dropped.
#[must_use]
pub fn list_values(params: &QueryParams, key: &str) -> Vec<String> {
    params
        .get_all(key)
        .into_iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// The [`list_values`] of `index`.
///
/// # Errors
///
/// Returns `InvalidParameter` for the first name [`validate_index_name`]
/// rejects.
pub fn index_names(params: &QueryParams) -> Result<Vec<String>> {
    let names = list_values(params, INDICES);
    names.iter().try_for_each(|name| validate_index_name(name))?;
    Ok(names)
}
