//! Sort options from the `sort` parameter.

use std::fmt;
use std::str::FromStr;

use serde_json::{Value, json};

use crate::error::Error;

const SCORE: &str = "_score";
const FIELD_ORDER_SEPARATOR: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(Error::invalid_parameter(
                crate::params::SORT,
                s,
                "sort order must be 'asc' or 'desc'",
            ))
        }
    }
}

/// A parsed sort option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortSpec {
    /// Relevance, best matches first.
    Score,
    /// Sort on a field; documents missing the field come last.
    Field {
        field: String,
        order: Option<SortOrder>,
    },
}

impl SortSpec {
    /// Parse `_score`, `field`, `field:asc` or `field:desc`. A blank string
    /// means no explicit sort.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when the part after the last `:` is not a
    /// sort order, or when the field name is empty.
    pub fn parse(raw: &str) -> Result<Option<Self>, Error> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        if raw == SCORE {
            return Ok(Some(Self::Score));
        }
        let (field, order) = match raw.rsplit_once(FIELD_ORDER_SEPARATOR) {
            Some((field, order)) => (field.trim(), Some(order.parse::<SortOrder>()?)),
            None => (raw, None),
        };
        if field.is_empty() {
            return Err(Error::invalid_parameter(
                crate::params::SORT,
                raw,
                "missing sort field",
            ));
        }
        Ok(Some(Self::Field {
            field: field.to_string(),
            order,
        }))
    }

    /// Render as one element of the search body's `sort` array.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Score => json!({ SCORE: { "order": "desc" } }),
            Self::Field { field, order } => {
                let mut options = serde_json::Map::new();
                if let Some(order) = order {
                    options.insert("order".into(), json!(order.as_str()));
                }
                options.insert("missing".into(), json!("_last"));
                json!({ field.as_str(): options })
            }
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Score => f.write_str(SCORE),
            Self::Field { field, order: None } => f.write_str(field),
            Self::Field {
                field,
                order: Some(order),
            } => write!(f, "{field}{FIELD_ORDER_SEPARATOR}{}", order.as_str()),
        }
    }
}
