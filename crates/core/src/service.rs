//! Search services and their query profiles.
//!
//! Several collections share the gateway. The `service` parameter picks the
//! collection, which decides how the free-text query is prepared and which
//! extras (boosting, highlighting) the search body carries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Error;
use crate::query::{
    QUERY_FIELDS, append_trailing_wildcard_if_single_term, append_wildcard_if_ubb_signature,
    append_wildcard_if_wab_signature, query_string_query,
};

/// Fields searched for the Wittgenstein Archives.
const WAB_QUERY_FIELDS: [&str; 4] = ["label", "publishedIn", "publishedInPart.exact", "_all"];

/// Document type boosted in Marcus results.
const MARCUS_BOOST_TYPE: &str = "fotografi";
const MARCUS_BOOST_WEIGHT: u32 = 3;

/// Boost factor for the index named in `index_boost`.
pub const INDEX_BOOST_FACTOR: f64 = 5.0;

const HIGHLIGHT_FIELD: &str = "textContent";
const HIGHLIGHT_PRE_TAG: &str = "<em class='txt-highlight'>";
const HIGHLIGHT_POST_TAG: &str = "</em>";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceName {
    /// University of Bergen Library special collections.
    #[default]
    Marcus,
    /// Skeivt arkiv.
    Ska,
    /// Wittgenstein Archives.
    Wab,
    MarcusAdmin,
    Naturen,
}

impl ServiceName {
    pub const ALL: [Self; 5] = [
        Self::Marcus,
        Self::Ska,
        Self::Wab,
        Self::MarcusAdmin,
        Self::Naturen,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Marcus => "marcus",
            Self::Ska => "ska",
            Self::Wab => "wab",
            Self::MarcusAdmin => "marcus_admin",
            Self::Naturen => "naturen",
        }
    }

    /// Rewrite the user's query the way this collection expects
    /// (shelfmark wildcards and the like).
    #[must_use]
    pub fn prepare_query(self, query: &str) -> String {
        match self {
            Self::Marcus => append_wildcard_if_ubb_signature(query),
            Self::Wab => append_wildcard_if_wab_signature(query),
            Self::MarcusAdmin => append_trailing_wildcard_if_single_term(query.trim()),
            Self::Ska | Self::Naturen => query.to_string(),
        }
    }

    /// The scoring query for an already prepared query string, or `match_all`
    /// when there is none.
    #[must_use]
    pub fn build_query(self, query: Option<&str>) -> Value {
        let base = match query {
            Some(q) if self == Self::Wab => query_string_query(q, &WAB_QUERY_FIELDS),
            Some(q) => query_string_query(q, &QUERY_FIELDS),
            None => json!({ "match_all": {} }),
        };
        match self {
            Self::Marcus => json!({
                "function_score": {
                    "query": base,
                    "functions": [{
                        "filter": { "term": { "type": MARCUS_BOOST_TYPE } },
                        "weight": MARCUS_BOOST_WEIGHT
                    }],
                    "boost_mode": "multiply"
                }
            }),
            Self::Ska | Self::Wab | Self::MarcusAdmin | Self::Naturen => base,
        }
    }

    /// Highlighting options, for collections that show text snippets.
    #[must_use]
    pub fn highlight(self) -> Option<Value> {
        (self == Self::Naturen).then(|| {
            json!({
                "fields": { HIGHLIGHT_FIELD: {} },
                "pre_tags": [HIGHLIGHT_PRE_TAG],
                "post_tags": [HIGHLIGHT_POST_TAG]
            })
        })
    }

    /// Whether the `index_boost` parameter is honoured.
    #[must_use]
    pub const fn supports_index_boost(self) -> bool {
        matches!(self, Self::Ska)
    }
}

impl FromStr for ServiceName {
    type Err = Error;

    /// Case-insensitive; an empty string selects the default service.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }
        Self::ALL
            .into_iter()
            .find(|service| service.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownService {
                name: s.to_string(),
                expected: Self::ALL.map(Self::as_str).join(", "),
            })
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
