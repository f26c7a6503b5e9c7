//! Free-text query fuzzification.
//!
//! Appends a wildcard (`*`) or fuzzy (`~`) operator to each token of a
//! free-text query so that partial words still match.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Characters that mark a query as already using query syntax.
const QUERY_SYNTAX_CHARS: [char; 5] = ['*', '~', ':', '"', '['];

/// Operator appended to each token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuzzyMode {
    #[serde(rename = "*")]
    Wildcard,
    #[serde(rename = "~")]
    Fuzzy,
}

impl FuzzyMode {
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Wildcard => '*',
            Self::Fuzzy => '~',
        }
    }
}

impl FromStr for FuzzyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "*" => Ok(Self::Wildcard),
            "~" => Ok(Self::Fuzzy),
            other => Err(Error::invalid_parameter(
                "fuzzify",
                other,
                "expected '*' or '~'",
            )),
        }
    }
}

impl fmt::Display for FuzzyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Append `mode` to every space-separated token of `text`.
///
/// The text is returned unchanged when it is blank or already contains any
/// of `* ~ : " [`. Tokens of at most one character, and tokens containing a
/// parenthesis, are kept as they are. Every output token is followed by a
/// single space.
#[must_use]
pub fn fuzzify(text: &str, mode: FuzzyMode) -> String {
    if text.trim().is_empty() || text.contains(QUERY_SYNTAX_CHARS) {
        return text.to_string();
    }
    let operator = mode.as_char();
    text.split(' ').fold(String::with_capacity(text.len().saturating_mul(2)), |mut out, token| {
        out.push_str(token);
        if token.chars().nth(1).is_some() && !token.contains(['(', ')']) {
            out.push(operator);
        }
        out.push(' ');
        out
    })
}

/// Like [`fuzzify`], but takes the mode as the raw string configured for the
/// UI. Unrecognized modes leave the text unchanged.
#[must_use]
pub fn fuzzify_with(text: &str, mode: &str) -> String {
    mode.parse::<FuzzyMode>()
        .map_or_else(|_| text.to_string(), |mode| fuzzify(text, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzify_appends_wildcard_to_each_token() {
        assert_eq!(fuzzify("hello world", FuzzyMode::Wildcard), "hello* world* ");
    }

    #[test]
    fn test_fuzzify_appends_tilde() {
        assert_eq!(fuzzify("bergen kart", FuzzyMode::Fuzzy), "bergen~ kart~ ");
    }

    #[test]
    fn test_fuzzify_leaves_query_syntax_alone() {
        for text in ["a:b", "\"exact phrase\"", "date:[1900 TO 1950]", "berg*", "berg~"] {
            assert_eq!(fuzzify(text, FuzzyMode::Wildcard), text);
        }
    }

    #[test]
    fn test_fuzzify_skips_short_and_parenthesized_tokens() {
        assert_eq!(
            fuzzify("a (bergen OR oslo) x", FuzzyMode::Wildcard),
            "a (bergen OR* oslo) x "
        );
    }

    #[test]
    fn test_fuzzify_counts_characters_not_bytes() {
        assert_eq!(fuzzify("å", FuzzyMode::Wildcard), "å ");
        assert_eq!(fuzzify("ås", FuzzyMode::Wildcard), "ås* ");
    }

    #[test]
    fn test_fuzzify_is_idempotent() {
        let once = fuzzify("hello world", FuzzyMode::Fuzzy);
        assert_eq!(fuzzify(&once, FuzzyMode::Fuzzy), once);
        assert_eq!(fuzzify(&once, FuzzyMode::Wildcard), once);
    }

    #[test]
    fn test_fuzzify_blank_text_unchanged() {
        assert_eq!(fuzzify("", FuzzyMode::Wildcard), "");
        assert_eq!(fuzzify("   ", FuzzyMode::Wildcard), "   ");
    }

    #[test]
    fn test_fuzzify_with_unknown_mode() {
        assert_eq!(fuzzify_with("hello world", "?"), "hello world");
        assert_eq!(fuzzify_with("hello world", "*"), "hello* world* ");
    }
}
