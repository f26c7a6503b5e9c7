//! Free-text query construction.

use serde_json::{Value, json};

const WILDCARD: char = '*';
const SPECIAL_SIGNATURE_CHAR: char = '-';

/// Elasticsearch query-syntax characters (the minus sign excluded).
const RESERVED_CHARS: [char; 20] = [
    '*', '"', '\\', '/', '=', '&', '|', '>', '<', '!', '(', ')', '{', '}', '[', ']', '^', '~',
    '?', ':',
];

/// Shelfmark prefixes used by the University of Bergen Library.
const UBB_SIGNATURE_PREFIXES: [&str; 3] = ["ubb", "ubm", "sab"];
/// Shelfmark prefixes used by the Wittgenstein Archives.
const WAB_SIGNATURE_PREFIXES: [&str; 2] = ["ms-", "ts-"];

/// Fields searched by the free-text query unless a service says otherwise.
pub const QUERY_FIELDS: [&str; 3] = ["identifier", "label", "_all"];

#[must_use]
pub fn contains_reserved_chars(s: &str) -> bool {
    s.contains(RESERVED_CHARS)
}

fn starts_with_letter(s: &str) -> bool {
    s.chars().next().is_some_and(char::is_alphabetic)
}

fn is_single_term(s: &str) -> bool {
    !s.is_empty() && !s.contains(char::is_whitespace)
}

/// `query_string` query over `fields` with AND as default operator.
#[must_use]
pub fn query_string_query(query: &str, fields: &[&str]) -> Value {
    json!({
        "query_string": {
            "query": query,
            "fields": fields,
            "default_operator": "and",
            "analyzer": "default"
        }
    })
}

/// Append `*` to a single term that starts with a letter and uses no query
/// syntax.
#[must_use]
pub fn append_trailing_wildcard_if_single_term(query: &str) -> String {
    if starts_with_letter(query) && is_single_term(query) && !contains_reserved_chars(query) {
        format!("{query}{WILDCARD}")
    } else {
        query.to_string()
    }
}

fn begins_with_prefix(value: &str, prefixes: &[&str]) -> bool {
    let lowered = value.trim().to_lowercase();
    prefixes.iter().any(|prefix| lowered.starts_with(prefix))
}

#[must_use]
pub fn is_ubb_signature(value: &str) -> bool {
    begins_with_prefix(value, &UBB_SIGNATURE_PREFIXES) && value.contains(SPECIAL_SIGNATURE_CHAR)
}

#[must_use]
pub fn is_wab_signature(value: &str) -> bool {
    begins_with_prefix(value, &WAB_SIGNATURE_PREFIXES)
}

/// `ubb-ms-01` becomes `ubb-ms-01*`; other hyphenated single terms such as
/// `bros-2000` become `*bros-2000*`.
#[must_use]
pub fn append_wildcard_if_ubb_signature(value: &str) -> String {
    let value = value.trim();
    if !starts_with_letter(value) || !is_single_term(value) || contains_reserved_chars(value) {
        return value.to_string();
    }
    if is_ubb_signature(value) {
        format!("{value}{WILDCARD}")
    } else if value.contains(SPECIAL_SIGNATURE_CHAR) {
        format!("{WILDCARD}{value}{WILDCARD}")
    } else {
        value.to_string()
    }
}

/// `ms-101` becomes `ms-101*`.
#[must_use]
pub fn append_wildcard_if_wab_signature(value: &str) -> String {
    let value = value.trim();
    if is_single_term(value) && !value.contains(WILDCARD) && is_wab_signature(value) {
        format!("{value}{WILDCARD}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_reserved_chars() {
        assert!(contains_reserved_chars("a:b"));
        assert!(contains_reserved_chars("(x)"));
        assert!(!contains_reserved_chars("ubb-ms-01"));
        assert!(!contains_reserved_chars(""));
    }

    #[test]
    fn test_trailing_wildcard_for_single_term() {
        assert_eq!(append_trailing_wildcard_if_single_term("bergen"), "bergen*");
        assert_eq!(append_trailing_wildcard_if_single_term("bergen kart"), "bergen kart");
        assert_eq!(append_trailing_wildcard_if_single_term("1950"), "1950");
        assert_eq!(append_trailing_wildcard_if_single_term("berg~"), "berg~");
    }

    #[test]
    fn test_ubb_signatures() {
        assert!(is_ubb_signature("ubb-ms-01"));
        assert!(is_ubb_signature("UBM-x"));
        assert!(!is_ubb_signature("ubbms"));
        assert_eq!(append_wildcard_if_ubb_signature("ubb-ms-01"), "ubb-ms-01*");
        assert_eq!(append_wildcard_if_ubb_signature("bros-2000"), "*bros-2000*");
        assert_eq!(append_wildcard_if_ubb_signature("-bros-2000"), "-bros-2000");
        assert_eq!(append_wildcard_if_ubb_signature("ubb+ms"), "ubb+ms");
        assert_eq!(append_wildcard_if_ubb_signature("bergen"), "bergen");
    }

    #[test]
    fn test_wab_signatures() {
        assert_eq!(append_wildcard_if_wab_signature("Ms-101"), "Ms-101*");
        assert_eq!(append_wildcard_if_wab_signature("ms-101*"), "ms-101*");
        assert_eq!(append_wildcard_if_wab_signature("letter"), "letter");
    }

    #[test]
    fn test_query_string_query_uses_and() {
        let query = query_string_query("flyfoto", &QUERY_FIELDS);
        assert_eq!(query["query_string"]["default_operator"], "and");
        assert_eq!(query["query_string"]["fields"][1], "label");
    }
}
