//! Query state synchronization and search body integration tests

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::io::Write;

use marcus_core::{
    FuzzyMode, QueryParams, SearchRequest, SearchSession, SearchState, Settings, fuzzify,
};
use serde_json::json;

#[test]
fn test_address_bar_round_trip() {
    let mut state = SearchState::new()
        .with_query_string("bergen kart")
        .with_sort_by("dateSort:desc")
        .with_date_range(Some("1900"), Some("1950-06"))
        .with_filter("type", "Fotografi")
        .with_filter("subject.exact", "Flyfoto");
    state.set_page_size(20).unwrap();
    state.set_page(3).unwrap();

    let encoded = state.to_query_params().to_query_string();
    let decoded = SearchState::from_query_params(&QueryParams::parse(&encoded)).unwrap();
    assert_eq!(decoded, state);
    assert!(encoded.contains("from=40"));
    assert!(encoded.contains("size=20"));
}

#[test]
fn test_default_state_has_empty_query_string() {
    assert_eq!(SearchState::new().to_query_params().to_query_string(), "");
}

#[test]
fn test_php_style_filter_alias() {
    let params = QueryParams::parse("?filter[]=type%23Brev&filter=status%23Aktiv");
    let state = SearchState::from_query_params(&params).unwrap();
    assert_eq!(state.selected_filters(), ["type#Brev", "status#Aktiv"]);

    let reencoded = state.to_query_params().to_query_string();
    assert_eq!(reencoded, "filter=type%23Brev&filter=status%23Aktiv");
}

#[test]
fn test_stale_responses_are_rejected() {
    let mut session = SearchSession::new(SearchState::new());
    let first = session.begin_search();
    session.state_mut().set_query_string(Some("oslo"));
    let second = session.begin_search();

    assert!(!session.accept(first));
    assert!(session.accept(second));
}

#[test]
fn test_search_body_from_ui_parameters() {
    let settings = Settings::from_toml("[search]\nfuzzify = \"*\"").unwrap();
    let aggs = r#"[{"field":"type","operator":"OR","size":20},{"field":"created","type":"date_histogram","interval":"year"}]"#;
    let mut params = QueryParams::new();
    params.push("q", "hello world");
    params.push("filter", "type#Brev");
    params.push("filter", "type#Kart");
    params.push("aggs", aggs);
    params.push("sort", "_score");

    let request = SearchRequest::from_query_params(&params).unwrap();
    let body = request.to_query_body(&settings.search).unwrap();

    let score = &body["query"]["bool"]["must"][0]["function_score"];
    assert_eq!(score["query"]["query_string"]["query"], "hello* world*");
    assert_eq!(
        body["post_filter"],
        json!({"bool": {"must": [{"terms": {"type": ["Brev", "Kart"]}}]}})
    );
    assert_eq!(body["aggs"]["type"]["terms"]["size"], 20);
    assert_eq!(
        body["aggs"]["created"]["date_histogram"]["calendar_interval"],
        "year"
    );
    assert_eq!(body["sort"], json!([{"_score": {"order": "desc"}}]));
}

#[test]
fn test_fuzzify_contract() {
    assert_eq!(fuzzify("hello world", FuzzyMode::Wildcard), "hello* world* ");
    assert_eq!(fuzzify("a:b", FuzzyMode::Wildcard), "a:b");
}

#[test]
fn test_settings_file_with_env_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[elasticsearch]\nurl = \"http://es.example:9200\"\ntimeout_secs = 3\n\n[search]\ndefault_indices = [\"marcus\", \"admin\"]"
    )
    .unwrap();

    let mut settings = Settings::load(file.path()).unwrap();
    assert_eq!(settings.elasticsearch.timeout_secs, 3);
    assert_eq!(settings.search.default_indices, vec!["marcus", "admin"]);

    settings
        .apply_env_with(|key| (key == "MARCUS_ES_URL").then(|| "http://other:9200".to_string()))
        .unwrap();
    assert_eq!(settings.elasticsearch.url, "http://other:9200");
    assert_eq!(settings.elasticsearch.timeout_secs, 3);
}
