use super::listing::{normalize_marker_filter, row_id};
use super::*;
use serde_json::json;

fn test_client(base_url: &str) -> RecordClient {
    RecordClient::new(base_url, 5, "gbview-test/0.1", 0, 0).unwrap()
}

#[test]
fn action_url_appends_action_and_params() {
    let client = test_client("https://example.org/get_data.php");
    let url = client.action_url("recordById", &[("id", "42")]);
    assert_eq!(
        url.as_str(),
        "https://example.org/get_data.php?action=recordById&id=42"
    );
}

#[test]
fn action_url_keeps_existing_query() {
    let client = test_client("https://example.org/api?lang=de");
    let url = client.action_url("fetchStreetView", &[]);
    assert_eq!(
        url.as_str(),
        "https://example.org/api?lang=de&action=fetchStreetView"
    );
}

#[test]
fn action_url_encodes_filter_values() {
    let client = test_client("http://localhost:8080/get_data.php");
    let url = client.action_url("mapMarkers", &[("architect", "Karl Ehn")]);
    assert_eq!(
        url.as_str(),
        "http://localhost:8080/get_data.php?action=mapMarkers&architect=Karl+Ehn"
    );
}

#[test]
fn rejects_non_http_base_url() {
    let err = RecordClient::new("ftp://example.org/data", 5, "ua", 0, 0)
        .err()
        .unwrap();
    assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
}

#[test]
fn rejects_relative_base_url() {
    let err = RecordClient::new("get_data.php", 5, "ua", 0, 0).err().unwrap();
    assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
}

#[test]
fn empty_payloads_mean_not_found() {
    assert!(is_empty_payload(&json!({})));
    assert!(is_empty_payload(&json!([])));
    assert!(is_empty_payload(&Value::Null));
    assert!(!is_empty_payload(&json!({"id": 1})));
}

#[test]
fn api_error_detail_prefers_detail() {
    let body = json!({"error": "Database error", "detail": "Table missing"});
    assert_eq!(api_error_detail(&body).as_deref(), Some("Table missing"));

    let body = json!({"error": "Missing/invalid id"});
    assert_eq!(api_error_detail(&body).as_deref(), Some("Missing/invalid id"));

    assert_eq!(api_error_detail(&json!({"id": 3})), None);
    assert_eq!(api_error_detail(&json!([1, 2])), None);
}

#[test]
fn error_status_falls_back_to_raw_body() {
    let err = error_from_status(502, "Bad Gateway", "http://x");
    assert!(matches!(err, ClientError::Api { status: 502, ref detail } if detail == "Bad Gateway"));

    let err = error_from_status(500, "  ", "http://x");
    assert!(matches!(err, ClientError::UnexpectedStatus { status: 500, .. }));
}

#[test]
fn row_id_accepts_numbers_and_numeric_strings() {
    assert_eq!(row_id(&json!({"id": 12})), Some(12));
    assert_eq!(row_id(&json!({"id": " 7 "})), Some(7));
    assert_eq!(row_id(&json!({"id": 0})), None);
    assert_eq!(row_id(&json!({"id": "x"})), None);
    assert_eq!(row_id(&json!({"Title": "no id"})), None);
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

#[test]
fn marker_filter_without_flag_is_unchanged() {
    let filter = pairs(&[("zipcode", "1190"), ("architect", "Ehn")]);
    assert_eq!(normalize_marker_filter(&filter), filter);
}

#[test]
fn marker_filter_sends_flag_under_both_names() {
    let filter = pairs(&[("art_visible", "true"), ("zipcode", "1190")]);
    assert_eq!(
        normalize_marker_filter(&filter),
        pairs(&[("zipcode", "1190"), ("artVisible", "1"), ("art_visible", "1")])
    );
}

#[test]
fn marker_filter_prefers_camel_case_flag() {
    let filter = pairs(&[("art_visible", "1"), ("artVisible", "false")]);
    assert_eq!(
        normalize_marker_filter(&filter),
        pairs(&[("artVisible", "0"), ("art_visible", "0")])
    );
}
