use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("GBVIEW_API_BASE_URL", "https://example.org/get_data.php");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_rejects_unknown() {
    let result = parse_environment("staging");
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GBVIEW_ENV"),
        "expected InvalidEnvVar(GBVIEW_ENV), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_api_base_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "GBVIEW_API_BASE_URL"),
        "expected MissingEnvVar(GBVIEW_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_api_base_url_as_missing() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("GBVIEW_API_BASE_URL", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_rejects_non_http_base_url() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("GBVIEW_API_BASE_URL", "ftp://example.org/get_data.php");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GBVIEW_API_BASE_URL"),
        "expected InvalidEnvVar(GBVIEW_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.api_base_url, "https://example.org/get_data.php");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 15);
    assert_eq!(cfg.user_agent, "gbview/0.1 (panorama-viewer)");
    assert_eq!(cfg.enrich_concurrency, 8);
    assert_eq!(cfg.fetch_timeout_secs, 20);
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_secs, 1);
    assert!(cfg.google_maps_api_key.is_none());
}

#[test]
fn enrich_concurrency_override() {
    let mut map = full_env();
    map.insert("GBVIEW_ENRICH_CONCURRENCY", "3");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.enrich_concurrency, 3);
}

#[test]
fn enrich_concurrency_zero_is_rejected() {
    let mut map = full_env();
    map.insert("GBVIEW_ENRICH_CONCURRENCY", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GBVIEW_ENRICH_CONCURRENCY"),
        "expected InvalidEnvVar(GBVIEW_ENRICH_CONCURRENCY), got: {result:?}"
    );
}

#[test]
fn request_timeout_invalid() {
    let mut map = full_env();
    map.insert("GBVIEW_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GBVIEW_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(GBVIEW_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn zero_request_timeout_is_rejected() {
    let mut map = full_env();
    map.insert("GBVIEW_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GBVIEW_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(GBVIEW_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn zero_fetch_timeout_is_rejected() {
    let mut map = full_env();
    map.insert("GBVIEW_FETCH_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GBVIEW_FETCH_TIMEOUT_SECS"),
        "expected InvalidEnvVar(GBVIEW_FETCH_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn fetch_timeout_override() {
    let mut map = full_env();
    map.insert("GBVIEW_FETCH_TIMEOUT_SECS", "1");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.fetch_timeout_secs, 1);
}

#[test]
fn max_retries_override() {
    let mut map = full_env();
    map.insert("GBVIEW_MAX_RETRIES", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_retries, 5);
}

#[test]
fn google_maps_api_key_is_read_and_redacted_in_debug() {
    let mut map = full_env();
    map.insert("GOOGLE_MAPS_API_KEY", "secret-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.google_maps_api_key.as_deref(), Some("secret-key"));
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("secret-key"), "key leaked: {debug}");
    assert!(debug.contains("[redacted]"));
}

#[test]
fn blank_google_maps_api_key_is_absent() {
    let mut map = full_env();
    map.insert("GOOGLE_MAPS_API_KEY", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.google_maps_api_key.is_none());
}
