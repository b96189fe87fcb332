use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a plain
/// `HashMap` instead of mutating global state.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let api_base_url = require("GBVIEW_API_BASE_URL")?;
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "GBVIEW_API_BASE_URL".to_string(),
            reason: "must be an http(s) URL".to_string(),
        });
    }

    let env = parse_environment(&or_default("GBVIEW_ENV", "development"))?;
    let log_level = or_default("GBVIEW_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("GBVIEW_REQUEST_TIMEOUT_SECS", "15")?;
    require_nonzero("GBVIEW_REQUEST_TIMEOUT_SECS", request_timeout_secs)?;
    let user_agent = or_default("GBVIEW_USER_AGENT", "gbview/0.1 (panorama-viewer)");
    let enrich_concurrency = parse_usize("GBVIEW_ENRICH_CONCURRENCY", "8")?;
    if enrich_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "GBVIEW_ENRICH_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let fetch_timeout_secs = parse_u64("GBVIEW_FETCH_TIMEOUT_SECS", "20")?;
    require_nonzero("GBVIEW_FETCH_TIMEOUT_SECS", fetch_timeout_secs)?;
    let max_retries = parse_u32("GBVIEW_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("GBVIEW_RETRY_BACKOFF_BASE_SECS", "1")?;

    let google_maps_api_key = lookup("GOOGLE_MAPS_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());

    Ok(AppConfig {
        api_base_url,
        env,
        log_level,
        request_timeout_secs,
        user_agent,
        enrich_concurrency,
        fetch_timeout_secs,
        max_retries,
        retry_backoff_base_secs,
        google_maps_api_key,
    })
}

/// A zero timeout would fail every request, so it is rejected up front.
fn require_nonzero(var: &str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }
    Ok(())
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GBVIEW_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
