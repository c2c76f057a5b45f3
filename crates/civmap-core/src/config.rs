use crate::app_config::{AppConfig, Environment, MapDefaults};
use crate::ConfigError;

const DEFAULT_RELAY_ENDPOINTS: &str = "/api/maps/local,/api/maps/json,/api/test-kml-import";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a working
/// development config pointed at `http://localhost:3002`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u8 = |var: &str, default: &str| -> Result<u8, ConfigError> {
        or_default(var, default)
            .parse::<u8>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("CIVMAP_ENV", "development"));
    let log_level = or_default("CIVMAP_LOG_LEVEL", "info");

    let api_base_url = or_default("CIVMAP_API_BASE_URL", "http://localhost:3002");
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(invalid(
            "CIVMAP_API_BASE_URL",
            format!("expected an http(s) URL, got \"{api_base_url}\""),
        ));
    }

    let relay_endpoints = parse_endpoint_list(&or_default(
        "CIVMAP_RELAY_ENDPOINTS",
        DEFAULT_RELAY_ENDPOINTS,
    ))?;

    let relay_timeout_secs = parse_u64("CIVMAP_RELAY_TIMEOUT_SECS", "10")?;
    let client_timeout_secs = parse_u64("CIVMAP_CLIENT_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("CIVMAP_USER_AGENT", "civmap/0.1 (municipal-portal)");
    let page_size = parse_u32("CIVMAP_PAGE_SIZE", "50")?;
    if page_size == 0 {
        return Err(invalid("CIVMAP_PAGE_SIZE", "must be at least 1".to_string()));
    }
    let max_retries = parse_u32("CIVMAP_MAX_RETRIES", "0")?;
    let retry_backoff_base_ms = parse_u64("CIVMAP_RETRY_BACKOFF_BASE_MS", "250")?;
    let layers_path = lookup("CIVMAP_LAYERS_PATH").ok().map(PathBuf::from);

    let focus_zoom = parse_u8("CIVMAP_FOCUS_ZOOM", "18")?;
    let map = MapDefaults {
        focus_zoom,
        ..MapDefaults::default()
    };

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        relay_endpoints,
        relay_timeout_secs,
        client_timeout_secs,
        user_agent,
        page_size,
        max_retries,
        retry_backoff_base_ms,
        layers_path,
        map,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Split a comma-separated endpoint list, normalising each entry to start
/// with exactly one `/`.
fn parse_endpoint_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let endpoints: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("/{}", s.trim_start_matches('/')))
        .collect();

    if endpoints.is_empty() {
        return Err(ConfigError::Validation(
            "CIVMAP_RELAY_ENDPOINTS must name at least one endpoint".to_string(),
        ));
    }
    Ok(endpoints)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
