use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_ALLOWED_ORIGINS: &str = "https://chat.openai.com,http://localhost";

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
/// Returns `ConfigError` if required env vars are missing, values are invalid,
/// or the privacy page override cannot be read.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    let mut config = build_app_config(|key| std::env::var(key))?;
    if let Ok(path) = std::env::var("IGCOACH_PRIVACY_PAGE_PATH") {
        let page = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileIo {
            path: path.clone(),
            source: e,
        })?;
        config.privacy_page = Some(page);
    }
    Ok(config)
}

/// Build application configuration using the provided env-var lookup function.
///
/// Pure over `lookup`, so tests drive it with a `HashMap` instead of
/// mutating the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let llm_api_key = require("OPENAI_API_KEY")?;

    let env = parse_environment(&or_default("IGCOACH_ENV", "development"));

    let bind_addr = or_default("IGCOACH_BIND_ADDR", "0.0.0.0:8000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("IGCOACH_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("IGCOACH_LOG_LEVEL", "info");

    let api_keys = split_list(&or_default("IGCOACH_API_KEYS", ""));
    let allowed_origins = split_list(&or_default(
        "IGCOACH_ALLOWED_ORIGINS",
        DEFAULT_ALLOWED_ORIGINS,
    ));

    let llm_base_url = or_default("IGCOACH_LLM_BASE_URL", "https://api.openai.com/v1");
    let llm_model = or_default("IGCOACH_LLM_MODEL", "gpt-5.1");
    let llm_temperature = or_default("IGCOACH_LLM_TEMPERATURE", "0.3")
        .parse::<f32>()
        .map_err(|e| invalid("IGCOACH_LLM_TEMPERATURE", e.to_string()))?;
    if !(0.0..=2.0).contains(&llm_temperature) {
        return Err(invalid(
            "IGCOACH_LLM_TEMPERATURE",
            format!("{llm_temperature} is outside 0.0..=2.0"),
        ));
    }
    let llm_timeout_secs = or_default("IGCOACH_LLM_TIMEOUT_SECS", "120")
        .parse::<u64>()
        .map_err(|e| invalid("IGCOACH_LLM_TIMEOUT_SECS", e.to_string()))?;

    let report_language = or_default("IGCOACH_REPORT_LANGUAGE", "Korean");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        api_keys,
        allowed_origins,
        llm_api_key,
        llm_base_url,
        llm_model,
        llm_temperature,
        llm_timeout_secs,
        report_language,
        privacy_page: None,
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

/// Splits a comma-separated list, trimming entries and dropping empties.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
