use crate::app_config::{AppConfig, DisplayLocale, Environment};
use crate::ConfigError;

const DEFAULT_SYNC_CRON: &str = "0 0 * * * *";
const SYNC_FUNCTION_PATH: &str = "functions/v1/magento-sync";

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
/// Credentials are optional; only malformed values are errors.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let env = parse_environment(&or_default("MAGDASH_ENV", "development"))?;
    let locale = parse_locale(&or_default("MAGDASH_LOCALE", "da"))?;

    let bind_addr = or_default("MAGDASH_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("MAGDASH_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("MAGDASH_LOG_LEVEL", "info");

    let http_timeout_secs = or_default("MAGDASH_HTTP_TIMEOUT_SECS", "30")
        .parse::<u64>()
        .map_err(|e| invalid("MAGDASH_HTTP_TIMEOUT_SECS", e.to_string()))?;

    let hosted_url = optional("MAGDASH_HOSTED_URL").map(|u| u.trim_end_matches('/').to_string());
    let hosted_anon_key = optional("MAGDASH_HOSTED_ANON_KEY");

    let sync_endpoint = optional("MAGDASH_SYNC_ENDPOINT").or_else(|| {
        hosted_url
            .as_deref()
            .map(|base| format!("{base}/{SYNC_FUNCTION_PATH}"))
    });
    let sync_bearer = optional("MAGDASH_SYNC_BEARER").or_else(|| hosted_anon_key.clone());

    let sync_cron = match or_default("MAGDASH_SYNC_CRON", DEFAULT_SYNC_CRON).as_str() {
        "disabled" | "off" => None,
        cron => Some(cron.to_string()),
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        hosted_url,
        hosted_anon_key,
        sync_endpoint,
        sync_bearer,
        sync_cron,
        http_timeout_secs,
        locale,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MAGDASH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_locale(s: &str) -> Result<DisplayLocale, ConfigError> {
    match s {
        "da" | "da-DK" => Ok(DisplayLocale::Danish),
        "en" | "en-US" => Ok(DisplayLocale::English),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MAGDASH_LOCALE".to_string(),
            reason: format!("unsupported locale '{other}'"),
        }),
    }
}
