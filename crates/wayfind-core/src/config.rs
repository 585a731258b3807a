use crate::app_config::{AppConfig, Environment, GroundingTool};
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
/// Decoupled from the process environment so tests can drive it from a
/// `HashMap`.
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

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got '{other}'"),
            }),
        }
    };

    let gemini_api_key = require("WAYFIND_GEMINI_API_KEY")?;
    let env = parse_environment(&or_default("WAYFIND_ENV", "development"))?;
    let log_level = or_default("WAYFIND_LOG_LEVEL", "info");

    let gemini_base_url = or_default(
        "WAYFIND_GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    let gemini_model = or_default("WAYFIND_GEMINI_MODEL", "gemini-2.5-flash");
    let grounding = parse_grounding(&or_default("WAYFIND_GROUNDING", "maps"))?;

    let request_timeout_secs = parse_u64("WAYFIND_REQUEST_TIMEOUT_SECS", "120")?;
    let retry_max_attempts = parse_u32("WAYFIND_RETRY_MAX_ATTEMPTS", "3")?;
    if retry_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WAYFIND_RETRY_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let retry_initial_delay_ms = parse_u64("WAYFIND_RETRY_INITIAL_DELAY_MS", "1000")?;
    let retry_jitter = parse_bool("WAYFIND_RETRY_JITTER", "true")?;

    Ok(AppConfig {
        env,
        log_level,
        gemini_api_key,
        gemini_base_url,
        gemini_model,
        grounding,
        request_timeout_secs,
        retry_max_attempts,
        retry_initial_delay_ms,
        retry_jitter,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "WAYFIND_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_grounding(s: &str) -> Result<GroundingTool, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "maps" => Ok(GroundingTool::GoogleMaps),
        "search" => Ok(GroundingTool::GoogleSearch),
        "none" | "" => Ok(GroundingTool::None),
        other => Err(ConfigError::InvalidEnvVar {
            var: "WAYFIND_GROUNDING".to_string(),
            reason: format!("expected maps, search or none, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
