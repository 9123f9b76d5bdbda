//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WELLSPRING_API_BASE_URL` - Base URL of the marketplace backend
//!
//! ## Optional
//! - `WELLSPRING_LOCALE` - Language sent as `X-localization` (default: en)
//! - `WELLSPRING_SESSION_FILE` - Persist the session to this JSON file
//! - `WELLSPRING_CATALOG_CACHE_TTL_SECS` - Catalog cache TTL (default: 300)
//! - `WELLSPRING_TOAST_DURATION_MS` - Default toast lifetime (default: 3000)
//! - `WELLSPRING_LOG_JSON` - Emit logs as JSON lines (`true`/`1`/`yes`, default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_LOCALE: &str = "en";
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_TOAST_DURATION_MS: u64 = 3000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend base URL (resource paths such as `api/v1/config` are joined to it)
    pub api_base_url: Url,
    /// Language code sent with every request
    pub locale: String,
    /// Where to persist the session; `None` keeps it in memory
    pub session_file: Option<PathBuf>,
    /// Time-to-live for cached catalog reads (config, modules, categories)
    pub catalog_cache_ttl: Duration,
    /// Default lifetime of a toast notification
    pub toast_duration: Duration,
    /// Structured JSON log output instead of human-readable text
    pub log_json: bool,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry configuration.
///
/// Implements `Debug` manually to redact the DSN.
#[derive(Clone, Default)]
pub struct SentryConfig {
    /// Sentry DSN; Sentry stays disabled when absent
    pub dsn: Option<SecretString>,
    /// Environment tag (e.g. "production")
    pub environment: Option<String>,
    /// Error event sample rate
    pub sample_rate: f32,
    /// Performance trace sample rate
    pub traces_sample_rate: f32,
}

impl std::fmt::Debug for SentryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryConfig")
            .field("dsn", &self.dsn.as_ref().map(|_| "[REDACTED]"))
            .field("environment", &self.environment)
            .field("sample_rate", &self.sample_rate)
            .field("traces_sample_rate", &self.traces_sample_rate)
            .finish()
    }
}

impl StorefrontConfig {
    /// Configuration with defaults for everything except the backend URL.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            locale: DEFAULT_LOCALE.to_string(),
            session_file: None,
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
            toast_duration: Duration::from_millis(DEFAULT_TOAST_DURATION_MS),
            log_json: false,
            sentry: SentryConfig {
                sample_rate: 1.0,
                ..SentryConfig::default()
            },
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_required_env("WELLSPRING_API_BASE_URL")?;
        let api_base_url = Url::parse(&api_base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("WELLSPRING_API_BASE_URL".to_string(), e.to_string())
        })?;

        let catalog_cache_ttl = Duration::from_secs(get_parsed_env(
            "WELLSPRING_CATALOG_CACHE_TTL_SECS",
            DEFAULT_CATALOG_CACHE_TTL_SECS,
        )?);
        let toast_duration = Duration::from_millis(get_parsed_env(
            "WELLSPRING_TOAST_DURATION_MS",
            DEFAULT_TOAST_DURATION_MS,
        )?);

        Ok(Self {
            api_base_url,
            locale: get_env_or_default("WELLSPRING_LOCALE", DEFAULT_LOCALE),
            session_file: get_optional_env("WELLSPRING_SESSION_FILE").map(PathBuf::from),
            catalog_cache_ttl,
            toast_duration,
            log_json: get_flag_env("WELLSPRING_LOG_JSON")?,
            sentry: SentryConfig::from_env()?,
        })
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN").map(SecretString::from),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: get_parsed_env("SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: get_parsed_env("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Read a boolean flag; unset means `false`.
fn get_flag_env(key: &str) -> Result<bool, ConfigError> {
    get_optional_env(key).map_or(Ok(false), |raw| parse_flag(key, &raw))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = StorefrontConfig::new(Url::parse("https://api.example.com").unwrap());
        assert_eq!(config.locale, "en");
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.toast_duration, Duration::from_millis(3000));
        assert!(config.session_file.is_none());
        assert!(config.sentry.dsn.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn test_log_json_flag_parsing() {
        for raw in ["1", "true", "YES", " on "] {
            assert!(parse_flag("WELLSPRING_LOG_JSON", raw).unwrap(), "{raw}");
        }
        for raw in ["0", "false", "No", "off"] {
            assert!(!parse_flag("WELLSPRING_LOG_JSON", raw).unwrap(), "{raw}");
        }
        let err = parse_flag("WELLSPRING_LOG_JSON", "json").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "WELLSPRING_LOG_JSON"));
    }

    #[test]
    fn test_flag_env_unset_is_false() {
        assert!(!get_flag_env("WELLSPRING_TEST_SURELY_UNSET_FLAG").unwrap());
    }

    #[test]
    fn test_get_parsed_env_missing_uses_default() {
        let value: u64 = get_parsed_env("WELLSPRING_TEST_SURELY_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_get_required_env_missing() {
        let err = get_required_env("WELLSPRING_TEST_SURELY_UNSET_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_sentry_config_debug_redacts_dsn() {
        let config = SentryConfig {
            dsn: Some(SecretString::from("https://key@sentry.example.com/1")),
            environment: Some("staging".to_string()),
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("staging"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("key@sentry"));
    }
}
