//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Record store (optional at startup)
//! - `AIRTABLE_API_KEY` - Airtable personal access token
//! - `AIRTABLE_BASE_ID` - Airtable base id (e.g., appXXXXXXXXXXXXXX)
//!
//! Missing credentials do not stop the server; every request that needs the
//! record store fails with a "not configured" error instead.
//!
//! ## Optional
//! - `AIRTABLE_API_URL` - API root (default: <https://api.airtable.com/v0>)
//! - `AIRTABLE_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `AIRTABLE_PUPPIES_TABLE` - Puppy table name (default: Puppies)
//! - `AIRTABLE_SHOPS_TABLE` - Pet shop table name (default: Pet Shops)
//! - `AIRTABLE_REGISTRATIONS_TABLE` - Inquiry table name (default: Registrations)
//! - `AIRTABLE_PUPPY_FILTER` - Listing formula (default: `Available = TRUE()`, empty disables)
//! - `AIRTABLE_SHOPS_VIEW` - View used when listing shops
//! - `LISTING_CACHE_TTL_SECS` - Listing freshness window (default: 300)
//! - `CLOUDINARY_CLOUD_NAME` - Only rewrite image URLs belonging to this cloud
//! - `CDN_TRANSFORMATION` - Token inserted after `/upload/` (default: `f_auto,q_auto,w_400,c_limit`)
//! - `STOREFRONT_HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` / `STOREFRONT_PORT` - Listen port (default: 5000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default Airtable REST API root.
pub const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";

/// Default image transformation inserted into CDN delivery URLs.
pub const DEFAULT_CDN_TRANSFORMATION: &str = "f_auto,q_auto,w_400,c_limit";

/// Default listing freshness window.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Record store configuration
    pub airtable: AirtableConfig,
    /// Listing cache and image delivery configuration
    pub catalog: CatalogConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Airtable connection configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AirtableConfig {
    /// Personal access token, if configured
    pub api_key: Option<SecretString>,
    /// Base id, if configured
    pub base_id: Option<String>,
    /// REST API root
    pub api_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_id", &self.base_id)
            .field("api_url", &self.api_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AirtableConfig {
    /// Configuration pointing at `api_url` with the given credentials.
    #[must_use]
    pub fn new(api_key: Option<SecretString>, base_id: Option<String>, api_url: Url) -> Self {
        Self {
            api_key,
            base_id,
            api_url,
            timeout: Duration::from_secs(10),
        }
    }

    /// Whether both credentials are present.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.base_id.is_some()
    }
}

/// Table names and listing behaviour.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Puppy table name
    pub puppies_table: String,
    /// Pet shop table name
    pub shops_table: String,
    /// Registration inquiry table name
    pub registrations_table: String,
    /// Formula restricting the puppy listing (e.g., only available puppies)
    pub puppy_filter: Option<String>,
    /// View used when listing shops
    pub shops_view: Option<String>,
    /// Freshness window for both listing caches
    pub cache_ttl: Duration,
    /// Transformation token inserted after `/upload/`
    pub cdn_transformation: String,
    /// Restrict rewriting to this CDN cloud
    pub cdn_cloud_name: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            puppies_table: "Puppies".to_string(),
            shops_table: "Pet Shops".to_string(),
            registrations_table: "Registrations".to_string(),
            puppy_filter: Some("Available = TRUE()".to_string()),
            shops_view: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            cdn_transformation: DEFAULT_CDN_TRANSFORMATION.to_string(),
            cdn_cloud_name: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("STOREFRONT_HOST", "0.0.0.0".parse::<IpAddr>())?;
        let port_default = get_optional_env("PORT").unwrap_or_else(|| "5000".to_string());
        let port = get_env_or_default("STOREFRONT_PORT", &port_default)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string()))?;

        let airtable = AirtableConfig::from_env()?;
        let catalog = CatalogConfig::from_env()?;

        Ok(Self {
            host,
            port,
            airtable,
            catalog,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", Ok(1.0))?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", Ok(0.0))?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AirtableConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = get_optional_env("AIRTABLE_API_KEY")
            .map(|key| {
                validate_secret_strength(&key, "AIRTABLE_API_KEY")?;
                Ok(SecretString::from(key))
            })
            .transpose()?;

        let api_url = get_env_or_default("AIRTABLE_API_URL", DEFAULT_AIRTABLE_API_URL);
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("AIRTABLE_API_URL".to_string(), e.to_string()))?;

        let timeout_secs: u64 = parse_env_or_default("AIRTABLE_TIMEOUT_SECS", Ok(10))?;

        Ok(Self {
            api_key,
            base_id: get_optional_env("AIRTABLE_BASE_ID"),
            api_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let ttl_secs: u64 =
            parse_env_or_default("LISTING_CACHE_TTL_SECS", Ok(defaults.cache_ttl.as_secs()))?;

        // An explicitly empty filter disables filtering
        let puppy_filter = match std::env::var("AIRTABLE_PUPPY_FILTER") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(value),
            Err(_) => defaults.puppy_filter,
        };

        Ok(Self {
            puppies_table: get_env_or_default("AIRTABLE_PUPPIES_TABLE", &defaults.puppies_table),
            shops_table: get_env_or_default("AIRTABLE_SHOPS_TABLE", &defaults.shops_table),
            registrations_table: get_env_or_default(
                "AIRTABLE_REGISTRATIONS_TABLE",
                &defaults.registrations_table,
            ),
            puppy_filter,
            shops_view: get_optional_env("AIRTABLE_SHOPS_VIEW"),
            cache_ttl: Duration::from_secs(ttl_secs),
            cdn_transformation: get_env_or_default(
                "CDN_TRANSFORMATION",
                &defaults.cdn_transformation,
            ),
            cdn_cloud_name: get_optional_env("CLOUDINARY_CLOUD_NAME"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional, non-blank environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, using `default` when it is unset.
fn parse_env_or_default<T>(key: &str, default: Result<T, T::Err>) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key)
        .map_or(default, |value| value.trim().parse::<T>())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Reject secrets that are obviously copied from a template.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-airtable-key", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        assert!(validate_secret_strength("CHANGEME", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result =
            validate_secret_strength("patAbc123.0f9e8d7c6b5a4f3e2d1c0b9a8f7e6d5c", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_env_or_default_uses_default_when_unset() {
        let value: u64 =
            parse_env_or_default("PUP_MARKET_TEST_SURELY_UNSET_VAR", Ok(42)).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            airtable: AirtableConfig::new(
                None,
                None,
                Url::parse(DEFAULT_AIRTABLE_API_URL).unwrap(),
            ),
            catalog: CatalogConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_airtable_config_is_configured() {
        let url = Url::parse(DEFAULT_AIRTABLE_API_URL).unwrap();
        let missing = AirtableConfig::new(None, Some("appBase".to_string()), url.clone());
        assert!(!missing.is_configured());

        let complete = AirtableConfig::new(
            Some(SecretString::from("patKey")),
            Some("appBase".to_string()),
            url,
        );
        assert!(complete.is_configured());
    }

    #[test]
    fn test_airtable_config_debug_redacts_key() {
        let config = AirtableConfig::new(
            Some(SecretString::from("patSuperSecretToken")),
            Some("appBase123".to_string()),
            Url::parse(DEFAULT_AIRTABLE_API_URL).unwrap(),
        );

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("appBase123"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("patSuperSecretToken"));
    }

    #[test]
    fn test_catalog_config_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.puppies_table, "Puppies");
        assert_eq!(config.shops_table, "Pet Shops");
        assert_eq!(config.puppy_filter.as_deref(), Some("Available = TRUE()"));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }
}
