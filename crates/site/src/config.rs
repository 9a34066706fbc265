//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Storage
//! - `SITE_STORE` - `postgres` (default) or `memory` (development only, data is lost on restart)
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`);
//!   required when `SITE_STORE=postgres`
//!
//! ## Server
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_CORS_ORIGIN` - Origin of the static frontend, if served from another host
//! - `SITE_RATE_LIMIT` - Rate limit admin auth endpoints (default: true)
//! - `SITE_TRUSTED_PROXY` - `none` (default), `cloudflare` or `fly`. Selects the
//!   proxy header the rate limiter reads the client IP from; with `none` the
//!   peer address of the connection is used
//!
//! ## Notifications (first configured wins)
//! - `NOTIFY_WEBHOOK_URL` - Endpoint receiving `{title, content}` JSON
//! - `NOTIFY_WEBHOOK_TOKEN` - Optional bearer token for the webhook
//! - `NOTIFY_SMTP_HOST` - SMTP relay host
//! - `NOTIFY_SMTP_PORT` - SMTP port (default: 587)
//! - `NOTIFY_SMTP_USERNAME` / `NOTIFY_SMTP_PASSWORD` - SMTP credentials (optional)
//! - `NOTIFY_FROM` - Sender address (required with SMTP)
//! - `NOTIFY_TO` - Owner address (required with SMTP)
//! - `NOTIFY_TIMEOUT_SECS` - Upper bound on notification delivery in seconds,
//!   at least 1 (default: 10)
//!
//! ## Error tracking
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
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
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Storage backend
    pub store: StoreBackend,
    /// Owner notification settings
    pub notify: NotifyConfig,
    /// Allowed cross-origin frontend, if any
    pub cors_origin: Option<String>,
    /// Whether admin auth endpoints are rate limited
    pub rate_limit: bool,
    /// Proxy whose client IP header the rate limiter trusts
    pub trusted_proxy: TrustedProxy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Where submissions and the admin credential are kept.
#[derive(Clone)]
pub enum StoreBackend {
    /// `PostgreSQL` at the given URL (contains password)
    Postgres { database_url: SecretString },
    /// Process memory; everything is lost on restart
    Memory,
}

impl std::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("database_url", &"[REDACTED]")
                .finish(),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// Reverse proxy in front of the site.
///
/// Client IP headers are only read from the proxy named here. Any other
/// forwarding header is client-controlled and ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrustedProxy {
    /// Directly exposed: key on the connection's peer address
    #[default]
    None,
    /// Cloudflare: `CF-Connecting-IP`
    Cloudflare,
    /// Fly.io edge: `Fly-Client-IP`
    Fly,
}

impl TrustedProxy {
    /// Header carrying the client IP set by this proxy.
    #[must_use]
    pub const fn client_ip_header(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Cloudflare => Some("cf-connecting-ip"),
            Self::Fly => Some("fly-client-ip"),
        }
    }
}

impl std::str::FromStr for TrustedProxy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "cloudflare" => Ok(Self::Cloudflare),
            "fly" => Ok(Self::Fly),
            other => Err(ConfigError::InvalidEnvVar(
                "SITE_TRUSTED_PROXY".to_string(),
                format!("expected 'none', 'cloudflare' or 'fly', got '{other}'"),
            )),
        }
    }
}

/// Owner notification configuration.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub webhook: Option<WebhookConfig>,
    pub smtp: Option<SmtpConfig>,
    /// Upper bound on a single delivery attempt
    pub timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook: None,
            smtp: None,
            timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        }
    }
}

/// Webhook notifier configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct WebhookConfig {
    pub url: Url,
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("url", &self.url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// SMTP notifier configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,
    /// SMTP server port
    pub port: u16,
    /// SMTP authentication username
    pub username: Option<String>,
    /// SMTP authentication password
    pub password: Option<SecretString>,
    /// Sender address (From header)
    pub from_address: String,
    /// Owner address receiving notifications
    pub to_address: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("from_address", &self.from_address)
            .field("to_address", &self.to_address)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;

        let store = StoreBackend::from_env()?;
        let notify = NotifyConfig::from_env()?;
        let cors_origin = get_optional_env("SITE_CORS_ORIGIN");
        let rate_limit = parse_bool("SITE_RATE_LIMIT", &get_env_or_default("SITE_RATE_LIMIT", "true"))?;
        let trusted_proxy = get_env_or_default("SITE_TRUSTED_PROXY", "none").parse()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            store,
            notify,
            cors_origin,
            rate_limit,
            trusted_proxy,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// A configuration for tests and local tooling: in-memory store, log-only
    /// notifications, no rate limiting, no Sentry.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            store: StoreBackend::Memory,
            notify: NotifyConfig::default(),
            cors_origin: None,
            rate_limit: false,
            trusted_proxy: TrustedProxy::None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StoreBackend {
    fn from_env() -> Result<Self, ConfigError> {
        match get_env_or_default("SITE_STORE", "postgres").as_str() {
            "postgres" => Ok(Self::Postgres {
                database_url: get_database_url("SITE_DATABASE_URL")?,
            }),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidEnvVar(
                "SITE_STORE".to_string(),
                format!("expected 'postgres' or 'memory', got '{other}'"),
            )),
        }
    }
}

impl NotifyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout = parse_timeout_secs(
            "NOTIFY_TIMEOUT_SECS",
            &get_env_or_default("NOTIFY_TIMEOUT_SECS", &DEFAULT_NOTIFY_TIMEOUT_SECS.to_string()),
        )?;

        Ok(Self {
            webhook: WebhookConfig::from_env()?,
            smtp: SmtpConfig::from_env()?,
            timeout,
        })
    }
}

impl WebhookConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(raw_url) = get_optional_env("NOTIFY_WEBHOOK_URL") else {
            return Ok(None);
        };

        let url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("NOTIFY_WEBHOOK_URL".to_string(), e.to_string())
        })?;

        let token = if get_optional_env("NOTIFY_WEBHOOK_TOKEN").is_some() {
            Some(get_validated_secret("NOTIFY_WEBHOOK_TOKEN")?)
        } else {
            None
        };

        Ok(Some(Self { url, token }))
    }
}

impl SmtpConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(host) = get_optional_env("NOTIFY_SMTP_HOST") else {
            return Ok(None);
        };

        let port = get_env_or_default("NOTIFY_SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("NOTIFY_SMTP_PORT".to_string(), e.to_string())
            })?;

        Ok(Some(Self {
            host,
            port,
            username: get_optional_env("NOTIFY_SMTP_USERNAME"),
            password: get_optional_env("NOTIFY_SMTP_PASSWORD").map(SecretString::from),
            from_address: get_required_env("NOTIFY_FROM")?,
            to_address: get_required_env("NOTIFY_TO")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Parse a whole number of seconds. Zero is rejected.
fn parse_timeout_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be at least 1 second".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
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

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-webhook-token", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(parse_bool("X", "ON").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let mut config = SiteConfig::in_memory();
        config.port = 3000;

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let store = StoreBackend::Postgres {
            database_url: SecretString::from("postgres://site:hunter2@db/site"),
        };
        let smtp = SmtpConfig {
            host: "smtp.mail.test".to_string(),
            port: 587,
            username: Some("mailer".to_string()),
            password: Some(SecretString::from("smtp_password_value")),
            from_address: "site@bridgia.test".to_string(),
            to_address: "owner@bridgia.test".to_string(),
        };

        let debug_output = format!("{store:?} {smtp:?}");

        assert!(debug_output.contains("smtp.mail.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
        assert!(!debug_output.contains("smtp_password_value"));
    }

    #[test]
    fn test_default_notify_timeout() {
        assert_eq!(NotifyConfig::default().timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_notify_timeout_rejects_zero() {
        let result = parse_timeout_secs("NOTIFY_TIMEOUT_SECS", "0");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "NOTIFY_TIMEOUT_SECS"
        ));
        assert!(parse_timeout_secs("NOTIFY_TIMEOUT_SECS", "-3").is_err());
        assert_eq!(
            parse_timeout_secs("NOTIFY_TIMEOUT_SECS", "30").unwrap(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_trusted_proxy_parse() {
        assert_eq!("none".parse::<TrustedProxy>().unwrap(), TrustedProxy::None);
        assert_eq!(
            "Cloudflare".parse::<TrustedProxy>().unwrap(),
            TrustedProxy::Cloudflare
        );
        assert_eq!("fly".parse::<TrustedProxy>().unwrap(), TrustedProxy::Fly);
        assert!("x-forwarded-for".parse::<TrustedProxy>().is_err());
        assert_eq!(TrustedProxy::default().client_ip_header(), None);
    }
}
