//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `OPENAI_API_KEY` - Completion provider API key
//! - `SPEAKERLAB_SESSION_SECRET` - Session cookie signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `SPEAKERLAB_HOST` - Bind address (default: 0.0.0.0)
//! - `SPEAKERLAB_PORT` or `PORT` - Listen port (default: 10000)
//! - `SPEAKERLAB_BASE_URL` - Public URL (default: <http://localhost:10000>)
//! - `SPEAKERLAB_DATA_DIR` - Directory for user/history stores and reports (default: data)
//! - `OPENAI_BASE_URL` - Chat-completions API root (default: <https://api.openai.com/v1>)
//! - `SPEAKERLAB_MODEL_BASIC` - Model for the free tier (default: gpt-3.5-turbo)
//! - `SPEAKERLAB_MODEL_ADVANCED` - Model for paid tiers (default: gpt-4o)
//! - `SPEAKERLAB_ADMIN_EMAIL` / `SPEAKERLAB_ADMIN_PASSWORD` - Seed a curator account at startup
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_BASIC_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_ADVANCED_MODEL: &str = "gpt-4o";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
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

/// Speaker Lab service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL (decides whether cookies are marked secure)
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Root directory for the flat-file stores and generated reports
    pub data_dir: PathBuf,
    /// Completion provider configuration
    pub openai: OpenAiConfig,
    /// Account created at startup if missing
    pub seed_admin: Option<SeedAdmin>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Chat-completions provider configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Provider API key
    pub api_key: SecretString,
    /// API root, without the `/chat/completions` suffix
    pub base_url: String,
    /// Model used by the free tier
    pub basic_model: String,
    /// Model used by paid tiers
    pub advanced_model: String,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("basic_model", &self.basic_model)
            .field("advanced_model", &self.advanced_model)
            .finish()
    }
}

/// Credentials for the curator account seeded at startup.
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: SecretString,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
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

        let host = get_env_or_default("SPEAKERLAB_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SPEAKERLAB_HOST".to_string(), e.to_string()))?;
        let port = get_optional_env("SPEAKERLAB_PORT")
            .or_else(|| get_optional_env("PORT"))
            .unwrap_or_else(|| "10000".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SPEAKERLAB_PORT".to_string(), e.to_string()))?;
        let base_url =
            get_env_or_default("SPEAKERLAB_BASE_URL", &format!("http://localhost:{port}"));
        let session_secret = get_validated_secret("SPEAKERLAB_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "SPEAKERLAB_SESSION_SECRET")?;
        let data_dir = PathBuf::from(get_env_or_default("SPEAKERLAB_DATA_DIR", "data"));

        let openai = OpenAiConfig::from_env()?;
        let seed_admin = SeedAdmin::from_env();

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            data_dir,
            openai,
            seed_admin,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_optional_env("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.0),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Directory that holds generated PDFs and chart images.
    #[must_use]
    pub fn report_dir(&self) -> PathBuf {
        self.data_dir.join("pdf")
    }

    /// Whether the public URL is served over TLS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl OpenAiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret("OPENAI_API_KEY")?,
            base_url: get_env_or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            basic_model: get_env_or_default("SPEAKERLAB_MODEL_BASIC", DEFAULT_BASIC_MODEL),
            advanced_model: get_env_or_default("SPEAKERLAB_MODEL_ADVANCED", DEFAULT_ADVANCED_MODEL),
        })
    }
}

impl SeedAdmin {
    fn from_env() -> Option<Self> {
        let email = get_optional_env("SPEAKERLAB_ADMIN_EMAIL")?;
        let password = get_optional_env("SPEAKERLAB_ADMIN_PASSWORD")?;
        Some(Self {
            email,
            password: SecretString::from(password),
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

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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
    let len = s.chars().count() as f64;
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

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
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

    fn test_openai() -> OpenAiConfig {
        OpenAiConfig {
            api_key: SecretString::from("sk-live-very-secret-value"),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            basic_model: "basic-model".to_string(),
            advanced_model: "advanced-model".to_string(),
        }
    }

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        let err = validate_secret_strength("your-openai-key", "OPENAI_API_KEY").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
        assert!(validate_secret_strength("changeme123", "X").is_err());
    }

    #[test]
    fn test_low_entropy_secret_rejected() {
        let result = validate_secret_strength(&"a".repeat(40), "X");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_random_secret_accepted() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "X").is_ok());
    }

    #[test]
    fn test_session_secret_length() {
        assert!(validate_session_secret(&SecretString::from("short"), "S").is_err());
        assert!(validate_session_secret(&SecretString::from("a".repeat(32)), "S").is_ok());
    }

    #[test]
    fn test_openai_debug_redacts_key() {
        let output = format!("{:?}", test_openai());
        assert!(output.contains("[REDACTED]"));
        assert!(output.contains("advanced-model"));
        assert!(!output.contains("very-secret"));
    }

    #[test]
    fn test_socket_addr_and_paths() {
        let config = AppConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 10000,
            base_url: "https://speakerlab.example.org".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            data_dir: PathBuf::from("/tmp/speakerlab"),
            openai: test_openai(),
            seed_admin: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:10000");
        assert_eq!(config.report_dir(), PathBuf::from("/tmp/speakerlab/pdf"));
        assert!(config.is_secure());
    }
}
