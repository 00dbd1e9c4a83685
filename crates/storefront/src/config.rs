//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STRIPE_SECRET_KEY` - Payment provider secret key
//! - `ANTHROPIC_API_KEY` - API key for the upsell recommendation model
//!
//! ## Optional
//! - `UPSELL_MODEL` - Model used for recommendations (default: claude-3-5-haiku-latest)
//! - `VERDANT_DATA_DIR` - Directory for persisted cart/currency state (default: .verdant)
//! - `EXTERNAL_TIMEOUT_SECS` - Timeout for external collaborator calls (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_UPSELL_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_DATA_DIR: &str = ".verdant";
const DEFAULT_EXTERNAL_TIMEOUT_SECS: u64 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Payment provider configuration
    pub stripe: StripeConfig,
    /// Upsell recommendation configuration
    pub upsell: UpsellConfig,
    /// Directory for the file-backed key-value store
    pub data_dir: PathBuf,
    /// Timeout applied to both external collaborator calls
    pub external_timeout: Duration,
}

/// Payment provider configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (server-side only)
    pub secret_key: SecretString,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Upsell recommendation model configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct UpsellConfig {
    /// API key for the model provider
    pub api_key: SecretString,
    /// Model identifier
    pub model: String,
}

impl std::fmt::Debug for UpsellConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpsellConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets look like placeholders.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let stripe = StripeConfig {
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
        };
        let upsell = UpsellConfig {
            api_key: get_validated_secret("ANTHROPIC_API_KEY")?,
            model: get_env_or_default("UPSELL_MODEL", DEFAULT_UPSELL_MODEL),
        };
        let data_dir = PathBuf::from(get_env_or_default("VERDANT_DATA_DIR", DEFAULT_DATA_DIR));
        let external_timeout = get_env_or_default(
            "EXTERNAL_TIMEOUT_SECS",
            &DEFAULT_EXTERNAL_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar("EXTERNAL_TIMEOUT_SECS".to_string(), e.to_string()))?;

        Ok(Self {
            stripe,
            upsell,
            data_dir,
            external_timeout,
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

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a secret is not an obvious placeholder.
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

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
