//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup and cached in memory; handlers only
//! ever see the resolved `Config`.

use std::env;
use std::path::PathBuf;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL for CORS and checkout redirects
    pub frontend_url: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Path to the journey catalog file
    pub journey_catalog_path: String,
    /// Directory for JSON session persistence; in-memory store when unset
    pub data_dir: Option<PathBuf>,

    // --- Stripe ---
    /// Stripe API secret key; checkout runs in mock mode when unset
    pub stripe_secret_key: Option<String>,
    /// Price ID for the subscription plan
    pub stripe_price_id: Option<String>,
    /// Webhook signing secret; webhook endpoint is disabled when unset
    pub stripe_webhook_secret: Option<String>,
    /// Allow issuing mock checkout URLs without a Stripe key (dev/test only)
    pub stripe_allow_mock: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            journey_catalog_path: env::var("JOURNEY_CATALOG")
                .unwrap_or_else(|_| "data/journey_legs.json".to_string()),
            data_dir: env::var("DATA_DIR").ok().map(PathBuf::from),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            stripe_price_id: env::var("STRIPE_PRICE_ID")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            stripe_allow_mock: env::var("STRIPE_ALLOW_MOCK")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    /// Default config for tests: mock billing, no persistence directory.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            journey_catalog_path: "data/journey_legs.json".to_string(),
            data_dir: None,
            stripe_secret_key: None,
            stripe_price_id: None,
            stripe_webhook_secret: Some("whsec_test".to_string()),
            stripe_allow_mock: true,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.journey_catalog_path, "data/journey_legs.json");
    }
}
