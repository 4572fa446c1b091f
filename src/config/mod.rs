//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TIER_WEBHOOK` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use tier_webhook::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod error;
mod payment;
mod server;
mod store;

pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};
pub use store::{StoreBackend, StoreConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Built once at startup and handed to the adapters; request handling never
/// reads the process environment.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Payment configuration (Stripe)
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Profile store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TIER_WEBHOOK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TIER_WEBHOOK__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TIER_WEBHOOK__STORE__URL=...` -> `store.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    /// Missing values are reported by [`AppConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TIER_WEBHOOK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - Required secrets and their prefixes
    /// - Store URL scheme and table name
    /// - Production-specific requirements (live Stripe key, HTTPS store)
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.payment.validate(self.server.environment)?;
        self.store.validate(self.server.environment)?;

        // Outbound calls end before the request timeout fires
        let request_timeout = self.server.request_timeout_secs;
        let outbound = [
            ("STRIPE_TIMEOUT_SECS", self.payment.stripe_timeout_secs),
            ("STORE_HTTP_TIMEOUT_SECS", self.store.http_timeout_secs),
        ];
        for (name, secs) in outbound {
            if secs == 0 || secs >= request_timeout {
                return Err(ValidationError::InvalidOutboundTimeout(name));
            }
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
