//! Process startup: tracing, adapters, and shared state.

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::http::WebhookAppState;
use crate::adapters::profile::profile_store_from_config;
use crate::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use crate::config::{AppConfig, ConfigError, ServerConfig, ValidationError};
use crate::domain::membership::StripeWebhookVerifier;
use crate::ports::{PaymentError, ProfileStoreError};

/// Errors that stop the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Profile store setup failed: {0}")]
    Store(#[from] ProfileStoreError),

    #[error("Stripe client setup failed: {0}")]
    Stripe(#[from] PaymentError),

    #[error("Tracing setup failed: {0}")]
    Tracing(String),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured log level.
pub fn init_tracing(server: &ServerConfig) -> Result<(), StartupError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if server.log_json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };

    result.map_err(|e| StartupError::Tracing(e.to_string()))
}

/// Builds the request-path state from validated configuration.
pub fn build_state(config: &AppConfig) -> Result<WebhookAppState, StartupError> {
    let verifier = StripeWebhookVerifier::new(config.payment.stripe_webhook_secret.clone())
        .with_tolerance_secs(config.payment.signature_tolerance_secs);

    let stripe = StripeConfig::new(config.payment.stripe_api_key.clone())
        .with_base_url(&config.payment.stripe_api_base_url)
        .with_api_version(&config.payment.stripe_api_version)
        .with_timeout(config.payment.stripe_timeout());
    let payment_provider = StripePaymentAdapter::new(stripe)?;

    let backend = config.store.backend()?;
    let profile_store = profile_store_from_config(backend, &config.store)?;

    tracing::info!(
        environment = ?config.server.environment,
        store_backend = ?backend,
        profile_table = %config.store.table,
        stripe_test_mode = config.payment.is_test_mode(),
        stripe_timeout_secs = config.payment.stripe_timeout_secs,
        "Webhook service configured"
    );

    Ok(WebhookAppState {
        verifier: Arc::new(verifier),
        payment_provider: Arc::new(payment_provider),
        profile_store,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PaymentConfig, StoreConfig};
    use secrecy::SecretString;

    fn config(store_url: &str) -> AppConfig {
        AppConfig {
            server: Default::default(),
            payment: PaymentConfig {
                stripe_api_key: SecretString::new("sk_test_123".to_string()),
                stripe_webhook_secret: SecretString::new("whsec_123".to_string()),
                ..Default::default()
            },
            store: StoreConfig {
                url: store_url.to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn builds_state_for_memory_store() {
        assert!(build_state(&config("memory://")).is_ok());
    }

    #[tokio::test]
    async fn unsupported_store_scheme_fails() {
        let err = build_state(&config("ftp://example.com")).err().unwrap();
        assert!(matches!(
            err,
            StartupError::Validation(ValidationError::UnsupportedStoreScheme(_))
        ));
    }
}
