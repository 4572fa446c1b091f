//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidHost(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("{0} must be at least 1 second and shorter than the request timeout")]
    InvalidOutboundTimeout(&'static str),

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Stripe live key (sk_live_) required in production")]
    LiveStripeKeyRequired,

    #[error("Signature tolerance must be between 1 and 3600 seconds")]
    InvalidSignatureTolerance,

    #[error("Unsupported store URL scheme: {0}")]
    UnsupportedStoreScheme(String),

    #[error("Store URL must use HTTPS in production")]
    StoreUrlMustBeHttps,

    #[error("Invalid profile table name: {0}")]
    InvalidTableName(String),

    #[error("Pool size must be between 1 and 100")]
    InvalidPoolSize,
}
