//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::membership::DEFAULT_TOLERANCE_SECS;

use super::error::ValidationError;
use super::server::Environment;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key, used to re-fetch checkout sessions
    #[serde(default = "empty_secret")]
    pub stripe_api_key: SecretString,

    /// Stripe webhook signing secret
    #[serde(default = "empty_secret")]
    pub stripe_webhook_secret: SecretString,

    /// Stripe API base URL
    #[serde(default = "default_api_base_url")]
    pub stripe_api_base_url: String,

    /// Pinned Stripe API version
    #[serde(default = "default_api_version")]
    pub stripe_api_version: String,

    /// Maximum age of a webhook signature, in seconds
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_secs: i64,

    /// Timeout for a single Stripe API call, in seconds
    #[serde(default = "default_stripe_timeout")]
    pub stripe_timeout_secs: u64,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_live_")
    }

    /// Get Stripe call timeout as Duration
    pub fn stripe_timeout(&self) -> Duration {
        Duration::from_secs(self.stripe_timeout_secs)
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        let api_key = self.stripe_api_key.expose_secret();
        let webhook_secret = self.stripe_webhook_secret.expose_secret();

        if api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if environment == Environment::Production && !self.is_live_mode() {
            return Err(ValidationError::LiveStripeKeyRequired);
        }

        if !(1..=3600).contains(&self.signature_tolerance_secs) {
            return Err(ValidationError::InvalidSignatureTolerance);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: empty_secret(),
            stripe_webhook_secret: empty_secret(),
            stripe_api_base_url: default_api_base_url(),
            stripe_api_version: default_api_version(),
            signature_tolerance_secs: default_signature_tolerance(),
            stripe_timeout_secs: default_stripe_timeout(),
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_api_version() -> String {
    "2024-06-20".to_string()
}

fn default_signature_tolerance() -> i64 {
    DEFAULT_TOLERANCE_SECS
}

fn default_stripe_timeout() -> u64 {
    10
}
