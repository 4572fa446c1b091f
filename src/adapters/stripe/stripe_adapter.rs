//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key)
//!     .with_api_version("2024-06-20")
//!     .with_timeout(Duration::from_secs(10));
//! let adapter = StripePaymentAdapter::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::membership::CheckoutSession;
use crate::ports::{PaymentError, PaymentErrorCode, PaymentProvider};

/// Stripe API version pinned for session reads.
pub const DEFAULT_API_VERSION: &str = "2024-06-20";

/// Upper bound on a single Stripe call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Value sent in the `Stripe-Version` header.
    api_version: String,

    /// Whole-call timeout; an expired call is a network error.
    timeout: Duration,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: "https://api.stripe.com".to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Pin a different API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Bound each Stripe call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Error envelope returned by the Stripe API.
#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// `{base}/v1/checkout/sessions/{id}` with the id as one encoded path
    /// segment, so it cannot change the request target.
    fn session_url(&self, session_id: &str) -> Result<reqwest::Url, PaymentError> {
        let mut url = reqwest::Url::parse(&self.config.api_base_url)
            .map_err(|e| PaymentError::provider(format!("Invalid Stripe base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PaymentError::provider("Stripe base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["v1", "checkout", "sessions", session_id]);
        Ok(url)
    }

    async fn error_from_response(response: reqwest::Response, resource: &str) -> PaymentError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<StripeErrorBody>(&body).ok().map(|b| b.error);
        let message = detail
            .as_ref()
            .and_then(|d| d.message.clone())
            .unwrap_or_else(|| format!("Stripe API error ({}): {}", status.as_u16(), body));

        let error = match status {
            reqwest::StatusCode::NOT_FOUND => PaymentError::not_found(resource),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                PaymentError::authentication(message)
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                PaymentError::new(PaymentErrorCode::RateLimitExceeded, message)
            }
            _ => PaymentError::provider(message),
        };

        match detail.and_then(|d| d.code) {
            Some(code) => error.with_provider_code(code),
            None => error,
        }
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
        expand: &[&str],
    ) -> Result<CheckoutSession, PaymentError> {
        let url = self.session_url(session_id)?;
        let query: Vec<(&str, &str)> = expand.iter().map(|path| ("expand[]", *path)).collect();

        let response = self
            .http_client
            .get(url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .header("Stripe-Version", &self.config.api_version)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::warn!(session_id = %session_id, "Stripe checkout session lookup timed out");
                }
                PaymentError::network(e.to_string())
            })?;

        if !response.status().is_success() {
            let error = Self::error_from_response(response, "Checkout session").await;
            tracing::warn!(
                session_id = %session_id,
                code = %error.code,
                error = %error.message,
                "Stripe checkout session lookup failed"
            );
            return Err(error);
        }

        response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })
    }
}
