//! Webhook error types for Stripe webhook handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and retryability semantics.

use http::StatusCode;
use thiserror::Error;

/// Reasons a delivery fails authentication.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// No Stripe-Signature header on the request.
    #[error("No stripe-signature header value was provided")]
    MissingHeader,

    /// Header present but not in `t=...,v1=...` form.
    #[error("Unable to extract timestamp and signatures from header: {0}")]
    MalformedHeader(String),

    /// None of the v1 signatures match the payload.
    #[error("No signatures found matching the expected signature for payload")]
    NoMatchingSignature,

    /// Signature is older than the configured tolerance.
    #[error("Timestamp outside the tolerance zone ({age_secs}s old)")]
    TimestampTooOld { age_secs: i64 },

    /// Signature timestamp is in the future beyond clock skew tolerance.
    #[error("Timestamp is in the future")]
    TimestampInFuture,

    /// Signed payload is not a Stripe event.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Request used a method other than POST.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Transport failure while buffering the request body.
    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    /// Body exceeded the configured size limit.
    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    /// Webhook signature verification failed.
    #[error("Webhook signature failed: {0}")]
    SignatureVerification(#[from] SignatureError),

    /// Verified event carried a checkout session we could not decode.
    #[error("Malformed checkout session: {0}")]
    MalformedSession(String),

    /// Profile store rejected or failed the tier update.
    #[error("Profile update failed: {0}")]
    StoreUpdate(String),

    /// Processing did not finish within the request timeout.
    #[error("Request timed out")]
    Timeout,

    /// A middleware layer failed before the handler produced a response.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    /// Returns true if Stripe should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::BodyRead(_)
                | WebhookError::MalformedSession(_)
                | WebhookError::StoreUpdate(_)
                | WebhookError::Timeout
                | WebhookError::Internal(_)
        )
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// Status codes determine Stripe's retry behavior:
    /// - 2xx: Event acknowledged, no retry
    /// - 4xx: Client error, no retry
    /// - 5xx: Server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            WebhookError::SignatureVerification(_) => StatusCode::BAD_REQUEST,
            WebhookError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            WebhookError::BodyRead(_)
            | WebhookError::MalformedSession(_)
            | WebhookError::StoreUpdate(_)
            | WebhookError::Timeout
            | WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
