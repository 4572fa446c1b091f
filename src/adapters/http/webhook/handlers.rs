//! HTTP handlers for the webhook endpoint.
//!
//! These handlers connect Axum routes to the checkout webhook command handler.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};

use crate::application::handlers::membership::{
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler, WebhookOutcome,
};
use crate::domain::membership::{SignatureError, StripeWebhookVerifier, WebhookError};
use crate::ports::{PaymentProvider, ProfileStore};

use super::dto::WebhookResponse;

/// Header carrying Stripe's webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

/// Largest webhook body accepted. Stripe events are far smaller.
pub const MAX_WEBHOOK_BODY_BYTES: usize = 1024 * 1024;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct WebhookAppState {
    pub verifier: Arc<StripeWebhookVerifier>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub profile_store: Arc<dyn ProfileStore>,
}

impl WebhookAppState {
    pub fn webhook_handler(&self) -> HandleCheckoutWebhookHandler {
        HandleCheckoutWebhookHandler::new(
            self.verifier.clone(),
            self.payment_provider.clone(),
            self.profile_store.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/stripe-webhook - Handle Stripe webhooks
///
/// The body is taken as raw bytes; the signature covers the exact payload.
pub async fn handle_stripe_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<WebhookResponse>, WebhookApiError> {
    let body = body.map_err(body_rejection_error)?;

    let signature = match headers.get(STRIPE_SIGNATURE_HEADER) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| {
                    SignatureError::MalformedHeader("header is not visible ASCII".to_string())
                })?
                .to_string(),
        ),
        None => None,
    };

    let cmd = HandleCheckoutWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    let outcome = state.webhook_handler().handle(cmd).await?;

    if let WebhookOutcome::NoAction { reason, .. } = &outcome {
        tracing::debug!(reason = ?reason, "Webhook acknowledged without update");
    }

    Ok(Json(WebhookResponse::ok()))
}

fn body_rejection_error(rejection: BytesRejection) -> WebhookError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        WebhookError::PayloadTooLarge(rejection.body_text())
    } else {
        WebhookError::BodyRead(rejection.body_text())
    }
}

/// Any method other than POST on a webhook path. Extracts nothing, so the
/// body is never read.
pub async fn method_not_allowed() -> WebhookApiError {
    WebhookApiError(WebhookError::MethodNotAllowed)
}

/// GET /health - Liveness check
pub async fn health() -> Json<WebhookResponse> {
    Json(WebhookResponse::ok())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// Turns a failure from the middleware stack (the request timeout) into the
/// usual `{ ok: false, error }` body.
pub async fn handle_middleware_error(err: BoxError) -> WebhookApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        WebhookApiError(WebhookError::Timeout)
    } else {
        WebhookApiError(WebhookError::Internal(err.to_string()))
    }
}

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl From<SignatureError> for WebhookApiError {
    fn from(err: SignatureError) -> Self {
        Self(WebhookError::from(err))
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, retryable = self.0.is_retryable(), "Webhook failed");
        }

        let body = WebhookResponse::error(self.0.to_string());
        let mut response = (status, Json(body)).into_response();
        if matches!(self.0, WebhookError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}
