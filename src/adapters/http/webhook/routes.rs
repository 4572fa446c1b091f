//! Axum router configuration for the webhook service.

use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    handle_middleware_error, handle_stripe_webhook, health, method_not_allowed, WebhookAppState,
    MAX_WEBHOOK_BODY_BYTES,
};

/// Create the Stripe webhook router.
///
/// # Routes
/// - `POST /api/stripe-webhook` - Handle Stripe webhooks
/// - `POST /api/stripe-webhooks` - Same handler, second deployed path
///
/// Other methods on these paths get `405 { ok: false }`. Bodies over
/// `MAX_WEBHOOK_BODY_BYTES` get `413 { ok: false }`.
pub fn webhook_routes() -> Router<WebhookAppState> {
    let webhook = post(handle_stripe_webhook).fallback(method_not_allowed);

    Router::new()
        .route("/api/stripe-webhook", webhook.clone())
        .route("/api/stripe-webhooks", webhook)
        .layer(DefaultBodyLimit::max(MAX_WEBHOOK_BODY_BYTES))
}

/// Create the complete service router with state and middleware applied.
///
/// Requests get an `x-request-id` (generated when absent, echoed on the
/// response), a trace span, and a timeout. A timed-out request is answered
/// with `500 { ok: false }` so Stripe redelivers it.
pub fn app_router(state: WebhookAppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(webhook_routes())
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use secrecy::SecretString;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::adapters::profile::InMemoryProfileStore;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::membership::{
        compute_signature_header, CheckoutSession, StripeWebhookVerifier,
    };
    use crate::ports::{PaymentError, PaymentProvider};

    /// Never answers within any test's patience.
    struct StalledPaymentProvider;

    #[async_trait]
    impl PaymentProvider for StalledPaymentProvider {
        async fn retrieve_checkout_session(
            &self,
            _session_id: &str,
            _expand: &[&str],
        ) -> Result<CheckoutSession, PaymentError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(PaymentError::network("unreachable"))
        }
    }

    const SECRET: &str = "whsec_routes_test";

    fn test_state() -> (WebhookAppState, MockPaymentProvider, InMemoryProfileStore) {
        let provider = MockPaymentProvider::new();
        let store = InMemoryProfileStore::new();
        let state = WebhookAppState {
            verifier: Arc::new(StripeWebhookVerifier::new(SecretString::new(
                SECRET.to_string(),
            ))),
            payment_provider: Arc::new(provider.clone()),
            profile_store: Arc::new(store.clone()),
        };
        (state, provider, store)
    }

    fn app(state: WebhookAppState) -> Router {
        app_router(state, Duration::from_secs(5))
    }

    fn checkout_payload() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": "cs_1",
                "customer_details": {"email": "a@example.com"},
                "line_items": {"data": [{"price": {"metadata": {"tier": "pro"}}}]}
            }}
        }))
        .unwrap()
    }

    fn signed_request(uri: &str, payload: Vec<u8>) -> Request<Body> {
        let signature =
            compute_signature_header(SECRET, chrono::Utc::now().timestamp(), &payload);
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .header("stripe-signature", signature)
            .body(Body::from(payload))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn non_post_methods_return_405() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let (state, _, store) = test_state();
            let request = Request::builder()
                .method(method.clone())
                .uri("/api/stripe-webhook")
                .body(Body::from(checkout_payload()))
                .unwrap();

            let response = app(state).oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", method);
            assert_eq!(
                body_json(response).await,
                json!({"ok": false, "error": "Method not allowed"})
            );
            assert!(store.updates().await.is_empty());
        }
    }

    #[tokio::test]
    async fn missing_signature_returns_400() {
        let (state, provider, store) = test_state();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/stripe-webhook")
            .body(Body::from(checkout_payload()))
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Webhook signature failed: "));
        assert!(store.updates().await.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn tampered_body_returns_400() {
        let (state, _, store) = test_state();
        let payload = checkout_payload();
        let signature =
            compute_signature_header(SECRET, chrono::Utc::now().timestamp(), &payload);
        let mut tampered = payload.clone();
        tampered.push(b' ');

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/stripe-webhook")
            .header("stripe-signature", signature)
            .body(Body::from(tampered))
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.updates().await.is_empty());
    }

    #[tokio::test]
    async fn signed_checkout_applies_tier_on_both_paths() {
        for uri in ["/api/stripe-webhook", "/api/stripe-webhooks"] {
            let (state, _, store) = test_state();
            store.insert_profile("a@example.com").await;

            let response = app(state)
                .oneshot(signed_request(uri, checkout_payload()))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
            assert_eq!(body_json(response).await, json!({"ok": true}));
            assert_eq!(store.tier_of("a@example.com").await.as_deref(), Some("pro"));
        }
    }

    #[tokio::test]
    async fn ignored_event_returns_200() {
        let (state, _, store) = test_state();
        let payload = serde_json::to_vec(&json!({
            "id": "evt_2",
            "type": "customer.subscription.updated",
            "data": {"object": {"id": "sub_1"}}
        }))
        .unwrap();

        let response = app(state)
            .oneshot(signed_request("/api/stripe-webhook", payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"ok": true}));
        assert!(store.updates().await.is_empty());
    }

    #[tokio::test]
    async fn store_failure_returns_500() {
        let (state, _, store) = test_state();
        store.fail_updates("connection reset").await;

        let response = app(state)
            .oneshot(signed_request("/api/stripe-webhook", checkout_payload()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (state, _, _) = test_state();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"ok": true}));
    }

    #[tokio::test]
    async fn request_id_is_generated_and_propagated() {
        let (state, _, _) = test_state();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));

        let (state, _, _) = test_state();
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let (state, _, _) = test_state();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/other")
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stalled_request_times_out_with_json_500() {
        let (mut state, _, store) = test_state();
        state.payment_provider = Arc::new(StalledPaymentProvider);
        store.insert_profile("a@example.com").await;
        let payload = serde_json::to_vec(&json!({
            "id": "evt_3",
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": "cs_stalled",
                "customer_email": "a@example.com",
                "metadata": {"tier": "basic"}
            }}
        }))
        .unwrap();

        let response = app_router(state, Duration::from_millis(200))
            .oneshot(signed_request("/api/stripe-webhook", payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(
            body_json(response).await,
            json!({"ok": false, "error": "Request timed out"})
        );
        assert!(store.updates().await.is_empty());
    }

    #[tokio::test]
    async fn oversized_body_returns_413() {
        let (state, _, store) = test_state();
        let payload = vec![b' '; MAX_WEBHOOK_BODY_BYTES + 1];

        let response = app(state)
            .oneshot(signed_request("/api/stripe-webhook", payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Request body too large"));
        assert!(store.updates().await.is_empty());
    }
}
