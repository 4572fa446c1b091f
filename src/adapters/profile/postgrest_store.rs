//! PostgREST (Supabase REST) implementation of ProfileStore.
//!
//! Issues `PATCH {url}/rest/v1/{table}?email=eq.<email>` with the service
//! role key, asking for the updated rows back so the match count is known.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::membership::{Email, Tier};
use crate::ports::{ProfileStore, ProfileStoreError};

/// ProfileStore backed by a PostgREST endpoint.
pub struct PostgrestProfileStore {
    endpoint: String,
    service_role_key: SecretString,
    http_client: reqwest::Client,
}

impl PostgrestProfileStore {
    /// `base_url` is the project URL (e.g. `https://xyz.supabase.co`).
    /// Each PATCH is bounded by `timeout`.
    pub fn new(
        base_url: &str,
        table: &str,
        service_role_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, ProfileStoreError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProfileStoreError::Unavailable(format!("HTTP client setup: {}", e)))?;

        Ok(Self {
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            service_role_key,
            http_client,
        })
    }
}

#[async_trait]
impl ProfileStore for PostgrestProfileStore {
    async fn update_tier_by_email(
        &self,
        email: &Email,
        tier: &Tier,
    ) -> Result<u64, ProfileStoreError> {
        let key = self.service_role_key.expose_secret();
        let filter = format!("eq.{}", email.as_str());

        let response = self
            .http_client
            .patch(&self.endpoint)
            .query(&[("email", filter.as_str())])
            .header("apikey", key.as_str())
            .bearer_auth(key)
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "tier": tier.as_str() }))
            .send()
            .await
            .map_err(|e| ProfileStoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                error = %message,
                "PostgREST rejected profile update"
            );
            return Err(ProfileStoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let rows: Vec<serde_json::Value> = response.json().await.map_err(|e| {
            ProfileStoreError::Rejected {
                status: status.as_u16(),
                message: format!("Unexpected response body: {}", e),
            }
        })?;

        Ok(rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::{RawQuery, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::patch;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    #[derive(Clone, Default)]
    struct Captured {
        requests: Arc<Mutex<Vec<(Option<String>, HeaderMap, Value)>>>,
    }

    async fn profiles_route(
        State(captured): State<Captured>,
        RawQuery(query): RawQuery,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let q = query.clone().unwrap_or_default();
        captured.requests.lock().unwrap().push((query, headers, body.clone()));

        if q.contains("broken") {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "column profiles.tier does not exist"})),
            );
        }
        if q.contains("slow") {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        if q.contains("nobody") {
            return (StatusCode::OK, Json(json!([])));
        }
        (
            StatusCode::OK,
            Json(json!([
                {"id": 1, "tier": body["tier"]},
                {"id": 2, "tier": body["tier"]}
            ])),
        )
    }

    async fn spawn_postgrest() -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route("/rest/v1/profiles", patch(profiles_route))
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), captured)
    }

    fn store(base_url: &str) -> PostgrestProfileStore {
        PostgrestProfileStore::new(
            base_url,
            "profiles",
            SecretString::new("service-role-key".to_string()),
            Duration::from_millis(500),
        )
        .unwrap()
    }

    #[test]
    fn endpoint_joins_base_url_and_table() {
        let store = store("https://xyz.supabase.co/");
        assert_eq!(store.endpoint, "https://xyz.supabase.co/rest/v1/profiles");
    }

    #[tokio::test]
    async fn patches_by_email_and_counts_returned_rows() {
        let (base_url, captured) = spawn_postgrest().await;

        let matched = store(&base_url)
            .update_tier_by_email(
                &Email::parse("a+b@example.com").unwrap(),
                &Tier::parse("pro").unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(matched, 2);

        let requests = captured.requests.lock().unwrap();
        let (query, headers, body) = &requests[0];
        assert_eq!(query.as_deref(), Some("email=eq.a%2Bb%40example.com"));
        assert_eq!(headers.get("apikey").unwrap(), "service-role-key");
        assert_eq!(
            headers.get("authorization").unwrap(),
            "Bearer service-role-key"
        );
        assert_eq!(headers.get("prefer").unwrap(), "return=representation");
        assert_eq!(body, &json!({"tier": "pro"}));
    }

    #[tokio::test]
    async fn no_matching_rows_is_zero() {
        let (base_url, _) = spawn_postgrest().await;

        let matched = store(&base_url)
            .update_tier_by_email(
                &Email::parse("nobody@example.com").unwrap(),
                &Tier::parse("pro").unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(matched, 0);
    }

    #[tokio::test]
    async fn error_status_is_rejected() {
        let (base_url, _) = spawn_postgrest().await;

        let err = store(&base_url)
            .update_tier_by_email(
                &Email::parse("broken@example.com").unwrap(),
                &Tier::parse("pro").unwrap(),
            )
            .await
            .unwrap_err();

        match err {
            ProfileStoreError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("does not exist"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = store(&format!("http://{}", addr))
            .update_tier_by_email(
                &Email::parse("a@example.com").unwrap(),
                &Tier::parse("pro").unwrap(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProfileStoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn stalled_endpoint_is_unavailable() {
        let (base_url, _) = spawn_postgrest().await;

        let err = store(&base_url)
            .update_tier_by_email(
                &Email::parse("slow@example.com").unwrap(),
                &Tier::parse("pro").unwrap(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProfileStoreError::Unavailable(_)));
    }
}
