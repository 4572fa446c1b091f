//! Stripe webhook event types.
//!
//! Defines the envelope Stripe wraps around every webhook payload.
//! Only fields relevant to our processing are captured.

use serde::{Deserialize, Serialize};

/// Stripe webhook event (simplified).
///
/// Additional fields from Stripe's full event schema are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    #[serde(default)]
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,

    /// API version used to render this event. Null for some account-level events.
    #[serde(default)]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,

    /// Previous values for updated attributes (only for update events).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl StripeEvent {
    /// Returns true if this is a live mode event.
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    /// Attempts to deserialize the data object as a concrete type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data.object)
    }

    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::from_type_str(&self.event_type)
    }
}

/// Stripe event types this service distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    /// Checkout session completed successfully.
    CheckoutSessionCompleted,
    /// Anything else. Acknowledged, never acted on.
    Other,
}

impl StripeEventType {
    pub fn from_type_str(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            _ => Self::Other,
        }
    }
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
                previous_attributes: None,
            },
            livemode: self.livemode,
            api_version: Some("2024-06-20".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_minimal_event() {
        let json = r#"{
            "id": "evt_1234567890",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": {
                "object": {}
            },
            "livemode": false,
            "api_version": "2024-06-20"
        }"#;

        let event: StripeEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.id, "evt_1234567890");
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.created, 1704067200);
        assert!(!event.is_live());
        assert_eq!(event.api_version.as_deref(), Some("2024-06-20"));
    }

    #[test]
    fn deserialize_tolerates_null_api_version() {
        let json = r#"{
            "id": "evt_1",
            "type": "account.updated",
            "created": 1704067200,
            "data": {"object": {}},
            "livemode": true,
            "api_version": null
        }"#;

        let event: StripeEvent = serde_json::from_str(json).unwrap();
        assert!(event.api_version.is_none());
        assert!(event.is_live());
    }

    #[test]
    fn deserialize_requires_data_object() {
        let json = r#"{"id": "evt_1", "type": "checkout.session.completed"}"#;
        assert!(serde_json::from_str::<StripeEvent>(json).is_err());
    }

    #[test]
    fn deserialize_object_to_custom_type() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Session {
            id: String,
        }

        let event = StripeEventBuilder::new()
            .object(json!({"id": "cs_test_abc123", "customer": "cus_xyz789"}))
            .build();

        let session: Session = event.deserialize_object().unwrap();
        assert_eq!(session.id, "cs_test_abc123");
    }

    #[test]
    fn checkout_completed_is_recognised() {
        let event = StripeEventBuilder::new().build();
        assert_eq!(event.parsed_type(), StripeEventType::CheckoutSessionCompleted);
    }

    #[test]
    fn similar_event_types_are_other() {
        for event_type in [
            "checkout.session.expired",
            "checkout.session.async_payment_succeeded",
            "invoice.paid",
            "Checkout.Session.Completed",
        ] {
            let event = StripeEventBuilder::new().event_type(event_type).build();
            assert_eq!(event.parsed_type(), StripeEventType::Other, "{}", event_type);
        }
    }

    #[test]
    fn builder_with_custom_values() {
        let event = StripeEventBuilder::new()
            .id("evt_custom")
            .event_type("invoice.paid")
            .livemode(true)
            .object(json!({"amount": 1000}))
            .build();

        assert_eq!(event.id, "evt_custom");
        assert!(event.is_live());
        assert_eq!(event.data.object["amount"], 1000);
    }
}
