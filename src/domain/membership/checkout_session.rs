//! Stripe Checkout Session as seen by the tier webhook.
//!
//! The same shape is used for the session embedded in a
//! `checkout.session.completed` event and for the session re-fetched from
//! the Stripe API with `line_items.data.price` expanded. Webhook deliveries
//! normally omit `line_items`; the fetched variant carries them.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::email::Email;
use super::tier::Tier;

/// Expansion path requesting line items together with their prices.
pub const LINE_ITEM_PRICE_EXPANSION: &str = "line_items.data.price";

/// Checkout session fields used for tier and email extraction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CheckoutSession {
    /// Session identifier (cs_...), used to re-fetch the session.
    pub id: String,

    /// Contact details collected during checkout.
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,

    /// Email passed in when the session was created.
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Session-level metadata.
    #[serde(default, deserialize_with = "nullable_map")]
    pub metadata: HashMap<String, String>,

    /// Line items; only present when expanded.
    #[serde(default)]
    pub line_items: Option<LineItemList>,
}

/// Customer contact details captured by Checkout.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

/// Stripe list wrapper around line items.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LineItemList {
    #[serde(default)]
    pub data: Vec<LineItem>,
}

/// One purchased line item.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LineItem {
    #[serde(default)]
    pub price: Option<Price>,
}

/// Price attached to a line item. `metadata` is only populated when expanded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Price {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "nullable_map")]
    pub metadata: HashMap<String, String>,
}

fn nullable_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<HashMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CheckoutSession {
    /// Email of the paying customer.
    ///
    /// Prefers the contact email collected by Checkout, then the email the
    /// session was created with.
    pub fn customer_email(&self) -> Option<Email> {
        self.customer_details
            .as_ref()
            .and_then(|details| details.email.clone())
            .and_then(Email::parse)
            .or_else(|| self.customer_email.clone().and_then(Email::parse))
    }

    /// True when the payload carries line-item data at all.
    pub fn has_line_items(&self) -> bool {
        self.line_items
            .as_ref()
            .is_some_and(|items| !items.data.is_empty())
    }

    /// Tier from the first line item's price metadata.
    pub fn line_item_tier(&self) -> Option<Tier> {
        self.line_items
            .as_ref()?
            .data
            .first()?
            .price
            .as_ref()?
            .metadata
            .get(Tier::METADATA_KEY)
            .cloned()
            .and_then(Tier::parse)
    }

    /// Tier from session-level metadata.
    pub fn metadata_tier(&self) -> Option<Tier> {
        self.metadata
            .get(Tier::METADATA_KEY)
            .cloned()
            .and_then(Tier::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(value: serde_json::Value) -> CheckoutSession {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn deserialize_webhook_shaped_session() {
        let s = session(json!({
            "id": "cs_test_1",
            "object": "checkout.session",
            "customer_details": {"email": "a@example.com", "name": "A"},
            "customer_email": null,
            "metadata": {"tier": "pro"},
            "payment_status": "paid"
        }));

        assert_eq!(s.id, "cs_test_1");
        assert!(s.line_items.is_none());
        assert_eq!(s.metadata_tier().unwrap().as_str(), "pro");
    }

    #[test]
    fn deserialize_tolerates_null_metadata() {
        let s = session(json!({"id": "cs_1", "metadata": null}));
        assert!(s.metadata.is_empty());
        assert!(s.metadata_tier().is_none());
    }

    #[test]
    fn deserialize_requires_id() {
        let result = serde_json::from_value::<CheckoutSession>(json!({"metadata": {}}));
        assert!(result.is_err());
    }

    #[test]
    fn customer_details_email_preferred() {
        let s = session(json!({
            "id": "cs_1",
            "customer_details": {"email": "details@example.com"},
            "customer_email": "top@example.com"
        }));
        assert_eq!(s.customer_email().unwrap().as_str(), "details@example.com");
    }

    #[test]
    fn falls_back_to_top_level_email() {
        let s = session(json!({
            "id": "cs_1",
            "customer_details": {"email": null},
            "customer_email": "top@example.com"
        }));
        assert_eq!(s.customer_email().unwrap().as_str(), "top@example.com");
    }

    #[test]
    fn empty_details_email_falls_back() {
        let s = session(json!({
            "id": "cs_1",
            "customer_details": {"email": ""},
            "customer_email": "top@example.com"
        }));
        assert_eq!(s.customer_email().unwrap().as_str(), "top@example.com");
    }

    #[test]
    fn no_email_anywhere() {
        let s = session(json!({"id": "cs_1", "customer_email": ""}));
        assert!(s.customer_email().is_none());
    }

    #[test]
    fn line_item_tier_reads_first_item_only() {
        let s = session(json!({
            "id": "cs_1",
            "line_items": {"object": "list", "data": [
                {"price": {"id": "price_a", "metadata": {"tier": "pro"}}},
                {"price": {"id": "price_b", "metadata": {"tier": "team"}}}
            ]}
        }));
        assert!(s.has_line_items());
        assert_eq!(s.line_item_tier().unwrap().as_str(), "pro");
    }

    #[test]
    fn line_item_tier_absent_without_price_metadata() {
        let s = session(json!({
            "id": "cs_1",
            "line_items": {"data": [{"price": {"id": "price_a"}}]}
        }));
        assert!(s.has_line_items());
        assert!(s.line_item_tier().is_none());
    }

    #[test]
    fn line_item_tier_absent_for_unexpanded_price() {
        let s = session(json!({
            "id": "cs_1",
            "line_items": {"data": [{"price": null}]}
        }));
        assert!(s.line_item_tier().is_none());
    }

    #[test]
    fn empty_line_item_list() {
        let s = session(json!({"id": "cs_1", "line_items": {"data": []}}));
        assert!(!s.has_line_items());
        assert!(s.line_item_tier().is_none());
    }
}
