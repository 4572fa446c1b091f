//! HandleCheckoutWebhookHandler - Command handler for Stripe checkout webhooks.
//!
//! Verifies the delivery, works out which tier was bought and applies it to
//! the buyer's profile. Only `checkout.session.completed` is acted on.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::membership::{
    CheckoutSession, Email, StripeEvent, StripeEventType, StripeWebhookVerifier, Tier,
    TierResolution, TierSource, WebhookError, LINE_ITEM_PRICE_EXPANSION,
};
use crate::ports::{PaymentProvider, ProfileStore};

/// Command to handle a checkout webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleCheckoutWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header, if present.
    pub signature: Option<String>,
}

/// Why a completed checkout did not lead to an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoActionReason {
    MissingEmail,
    MissingTier,
    MissingEmailAndTier,
}

/// Result of webhook processing. Every variant is acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Tier written to every profile with the buyer's email.
    TierApplied {
        email: Email,
        tier: Tier,
        profiles_matched: u64,
        source: TierSource,
    },
    /// Checkout completed but email or tier could not be found.
    NoAction {
        reason: NoActionReason,
        tier_source: TierSource,
    },
    /// Event type this service does not act on.
    Ignored { event_type: String },
}

/// Handler for Stripe checkout webhooks.
pub struct HandleCheckoutWebhookHandler {
    verifier: Arc<StripeWebhookVerifier>,
    payment_provider: Arc<dyn PaymentProvider>,
    profile_store: Arc<dyn ProfileStore>,
}

impl HandleCheckoutWebhookHandler {
    pub fn new(
        verifier: Arc<StripeWebhookVerifier>,
        payment_provider: Arc<dyn PaymentProvider>,
        profile_store: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            verifier,
            payment_provider,
            profile_store,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleCheckoutWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        // 1. Verify webhook signature and parse event
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, cmd.signature.as_deref())
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected webhook delivery");
                WebhookError::from(e)
            })?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.is_live(),
            "Verified webhook event"
        );

        // 2. Dispatch on event type
        match event.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => self.handle_checkout_completed(&event).await,
            StripeEventType::Other => {
                tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring event");
                Ok(WebhookOutcome::Ignored {
                    event_type: event.event_type,
                })
            }
        }
    }

    async fn handle_checkout_completed(
        &self,
        event: &StripeEvent,
    ) -> Result<WebhookOutcome, WebhookError> {
        let session: CheckoutSession = event.deserialize_object().map_err(|e| {
            tracing::error!(event_id = %event.id, error = %e, "Undecodable checkout session");
            WebhookError::MalformedSession(e.to_string())
        })?;

        let email = session.customer_email();
        let resolution = self.resolve_tier(&session).await;

        tracing::info!(
            event_id = %event.id,
            session_id = %session.id,
            tier_source = resolution.source.as_str(),
            embedded_line_items = session.has_line_items(),
            has_email = email.is_some(),
            "Resolved checkout tier"
        );

        let (email, tier) = match (email, resolution.tier) {
            (Some(email), Some(tier)) => (email, tier),
            (email, tier) => {
                let reason = match (email.is_some(), tier.is_some()) {
                    (false, false) => NoActionReason::MissingEmailAndTier,
                    (false, true) => NoActionReason::MissingEmail,
                    _ => NoActionReason::MissingTier,
                };
                tracing::info!(
                    event_id = %event.id,
                    session_id = %session.id,
                    reason = ?reason,
                    "No profile update for checkout"
                );
                return Ok(WebhookOutcome::NoAction {
                    reason,
                    tier_source: resolution.source,
                });
            }
        };

        // 3. Apply tier to existing profiles
        let profiles_matched = self
            .profile_store
            .update_tier_by_email(&email, &tier)
            .await
            .map_err(|e| {
                tracing::error!(
                    event_id = %event.id,
                    session_id = %session.id,
                    email = %email.redacted(),
                    error = %e,
                    "Profile tier update failed"
                );
                WebhookError::StoreUpdate(e.to_string())
            })?;

        tracing::info!(
            event_id = %event.id,
            email = %email.redacted(),
            tier = %tier,
            profiles_matched,
            "Applied tier to profiles"
        );
        tracing::debug!(email = %email, "Tier update target");

        Ok(WebhookOutcome::TierApplied {
            email,
            tier,
            profiles_matched,
            source: resolution.source,
        })
    }

    /// Runs the tier lookup chain, re-fetching the session when the payload
    /// carries no line-item tier. A failed re-fetch is logged and recovered.
    async fn resolve_tier(&self, session: &CheckoutSession) -> TierResolution {
        if let Some(resolution) = TierResolution::from_payload(session) {
            return resolution;
        }

        match self
            .payment_provider
            .retrieve_checkout_session(&session.id, &[LINE_ITEM_PRICE_EXPANSION])
            .await
        {
            Ok(full) => TierResolution::after_fetch(session, Some(&full)),
            Err(e) => {
                tracing::warn!(
                    session_id = %session.id,
                    code = %e.code,
                    error = %e.message,
                    "Checkout session re-fetch failed, falling back to session metadata"
                );
                TierResolution::after_fetch(session, None)
            }
        }
    }
}
