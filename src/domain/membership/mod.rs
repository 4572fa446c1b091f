//! Membership domain module.
//!
//! Turns a verified Stripe checkout into a tier assignment for a profile.
//!
//! # Module Structure
//!
//! - `checkout_session` - Checkout Session fields read by the webhook
//! - `email` - Customer email value object
//! - `stripe_event` - Stripe event envelope
//! - `tier` - Subscription tier value object
//! - `tier_policy` - Ordered tier extraction policy
//! - `webhook_errors` - Webhook failure taxonomy and HTTP mapping
//! - `webhook_verifier` - Stripe-Signature verification

mod checkout_session;
mod email;
mod stripe_event;
mod tier;
mod tier_policy;
mod webhook_errors;
mod webhook_verifier;

pub use checkout_session::{
    CheckoutSession, CustomerDetails, LineItem, LineItemList, Price, LINE_ITEM_PRICE_EXPANSION,
};
pub use email::Email;
pub use stripe_event::{StripeEvent, StripeEventData, StripeEventType};
pub use tier::Tier;
pub use tier_policy::{TierResolution, TierSource};
pub use webhook_errors::{SignatureError, WebhookError};
pub use webhook_verifier::{
    compute_signature_header, SignatureHeader, StripeWebhookVerifier, DEFAULT_TOLERANCE_SECS,
};
