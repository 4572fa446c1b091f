//! Membership handlers.
//!
//! ## Commands
//! - Processing Stripe checkout webhooks into profile tier updates

mod handle_checkout_webhook;

pub use handle_checkout_webhook::{
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler, NoActionReason, WebhookOutcome,
};
