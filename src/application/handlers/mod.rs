//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod membership;

pub use membership::{
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler, NoActionReason, WebhookOutcome,
};
