//! HTTP adapter for the Stripe checkout webhook.
//!
//! - `POST /api/stripe-webhook` - Handle Stripe webhooks
//! - `POST /api/stripe-webhooks` - Same handler, second deployed path
//! - `GET /health` - Liveness check

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::WebhookResponse;
pub use handlers::{WebhookApiError, WebhookAppState, STRIPE_SIGNATURE_HEADER};
pub use routes::{app_router, webhook_routes};
