//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Stripe: checkout sessions are
//! read back with `line_items.data.price` expanded so the purchased tier can
//! be found on the price metadata.
//!
//! # Configuration
//!
//! - `TIER_WEBHOOK__PAYMENT__STRIPE_API_KEY`: Stripe secret API key
//! - `TIER_WEBHOOK__PAYMENT__STRIPE_API_BASE_URL`: override for testing

mod mock_payment_provider;
mod stripe_adapter;

pub use mock_payment_provider::{MockPaymentProvider, SessionLookup};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter, DEFAULT_API_VERSION};
