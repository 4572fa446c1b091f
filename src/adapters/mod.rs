//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum webhook endpoint
//! - `profile` - Profile stores (PostgREST, PostgreSQL, in-memory)
//! - `stripe` - Stripe API client and test double

pub mod http;
pub mod profile;
pub mod stripe;

pub use profile::{
    profile_store_from_config, InMemoryProfileStore, PostgresProfileStore, PostgrestProfileStore,
};
pub use stripe::{MockPaymentProvider, StripeConfig, StripePaymentAdapter};
