//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentProvider` - Reads checkout sessions back from the payment provider
//! - `ProfileStore` - Applies purchased tiers to user profiles

mod payment_provider;
mod profile_store;

pub use payment_provider::{PaymentError, PaymentErrorCode, PaymentProvider};
pub use profile_store::{ProfileStore, ProfileStoreError};
