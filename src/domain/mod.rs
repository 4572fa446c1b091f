//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `membership` - Checkout sessions, tiers, and webhook verification

pub mod membership;
