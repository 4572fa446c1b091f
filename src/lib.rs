//! Tier Webhook - Stripe checkout webhook that applies purchased tiers to profiles
//!
//! A verified `checkout.session.completed` delivery is turned into a single
//! tier update on every profile whose email matches the buyer.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
