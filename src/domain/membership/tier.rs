//! Subscription tier value object.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A purchased subscription level, as carried in Stripe price or session metadata.
///
/// Tiers are opaque short identifiers (`"pro"`, `"team"`, ...) owned by the
/// Stripe catalogue. The only rule enforced here is that a tier is never empty:
/// an empty metadata value means "no tier".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tier(String);

impl Tier {
    /// Metadata key under which Stripe objects carry the tier.
    pub const METADATA_KEY: &'static str = "tier";

    /// Builds a tier from a raw metadata value, treating empty values as absent.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
