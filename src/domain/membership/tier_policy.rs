//! Tier extraction policy.
//!
//! Webhook deliveries omit line items by default, so the tier is looked up
//! through an ordered chain:
//!
//! 1. first line item's price metadata in the delivered payload
//! 2. first line item's price metadata in the re-fetched, expanded session
//! 3. re-fetched session metadata, then delivered session metadata
//! 4. delivered session metadata when the re-fetch failed
//!
//! The I/O (the re-fetch) happens in the application layer. This module only
//! decides, given what is available, which tier wins and records the path.

use serde::Serialize;

use super::checkout_session::CheckoutSession;
use super::tier::Tier;

/// Which step of the chain produced the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierSource {
    /// Price metadata of a line item embedded in the webhook payload.
    EmbeddedLineItem,
    /// Price metadata of a line item from the expanded re-fetch.
    FetchedLineItem,
    /// Metadata of the re-fetched session.
    FetchedSessionMetadata,
    /// Metadata of the delivered session after a successful re-fetch found nothing.
    SessionMetadata,
    /// Metadata of the delivered session because the re-fetch failed.
    SessionMetadataAfterFetchFailure,
    /// No step yielded a tier.
    NotFound,
}

impl TierSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmbeddedLineItem => "embedded_line_item",
            Self::FetchedLineItem => "fetched_line_item",
            Self::FetchedSessionMetadata => "fetched_session_metadata",
            Self::SessionMetadata => "session_metadata",
            Self::SessionMetadataAfterFetchFailure => "session_metadata_after_fetch_failure",
            Self::NotFound => "not_found",
        }
    }
}

/// Outcome of the tier lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierResolution {
    pub tier: Option<Tier>,
    pub source: TierSource,
}

impl TierResolution {
    fn found(tier: Tier, source: TierSource) -> Self {
        Self {
            tier: Some(tier),
            source,
        }
    }

    fn not_found() -> Self {
        Self {
            tier: None,
            source: TierSource::NotFound,
        }
    }

    /// Step 1: resolves from the delivered payload alone.
    ///
    /// Returns `None` when a re-fetch is needed.
    pub fn from_payload(session: &CheckoutSession) -> Option<Self> {
        session
            .line_item_tier()
            .map(|tier| Self::found(tier, TierSource::EmbeddedLineItem))
    }

    /// Steps 2-4: resolves once the re-fetch has completed.
    ///
    /// `fetched` is `None` when the re-fetch failed.
    pub fn after_fetch(delivered: &CheckoutSession, fetched: Option<&CheckoutSession>) -> Self {
        match fetched {
            Some(full) => full
                .line_item_tier()
                .map(|tier| Self::found(tier, TierSource::FetchedLineItem))
                .or_else(|| {
                    full.metadata_tier()
                        .map(|tier| Self::found(tier, TierSource::FetchedSessionMetadata))
                })
                .or_else(|| {
                    delivered
                        .metadata_tier()
                        .map(|tier| Self::found(tier, TierSource::SessionMetadata))
                })
                .unwrap_or_else(Self::not_found),
            None => delivered
                .metadata_tier()
                .map(|tier| Self::found(tier, TierSource::SessionMetadataAfterFetchFailure))
                .unwrap_or_else(Self::not_found),
        }
    }
}
