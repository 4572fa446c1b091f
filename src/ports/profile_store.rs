//! ProfileStore port for applying purchased tiers to profile records.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::membership::{Email, Tier};

/// Errors raised by profile store adapters.
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    /// Could not reach the store.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Store answered with an error.
    #[error("Store rejected update ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Database driver error.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for ProfileStoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed => {
                Self::Unavailable(err.to_string())
            }
            other => Self::Database(other.to_string()),
        }
    }
}

/// Store holding the application's user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Set `tier` on every profile whose email equals `email`.
    ///
    /// Returns the number of profiles matched. Zero is not an error: the
    /// customer may not have signed up yet. Profiles are never created here.
    async fn update_tier_by_email(&self, email: &Email, tier: &Tier)
        -> Result<u64, ProfileStoreError>;
}
