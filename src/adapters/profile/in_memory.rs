//! In-memory profile store for tests and local development.
//!
//! Not durable. Selected with a `memory://` store URL.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::membership::{Email, Tier};
use crate::ports::{ProfileStore, ProfileStoreError};

/// A profile row as held by the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProfile {
    pub email: String,
    pub tier: Option<String>,
}

/// Update requests kept for inspection; older ones are dropped.
pub const MAX_RECORDED_UPDATES: usize = 1024;

#[derive(Debug, Default)]
struct StoreState {
    profiles: Vec<StoredProfile>,
    /// Most recent update requests, matched or not.
    updates: VecDeque<(String, String)>,
    failure: Option<String>,
}

/// In-memory `ProfileStore`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile with the given email and no tier.
    pub async fn insert_profile(&self, email: impl Into<String>) {
        self.state.write().await.profiles.push(StoredProfile {
            email: email.into(),
            tier: None,
        });
    }

    /// Fail every update with `message` until cleared.
    pub async fn fail_updates(&self, message: impl Into<String>) {
        self.state.write().await.failure = Some(message.into());
    }

    pub async fn clear_failure(&self) {
        self.state.write().await.failure = None;
    }

    /// Current profiles.
    pub async fn profiles(&self) -> Vec<StoredProfile> {
        self.state.read().await.profiles.clone()
    }

    /// `(email, tier)` pairs of the most recent updates, oldest first.
    pub async fn updates(&self) -> Vec<(String, String)> {
        self.state.read().await.updates.iter().cloned().collect()
    }

    /// Tier of the first profile with `email`.
    pub async fn tier_of(&self, email: &str) -> Option<String> {
        self.state
            .read()
            .await
            .profiles
            .iter()
            .find(|p| p.email == email)
            .and_then(|p| p.tier.clone())
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn update_tier_by_email(
        &self,
        email: &Email,
        tier: &Tier,
    ) -> Result<u64, ProfileStoreError> {
        let mut state = self.state.write().await;
        if state.updates.len() == MAX_RECORDED_UPDATES {
            state.updates.pop_front();
        }
        state
            .updates
            .push_back((email.as_str().to_string(), tier.as_str().to_string()));

        if let Some(message) = &state.failure {
            return Err(ProfileStoreError::Unavailable(message.clone()));
        }

        let mut matched = 0;
        for profile in state.profiles.iter_mut().filter(|p| p.email == email.as_str()) {
            profile.tier = Some(tier.as_str().to_string());
            matched += 1;
        }
        Ok(matched)
    }
}
