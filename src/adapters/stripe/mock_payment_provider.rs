//! Mock payment provider for testing.
//!
//! Provides a configurable mock implementation of `PaymentProvider` for unit
//! and integration tests. Supports:
//! - Pre-configured sessions
//! - Error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::membership::CheckoutSession;
use crate::ports::{PaymentError, PaymentProvider};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.set_session(session);
/// mock.set_error(PaymentError::network("Stripe unreachable"));
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Pre-configured sessions by ID.
    sessions: HashMap<String, CheckoutSession>,

    /// Error to return on every call while set.
    error: Option<PaymentError>,

    /// Track calls for assertions.
    call_log: Vec<SessionLookup>,
}

/// A recorded `retrieve_checkout_session` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLookup {
    pub session_id: String,
    pub expand: Vec<String>,
}

impl MockPaymentProvider {
    /// Create a new mock with no sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session returned for its ID.
    pub fn set_session(&self, session: CheckoutSession) {
        let mut state = self.inner.lock().unwrap();
        state.sessions.insert(session.id.clone(), session);
    }

    /// Fail every lookup with `error`.
    pub fn set_error(&self, error: PaymentError) {
        self.inner.lock().unwrap().error = Some(error);
    }

    /// Recorded lookups, in call order.
    pub fn calls(&self) -> Vec<SessionLookup> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Number of lookups made.
    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().call_log.len()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
        expand: &[&str],
    ) -> Result<CheckoutSession, PaymentError> {
        let mut state = self.inner.lock().unwrap();
        state.call_log.push(SessionLookup {
            session_id: session_id.to_string(),
            expand: expand.iter().map(|p| p.to_string()).collect(),
        });

        if let Some(error) = state.error.clone() {
            return Err(error);
        }

        state
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("Checkout session"))
    }
}
