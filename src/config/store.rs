//! Profile store configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Profile store configuration
///
/// The backend is picked from the URL scheme:
/// - `postgres://` / `postgresql://` - direct PostgreSQL connection
/// - `http://` / `https://` - PostgREST (e.g. Supabase) endpoint
/// - `memory://` - in-process store, local runs only
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Store URL
    #[serde(default)]
    pub url: String,

    /// Service role key sent to PostgREST
    pub service_role_key: Option<SecretString>,

    /// Table holding profiles
    #[serde(default = "default_table")]
    pub table: String,

    /// Maximum PostgreSQL connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Timeout for a single PostgREST call in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

/// Which profile store adapter a URL selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Postgrest,
    InMemory,
}

impl StoreConfig {
    /// Resolve the backend from the URL scheme.
    pub fn backend(&self) -> Result<StoreBackend, ValidationError> {
        let scheme = self.url.split_once("://").map(|(scheme, _)| scheme);
        match scheme {
            Some("postgres") | Some("postgresql") => Ok(StoreBackend::Postgres),
            Some("http") | Some("https") => Ok(StoreBackend::Postgrest),
            Some("memory") => Ok(StoreBackend::InMemory),
            Some(other) => Err(ValidationError::UnsupportedStoreScheme(other.to_string())),
            None => Err(ValidationError::UnsupportedStoreScheme(self.url.clone())),
        }
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get PostgREST call timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Validate store configuration
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("STORE_URL"));
        }
        if !is_plain_identifier(&self.table) {
            return Err(ValidationError::InvalidTableName(self.table.clone()));
        }

        match self.backend()? {
            StoreBackend::Postgrest => {
                let has_key = self
                    .service_role_key
                    .as_ref()
                    .is_some_and(|key| !key.expose_secret().is_empty());
                if !has_key {
                    return Err(ValidationError::MissingRequired("STORE_SERVICE_ROLE_KEY"));
                }
                if environment == Environment::Production && !self.url.starts_with("https://") {
                    return Err(ValidationError::StoreUrlMustBeHttps);
                }
            }
            StoreBackend::Postgres => {
                if self.max_connections == 0 || self.max_connections > 100 {
                    return Err(ValidationError::InvalidPoolSize);
                }
            }
            StoreBackend::InMemory => {}
        }

        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_role_key: None,
            table: default_table(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, at most 63 bytes.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts_ok && name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn default_table() -> String {
    "profiles".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_http_timeout() -> u64 {
    10
}
