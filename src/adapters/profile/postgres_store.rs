//! PostgreSQL implementation of ProfileStore.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::membership::{Email, Tier};
use crate::ports::{ProfileStore, ProfileStoreError};

/// PostgreSQL implementation of the ProfileStore port.
///
/// The table name is interpolated into the statement, so callers must pass
/// a validated identifier (see `StoreConfig::validate`).
pub struct PostgresProfileStore {
    pool: PgPool,
    update_sql: String,
}

impl PostgresProfileStore {
    /// Creates a store updating `table` through the given pool.
    pub fn new(pool: PgPool, table: &str) -> Self {
        Self {
            pool,
            update_sql: update_statement(table),
        }
    }
}

fn update_statement(table: &str) -> String {
    format!("UPDATE {} SET tier = $1 WHERE email = $2", table)
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn update_tier_by_email(
        &self,
        email: &Email,
        tier: &Tier,
    ) -> Result<u64, ProfileStoreError> {
        let result = sqlx::query(&self.update_sql)
            .bind(tier.as_str())
            .bind(email.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Profile tier update failed");
                ProfileStoreError::from(e)
            })?;

        Ok(result.rows_affected())
    }
}
