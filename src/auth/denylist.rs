//! Revoked token ids, consulted on every authenticated request.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError>;

    /// Revoke `jti`. The entry only needs to outlive the token's own expiry.
    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError>;
}

/// Denylist stored in the `revoked_token` table.
#[derive(Clone)]
pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        let (revoked,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM revoked_token WHERE jti = $1)")
            .bind(jti)
            .fetch_one(&self.pool)
            .await?;
        Ok(revoked)
    }

    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM revoked_token WHERE expires_at < NOW()")
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO revoked_token (jti, expires_at) VALUES ($1, $2) ON CONFLICT (jti) DO NOTHING")
            .bind(jti)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Process-local denylist for single-instance deployments and tests.
#[derive(Default)]
pub struct MemoryRevocationStore {
    revoked: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        let revoked = self
            .revoked
            .read()
            .map_err(|_| AppError::Internal("revocation store poisoned".into()))?;
        Ok(revoked.contains_key(&jti))
    }

    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        let mut revoked = self
            .revoked
            .write()
            .map_err(|_| AppError::Internal("revocation store poisoned".into()))?;
        let now = Utc::now();
        revoked.retain(|_, exp| *exp >= now);
        revoked.insert(jti, expires_at);
        Ok(())
    }
}
