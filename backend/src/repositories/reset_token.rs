//! Password-reset token repository

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// One-time password-reset credential
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ResetToken {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Persisted reset tokens
#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn insert(&self, token: &ResetToken) -> Result<()>;

    /// Delete every token owned by the user that `token` belongs to, and
    /// return the matched row. Unknown tokens return `None` and change nothing.
    ///
    /// Lookup and deletion happen as one atomic step: of two concurrent calls
    /// for the same user, only one observes the match.
    async fn take_all_for_token(&self, token: &str) -> Result<Option<ResetToken>>;
}

/// Postgres-backed reset token store
#[derive(Clone)]
pub struct PgResetTokenStore {
    pool: PgPool,
}

impl PgResetTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetTokenStore for PgResetTokenStore {
    async fn insert(&self, token: &ResetToken) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reset_password (token, user_id, token_expiry)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn take_all_for_token(&self, token: &str) -> Result<Option<ResetToken>> {
        let removed = sqlx::query_as::<_, ResetToken>(
            r#"
            DELETE FROM reset_password
            WHERE user_id = (SELECT user_id FROM reset_password WHERE token = $1)
            RETURNING token, user_id, token_expiry AS expires_at
            "#,
        )
        .bind(token)
        .fetch_all(&self.pool)
        .await?;

        Ok(removed.into_iter().find(|row| row.token == token))
    }
}
