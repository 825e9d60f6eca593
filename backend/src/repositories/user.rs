//! User repository for database operations

use anyhow::Result;
use async_trait::async_trait;
use mini_blog_shared::UserOut;
use sqlx::PgPool;
use thiserror::Error;

/// User record from database
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub profile_img: Option<String>,
}

impl From<&User> for UserOut {
    fn from(user: &User) -> Self {
        UserOut {
            username: user.username.clone(),
            profile_img: user.profile_img.clone(),
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub profile_img: Option<String>,
}

#[derive(Error, Debug)]
pub enum CreateUserError {
    #[error("username already taken")]
    DuplicateUsername,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Persisted user identities
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user; a taken username yields `DuplicateUsername`
    async fn create(&self, new_user: NewUser) -> Result<User, CreateUserError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<()>;
}

/// Postgres-backed credential store
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create(&self, new_user: NewUser) -> Result<User, CreateUserError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, profile_img)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, profile_img
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(&new_user.profile_img)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(CreateUserError::DuplicateUsername)
            }
            Err(e) => Err(CreateUserError::Store(e.into())),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, profile_img
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, profile_img
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET password_hash = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            anyhow::bail!("user {} vanished during password update", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_out_hides_hash() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            profile_img: Some("https://example.com/alice.svg".to_string()),
        };
        let out = UserOut::from(&user);
        assert_eq!(out.username, "alice");
        assert_eq!(out.profile_img.as_deref(), Some("https://example.com/alice.svg"));
    }

    // Postgres-backed tests live in backend/tests and require a database
}
