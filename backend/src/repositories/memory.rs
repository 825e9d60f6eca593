//! In-memory implementation of the credential and reset-token stores
//!
//! Mirrors the relational constraints the Postgres schema enforces: unique
//! usernames, unique tokens, and cascade delete from users to their reset
//! tokens. Used by unit tests and router tests that run without a database.

use super::reset_token::{ResetToken, ResetTokenStore};
use super::user::{CreateUserError, CredentialStore, NewUser, User};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    reset_tokens: HashMap<String, ResetToken>,
}

/// Single store backing both traits, so user deletion can cascade
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))
    }

    /// Remove a user and, by cascade, every reset token they own
    pub fn remove_user(&self, id: i64) -> Result<bool> {
        let mut tables = self.lock()?;
        let removed = tables.users.remove(&id).is_some();
        tables.reset_tokens.retain(|_, t| t.user_id != id);
        Ok(removed)
    }

    /// Outstanding reset tokens for a user
    pub fn reset_tokens_for(&self, user_id: i64) -> Result<Vec<ResetToken>> {
        let tables = self.lock()?;
        Ok(tables
            .reset_tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    pub fn user_count(&self) -> Result<usize> {
        Ok(self.lock()?.users.len())
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User, CreateUserError> {
        let mut tables = self.lock()?;
        if tables
            .users
            .values()
            .any(|u| u.username == new_user.username)
        {
            return Err(CreateUserError::DuplicateUsername);
        }

        tables.next_id += 1;
        let user = User {
            id: tables.next_id,
            username: new_user.username,
            password_hash: new_user.password_hash,
            profile_img: new_user.profile_img,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<()> {
        let mut tables = self.lock()?;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("user {} vanished during password update", id))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl ResetTokenStore for InMemoryStore {
    async fn insert(&self, token: &ResetToken) -> Result<()> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&token.user_id) {
            anyhow::bail!("reset token references unknown user {}", token.user_id);
        }
        if tables.reset_tokens.contains_key(&token.token) {
            anyhow::bail!("duplicate reset token");
        }
        tables
            .reset_tokens
            .insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn take_all_for_token(&self, token: &str) -> Result<Option<ResetToken>> {
        let mut tables = self.lock()?;
        let Some(matched) = tables.reset_tokens.get(token).cloned() else {
            return Ok(None);
        };
        tables
            .reset_tokens
            .retain(|_, t| t.user_id != matched.user_id);
        Ok(Some(matched))
    }
}
