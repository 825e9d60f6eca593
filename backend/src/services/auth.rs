//! Authentication service
//!
//! Orchestrates the credential store, password hasher, session token issuer
//! and reset-token store. Holds no mutable state of its own; one instance is
//! built at startup and cloned into every request handler.
//!
//! # Performance
//!
//! - Password hashing/verification runs on the blocking thread pool
//! - JWT keys are pre-computed once

use crate::auth::{generate_token, AuthError, AuthResult, JwtService, PasswordService};
use crate::config::AppConfig;
use crate::repositories::{
    CreateUserError, CredentialStore, NewUser, ResetToken, ResetTokenStore, User,
};
use chrono::{Duration, Utc};
use mini_blog_shared::{validate_password, AccessToken, UserCreate};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

impl From<CreateUserError> for AuthError {
    fn from(err: CreateUserError) -> Self {
        match err {
            CreateUserError::DuplicateUsername => AuthError::DuplicateUsername,
            CreateUserError::Store(e) => AuthError::Internal(e),
        }
    }
}

/// Avatar derived from the username at registration
pub fn profile_image_url(username: &str) -> String {
    format!("https://avatars.dicebear.com/api/identicon/{}.svg", username)
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    reset_tokens: Arc<dyn ResetTokenStore>,
    passwords: PasswordService,
    jwt: JwtService,
    reset_ttl: Duration,
    reset_token_bytes: usize,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        reset_tokens: Arc<dyn ResetTokenStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            users,
            reset_tokens,
            passwords: PasswordService::new(&config.password),
            jwt: JwtService::from_config(&config.jwt),
            reset_ttl: Duration::hours(config.reset.token_ttl_hours),
            reset_token_bytes: config.reset.token_bytes,
        }
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    #[inline]
    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }

    /// Register a new user
    pub async fn register(&self, req: UserCreate) -> AuthResult<User> {
        req.validate()?;

        if self.users.find_by_username(&req.username).await?.is_some() {
            info!(username = %req.username, "Registration rejected: username taken");
            return Err(AuthError::DuplicateUsername);
        }

        let password_hash = self.passwords.hash_async(req.password).await?;
        let profile_img = Some(profile_image_url(&req.username));

        let user = self
            .users
            .create(NewUser {
                username: req.username,
                password_hash,
                profile_img,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Check a username/password pair
    ///
    /// `None` when the user does not exist or the password does not verify.
    /// A hash made with outdated settings is upgraded in place.
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<Option<User>> {
        let Some(mut user) = self.users.find_by_username(username).await? else {
            info!(username, "Authentication failed: unknown user");
            return Ok(None);
        };

        let valid = self
            .passwords
            .verify_async(password.to_string(), user.password_hash.clone())
            .await?;
        if !valid {
            info!(username, "Authentication failed: wrong password");
            return Ok(None);
        }

        if self.passwords.needs_rehash(&user.password_hash) {
            match self.upgrade_hash(&user, password).await {
                Ok(hash) => user.password_hash = hash,
                Err(e) => warn!(user_id = user.id, error = %e, "Password hash upgrade failed"),
            }
        }

        info!(user_id = user.id, username, "User authenticated");
        Ok(Some(user))
    }

    async fn upgrade_hash(&self, user: &User, password: &str) -> anyhow::Result<String> {
        let hash = self.passwords.hash_async(password.to_string()).await?;
        self.users.update_password_hash(user.id, &hash).await?;
        info!(user_id = user.id, "Password hash upgraded to current settings");
        Ok(hash)
    }

    /// Authenticate and issue a session token
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<AccessToken> {
        let user = self
            .authenticate(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.jwt.issue(&user.username)?;
        Ok(AccessToken::bearer(token))
    }

    /// Resolve the user a bearer token was issued to
    pub async fn current_user(&self, token: &str) -> AuthResult<User> {
        let username = self.jwt.verify(token).map_err(|e| {
            info!(reason = %e, "Bearer token rejected");
            AuthError::Unauthorized
        })?;

        self.users
            .find_by_username(&username)
            .await?
            .ok_or_else(|| {
                info!(username = %username, "Bearer token names an unknown user");
                AuthError::Unauthorized
            })
    }

    /// Replace the password of `user` after checking the current one
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        user: &User,
    ) -> AuthResult<()> {
        let valid = self
            .passwords
            .verify_async(current_password.to_string(), user.password_hash.clone())
            .await?;
        if !valid {
            info!(user_id = user.id, "Password change rejected: wrong current password");
            return Err(AuthError::Forbidden);
        }

        validate_password(new_password)?;
        let hash = self.passwords.hash_async(new_password.to_string()).await?;
        self.users.update_password_hash(user.id, &hash).await?;

        info!(user_id = user.id, "Password changed");
        Ok(())
    }

    /// Issue a password-reset token for `username`
    pub async fn request_reset(&self, username: &str) -> AuthResult<String> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::NotFound)?;

        self.issue_reset_token(user.id).await
    }

    /// Persist a fresh reset token for `user_id`
    ///
    /// Earlier tokens for the same user stay valid until one is consumed.
    pub async fn issue_reset_token(&self, user_id: i64) -> AuthResult<String> {
        let token = ResetToken {
            token: generate_token(self.reset_token_bytes),
            user_id,
            expires_at: Utc::now() + self.reset_ttl,
        };
        self.reset_tokens.insert(&token).await?;

        info!(user_id, expires_at = %token.expires_at, "Reset token issued");
        Ok(token.token)
    }

    /// Consume a reset token and set a new password
    ///
    /// All of the owner's outstanding tokens are deleted before expiry is
    /// checked, so an expired submission still burns every token that user
    /// holds.
    pub async fn complete_reset(&self, token: &str, new_password: &str) -> AuthResult<()> {
        validate_password(new_password)?;

        let matched = self
            .reset_tokens
            .take_all_for_token(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if matched.is_expired_at(Utc::now()) {
            info!(user_id = matched.user_id, "Reset rejected: token expired");
            return Err(AuthError::TokenExpired);
        }

        // Tokens are already gone; a failure below means requesting a new one
        let hash = self.passwords.hash_async(new_password.to_string()).await?;
        self.users
            .update_password_hash(matched.user_id, &hash)
            .await?;

        info!(user_id = matched.user_id, "Password reset completed");
        Ok(())
    }
}
