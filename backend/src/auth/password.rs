//! Password hashing
//!
//! New hashes use the configured scheme (bcrypt by default, argon2id as the
//! alternative). Verification reads the scheme from the self-describing
//! hash string, so switching schemes never locks out existing users.
//!
//! # Performance Considerations
//!
//! Both schemes are intentionally CPU-intensive. From async code use
//! `hash_async` / `verify_async`, which run on the blocking thread pool.

use crate::config::{PasswordConfig, PasswordScheme};
use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash scheme detected from a stored hash string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoredScheme {
    Bcrypt { cost: u32 },
    Argon2,
    Unknown,
}

impl StoredScheme {
    fn detect(hash: &str) -> Self {
        if hash.starts_with("$argon2") {
            return StoredScheme::Argon2;
        }
        if hash.starts_with("$2a$") || hash.starts_with("$2b$") || hash.starts_with("$2y$") {
            // $2b$12$<salt+hash>
            return hash
                .get(4..6)
                .and_then(|cost| cost.parse().ok())
                .map(|cost| StoredScheme::Bcrypt { cost })
                .unwrap_or(StoredScheme::Unknown);
        }
        StoredScheme::Unknown
    }
}

/// Password hashing service
///
/// An immutable value built once from configuration and cloned wherever
/// hashing is needed.
#[derive(Debug, Clone)]
pub struct PasswordService {
    scheme: PasswordScheme,
    bcrypt_cost: u32,
}

impl PasswordService {
    pub fn new(config: &PasswordConfig) -> Self {
        Self {
            scheme: config.scheme,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Hash a password with a fresh random salt (blocking operation)
    pub fn hash(&self, password: &str) -> Result<String> {
        match self.scheme {
            PasswordScheme::Bcrypt => bcrypt::hash(password, self.bcrypt_cost)
                .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e)),
            PasswordScheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
                Ok(hash.to_string())
            }
        }
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// Malformed or unrecognised hashes verify as `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match StoredScheme::detect(hash) {
            StoredScheme::Bcrypt { .. } => bcrypt::verify(password, hash).unwrap_or(false),
            StoredScheme::Argon2 => PasswordHash::new(hash)
                .map(|parsed| {
                    Argon2::default()
                        .verify_password(password.as_bytes(), &parsed)
                        .is_ok()
                })
                .unwrap_or(false),
            StoredScheme::Unknown => false,
        }
    }

    /// Whether `hash` was produced with settings other than the current ones
    pub fn needs_rehash(&self, hash: &str) -> bool {
        match (self.scheme, StoredScheme::detect(hash)) {
            (PasswordScheme::Bcrypt, StoredScheme::Bcrypt { cost }) => cost != self.bcrypt_cost,
            (PasswordScheme::Argon2, StoredScheme::Argon2) => false,
            _ => true,
        }
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(&self, password: String) -> Result<String> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password on the blocking thread pool
    pub async fn verify_async(&self, password: String, hash: String) -> Result<bool> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))
    }
}
