//! Session token issuance and verification
//!
//! Tokens are stateless HMAC-signed JWTs carrying the username as `sub`.
//! There is no denylist: a token stays valid until its `exp` passes.

use super::error::AuthError;
use crate::config::{JwtAlgorithm, JwtConfig};
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    /// This should be called once at startup
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// JWT service for token operations
///
/// Built once at startup and cloned into request handlers; keys are
/// wrapped in Arc so clones are cheap.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    algorithm: Algorithm,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str, algorithm: JwtAlgorithm, ttl: Duration) -> Self {
        Self {
            keys: JwtKeys::new(secret),
            algorithm: algorithm.into(),
            ttl,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            &config.secret,
            config.algorithm,
            Duration::minutes(config.expire_minutes),
        )
    }

    /// Issue a token for `subject` expiring after the configured TTL
    pub fn issue(&self, subject: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: Some(subject.to_string()),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(self.algorithm), claims, self.keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to sign session token: {}", e))
    }

    /// Check signature and expiry, returning the subject
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, self.keys.decoding(), &validation).map_err(|e| {
            debug!(kind = ?e.kind(), "Session token rejected");
            AuthError::InvalidToken
        })?;

        data.claims.sub.ok_or(AuthError::MissingSubject)
    }

    /// Session token lifetime in seconds
    #[inline]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }
}
