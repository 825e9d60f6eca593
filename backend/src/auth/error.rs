//! Authentication error kinds
//!
//! Every variant is recoverable at the request boundary. Display text is
//! safe to return to callers: it never carries library error text, tokens
//! or passwords.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Current password is incorrect")]
    Forbidden,

    #[error("User not found")]
    NotFound,

    #[error("Reset token not found")]
    TokenNotFound,

    #[error("Reset token has expired")]
    TokenExpired,

    #[error("User already exists")]
    DuplicateUsername,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has no subject")]
    MissingSubject,

    #[error("{0}")]
    Validation(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<validator::ValidationError> for AuthError {
    fn from(err: validator::ValidationError) -> Self {
        let message = err
            .message
            .map(|m| m.into_owned())
            .unwrap_or_else(|| err.code.into_owned());
        AuthError::Validation(message)
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::Validation(errors.to_string())
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
