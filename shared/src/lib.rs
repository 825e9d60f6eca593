//! Mini Blog Shared Library
//!
//! Wire types and input validation shared between the backend and any
//! client talking to it.

pub mod types;
pub mod validation;

// Re-export commonly used items
pub use types::*;
pub use validation::{validate_password, validate_username, MAX_PASSWORD_BYTES, MAX_USERNAME_CHARS};
