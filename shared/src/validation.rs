//! Input validation functions
//!
//! Custom validators used by the `validator` derive on request types, and
//! callable directly where a request body is not involved (password reset,
//! password change).

use std::borrow::Cow;
use validator::ValidationError;

/// Longest username accepted at registration
pub const MAX_USERNAME_CHARS: usize = 20;

/// bcrypt silently ignores input past 72 bytes, so longer passwords are refused
pub const MAX_PASSWORD_BYTES: usize = 72;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Validate a username: 1 to 20 characters, no whitespace
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(error("username_empty", "Username cannot be empty"));
    }
    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(error(
            "username_too_long",
            "Username must be at most 20 characters",
        ));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(error(
            "username_whitespace",
            "Username must not contain whitespace",
        ));
    }
    Ok(())
}

/// Validate a plaintext password before it is hashed
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(error("password_empty", "Password cannot be empty"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(error(
            "password_too_long",
            "Password must be at most 72 bytes",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice")]
    #[case("a")]
    #[case("exactly_twenty_chars")]
    #[case("émile")]
    fn test_valid_usernames(#[case] username: &str) {
        assert!(validate_username(username).is_ok());
    }

    #[rstest]
    #[case("", "username_empty")]
    #[case("twenty_one_characters", "username_too_long")]
    #[case("has space", "username_whitespace")]
    #[case("tab\there", "username_whitespace")]
    #[case("trailing\n", "username_whitespace")]
    fn test_invalid_usernames(#[case] username: &str, #[case] code: &str) {
        let err = validate_username(username).unwrap_err();
        assert_eq!(err.code, code);
    }

    #[rstest]
    #[case("", false)]
    #[case("Secret1!", true)]
    #[case(&"x".repeat(72), true)]
    #[case(&"x".repeat(73), false)]
    fn test_password_rules(#[case] password: &str, #[case] ok: bool) {
        assert_eq!(validate_password(password).is_ok(), ok);
    }

    proptest! {
        #[test]
        fn prop_username_without_whitespace_within_limit_is_valid(name in "[a-zA-Z0-9_.-]{1,20}") {
            prop_assert!(validate_username(&name).is_ok());
        }

        #[test]
        fn prop_username_with_whitespace_is_rejected(
            head in "[a-z]{0,8}",
            tail in "[a-z]{0,8}",
        ) {
            let name = format!("{} {}", head, tail);
            prop_assert!(validate_username(&name).is_err());
        }
    }
}
