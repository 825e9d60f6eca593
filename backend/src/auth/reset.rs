//! Password-reset token generation

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// Never issue tokens with less than 256 bits of entropy
pub const MIN_TOKEN_BYTES: usize = 32;

/// Generate a random URL-safe reset token from `bytes` bytes of OS entropy
pub fn generate_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes.max(MIN_TOKEN_BYTES)];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_is_url_safe() {
        let token = generate_token(32);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_token_length_encodes_requested_bytes() {
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(generate_token(32).len(), 43);
        assert_eq!(generate_token(48).len(), 64);
    }

    #[test]
    fn test_short_request_is_raised_to_minimum() {
        assert_eq!(generate_token(8).len(), 43);
    }

    #[test]
    fn test_tokens_are_unique() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_token(32)).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
