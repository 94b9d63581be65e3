//! Opaque bearer tokens for sessions and invitations.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

/// Number of random bytes per token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Generates a URL-safe random token from the OS CSPRNG.
///
/// Tokens are single-purpose secrets: guessing one must be as hard as
/// guessing 256 random bits, so they are never derived from timestamps,
/// counters or row ids.
pub(crate) fn generate() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_url_safe_and_full_length() {
        let token = generate();
        // 32 bytes -> 43 base64 chars without padding.
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn tokens_do_not_repeat() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
    }
}
