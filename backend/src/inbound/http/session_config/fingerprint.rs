//! Short, non-secret identifier for the active session key.
//!
//! Logged at startup so operators can tell which key a deployment runs with
//! after a rotation, without the key itself ever reaching the logs.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 8;

/// First 8 bytes of the SHA-256 of the signing half of `key`, hex encoded.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use medlink::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::derive_from(&[7u8; 64]));
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn same_material_gives_same_lowercase_hex() {
        let first = key_fingerprint(&Key::derive_from(&[b'a'; 64]));
        let second = key_fingerprint(&Key::derive_from(&[b'a'; 64]));

        assert_eq!(first, second);
        assert_eq!(first.len(), FINGERPRINT_BYTES * 2);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[rstest]
    fn rotated_keys_are_distinguishable() {
        let old = key_fingerprint(&Key::derive_from(&[b'a'; 64]));
        let new = key_fingerprint(&Key::derive_from(&[b'b'; 64]));
        assert_ne!(old, new);
    }
}
