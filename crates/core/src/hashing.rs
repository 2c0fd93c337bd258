//! Shared SHA-256 digest utilities.
//!
//! Used by the image classifier's last-resort pick and by the upload
//! handlers when logging file fingerprints.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Interpret the first eight bytes of the SHA-256 digest as a big-endian
/// integer. Stable across platforms and runs.
pub fn sha256_prefix_u64(data: &[u8]) -> u64 {
    let hash = Sha256::digest(data);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash[..8]);
    u64::from_be_bytes(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        let hash = sha256_hex(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn consistent_output() {
        let data = b"hello world";
        assert_eq!(sha256_hex(data), sha256_hex(data));
        assert_eq!(sha256_hex(data).len(), 64);
    }

    #[test]
    fn prefix_matches_hex_digest() {
        // e3b0c44298fc1c14 is the first 8 bytes of SHA-256("").
        assert_eq!(sha256_prefix_u64(b""), 0xe3b0_c442_98fc_1c14);
    }
}
