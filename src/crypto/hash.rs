//! Cryptographic hashing utilities for the ledger
//!
//! Provides the SHA-256 based hashing used for block hashes and the
//! leading-zero proof-of-work test.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-256 hash and returns it as a lower-case hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Checks if a hex hash string meets the difficulty target.
/// The first `difficulty` hex characters must all be '0'.
pub fn meets_difficulty(hash_hex: &str, difficulty: u32) -> bool {
    let prefix_len = difficulty as usize;
    if hash_hex.len() < prefix_len {
        return false;
    }
    hash_hex.bytes().take(prefix_len).all(|b| b == b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.len(), 32);
        assert_eq!(
            sha256_hex(data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_meets_difficulty() {
        assert!(meets_difficulty("000abc", 3));
        assert!(meets_difficulty("000abc", 2));
        assert!(!meets_difficulty("000abc", 4));
        assert!(meets_difficulty("ffff", 0));
        assert!(!meets_difficulty("0", 2));
    }
}
