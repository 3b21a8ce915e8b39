//! Block implementation for the ledger
//!
//! A block carries an opaque payload plus the hash-chain metadata that
//! links it to its predecessor.

use crate::crypto::{meets_difficulty, sha256_hex};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved payload of the genesis block
pub const GENESIS_PAYLOAD: &str = "Genesis Block";

/// A single unit of the ledger.
///
/// The stored hash always equals [`Block::compute_hash`] over the other
/// four fields; mining rewrites `nonce` and `hash` together until the
/// proof-of-work target is met. Only the genesis block keeps its
/// construction-time hash without satisfying proof of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Opaque data stored in the block
    pub payload: String,
    /// Creation time, milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Counter searched by the miner
    pub nonce: u64,
    /// SHA-256 hash of this block, lower-case hex
    pub hash: String,
    /// Hash of the previous block in the chain, empty only for genesis
    pub previous_hash: String,
}

impl Block {
    /// Create an unmined block carrying `payload`.
    ///
    /// `previous_hash` starts empty; the chain owner fills it in before
    /// mining, which overwrites the seed hash computed here.
    pub fn new(payload: &str) -> Self {
        let mut block = Self {
            payload: payload.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            nonce: 0,
            hash: String::new(),
            previous_hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Create the genesis block. Its hash is accepted permanently
    /// without mining.
    pub fn genesis() -> Self {
        Self::new(GENESIS_PAYLOAD)
    }

    /// SHA-256 over previous hash, timestamp, nonce and payload, in
    /// that fixed order, each in its canonical string form.
    pub fn compute_hash(&self) -> String {
        let data = format!(
            "{}{}{}{}",
            self.previous_hash, self.timestamp, self.nonce, self.payload
        );
        sha256_hex(data.as_bytes())
    }

    /// Verify the stored hash against a recomputation
    pub fn verify_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Check the leading-zero proof-of-work condition
    pub fn is_valid_pow(&self, difficulty: u32) -> bool {
        meets_difficulty(&self.hash, difficulty)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block {{ payload: '{}' }}", self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_block_hash_matches_fields() {
        let block = Block::new("some data");
        assert_eq!(block.nonce, 0);
        assert!(block.previous_hash.is_empty());
        assert!(block.verify_hash());
        assert_eq!(block.hash.len(), 64);
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis();
        assert_eq!(genesis.payload, GENESIS_PAYLOAD);
        assert!(genesis.previous_hash.is_empty());
        assert!(genesis.verify_hash());
    }

    #[test]
    fn test_compute_hash_deterministic() {
        let block = Block::new("payload");
        assert_eq!(block.compute_hash(), block.compute_hash());
    }

    #[test]
    fn test_tampered_nonce_detected() {
        let mut block = Block::new("payload");
        assert!(block.verify_hash());

        block.nonce += 1;
        assert!(!block.verify_hash());
    }

    #[test]
    fn test_tampered_payload_detected() {
        let mut block = Block::new("payload");
        block.payload = "other payload".to_string();
        assert!(!block.verify_hash());
    }
}
