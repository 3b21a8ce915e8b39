//! Chain management
//!
//! An ordered, append-only sequence of blocks, index 0 always genesis.
//! The whole-chain validity check and the tentative append/rollback
//! step live here; the network node wraps them in its write lock.

use crate::core::block::Block;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Leading-zero hex characters required of every non-genesis block
/// hash. All cooperating nodes must agree on this value; the wire
/// protocol does not negotiate or advertise it.
pub const DEFAULT_DIFFICULTY: u32 = 5;

/// The local copy of the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    /// The chain of blocks
    pub blocks: Vec<Block>,
    /// Proof-of-work difficulty shared by miner and validator
    pub difficulty: u32,
}

impl Chain {
    /// Create a new chain holding only the genesis block
    pub fn new() -> Self {
        Self::with_difficulty(DEFAULT_DIFFICULTY)
    }

    /// Create a chain with custom difficulty
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self {
            blocks: vec![Block::genesis()],
            difficulty,
        }
    }

    /// Get the latest block
    pub fn latest_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("chain should have at least the genesis block")
    }

    /// Get chain height (genesis is height 0)
    pub fn height(&self) -> u64 {
        (self.blocks.len() as u64).saturating_sub(1)
    }

    /// Validate the entire chain.
    ///
    /// Genesis is exempt from recomputation and proof of work; every
    /// later block must recompute to its stored hash, link to its
    /// predecessor and satisfy the difficulty target. Returns false on
    /// the first violation found — a single outcome bit, which is all
    /// the append/rollback protocol needs.
    pub fn is_valid(&self) -> bool {
        for i in 1..self.blocks.len() {
            let current = &self.blocks[i];
            let previous = &self.blocks[i - 1];

            if !current.verify_hash() {
                return false;
            }

            if current.previous_hash != previous.hash {
                return false;
            }

            if !current.is_valid_pow(self.difficulty) {
                return false;
            }
        }
        true
    }

    /// Tentatively append `block`: keep it if the whole chain still
    /// validates, roll it back otherwise. The chain is untouched when
    /// this returns false.
    pub fn try_append(&mut self, block: Block) -> bool {
        self.blocks.push(block);
        if self.is_valid() {
            true
        } else {
            self.blocks.pop();
            false
        }
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            writeln!(f, "#{} {}", i, block)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining;

    #[test]
    fn test_new_chain_starts_at_genesis() {
        let chain = Chain::with_difficulty(1);
        assert_eq!(chain.blocks.len(), 1);
        assert_eq!(chain.height(), 0);
        assert!(chain.is_valid());
    }

    #[test]
    fn test_mined_hello_block_validates() {
        let mut chain = Chain::with_difficulty(1);
        let previous_hash = chain.latest_block().hash.clone();

        let (block, _stats) = mining::mine_payload("hello", previous_hash, 1).unwrap();
        assert!(block.hash.starts_with('0'));

        assert!(chain.try_append(block));
        assert!(chain.is_valid());
        assert_eq!(chain.height(), 1);
    }

    #[test]
    fn test_tampered_payload_invalidates_chain() {
        let mut chain = Chain::with_difficulty(1);
        for payload in ["first", "second"] {
            let previous_hash = chain.latest_block().hash.clone();
            let (block, _) = mining::mine_payload(payload, previous_hash, 1).unwrap();
            assert!(chain.try_append(block));
        }
        assert!(chain.is_valid());

        chain.blocks[1].payload = "rewritten".to_string();
        assert!(!chain.is_valid());
    }

    #[test]
    fn test_rollback_leaves_chain_untouched() {
        let mut chain = Chain::with_difficulty(1);
        let previous_hash = chain.latest_block().hash.clone();
        let (block, _) = mining::mine_payload("kept", previous_hash, 1).unwrap();
        assert!(chain.try_append(block));

        let before = chain.clone();

        let (stale, _) = mining::mine_payload("stale", "deadbeef".to_string(), 1).unwrap();
        assert!(!chain.try_append(stale));

        assert_eq!(chain, before);
    }

    #[test]
    fn test_redelivered_block_rejected() {
        let mut chain = Chain::with_difficulty(1);
        let previous_hash = chain.latest_block().hash.clone();
        let (block, _) = mining::mine_payload("once", previous_hash, 1).unwrap();

        assert!(chain.try_append(block.clone()));
        let len = chain.blocks.len();

        // Its previous_hash now points two blocks back, so linkage fails.
        assert!(!chain.try_append(block));
        assert_eq!(chain.blocks.len(), len);
    }

    #[test]
    fn test_pow_violation_rejected() {
        let mut chain = Chain::with_difficulty(5);
        let mut block = Block::new("cheap block");
        block.previous_hash = chain.latest_block().hash.clone();
        block.hash = block.compute_hash();

        // Hash is consistent and linked, but almost certainly fails
        // the 5-leading-zero target without mining.
        if !block.is_valid_pow(5) {
            assert!(!chain.try_append(block));
            assert_eq!(chain.height(), 0);
        }
    }
}
