//! Proof-of-work miner
//!
//! Brute-force search over a single block's nonce space. Purely
//! CPU-bound and blocking; once started it runs until the target is met
//! or the nonce space is exhausted. There is no cancellation.

use crate::core::Block;
use log::info;
use std::time::Instant;
use thiserror::Error;

/// Mining errors
#[derive(Error, Debug)]
pub enum MinerError {
    /// The u64 nonce space ran out before a conforming hash was found
    #[error("nonce space exhausted after {0} attempts")]
    NonceExhausted(u64),
}

/// Mining statistics
#[derive(Debug, Clone)]
pub struct MiningStats {
    /// Number of hash evaluations
    pub hash_attempts: u64,
    /// Time taken in milliseconds
    pub time_ms: u128,
    /// Hash rate (hashes per second)
    pub hash_rate: f64,
}

/// Search the nonce space until the block's hash has `difficulty`
/// leading zero hex characters. Expected work is around 16^difficulty
/// hash evaluations.
pub fn mine(block: &mut Block, difficulty: u32) -> Result<MiningStats, MinerError> {
    let start = Instant::now();
    let mut attempts = 1u64;

    // The construction-time hash predates the previous_hash assignment,
    // so refresh it before the first check.
    block.hash = block.compute_hash();

    while !block.is_valid_pow(difficulty) {
        block.nonce = block
            .nonce
            .checked_add(1)
            .ok_or(MinerError::NonceExhausted(attempts))?;
        block.hash = block.compute_hash();
        attempts += 1;
    }

    let elapsed = start.elapsed().as_millis();
    let hash_rate = if elapsed > 0 {
        (attempts as f64) / (elapsed as f64 / 1000.0)
    } else {
        attempts as f64
    };

    info!(
        "block mined in {}ms ({} attempts, {:.2} H/s)",
        elapsed, attempts, hash_rate
    );

    Ok(MiningStats {
        hash_attempts: attempts,
        time_ms: elapsed,
        hash_rate,
    })
}

/// Build a payload block on top of `previous_hash` and mine it.
///
/// Takes snapshot data rather than a chain reference so callers can run
/// the CPU-heavy search without holding the chain lock; the mined block
/// still has to pass validate-and-append, which rejects it if the chain
/// advanced in the meantime.
pub fn mine_payload(
    payload: &str,
    previous_hash: String,
    difficulty: u32,
) -> Result<(Block, MiningStats), MinerError> {
    let mut block = Block::new(payload);
    block.previous_hash = previous_hash;

    info!("mining block with difficulty {}...", difficulty);
    let stats = mine(&mut block, difficulty)?;

    Ok((block, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mine_meets_difficulty() {
        let mut block = Block::new("hello");
        let stats = mine(&mut block, 1).unwrap();

        assert!(block.hash.starts_with('0'));
        assert!(block.verify_hash());
        assert!(stats.hash_attempts >= 1);
    }

    #[test]
    fn test_mine_payload_links_previous_hash() {
        let previous = Block::genesis();
        let (block, _stats) = mine_payload("data", previous.hash.clone(), 1).unwrap();

        assert_eq!(block.previous_hash, previous.hash);
        assert!(block.is_valid_pow(1));
        assert!(block.verify_hash());
    }

    #[test]
    fn test_mine_difficulty_two() {
        let mut block = Block::new("harder");
        mine(&mut block, 2).unwrap();

        assert!(block.hash.starts_with("00"));
        assert!(block.verify_hash());
    }
}
