//! Mining engine
//!
//! Proof-of-work search over a block's nonce space.

pub mod miner;

pub use miner::{mine, mine_payload, MinerError, MiningStats};
