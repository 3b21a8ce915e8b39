//! Gossipchain: a minimal peer-to-peer proof-of-work ledger
//!
//! Each node holds a local copy of a hash-linked block sequence, mines
//! new blocks via proof of work and propagates them to peers by direct
//! TCP gossip. This crate provides:
//! - SHA-256 hash-linked blocks with leading-zero proof of work
//! - Whole-chain validation with tentative append/rollback as the only
//!   consistency gate
//! - Snapshot-on-connect bootstrap and block gossip over
//!   length-prefixed TCP frames
//! - One gossip receive loop per peer, with the chain guarded by a
//!   single write lock shared by miner and receive loops
//!
//! # Example
//!
//! ```rust
//! use gossipchain::core::Chain;
//! use gossipchain::mining;
//!
//! // Low difficulty for a fast example
//! let mut chain = Chain::with_difficulty(1);
//!
//! let previous_hash = chain.latest_block().hash.clone();
//! let (block, stats) = mining::mine_payload("hello", previous_hash, 1).unwrap();
//! println!("mined in {} attempts", stats.hash_attempts);
//!
//! assert!(chain.try_append(block));
//! assert!(chain.is_valid());
//! ```

pub mod core;
pub mod crypto;
pub mod mining;
pub mod network;

// Re-export commonly used types
pub use crate::core::{Block, Chain, DEFAULT_DIFFICULTY, GENESIS_PAYLOAD};
pub use crate::mining::{mine, mine_payload, MinerError, MiningStats};
pub use crate::network::{Message, Node, NodeConfig, NodeError, NodeStatus, PeerRegistry};
