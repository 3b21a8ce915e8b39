//! Core ledger components
//!
//! The fundamental building blocks:
//! - Blocks (opaque payload, hash-chain metadata, proof of work)
//! - Chain (append-only sequence with whole-chain validation and
//!   tentative append/rollback)

pub mod block;
pub mod chain;

pub use block::{Block, GENESIS_PAYLOAD};
pub use chain::{Chain, DEFAULT_DIFFICULTY};
