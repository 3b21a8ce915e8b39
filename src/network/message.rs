//! Wire messages for the gossip protocol
//!
//! Two message kinds travel over a connection: the full chain snapshot,
//! sent exactly once by the accepting side immediately after the
//! transport is established, and individual gossip blocks thereafter.

use crate::core::Block;
use serde::{Deserialize, Serialize};

/// Magic bytes for message framing
pub const MAGIC: [u8; 4] = [0x47, 0x4F, 0x53, 0x50]; // "GOSP"

/// Upper bound on a single framed message
pub const MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Network message types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    /// Full ordered chain, sent once at connection establishment and
    /// never again on the same channel
    Snapshot(Vec<Block>),

    /// A single newly accepted block
    Block(Block),
}

impl Message {
    /// Serialize message to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize message from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// Get message type name for logging
    pub fn type_name(&self) -> &'static str {
        match self {
            Message::Snapshot(_) => "Snapshot",
            Message::Block(_) => "Block",
        }
    }
}
