//! P2P networking module
//!
//! Direct TCP gossip between nodes:
//! - Snapshot-on-connect bootstrap (the accepting side sends its full
//!   chain exactly once, immediately)
//! - Block gossip over length-prefixed frames
//! - One receive loop per live peer channel
//! - Broadcast fan-out through the peer registry

pub mod message;
pub mod node;
pub mod peer;
pub mod server;

pub use message::{Message, MAGIC, MAX_MESSAGE_SIZE};
pub use node::{Node, NodeConfig, NodeError, NodeStatus};
pub use peer::{PeerError, PeerHandle, PeerRegistry};
pub use server::{connect_to_peer, MessageCodec, Server};
