//! Peer registry
//!
//! Tracks the send half of every live peer channel and fans newly
//! accepted blocks out to all of them.

use crate::network::message::Message;
use std::collections::HashMap;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};

/// Peer connection errors
#[derive(Error, Debug)]
pub enum PeerError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("peer disconnected")]
    Disconnected,
    #[error("protocol violation: expected chain snapshot, got {0}")]
    MissingSnapshot(&'static str),
}

/// Handle for sending messages to one peer channel
#[derive(Clone)]
pub struct PeerHandle {
    pub addr: SocketAddr,
    pub tx: mpsc::Sender<Message>,
}

impl PeerHandle {
    pub async fn send(&self, msg: Message) -> Result<(), PeerError> {
        self.tx.send(msg).await.map_err(|_| PeerError::Disconnected)
    }
}

/// The set of currently live peer channels.
///
/// Membership changes and broadcast iteration are synchronized against
/// each other, since peers may connect or die while a broadcast runs.
pub struct PeerRegistry {
    handles: RwLock<HashMap<SocketAddr, PeerHandle>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Register a live channel
    pub async fn register(&self, handle: PeerHandle) {
        let mut handles = self.handles.write().await;
        log::info!("registered peer {}", handle.addr);
        handles.insert(handle.addr, handle);
    }

    /// Remove a dead channel
    pub async fn deregister(&self, addr: &SocketAddr) {
        let mut handles = self.handles.write().await;
        if handles.remove(addr).is_some() {
            log::info!("removed peer {}", addr);
        }
    }

    /// Get peer count
    pub async fn peer_count(&self) -> usize {
        let handles = self.handles.read().await;
        handles.len()
    }

    /// Get all registered peer addresses
    pub async fn peers(&self) -> Vec<SocketAddr> {
        let handles = self.handles.read().await;
        handles.keys().cloned().collect()
    }

    /// Send `msg` to every live channel, the block's origin included.
    /// Re-delivered blocks are rejected by validate-and-append on the
    /// receiving side, at the cost of redundant traffic.
    pub async fn broadcast(&self, msg: Message) {
        let handles = self.handles.read().await;
        for (addr, handle) in handles.iter() {
            if let Err(e) = handle.send(msg.clone()).await {
                log::warn!("failed to send to {}: {}", addr, e);
            }
        }
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Block;

    fn test_handle(port: u16) -> (PeerHandle, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(8);
        let addr: SocketAddr = format!("127.0.0.1:{}", port).parse().unwrap();
        (PeerHandle { addr, tx }, rx)
    }

    #[tokio::test]
    async fn test_register_and_deregister() {
        let registry = PeerRegistry::new();
        let (handle, _rx) = test_handle(9001);
        let addr = handle.addr;

        registry.register(handle).await;
        assert_eq!(registry.peer_count().await, 1);

        registry.deregister(&addr).await;
        assert_eq!(registry.peer_count().await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_peer() {
        let registry = PeerRegistry::new();
        let (first, mut first_rx) = test_handle(9002);
        let (second, mut second_rx) = test_handle(9003);
        registry.register(first).await;
        registry.register(second).await;

        registry.broadcast(Message::Block(Block::new("fanout"))).await;

        assert!(matches!(first_rx.recv().await, Some(Message::Block(_))));
        assert!(matches!(second_rx.recv().await, Some(Message::Block(_))));
    }
}
