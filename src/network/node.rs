//! P2P node implementation
//!
//! The node owns the authoritative chain and the peer registry, runs
//! the accept loop, and is the single gate through which every block —
//! locally mined or received from a peer — enters the chain.

use crate::core::{Block, Chain, DEFAULT_DIFFICULTY};
use crate::mining;
use crate::network::message::Message;
use crate::network::peer::{PeerError, PeerHandle, PeerRegistry};
use crate::network::server::{connect_to_peer, MessageCodec, Server};
use futures::sink::SinkExt;
use futures::stream::{SplitSink, SplitStream, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;

type Writer = SplitSink<Framed<TcpStream, MessageCodec>, Message>;
type Reader = SplitStream<Framed<TcpStream, MessageCodec>>;

/// Node startup errors
#[derive(Error, Debug)]
pub enum NodeError {
    /// The listen port could not be bound; the node refuses to run
    /// with networking disabled
    #[error("failed to bind listen port: {0}")]
    Bind(#[from] std::io::Error),

    /// Every bootstrap peer was unreachable, leaving the node with no
    /// chain at all
    #[error("no chain adopted: all bootstrap peers unreachable")]
    NoChainAdopted,
}

/// Node configuration
#[derive(Clone)]
pub struct NodeConfig {
    /// Port to listen on (0 binds an ephemeral port)
    pub port: u16,
    /// Bootstrap peers to connect to, in order
    pub bootstrap_peers: Vec<String>,
    /// Proof-of-work difficulty; must match the rest of the network
    pub difficulty: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            port: 8333,
            bootstrap_peers: Vec::new(),
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

/// The main P2P node
pub struct Node {
    pub config: NodeConfig,
    port: u16,
    chain: RwLock<Chain>,
    peers: PeerRegistry,
}

impl Node {
    /// Bind, bootstrap and start accepting peers.
    ///
    /// With an empty bootstrap list the chain starts as a lone genesis
    /// block. Otherwise each address is contacted in order and the
    /// chain is replaced wholesale by every snapshot read — the last
    /// successfully contacted peer wins. Individual connect failures
    /// are logged and skipped, but if every peer was unreachable the
    /// node has no chain and startup fails.
    pub async fn start(config: NodeConfig) -> Result<Arc<Self>, NodeError> {
        let server = Server::bind(config.port).await?;
        let port = server.port();

        let node = Arc::new(Self {
            chain: RwLock::new(Chain {
                blocks: Vec::new(),
                difficulty: config.difficulty,
            }),
            peers: PeerRegistry::new(),
            port,
            config,
        });

        if node.config.bootstrap_peers.is_empty() {
            let mut chain = node.chain.write().await;
            chain.blocks.push(Block::genesis());
            log::info!("created new chain with genesis block");
        } else {
            for addr in &node.config.bootstrap_peers {
                if let Err(e) = node.clone().connect_to(addr).await {
                    log::warn!("could not connect to bootstrap peer {}: {}", addr, e);
                }
            }
            if node.chain.read().await.blocks.is_empty() {
                return Err(NodeError::NoChainAdopted);
            }
        }

        let accept_node = node.clone();
        tokio::spawn(async move {
            loop {
                match server.accept().await {
                    Ok((stream, addr)) => {
                        log::info!("incoming connection from {}", addr);
                        let node = accept_node.clone();
                        tokio::spawn(async move {
                            node.handle_inbound(stream, addr).await;
                        });
                    }
                    Err(e) => {
                        log::error!("accept error: {}", e);
                    }
                }
            }
        });

        Ok(node)
    }

    /// Get the port actually bound
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Connect out to a peer.
    ///
    /// The accepting side speaks first: this side performs exactly one
    /// blocking read, interprets it as a chain snapshot and adopts it,
    /// then joins the gossip loop on the same channel.
    pub async fn connect_to(self: Arc<Self>, addr: &str) -> Result<(), PeerError> {
        log::info!("connecting to peer: {}", addr);

        let (stream, peer_addr) = connect_to_peer(addr).await?;
        let framed = Framed::new(stream, MessageCodec);
        let (writer, mut reader) = framed.split();

        let snapshot = match reader.next().await {
            Some(Ok(Message::Snapshot(blocks))) => blocks,
            Some(Ok(other)) => return Err(PeerError::MissingSnapshot(other.type_name())),
            Some(Err(e)) => return Err(PeerError::Io(e)),
            None => return Err(PeerError::Disconnected),
        };
        self.adopt_snapshot(snapshot, peer_addr).await;

        self.attach_channel(writer, reader, peer_addr).await;
        Ok(())
    }

    /// Handle one accepted connection: send the full chain snapshot
    /// exactly once, then join the gossip loop.
    async fn handle_inbound(self: Arc<Self>, stream: TcpStream, addr: SocketAddr) {
        let framed = Framed::new(stream, MessageCodec);
        let (mut writer, reader) = framed.split();

        let snapshot = {
            let chain = self.chain.read().await;
            Message::Snapshot(chain.blocks.clone())
        };
        if let Err(e) = writer.send(snapshot).await {
            log::warn!("failed to send snapshot to {}: {}", addr, e);
            return;
        }
        log::debug!("sent chain snapshot to {}", addr);

        self.attach_channel(writer, reader, addr).await;
    }

    /// Register the channel and spawn its writer task and gossip
    /// receive loop.
    async fn attach_channel(self: Arc<Self>, mut writer: Writer, reader: Reader, addr: SocketAddr) {
        let (tx, mut rx) = mpsc::channel::<Message>(100);
        self.peers.register(PeerHandle { addr, tx }).await;

        let write_handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if writer.send(msg).await.is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            self.gossip_loop(reader, addr, write_handle).await;
        });
    }

    /// One receive loop per live channel: read blocks and feed them
    /// into validate-and-append. The first transport error or protocol
    /// violation kills the channel — no retry, no reconnection.
    async fn gossip_loop(self: Arc<Self>, mut reader: Reader, addr: SocketAddr, write_handle: JoinHandle<()>) {
        loop {
            match reader.next().await {
                Some(Ok(Message::Block(block))) => {
                    self.validate_and_append(block).await;
                }
                Some(Ok(Message::Snapshot(_))) => {
                    log::warn!("unexpected snapshot from {} after setup, closing channel", addr);
                    break;
                }
                Some(Err(e)) => {
                    log::warn!("error reading from {}: {}", addr, e);
                    break;
                }
                None => {
                    log::info!("peer {} disconnected", addr);
                    break;
                }
            }
        }

        write_handle.abort();
        self.peers.deregister(&addr).await;
    }

    /// Replace the local chain with a received snapshot. No merge, no
    /// comparison with prior state — the last snapshot read wins.
    async fn adopt_snapshot(&self, blocks: Vec<Block>, from: SocketAddr) {
        let mut chain = self.chain.write().await;
        log::info!("adopting chain snapshot of {} blocks from {}", blocks.len(), from);
        chain.blocks = blocks;
    }

    /// The single consistency gate, callable concurrently from the
    /// local mining path and from every gossip receive loop.
    ///
    /// Under the chain write lock: append, validate the whole chain,
    /// keep or roll back — one atomic step, so two concurrent callers
    /// can never both extend the same tail. On success the block is
    /// broadcast to every registered channel, the sender included; an
    /// invalid block is discarded silently.
    pub async fn validate_and_append(&self, block: Block) -> bool {
        let accepted = {
            let mut chain = self.chain.write().await;
            chain.try_append(block.clone())
        };

        if accepted {
            log::info!("chain valid after appending block {}, propagating", block.hash);
            self.peers.broadcast(Message::Block(block)).await;
        } else {
            log::debug!("chain invalid after appending block {}, discarding", block.hash);
        }
        accepted
    }

    /// Mine a payload on top of the current chain tail and submit it.
    ///
    /// The tail hash is captured at call time; the proof-of-work search
    /// runs on a blocking thread and the caller waits for its entire
    /// duration. If a competing block lands first, the mined block
    /// fails validate-and-append and is discarded.
    pub async fn submit_payload(&self, payload: &str) -> bool {
        let (previous_hash, difficulty) = {
            let chain = self.chain.read().await;
            (chain.latest_block().hash.clone(), chain.difficulty)
        };

        let payload = payload.to_string();
        let mined =
            tokio::task::spawn_blocking(move || mining::mine_payload(&payload, previous_hash, difficulty))
                .await;

        match mined {
            Ok(Ok((block, _stats))) => self.validate_and_append(block).await,
            Ok(Err(e)) => {
                log::error!("mining failed: {}", e);
                false
            }
            Err(e) => {
                log::error!("mining task failed: {}", e);
                false
            }
        }
    }

    /// Human-readable dump of the chain's payloads
    pub async fn render_chain(&self) -> String {
        let chain = self.chain.read().await;
        chain.to_string()
    }

    /// Get node status
    pub async fn status(&self) -> NodeStatus {
        let height = {
            let chain = self.chain.read().await;
            chain.height()
        };

        NodeStatus {
            port: self.port,
            height,
            peers: self.peers.peer_count().await,
        }
    }

    /// Terminate the process, taking the accept loop and every peer
    /// channel with it.
    pub fn shutdown(&self) -> ! {
        log::info!("node on port {} shutting down", self.port);
        std::process::exit(0);
    }
}

/// Node status information
#[derive(Debug, Clone)]
pub struct NodeStatus {
    pub port: u16,
    pub height: u64,
    pub peers: usize,
}
