//! Gossipchain CLI application
//!
//! Thin interactive shell around a running node: display the chain,
//! submit payloads for mining, shut the node down.

use clap::Parser;
use gossipchain::network::{Node, NodeConfig};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "gossipchain")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A minimal peer-to-peer proof-of-work ledger", long_about = None)]
struct Cli {
    /// Port to listen on for peer connections
    #[arg(short, long, default_value = "8333")]
    port: u16,

    /// Bootstrap peers to connect to (comma-separated host:port)
    #[arg(long)]
    peers: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let bootstrap_peers: Vec<String> = cli
        .peers
        .map(|p| p.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    let config = NodeConfig {
        port: cli.port,
        bootstrap_peers,
        ..Default::default()
    };

    println!("🌐 Starting node on port {}...", cli.port);
    let node = Node::start(config).await?;

    // Handle Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        println!("\n📴 Shutting down node...");
        std::process::exit(0);
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let status = node.status().await;
        println!();
        println!(
            "NODE on port {} (height {}, {} peers)",
            status.port, status.height, status.peers
        );
        println!("1. Display chain");
        println!("2. Create/mine new block");
        println!("3. Kill node");
        prompt("Enter option: ")?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "1" => {
                print!("{}", node.render_chain().await);
            }
            "2" => {
                prompt("Enter payload for new block: ")?;
                let Some(payload) = lines.next_line().await? else {
                    break;
                };
                let payload = payload.trim();
                if payload.is_empty() {
                    println!("Payload must not be empty.");
                    continue;
                }

                println!("⛏️  Mining...");
                if node.submit_payload(payload).await {
                    println!("✅ Block accepted and propagated to peers");
                } else {
                    println!("❌ Block discarded: the chain moved on while mining");
                }
            }
            "3" => {
                node.shutdown();
            }
            other => {
                println!("Unknown option: {}", other);
            }
        }
    }

    Ok(())
}

fn prompt(text: &str) -> std::io::Result<()> {
    print!("{}", text);
    std::io::stdout().flush()
}
