//! Social graph messaging example
//!
//! Builds a small friendship graph, sends an encrypted message along the
//! shortest path, then runs a signed request/response exchange.
//!
//! ```text
//! cargo run --example social_graph -- --symmetric --to dave
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use socialmesh::{
    CryptoProvider, DalekProvider, MeshConfig, MockProvider, Network, PathPolicy,
    ResponseProtocol, Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "socialmesh - social graph messaging example", long_about = None)]
struct Args {
    /// Sender id
    #[arg(short, long, default_value = "alice")]
    from: String,

    /// Receiver id
    #[arg(short, long, default_value = "charlie")]
    to: String,

    /// Message body
    #[arg(short, long, default_value = "Hello from across the graph!")]
    message: String,

    /// Follow edges in both directions when searching for a path
    #[arg(long)]
    symmetric: bool,

    /// JSON configuration file (overrides --symmetric)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the insecure deterministic provider
    #[arg(long)]
    mock: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn load_config(args: &Args) -> Result<MeshConfig> {
    match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok(MeshConfig::from_json(&json)?)
        },
        None => {
            let policy = if args.symmetric {
                PathPolicy::Symmetric
            } else {
                PathPolicy::Directed
            };
            Ok(MeshConfig::default().with_path_policy(policy))
        },
    }
}

fn build_network(provider: Arc<dyn CryptoProvider>) -> Result<Network> {
    let mut network = Network::new(provider);
    for (i, id) in ["alice", "bob", "charlie", "dave"].iter().enumerate() {
        network.add_node_with_seed(*id, &[i as u8 + 1; 32])?;
    }

    network.connect("alice", "bob")?;
    network.connect("bob", "charlie")?;
    network.add_edge("dave", "charlie")?;
    Ok(network)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("social_graph={},socialmesh={}", log_level, log_level))
        .init();

    let config = load_config(&args)?;
    let provider: Arc<dyn CryptoProvider> = if args.mock {
        Arc::new(MockProvider::new())
    } else {
        Arc::new(DalekProvider::new())
    };
    info!(provider = provider.name(), policy = ?config.path_policy, "Starting");

    let network = build_network(provider.clone())?;

    println!("════════════════════════════════════════════════════════════");
    println!("Nodes");
    println!("════════════════════════════════════════════════════════════");
    let mut ids: Vec<_> = network.node_ids().collect();
    ids.sort();
    for id in ids {
        let node = network.resolve(id.as_str())?;
        let edges: Vec<_> = node.out_edges().iter().map(|e| e.as_str()).collect();
        println!(
            "{:<10} {}  knows [{}]",
            id.as_str(),
            node.public_key().fingerprint(),
            edges.join(", ")
        );
    }
    println!();

    // Encrypted delivery along the shortest path
    let router = Router::from_config(provider.clone(), &config)?;
    match router.send(&network, &args.from, &args.to, &args.message) {
        Ok(encrypted) => {
            println!("Path:          {}", encrypted.path);
            println!("Ciphertext:    {} bytes", encrypted.ciphertext.len());
            println!("Decrypted:     {}", router.open(&network, &encrypted)?);
        },
        Err(e) if e.is_recoverable() => {
            println!("No route from {} to {}: {}", args.from, args.to, e);
            println!("Hint: try --symmetric");
        },
        Err(e) => return Err(e.into()),
    }
    println!();

    // Signed request and acknowledgment
    let protocol = ResponseProtocol::from_config(provider, &config)?;
    let sender = network.resolve(&args.from)?;
    let responder = network.resolve(&args.to)?;

    let signed = sender.sign_message(protocol.codec(), responder.id(), "ping")?;
    let response = protocol.respond(&network, &signed, responder)?;
    protocol.confirm(&network, &response, &signed)?;

    println!("Request hash:  {}", signed.hash);
    println!("Signature:     {}", hex::encode(signed.signature.as_bytes()));
    println!("Response:      {}", response.body);
    println!("Response hash: {}", response.response_hash);
    println!("Chained to:    {}", response.original_hash);

    info!("Done");
    Ok(())
}
