//! # socialmesh
//!
//! Secure messaging over a social graph: nodes with their own key pairs,
//! directed "knows" edges, shortest-path discovery, end-to-end encryption for
//! the receiver, and a signed request/response protocol that checks integrity
//! and authenticity before acknowledging.
//!
//! ## Quick Start
//!
//! ```
//! use socialmesh::{DalekProvider, MessageCodec, Network, ResponseProtocol, Router};
//! use std::sync::Arc;
//!
//! # fn main() -> socialmesh::Result<()> {
//! let provider = Arc::new(DalekProvider::new());
//! let mut network = Network::new(provider.clone());
//! for id in ["alice", "bob", "charlie"] {
//!     network.add_node(id)?;
//! }
//! network.connect("alice", "bob")?;
//! network.connect("bob", "charlie")?;
//!
//! // Encrypted for charlie, routed alice -> bob -> charlie
//! let router = Router::new(MessageCodec::new(provider.clone()));
//! let message = router.send(&network, "alice", "charlie", "hi charlie")?;
//! assert_eq!(message.path.hops(), 2);
//! assert_eq!(router.open(&network, &message)?, "hi charlie");
//!
//! // Signed request, validated and acknowledged
//! let protocol = ResponseProtocol::new(MessageCodec::new(provider));
//! let alice = network.resolve("alice")?;
//! let signed = alice.sign_message(protocol.codec(), "bob", "ping")?;
//! let response = protocol.respond(&network, &signed, network.resolve("bob")?)?;
//! protocol.confirm(&network, &response, &signed)?;
//! # Ok(())
//! # }
//! ```
//!
//! All cryptography goes through an injected [`CryptoProvider`]; tests can
//! use the deterministic [`MockProvider`] instead of [`DalekProvider`].

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
pub mod compression;
pub mod config;
pub mod crypto;
pub mod error;
pub mod network;
pub mod protocol;
pub mod routing;

// Re-export main types
pub use codec::MessageCodec;
pub use compression::{Compressor, RunLengthCompressor};
pub use config::MeshConfig;
pub use crypto::{
    CryptoProvider, DalekProvider, Digest, KeyMaterial, MockProvider, PrivateKey, PublicKey,
    Signature,
};
pub use error::{
    CompressionError, ConfigError, CryptoError, GraphError, MeshError, ProtocolError, Result,
    RoutingError,
};
pub use network::{Network, Node, NodeId, Path, PathPolicy, SharedNetwork};
pub use protocol::{
    EncryptedMessage, Message, PlainMessage, ResponseMessage, ResponseProtocol, SignedMessage,
};
pub use routing::{Router, RouterBuilder};
