//! Routing subsystem
//!
//! Turns a plaintext body into an [`EncryptedMessage`](crate::protocol::EncryptedMessage)
//! bound to a path through the social graph, and opens it again on the
//! receiver's side.
//!
//! # Example
//!
//! ```
//! use socialmesh::{MessageCodec, MockProvider, Network, Router};
//! use std::sync::Arc;
//!
//! # fn main() -> socialmesh::Result<()> {
//! let provider = Arc::new(MockProvider::new());
//! let mut network = Network::new(provider.clone());
//! network.add_node("alice")?;
//! network.add_node("bob")?;
//! network.connect("alice", "bob")?;
//!
//! let router = Router::new(MessageCodec::new(provider));
//! let message = router.send(&network, "alice", "bob", "hello")?;
//! assert_eq!(message.path.to_string(), "alice -> bob");
//! assert_eq!(router.open(&network, &message)?, "hello");
//! # Ok(())
//! # }
//! ```
//!
//! # Routing Strategies
//!
//! Paths follow outgoing edges by default. With
//! [`PathPolicy::Symmetric`](crate::network::PathPolicy::Symmetric) an edge
//! also counts in the reverse direction. The path is metadata only; the body
//! is encrypted end to end for the receiver and never for intermediaries.

pub mod router;

pub use router::{Router, RouterBuilder};
