//! Social graph: node registry, directed edges and path discovery
//!
//! A [`Network`] is an explicit value owned by the caller; there is no
//! process-wide registry. Nodes and edges can only be added, never removed.
//!
//! # Example
//!
//! ```
//! use socialmesh::{DalekProvider, Network};
//! use std::sync::Arc;
//!
//! let mut network = Network::new(Arc::new(DalekProvider::new()));
//! for id in ["alice", "bob", "carol"] {
//!     network.add_node(id).unwrap();
//! }
//! network.connect("alice", "bob").unwrap();
//! network.add_edge("bob", "carol").unwrap();
//!
//! let path = network.find_path("alice", "carol").unwrap();
//! assert_eq!(path.to_string(), "alice -> bob -> carol");
//! assert!(network.find_path("carol", "alice").is_none());
//! ```

pub mod node;
pub mod path;
pub mod shared;

pub use node::{Node, NodeId};
pub use path::{Path, PathPolicy};
pub use shared::SharedNetwork;

use crate::crypto::{CryptoProvider, KeyMaterial, PublicKey};
use crate::error::{GraphError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Registry of nodes and the directed adjacency between them
pub struct Network {
    /// Source of key pairs for new nodes
    provider: Arc<dyn CryptoProvider>,

    /// Registered nodes (id -> node)
    nodes: HashMap<NodeId, Node>,

    /// Reverse adjacency (id -> ids with an edge into it), in insertion order
    incoming: HashMap<NodeId, Vec<NodeId>>,

    /// Number of distinct directed edges
    edge_count: usize,
}

impl Network {
    /// Create an empty network whose nodes get keys from `provider`
    pub fn new(provider: Arc<dyn CryptoProvider>) -> Self {
        Self {
            provider,
            nodes: HashMap::new(),
            incoming: HashMap::new(),
            edge_count: 0,
        }
    }

    /// The provider used for key generation
    pub fn provider(&self) -> &Arc<dyn CryptoProvider> {
        &self.provider
    }

    /// Register a node with a freshly generated key pair
    ///
    /// # Errors
    ///
    /// `GraphError::DuplicateId` if the id is already registered.
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> Result<&Node> {
        let id = id.into();
        self.ensure_vacant(&id)?;
        let keys = self.provider.generate_key_pair();
        Ok(self.insert(id, keys))
    }

    /// Register a node whose key pair is derived from `seed`
    ///
    /// Useful for reproducible tests and demos.
    pub fn add_node_with_seed(&mut self, id: impl Into<NodeId>, seed: &[u8; 32]) -> Result<&Node> {
        let id = id.into();
        self.ensure_vacant(&id)?;
        let keys = self.provider.key_pair_from_seed(seed);
        Ok(self.insert(id, keys))
    }

    fn ensure_vacant(&self, id: &NodeId) -> Result<()> {
        if self.nodes.contains_key(id) {
            return Err(GraphError::DuplicateId { id: id.clone() }.into());
        }
        Ok(())
    }

    fn insert(&mut self, id: NodeId, keys: KeyMaterial) -> &Node {
        debug!(node = %id, fingerprint = %keys.public_key().fingerprint(), "Registered node");
        self.nodes
            .entry(id.clone())
            .or_insert_with(|| Node::new(id, keys))
    }

    /// Add a directed edge `from -> to`
    ///
    /// The reverse edge is not added. Adding an existing edge is a no-op.
    ///
    /// # Errors
    ///
    /// `GraphError::UnknownNode` if either endpoint is unregistered.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<()> {
        let from_id = self.resolve(from)?.id().clone();
        let to_id = self.resolve(to)?.id().clone();

        let node = self
            .nodes
            .get_mut(from)
            .ok_or_else(|| GraphError::UnknownNode { id: from_id.clone() })?;

        if node.add_out_edge(to_id.clone()) {
            debug!(from = %from_id, to = %to_id, "Added edge");
            self.incoming.entry(to_id).or_default().push(from_id);
            self.edge_count += 1;
        }
        Ok(())
    }

    /// Add edges in both directions, as for a mutual friendship
    pub fn connect(&mut self, a: &str, b: &str) -> Result<()> {
        self.add_edge(a, b)?;
        self.add_edge(b, a)
    }

    /// Look up a node
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up a node, failing if it is not registered
    pub fn resolve(&self, id: &str) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::UnknownNode { id: id.into() }.into())
    }

    /// The registered public key of a node
    ///
    /// This is the only source of keys used for signature verification.
    pub fn public_key_of(&self, id: &str) -> Result<&PublicKey> {
        self.resolve(id).map(Node::public_key)
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of registered nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no nodes are registered
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct directed edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Iterate over registered ids (unordered)
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub(crate) fn incoming(&self, id: &str) -> &[NodeId] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Shortest path following outgoing edges only
    ///
    /// Returns `[from]` when `from == to`, and `None` when no path exists or
    /// either endpoint is unregistered.
    pub fn find_path(&self, from: &str, to: &str) -> Option<Path> {
        self.find_path_with(from, to, PathPolicy::Directed)
    }

    /// Shortest path under the given policy
    pub fn find_path_with(&self, from: &str, to: &str, policy: PathPolicy) -> Option<Path> {
        let path = path::breadth_first(self, from, to, policy);
        match &path {
            Some(p) => trace!(%from, %to, ?policy, hops = p.hops(), "Path found"),
            None => trace!(%from, %to, ?policy, "No path"),
        }
        path
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("provider", &self.provider.name())
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edge_count)
            .finish()
    }
}
