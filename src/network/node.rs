//! Network participants
//!
//! A [`Node`] owns its key material. Only the public key is reachable from
//! outside the crate; operations needing the private key (signing, decrypting)
//! are methods on the node itself.

use crate::codec::MessageCodec;
use crate::crypto::{KeyMaterial, PrivateKey, PublicKey};
use crate::error::Result;
use crate::protocol::SignedMessage;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a node, unique within a [`Network`](super::Network)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a NodeId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A participant in the social graph
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    keys: KeyMaterial,
    /// Outgoing edges, in insertion order, without duplicates
    out_edges: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, keys: KeyMaterial) -> Self {
        Self {
            id,
            keys,
            out_edges: Vec::new(),
        }
    }

    /// This node's id
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// This node's shareable public key
    pub fn public_key(&self) -> &PublicKey {
        self.keys.public_key()
    }

    /// Ids this node has a directed edge to, in insertion order
    pub fn out_edges(&self) -> &[NodeId] {
        &self.out_edges
    }

    /// Whether this node has a directed edge to `id`
    pub fn has_edge_to(&self, id: &str) -> bool {
        self.out_edges.iter().any(|e| e == id)
    }

    /// Record an outgoing edge; returns `false` if it already existed
    pub(crate) fn add_out_edge(&mut self, to: NodeId) -> bool {
        if self.has_edge_to(to.as_str()) {
            return false;
        }
        self.out_edges.push(to);
        true
    }

    pub(crate) fn private_key(&self) -> &PrivateKey {
        self.keys.private_key()
    }

    /// Hash and sign `body` for `receiver`
    ///
    /// # Example
    ///
    /// ```
    /// use socialmesh::{MessageCodec, MockProvider, Network};
    /// use std::sync::Arc;
    ///
    /// let provider = Arc::new(MockProvider::new());
    /// let codec = MessageCodec::new(provider.clone());
    /// let mut network = Network::new(provider);
    /// network.add_node("alice").unwrap();
    /// network.add_node("bob").unwrap();
    ///
    /// let alice = network.node("alice").unwrap();
    /// let signed = alice.sign_message(&codec, "bob", "ping").unwrap();
    /// assert_eq!(signed.hash, codec.digest("ping"));
    /// ```
    pub fn sign_message(
        &self,
        codec: &MessageCodec,
        receiver: impl Into<NodeId>,
        body: impl Into<String>,
    ) -> Result<SignedMessage> {
        let body = body.into();
        let hash = codec.digest(&body);
        let signature = codec.sign(&hash, self.private_key())?;

        Ok(SignedMessage {
            sender: self.id.clone(),
            receiver: receiver.into(),
            body,
            hash,
            signature,
        })
    }

    /// Decrypt a ciphertext addressed to this node
    pub fn open(&self, codec: &MessageCodec, ciphertext: &[u8]) -> Result<String> {
        codec.decrypt(ciphertext, self.private_key())
    }

    pub(crate) fn decrypt_bytes(&self, codec: &MessageCodec, ciphertext: &[u8]) -> Result<Vec<u8>> {
        codec.decrypt_bytes(ciphertext, self.private_key())
    }
}
