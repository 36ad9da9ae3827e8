//! Thread-safe handle to a [`Network`]
//!
//! Insertions take the write lock; lookups and path queries take the read
//! lock and may run concurrently with one another. A reader never observes a
//! half-inserted edge.

use super::{Network, Path, PathPolicy};
use crate::crypto::PublicKey;
use crate::error::Result;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Cheaply cloneable, shared network
#[derive(Clone, Debug)]
pub struct SharedNetwork {
    inner: Arc<RwLock<Network>>,
}

impl SharedNetwork {
    /// Wrap a network for shared use
    pub fn new(network: Network) -> Self {
        Self {
            inner: Arc::new(RwLock::new(network)),
        }
    }

    /// Acquire read access
    pub fn read(&self) -> RwLockReadGuard<'_, Network> {
        self.inner.read()
    }

    /// Acquire exclusive write access
    pub fn write(&self) -> RwLockWriteGuard<'_, Network> {
        self.inner.write()
    }

    /// Register a node, returning its public key
    pub fn add_node(&self, id: &str) -> Result<PublicKey> {
        let mut network = self.inner.write();
        network.add_node(id).map(|node| node.public_key().clone())
    }

    /// Add a directed edge
    pub fn add_edge(&self, from: &str, to: &str) -> Result<()> {
        self.inner.write().add_edge(from, to)
    }

    /// Shortest path following outgoing edges
    pub fn find_path(&self, from: &str, to: &str) -> Option<Path> {
        self.inner.read().find_path(from, to)
    }

    /// Shortest path under the given policy
    pub fn find_path_with(&self, from: &str, to: &str, policy: PathPolicy) -> Option<Path> {
        self.inner.read().find_path_with(from, to, policy)
    }
}
