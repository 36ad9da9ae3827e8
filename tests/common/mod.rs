//! Common test helpers and utilities
//!
//! This module provides shared fixtures for integration tests.

#![allow(dead_code)]

use socialmesh::{CryptoProvider, DalekProvider, MockProvider, Network};
use std::sync::Arc;

/// Deterministic provider for fast tests
pub fn mock_provider() -> Arc<dyn CryptoProvider> {
    Arc::new(MockProvider::new())
}

/// Production provider
pub fn dalek_provider() -> Arc<dyn CryptoProvider> {
    Arc::new(DalekProvider::new())
}

/// Both providers, for tests that must hold for any implementation
pub fn all_providers() -> Vec<Arc<dyn CryptoProvider>> {
    vec![mock_provider(), dalek_provider()]
}

/// A 32-byte seed from a single repeated byte
pub fn seed(byte: u8) -> [u8; 32] {
    [byte; 32]
}

/// Build a network from node ids and directed edges
///
/// Nodes get seeded keys (seed `i` for the `i`-th id) so runs are
/// reproducible.
pub fn build_network(
    provider: Arc<dyn CryptoProvider>,
    nodes: &[&str],
    edges: &[(&str, &str)],
) -> Network {
    let mut network = Network::new(provider);
    for (i, id) in nodes.iter().enumerate() {
        network.add_node_with_seed(*id, &seed(i as u8)).unwrap();
    }
    for (from, to) in edges {
        network.add_edge(from, to).unwrap();
    }
    network
}

/// The four-person reference graph plus an isolated node
///
/// Alice and Bob are friends, Bob and Charlie are friends, and Dave knows
/// Charlie. Eve knows nobody.
pub fn reference_network(provider: Arc<dyn CryptoProvider>) -> Network {
    build_network(
        provider,
        &["alice", "bob", "charlie", "dave", "eve"],
        &[
            ("alice", "bob"),
            ("bob", "alice"),
            ("bob", "charlie"),
            ("charlie", "bob"),
            ("dave", "charlie"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_network_shape() {
        let network = reference_network(mock_provider());
        assert_eq!(network.len(), 5);
        assert_eq!(network.edge_count(), 5);
        assert!(network.node("eve").unwrap().out_edges().is_empty());
    }

    #[test]
    fn test_seeded_keys_are_reproducible() {
        let first = reference_network(dalek_provider());
        let second = reference_network(dalek_provider());
        assert_eq!(
            first.public_key_of("alice").unwrap(),
            second.public_key_of("alice").unwrap()
        );
        assert_ne!(
            first.public_key_of("alice").unwrap(),
            first.public_key_of("bob").unwrap()
        );
    }
}
