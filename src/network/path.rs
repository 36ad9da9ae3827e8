//! Shortest-path discovery over the social graph
//!
//! Breadth-first search with FIFO expansion and visit-once marking, so the
//! first time the destination is reached the path has the minimum number of
//! edges. Neighbours are expanded in edge insertion order, which makes the
//! chosen path deterministic for a given sequence of insertions.

use super::node::NodeId;
use super::Network;
use crate::error::RoutingError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Which edges path discovery may follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathPolicy {
    /// Follow outgoing edges only (default)
    #[default]
    Directed,

    /// Follow edges in either direction
    ///
    /// Models mutual social reachability: an edge `D -> C` also lets a
    /// message reach `D` from `C`. Outgoing edges are expanded before
    /// incoming ones.
    Symmetric,
}

/// An ordered route from a source to a destination node
///
/// Never empty. A path parsed from JSON is only checked for that; whether it
/// follows real edges or matches a message's endpoints is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<NodeId>", into = "Vec<NodeId>")]
pub struct Path(Vec<NodeId>);

impl Path {
    /// Ids along the route, source first
    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    /// Number of edges traversed
    pub fn hops(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// First node on the route
    pub fn source(&self) -> &NodeId {
        &self.0[0]
    }

    /// Last node on the route
    pub fn destination(&self) -> &NodeId {
        &self.0[self.0.len() - 1]
    }

    /// Whether the route passes through `id`
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|n| n == id)
    }

    /// Whether the route starts at `from` and ends at `to`
    pub fn connects(&self, from: &str, to: &str) -> bool {
        self.source() == from && self.destination() == to
    }
}

impl TryFrom<Vec<NodeId>> for Path {
    type Error = RoutingError;

    fn try_from(nodes: Vec<NodeId>) -> Result<Self, Self::Error> {
        if nodes.is_empty() {
            return Err(RoutingError::EmptyPath);
        }
        Ok(Self(nodes))
    }
}

impl From<Path> for Vec<NodeId> {
    fn from(path: Path) -> Self {
        path.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

fn neighbours<'a>(
    network: &'a Network,
    id: &str,
    policy: PathPolicy,
) -> impl Iterator<Item = &'a NodeId> {
    let outgoing: &[NodeId] = network.node(id).map(|n| n.out_edges()).unwrap_or(&[]);
    let incoming: &[NodeId] = match policy {
        PathPolicy::Directed => &[],
        PathPolicy::Symmetric => network.incoming(id),
    };
    outgoing.iter().chain(incoming.iter())
}

/// Breadth-first search from `from` to `to`
///
/// Returns `None` when either endpoint is unregistered or no path exists.
pub(crate) fn breadth_first(
    network: &Network,
    from: &str,
    to: &str,
    policy: PathPolicy,
) -> Option<Path> {
    let start = network.node(from)?.id();
    let goal = network.node(to)?.id();

    if start == goal {
        return Some(Path(vec![start.clone()]));
    }

    let mut visited: HashSet<&NodeId> = HashSet::from([start]);
    let mut parents: HashMap<&NodeId, &NodeId> = HashMap::new();
    let mut queue: VecDeque<&NodeId> = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for next in neighbours(network, current.as_str(), policy) {
            if !visited.insert(next) {
                continue;
            }
            parents.insert(next, current);

            if next == goal {
                let mut route = vec![next.clone()];
                let mut cursor = next;
                while let Some(&parent) = parents.get(cursor) {
                    route.push(parent.clone());
                    cursor = parent;
                }
                route.reverse();
                return Some(Path(route));
            }

            queue.push_back(next);
        }
    }

    None
}
