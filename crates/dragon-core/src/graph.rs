use crate::error::{Error, Result};
use crate::NodeId;
use serde::{Deserialize, Serialize};

/// Read-only neighbor lookup over a fixed node set `0..node_count()`.
pub trait Topology: Send + Sync {
    fn node_count(&self) -> usize;

    fn neighbors(&self, node: NodeId) -> &[NodeId];

    fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }
}

/// Undirected edge between two nodes
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId,
}

impl Edge {
    pub fn new(u: NodeId, v: NodeId) -> Self {
        Self { u, v }
    }
}

/// Simple undirected graph stored as sorted adjacency lists
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    adjacency: Vec<Vec<NodeId>>,
    num_edges: usize,
}

impl Graph {
    /// Graph with `n` nodes and no edges
    pub fn empty(n: usize) -> Self {
        Self { adjacency: vec![Vec::new(); n], num_edges: 0 }
    }

    /// Build from an edge list. Duplicate edges collapse; self-loops and
    /// endpoints outside `0..n` are rejected.
    pub fn from_edges(n: usize, edges: impl IntoIterator<Item = Edge>) -> Result<Self> {
        let mut adjacency = vec![Vec::new(); n];

        for edge in edges {
            if edge.u >= n || edge.v >= n {
                return Err(Error::GraphConstruction(format!(
                    "edge ({}, {}) references a node outside 0..{}",
                    edge.u, edge.v, n
                )));
            }
            if edge.u == edge.v {
                return Err(Error::GraphConstruction(format!("self-loop on node {}", edge.u)));
            }
            adjacency[edge.u].push(edge.v);
            adjacency[edge.v].push(edge.u);
        }

        let mut half_edges = 0;
        for list in &mut adjacency {
            list.sort_unstable();
            list.dedup();
            half_edges += list.len();
        }

        Ok(Self { adjacency, num_edges: half_edges / 2 })
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.adjacency
            .get(u)
            .map(|list| list.binary_search(&v).is_ok())
            .unwrap_or(false)
    }

    /// Edges with `u < v`, in ascending order
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(u, list)| {
            list.iter().filter(move |&&v| u < v).map(move |&v| Edge::new(u, v))
        })
    }

    /// Ring 0-1-...-(n-1)-0
    pub fn cycle(n: usize) -> Self {
        let edges = (0..n).map(|i| Edge::new(i, (i + 1) % n)).filter(|e| e.u != e.v);
        Self::from_edges(n, edges).unwrap_or_else(|_| Self::empty(n))
    }

    /// Every pair of distinct nodes connected
    pub fn complete(n: usize) -> Self {
        let edges = (0..n).flat_map(|u| (u + 1..n).map(move |v| Edge::new(u, v)));
        Self::from_edges(n, edges).unwrap_or_else(|_| Self::empty(n))
    }
}

impl Topology for Graph {
    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.adjacency.get(node).map(|v| v.as_slice()).unwrap_or(&[])
    }
}
