use crate::GraphGenerator;
use dragon_core::{Edge, Error, Graph, NodeId, Result, SimRng};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Preferential attachment: each new node links to `m` existing nodes chosen
/// proportionally to degree.
///
/// Growth starts from a star on `m + 1` nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarabasiAlbert {
    pub n: usize,
    pub m: usize,
}

impl BarabasiAlbert {
    pub fn new(n: usize, m: usize) -> Self {
        Self { n, m }
    }

    /// Edges a valid graph ends up with
    pub fn expected_edges(&self) -> usize {
        self.m + self.n.saturating_sub(self.m + 1) * self.m
    }
}

impl GraphGenerator for BarabasiAlbert {
    fn node_count(&self) -> usize {
        self.n
    }

    fn validate(&self) -> Result<()> {
        if self.m == 0 {
            return Err(Error::GraphConstruction(
                "preferential attachment needs at least one edge per node".to_string(),
            ));
        }
        if self.m >= self.n {
            return Err(Error::GraphConstruction(format!(
                "edges per node m={} must be smaller than node count n={}",
                self.m, self.n
            )));
        }
        Ok(())
    }

    fn generate(&self, rng: &mut SimRng) -> Result<Graph> {
        self.validate()?;
        let m = self.m;
        let mut edges = Vec::with_capacity(self.expected_edges());

        // every endpoint appears once per incident edge, so a uniform pick is
        // a degree-proportional pick
        let mut endpoints: Vec<NodeId> = Vec::with_capacity(2 * self.expected_edges());
        for leaf in 1..=m {
            edges.push(Edge::new(0, leaf));
            endpoints.push(0);
            endpoints.push(leaf);
        }

        let mut targets = BTreeSet::new();
        for source in (m + 1)..self.n {
            targets.clear();
            while targets.len() < m {
                let pick = endpoints[rng.gen_range(0..endpoints.len())];
                targets.insert(pick);
            }
            for &target in &targets {
                edges.push(Edge::new(source, target));
                endpoints.push(target);
                endpoints.push(source);
            }
        }

        Graph::from_edges(self.n, edges)
    }
}
