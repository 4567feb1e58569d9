use crate::{max_edges, pair_from_index, GraphGenerator};
use dragon_core::{Edge, Error, Graph, Result, SimRng};
use rand::seq::index;
use serde::{Deserialize, Serialize};

/// Uniform random graph with exactly `m` edges: G(n, m)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gnm {
    pub n: usize,
    pub m: usize,
}

impl Gnm {
    pub fn new(n: usize, m: usize) -> Self {
        Self { n, m }
    }
}

impl GraphGenerator for Gnm {
    fn node_count(&self) -> usize {
        self.n
    }

    fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(Error::GraphConstruction("G(n,m) needs at least one node".to_string()));
        }
        if self.m as u64 > max_edges(self.n) {
            return Err(Error::GraphConstruction(format!(
                "G(n,m) with n={} admits at most {} edges, got m={}",
                self.n,
                max_edges(self.n),
                self.m
            )));
        }
        Ok(())
    }

    fn generate(&self, rng: &mut SimRng) -> Result<Graph> {
        self.validate()?;
        let total = max_edges(self.n);
        let edges = sample_pairs(rng, total, self.m).into_iter().map(|k| {
            let (u, v) = pair_from_index(k);
            Edge::new(u, v)
        });
        Graph::from_edges(self.n, edges)
    }
}

/// `amount` distinct pair indices from `0..total`
fn sample_pairs(rng: &mut SimRng, total: u64, amount: usize) -> Vec<u64> {
    index::sample(rng, total as usize, amount)
        .into_iter()
        .map(|k| k as u64)
        .collect()
}
