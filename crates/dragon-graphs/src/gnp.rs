use crate::{max_edges, pair_from_index, GraphGenerator};
use dragon_core::{Edge, Error, Graph, Result, SimRng};
use rand_distr::{Distribution, Geometric};
use serde::{Deserialize, Serialize};

/// Erdős–Rényi graph: every pair connected independently with probability `p`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gnp {
    pub n: usize,
    pub p: f64,
}

impl Gnp {
    pub fn new(n: usize, p: f64) -> Self {
        Self { n, p }
    }
}

impl GraphGenerator for Gnp {
    fn node_count(&self) -> usize {
        self.n
    }

    fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(Error::GraphConstruction("G(n,p) needs at least one node".to_string()));
        }
        if !(0.0..=1.0).contains(&self.p) {
            return Err(Error::GraphConstruction(format!(
                "edge probability {} outside [0, 1]",
                self.p
            )));
        }
        Ok(())
    }

    fn generate(&self, rng: &mut SimRng) -> Result<Graph> {
        self.validate()?;
        if self.p == 0.0 {
            return Ok(Graph::empty(self.n));
        }
        if self.p == 1.0 {
            return Ok(Graph::complete(self.n));
        }

        // Skip over absent pairs geometrically instead of testing each one
        let skip = Geometric::new(self.p)
            .map_err(|e| Error::GraphConstruction(format!("edge probability {}: {}", self.p, e)))?;
        let total = max_edges(self.n);
        let mut edges = Vec::new();
        let mut k: u64 = 0;

        loop {
            k = k.saturating_add(skip.sample(rng));
            if k >= total {
                break;
            }
            let (u, v) = pair_from_index(k);
            edges.push(Edge::new(u, v));
            k += 1;
        }

        Graph::from_edges(self.n, edges)
    }
}
