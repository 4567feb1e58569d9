use crate::{BarabasiAlbert, GraphGenerator, Gnm, Gnp};
use dragon_core::{Error, Graph, Result, SimRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Topology choice for a run, carried into manifests
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum GraphSpec {
    BarabasiAlbert(BarabasiAlbert),
    Gnm(Gnm),
    Gnp(Gnp),
}

impl GraphSpec {
    /// Edge count selects preferential attachment, probability selects G(n,p).
    /// The edge count wins when both are given.
    pub fn from_params(n: usize, n_edges: Option<usize>, edge_probability: Option<f64>) -> Result<Self> {
        let spec = match (n_edges, edge_probability) {
            (Some(m), _) => GraphSpec::BarabasiAlbert(BarabasiAlbert::new(n, m)),
            (None, Some(p)) => GraphSpec::Gnp(Gnp::new(n, p)),
            (None, None) => {
                return Err(Error::GraphConstruction(
                    "either an edge count or an edge probability must be provided".to_string(),
                ))
            }
        };
        spec.validate()?;
        Ok(spec)
    }

    fn inner(&self) -> &dyn GraphGenerator {
        match self {
            GraphSpec::BarabasiAlbert(g) => g,
            GraphSpec::Gnm(g) => g,
            GraphSpec::Gnp(g) => g,
        }
    }
}

impl GraphGenerator for GraphSpec {
    fn node_count(&self) -> usize {
        self.inner().node_count()
    }

    fn validate(&self) -> Result<()> {
        self.inner().validate()
    }

    fn generate(&self, rng: &mut SimRng) -> Result<Graph> {
        let graph = self.inner().generate(rng)?;
        trace!(topology = %self, edges = graph.num_edges(), "Generated graph");
        Ok(graph)
    }
}

impl fmt::Display for GraphSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphSpec::BarabasiAlbert(g) => write!(f, "BA(n={}, m={})", g.n, g.m),
            GraphSpec::Gnm(g) => write!(f, "G(n={}, m={})", g.n, g.m),
            GraphSpec::Gnp(g) => write!(f, "G(n={}, p={})", g.n, g.p),
        }
    }
}
