pub mod gnm;
pub mod gnp;
pub mod barabasi_albert;
pub mod topology;

use dragon_core::{Graph, Result, SimRng};

pub use gnm::Gnm;
pub use gnp::Gnp;
pub use barabasi_albert::BarabasiAlbert;
pub use topology::GraphSpec;

/// Builds one fresh topology per trial from the trial's own rng.
pub trait GraphGenerator: Send + Sync {
    fn node_count(&self) -> usize;

    /// Reject parameter combinations that cannot yield a simple graph
    fn validate(&self) -> Result<()>;

    fn generate(&self, rng: &mut SimRng) -> Result<Graph>;
}

/// Index of unordered pair `(u, v)`, `v < u`, in the lower triangle:
/// `k = u(u-1)/2 + v`.
pub(crate) fn pair_from_index(k: u64) -> (usize, usize) {
    let mut u = ((1.0 + (1.0 + 8.0 * k as f64).sqrt()) / 2.0).floor() as u64;
    // float rounding can land one row off in either direction
    while u * (u - 1) / 2 > k {
        u -= 1;
    }
    while (u + 1) * u / 2 <= k {
        u += 1;
    }
    let v = k - u * (u - 1) / 2;
    (u as usize, v as usize)
}

pub(crate) fn max_edges(n: usize) -> u64 {
    let n = n as u64;
    n * n.saturating_sub(1) / 2
}
