use crate::error::{Error, Result};
use crate::graph::Topology;
use crate::mechanism::Mechanism;
use crate::status::NodeStatus;
use crate::store::NodeStateStore;
use crate::trace::CascadeTrace;
use crate::NodeId;
use rayon::prelude::*;
use tracing::trace;

/// Configuration for cascade propagation
#[derive(Clone, Debug)]
pub struct CascadeConfig {
    /// Rounds with at least this many candidates evaluate them on the rayon pool
    pub parallel_threshold: usize,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self { parallel_threshold: 4096 }
    }
}

impl CascadeConfig {
    pub fn sequential() -> Self {
        Self { parallel_threshold: usize::MAX }
    }
}

/// Converged cascade
#[derive(Clone, Debug, PartialEq)]
pub struct CascadeOutcome {
    /// Every node failed by this cascade, seeds included, ascending
    pub failed: Vec<NodeId>,
    pub trace: CascadeTrace,
    /// Rounds that failed at least one node
    pub rounds: usize,
}

impl CascadeOutcome {
    pub fn size(&self) -> usize {
        self.failed.len()
    }
}

/// Propagate failure from `seeds` to a fixed point.
///
/// Rounds are synchronous: each candidate is judged against the failed set
/// and its own status as they stood when the round began, and all nodes that
/// satisfy the mechanism fail together. Trace entry 0 is recorded before the
/// first round and one entry follows every round, including the final round
/// that fails nothing.
pub fn propagate<T: Topology + ?Sized>(
    graph: &T,
    store: &mut NodeStateStore,
    mechanism: Mechanism,
    seeds: &[NodeId],
    config: &CascadeConfig,
) -> Result<CascadeOutcome> {
    let n = graph.node_count();
    if store.len() != n {
        return Err(Error::StateConsistency(format!(
            "store tracks {} nodes but graph declares {}",
            store.len(),
            n
        )));
    }

    let mut in_failed = vec![false; n];
    let mut failed = Vec::with_capacity(seeds.len());
    for &seed in seeds {
        if !store.get(seed)?.is_failed() {
            return Err(Error::StateConsistency(format!("cascade seed {} is not failed", seed)));
        }
        if !in_failed[seed] {
            in_failed[seed] = true;
            failed.push(seed);
        }
    }

    let mut trace = CascadeTrace::new();
    trace.push(store.failure_fraction(n)?);

    let mut frontier = failed.clone();
    let mut candidates = Vec::new();
    let mut rounds = 0;

    while !frontier.is_empty() {
        candidates.clear();
        for &node in &frontier {
            candidates.extend(graph.neighbors(node).iter().copied().filter(|&nb| !in_failed[nb]));
        }
        candidates.sort_unstable();
        candidates.dedup();

        let statuses = store.all();
        let newly_failed: Vec<NodeId> = if candidates.len() >= config.parallel_threshold {
            candidates
                .par_iter()
                .copied()
                .filter(|&c| fails(graph, statuses, &in_failed, mechanism, c))
                .collect()
        } else {
            candidates
                .iter()
                .copied()
                .filter(|&c| fails(graph, statuses, &in_failed, mechanism, c))
                .collect()
        };

        for &node in &newly_failed {
            in_failed[node] = true;
            store.set_status(node, NodeStatus::Failed)?;
        }
        failed.extend_from_slice(&newly_failed);
        trace.push(store.failure_fraction(n)?);

        if !newly_failed.is_empty() {
            rounds += 1;
        }
        frontier = newly_failed;
    }

    failed.sort_unstable();
    trace!(size = failed.len(), rounds, %mechanism, "cascade converged");

    Ok(CascadeOutcome { failed, trace, rounds })
}

fn fails<T: Topology + ?Sized>(
    graph: &T,
    statuses: &[NodeStatus],
    in_failed: &[bool],
    mechanism: Mechanism,
    node: NodeId,
) -> bool {
    let failed_neighbors = graph.neighbors(node).iter().filter(|&&nb| in_failed[nb]).count();
    mechanism.should_fail(statuses[node], failed_neighbors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Graph};
    use approx::assert_abs_diff_eq;

    fn path_graph(n: usize) -> Graph {
        Graph::from_edges(n, (0..n - 1).map(|i| Edge::new(i, i + 1))).unwrap()
    }

    #[test]
    fn test_chain_one_node_per_round() {
        // 0 -- 1 -- 2 -- 3 -- 4, all weak, 0 failed
        let graph = path_graph(5);
        let mut store = NodeStateStore::new(5, NodeStatus::Weak);
        store.set_status(0, NodeStatus::Failed).unwrap();

        let out = propagate(&graph, &mut store, Mechanism::Inoculation, &[0], &CascadeConfig::default()).unwrap();

        assert_eq!(out.failed, vec![0, 1, 2, 3, 4]);
        assert_eq!(out.rounds, 4);
        assert_eq!(out.trace.fractions(), &[0.2, 0.4, 0.6, 0.8, 1.0, 1.0]);
    }

    #[test]
    fn test_strong_wall_stops_inoculation() {
        // 0 -- 1 -- [2 strong] -- 3
        let graph = path_graph(4);
        let mut store = NodeStateStore::from_statuses(vec![
            NodeStatus::Failed,
            NodeStatus::Weak,
            NodeStatus::Strong,
            NodeStatus::Weak,
        ]);

        let out = propagate(&graph, &mut store, Mechanism::Inoculation, &[0], &CascadeConfig::default()).unwrap();
        assert_eq!(out.failed, vec![0, 1]);
        assert_eq!(store.get(2), Ok(NodeStatus::Strong));
        assert_eq!(store.get(3), Ok(NodeStatus::Weak));
        assert_abs_diff_eq!(out.trace.final_fraction().unwrap(), 0.5);
    }

    #[test]
    fn test_cc_needs_threshold_at_round_start() {
        // Star: strong centre 0 with leaves 1, 2 (both weak) and 3 (failed seed).
        // Round 1: centre sees one failed neighbor and holds.
        // Leaves 1 and 2 only touch the centre, so nothing else can fail.
        let graph = Graph::from_edges(4, vec![Edge::new(0, 1), Edge::new(0, 2), Edge::new(0, 3)]).unwrap();
        let mut store = NodeStateStore::from_statuses(vec![
            NodeStatus::Strong,
            NodeStatus::Weak,
            NodeStatus::Weak,
            NodeStatus::Failed,
        ]);

        let out = propagate(&graph, &mut store, Mechanism::complex_contagion(), &[3], &CascadeConfig::default()).unwrap();
        assert_eq!(out.failed, vec![3]);
        assert_eq!(out.rounds, 0);
        assert_eq!(out.trace.len(), 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let graph = Graph::complete(30);
        let statuses: Vec<NodeStatus> = (0..30)
            .map(|i| if i % 3 == 0 { NodeStatus::Strong } else { NodeStatus::Weak })
            .collect();

        let mut seq_store = NodeStateStore::from_statuses(statuses.clone());
        seq_store.set_status(1, NodeStatus::Failed).unwrap();
        let mut par_store = seq_store.clone();

        let seq = propagate(&graph, &mut seq_store, Mechanism::complex_contagion(), &[1], &CascadeConfig::sequential()).unwrap();
        let par = propagate(
            &graph,
            &mut par_store,
            Mechanism::complex_contagion(),
            &[1],
            &CascadeConfig { parallel_threshold: 1 },
        )
        .unwrap();

        assert_eq!(seq, par);
        assert_eq!(seq_store, par_store);
    }

    #[test]
    fn test_seed_must_be_failed() {
        let graph = Graph::cycle(3);
        let mut store = NodeStateStore::new(3, NodeStatus::Weak);
        let err = propagate(&graph, &mut store, Mechanism::Inoculation, &[0], &CascadeConfig::default()).unwrap_err();
        assert!(matches!(err, Error::StateConsistency(_)));
    }

    #[test]
    fn test_store_graph_size_mismatch() {
        let graph = Graph::cycle(3);
        let mut store = NodeStateStore::new(4, NodeStatus::Failed);
        assert!(matches!(
            propagate(&graph, &mut store, Mechanism::Inoculation, &[0], &CascadeConfig::default()),
            Err(Error::StateConsistency(_))
        ));
    }

    #[test]
    fn test_no_seeds_single_entry() {
        let graph = Graph::cycle(3);
        let mut store = NodeStateStore::new(3, NodeStatus::Weak);
        let out = propagate(&graph, &mut store, Mechanism::Inoculation, &[], &CascadeConfig::default()).unwrap();
        assert!(out.failed.is_empty());
        assert_eq!(out.trace.fractions(), &[0.0]);
    }
}
