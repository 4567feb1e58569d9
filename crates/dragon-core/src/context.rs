use crate::cascade::{propagate, CascadeConfig};
use crate::degrade::{degrade, degrade_node, Degradation};
use crate::error::{Error, Result};
use crate::graph::Topology;
use crate::mechanism::Mechanism;
use crate::repair::repair_and_reinforce;
use crate::rng::SimRng;
use crate::status::{InitialStatus, NodeStatus};
use crate::store::{NodeStateStore, Snapshot};
use crate::trace::CascadeTrace;
use crate::{NodeId, F};
use serde::{Deserialize, Serialize};

/// Dynamics parameters fixed for the lifetime of a trial
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub mechanism: Mechanism,
    /// Probability that a repaired weak node is promoted to strong
    pub epsilon: F,
    pub initial: InitialStatus,
}

impl ModelParams {
    pub fn new(mechanism: Mechanism, epsilon: F) -> Self {
        Self { mechanism, epsilon, initial: InitialStatus::AllWeak }
    }

    pub fn with_initial(mut self, initial: InitialStatus) -> Self {
        self.initial = initial;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(Error::InvalidParameter(format!("epsilon {} outside [0, 1]", self.epsilon)));
        }
        self.mechanism.validate()
    }
}

impl Default for ModelParams {
    fn default() -> Self {
        Self::new(Mechanism::Inoculation, 0.2)
    }
}

/// Record of one degrade / cascade / repair cycle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Node picked by degradation
    pub node: NodeId,
    /// Present only when degradation failed a node
    pub trace: Option<CascadeTrace>,
    /// Nodes failed by the cascade, seed included
    pub failed: usize,
    pub promoted: usize,
}

impl StepResult {
    pub fn quiet(node: NodeId) -> Self {
        Self { node, trace: None, failed: 0, promoted: 0 }
    }

    pub fn cascade_size(&self) -> Option<F> {
        self.trace.as_ref().and_then(|t| t.final_fraction())
    }
}

/// Everything one trial owns: topology, statuses, randomness and parameters.
///
/// Nothing here is shared between trials.
pub struct SimulationContext<T: Topology> {
    graph: T,
    store: NodeStateStore,
    rng: SimRng,
    params: ModelParams,
    cascade: CascadeConfig,
    steps_taken: usize,
}

impl<T: Topology> SimulationContext<T> {
    /// Fresh trial with statuses seeded by `params.initial`
    pub fn new(graph: T, params: ModelParams, rng: SimRng) -> Result<Self> {
        let store = NodeStateStore::initialize(&graph, params.initial);
        Self::with_store(graph, store, params, rng)
    }

    /// Trial starting from explicit statuses
    pub fn with_store(graph: T, store: NodeStateStore, params: ModelParams, rng: SimRng) -> Result<Self> {
        params.validate()?;
        if store.len() != graph.node_count() {
            return Err(Error::StateConsistency(format!(
                "store tracks {} nodes but graph declares {}",
                store.len(),
                graph.node_count()
            )));
        }
        Ok(Self {
            graph,
            store,
            rng,
            params,
            cascade: CascadeConfig::default(),
            steps_taken: 0,
        })
    }

    pub fn with_cascade_config(mut self, cascade: CascadeConfig) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn graph(&self) -> &T {
        &self.graph
    }

    pub fn store(&self) -> &NodeStateStore {
        &self.store
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn strong_fraction(&self) -> F {
        if self.store.is_empty() {
            return 0.0;
        }
        self.store.count(NodeStatus::Strong) as F / self.store.len() as F
    }

    /// Degrade a random node and, if it failed, cascade and repair.
    pub fn step(&mut self) -> Result<StepResult> {
        let snapshot = self.store.snapshot();
        let degradation = degrade(&mut self.store, &mut self.rng)?;
        self.finish_step(snapshot, degradation)
    }

    /// Same cycle with the degraded node chosen by the caller
    pub fn step_at(&mut self, node: NodeId) -> Result<StepResult> {
        let snapshot = self.store.snapshot();
        let degradation = degrade_node(&mut self.store, node)?;
        self.finish_step(snapshot, degradation)
    }

    fn finish_step(&mut self, snapshot: Snapshot, degradation: Degradation) -> Result<StepResult> {
        self.steps_taken += 1;
        if !degradation.newly_failed {
            return Ok(StepResult::quiet(degradation.node));
        }

        let outcome = propagate(
            &self.graph,
            &mut self.store,
            self.params.mechanism,
            &[degradation.node],
            &self.cascade,
        )?;
        let report = repair_and_reinforce(
            &mut self.store,
            &snapshot,
            &outcome.failed,
            self.params.epsilon,
            &mut self.rng,
        )?;

        Ok(StepResult {
            node: degradation.node,
            failed: outcome.size(),
            promoted: report.promoted,
            trace: Some(outcome.trace),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn test_quiet_step_keeps_degradation() {
        let graph = Graph::cycle(4);
        let store = NodeStateStore::new(4, NodeStatus::Strong);
        let mut ctx = SimulationContext::with_store(graph, store, ModelParams::default(), SimRng::new(1)).unwrap();

        let result = ctx.step_at(2).unwrap();
        assert_eq!(result, StepResult::quiet(2));
        assert_eq!(ctx.store().get(2), Ok(NodeStatus::Weak));
        assert_eq!(ctx.steps_taken(), 1);
    }

    #[test]
    fn test_cascade_step_heals() {
        let graph = Graph::cycle(4);
        let params = ModelParams::new(Mechanism::Inoculation, 0.0);
        let mut ctx = SimulationContext::new(graph, params, SimRng::new(1)).unwrap();

        let result = ctx.step_at(0).unwrap();
        assert_eq!(result.failed, 4);
        assert_eq!(result.cascade_size(), Some(1.0));
        assert_eq!(ctx.store().count(NodeStatus::Failed), 0);
        assert_eq!(ctx.store().count(NodeStatus::Weak), 4);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let graph = Graph::cycle(4);
        let params = ModelParams::new(Mechanism::Inoculation, -0.1);
        assert!(matches!(
            SimulationContext::new(graph, params, SimRng::new(0)),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_store_size_checked() {
        let store = NodeStateStore::new(3, NodeStatus::Weak);
        assert!(matches!(
            SimulationContext::with_store(Graph::cycle(4), store, ModelParams::default(), SimRng::new(0)),
            Err(Error::StateConsistency(_))
        ));
    }
}
