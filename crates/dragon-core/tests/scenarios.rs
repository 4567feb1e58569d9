use dragon_core::{
    degrade_node, propagate, CascadeConfig, Edge, Graph, Mechanism, ModelParams, NodeStateStore,
    NodeStatus, SimRng, SimulationContext,
};
use approx::assert_abs_diff_eq;

use NodeStatus::{Failed, Strong, Weak};

#[test]
fn scenario_a_weak_cycle_fully_fails() {
    let graph = Graph::cycle(4);
    let mut store = NodeStateStore::new(4, Weak);

    let degradation = degrade_node(&mut store, 0).unwrap();
    assert!(degradation.newly_failed);

    let out = propagate(&graph, &mut store, Mechanism::Inoculation, &[0], &CascadeConfig::default()).unwrap();

    assert_eq!(out.failed, vec![0, 1, 2, 3]);
    assert_eq!(out.rounds, 2);
    // iteration 0: {0}; round 1: {1, 3}; round 2: {2}; round 3 quiescent
    assert_eq!(out.trace.fractions(), &[0.25, 0.75, 1.0, 1.0]);
    assert_abs_diff_eq!(out.trace.final_fraction().unwrap(), 1.0);
}

#[test]
fn scenario_b_strong_nodes_shield_under_inoculation() {
    let graph = Graph::cycle(4);
    let mut store = NodeStateStore::from_statuses(vec![Strong, Weak, Weak, Strong]);

    degrade_node(&mut store, 1).unwrap();
    let out = propagate(&graph, &mut store, Mechanism::Inoculation, &[1], &CascadeConfig::default()).unwrap();

    assert_eq!(out.failed, vec![1, 2]);
    assert_abs_diff_eq!(out.trace.final_fraction().unwrap(), 0.5);
    assert_eq!(store.get(0), Ok(Strong));
    assert_eq!(store.get(3), Ok(Strong));
}

#[test]
fn scenario_c_complex_contagion_breaks_strong_node() {
    let graph = Graph::complete(3);
    let mut store = NodeStateStore::from_statuses(vec![Failed, Weak, Strong]);

    let out = propagate(&graph, &mut store, Mechanism::complex_contagion(), &[0], &CascadeConfig::default()).unwrap();

    assert_eq!(out.failed, vec![0, 1, 2]);
    assert_eq!(out.rounds, 2);
    assert_abs_diff_eq!(out.trace.final_fraction().unwrap(), 1.0);
}

#[test]
fn scenario_c_inoculation_keeps_strong_node() {
    let graph = Graph::complete(3);
    let mut store = NodeStateStore::from_statuses(vec![Failed, Weak, Strong]);

    let out = propagate(&graph, &mut store, Mechanism::Inoculation, &[0], &CascadeConfig::default()).unwrap();

    assert_eq!(out.failed, vec![0, 1]);
    assert_eq!(store.get(2), Ok(Strong));
}

#[test]
fn scenario_d_epsilon_one_always_promotes() {
    for seed in 0..50 {
        let params = ModelParams::new(Mechanism::Inoculation, 1.0);
        let mut ctx = SimulationContext::new(Graph::cycle(4), params, SimRng::new(seed)).unwrap();

        let result = ctx.step_at(0).unwrap();
        assert_eq!(result.promoted, 4);
        assert_eq!(ctx.store().all(), &[Strong; 4]);
    }
}

#[test]
fn scenario_d_epsilon_zero_never_promotes() {
    for seed in 0..50 {
        let params = ModelParams::new(Mechanism::Inoculation, 0.0);
        let mut ctx = SimulationContext::new(Graph::cycle(4), params, SimRng::new(seed)).unwrap();

        let result = ctx.step_at(0).unwrap();
        assert_eq!(result.promoted, 0);
        assert_eq!(ctx.store().all(), &[Weak; 4]);
    }
}

#[test]
fn strong_node_degraded_without_failure_is_not_reinforced() {
    // 0 is strong; degrading it leaves it weak and triggers nothing
    let graph = Graph::from_edges(3, vec![Edge::new(0, 1), Edge::new(1, 2)]).unwrap();
    let store = NodeStateStore::from_statuses(vec![Strong, Strong, Strong]);
    let params = ModelParams::new(Mechanism::Inoculation, 1.0);
    let mut ctx = SimulationContext::with_store(graph, store, params, SimRng::new(9)).unwrap();

    let result = ctx.step_at(0).unwrap();
    assert!(result.trace.is_none());
    assert_eq!(ctx.store().all(), &[Weak, Strong, Strong]);
}
