use dragon_core::{
    propagate, CascadeConfig, Edge, Graph, Mechanism, ModelParams, NodeStateStore, NodeStatus,
    SimRng, SimulationContext, StepResult, Topology,
};
use rand::Rng;

/// Sparse random graph built straight from the trial rng
fn random_graph(n: usize, edges: usize, rng: &mut SimRng) -> Graph {
    let mut list = Vec::with_capacity(edges);
    while list.len() < edges {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        if u != v {
            list.push(Edge::new(u, v));
        }
    }
    Graph::from_edges(n, list).unwrap()
}

fn random_statuses(n: usize, rng: &mut SimRng) -> Vec<NodeStatus> {
    (0..n)
        .map(|_| if rng.gen_bool(0.4) { NodeStatus::Strong } else { NodeStatus::Weak })
        .collect()
}

#[test]
fn post_repair_no_failures_and_domain_holds() {
    for trial in 0..20u64 {
        let mut rng = SimRng::from_trial_id(1234, trial);
        let graph = random_graph(60, 120, &mut rng);
        let params = ModelParams::new(Mechanism::complex_contagion(), 0.3);
        let mut ctx = SimulationContext::new(graph, params, rng).unwrap();

        for _ in 0..300 {
            ctx.step().unwrap();
            assert_eq!(ctx.store().count(NodeStatus::Failed), 0);
            for &status in ctx.store().all() {
                assert!(status.as_u8() <= 2);
            }
        }
    }
}

#[test]
fn cascade_trace_is_monotone_and_bounded() {
    for trial in 0..20u64 {
        let mut rng = SimRng::from_trial_id(99, trial);
        let graph = random_graph(80, 200, &mut rng);
        let params = ModelParams::new(Mechanism::complex_contagion(), 0.1);
        let mut ctx = SimulationContext::new(graph, params, rng).unwrap();

        for _ in 0..200 {
            let result = ctx.step().unwrap();
            if let Some(trace) = result.trace {
                let fractions = trace.fractions();
                assert!(fractions.len() >= 2);
                for pair in fractions.windows(2) {
                    assert!(pair[0] <= pair[1], "trace shrank: {:?}", fractions);
                }
                assert!(fractions.iter().all(|&f| (0.0..=1.0).contains(&f)));
                // fixed point: last round adds nothing
                assert_eq!(fractions[fractions.len() - 1], fractions[fractions.len() - 2]);
            }
        }
    }
}

#[test]
fn inoculation_never_fails_strong_nodes() {
    for trial in 0..50u64 {
        let mut rng = SimRng::from_trial_id(7, trial);
        let graph = random_graph(50, 150, &mut rng);
        let before = random_statuses(50, &mut rng);

        let seed = (0..50).find(|&i| before[i] == NodeStatus::Weak).unwrap_or(0);
        let mut store = NodeStateStore::from_statuses(before.clone());
        store.set_status(seed, NodeStatus::Failed).unwrap();

        let out = propagate(&graph, &mut store, Mechanism::Inoculation, &[seed], &CascadeConfig::default()).unwrap();
        for &node in &out.failed {
            assert_ne!(before[node], NodeStatus::Strong, "strong node {} failed under IN", node);
        }
    }
}

#[test]
fn complex_contagion_strong_failures_have_two_failed_neighbors() {
    for trial in 0..50u64 {
        let mut rng = SimRng::from_trial_id(8, trial);
        let graph = random_graph(50, 150, &mut rng);
        let before = random_statuses(50, &mut rng);

        let seed = (trial as usize) % 50;
        let mut store = NodeStateStore::from_statuses(before.clone());
        store.set_status(seed, NodeStatus::Failed).unwrap();

        let out = propagate(&graph, &mut store, Mechanism::complex_contagion(), &[seed], &CascadeConfig::default()).unwrap();
        let mut in_failed = vec![false; 50];
        for &node in &out.failed {
            in_failed[node] = true;
        }
        for &node in &out.failed {
            if node != seed && before[node] == NodeStatus::Strong {
                let failed_neighbors = graph.neighbors(node).iter().filter(|&&nb| in_failed[nb]).count();
                assert!(failed_neighbors >= 2, "strong node {} failed with {} failed neighbors", node, failed_neighbors);
            }
        }
    }
}

#[test]
fn identical_seeds_identical_traces() {
    fn run(seed: u64) -> Vec<StepResult> {
        let mut rng = SimRng::new(seed);
        let graph = random_graph(40, 100, &mut rng);
        let params = ModelParams::new(Mechanism::complex_contagion(), 0.25);
        let mut ctx = SimulationContext::new(graph, params, rng).unwrap();
        (0..500).map(|_| ctx.step().unwrap()).collect()
    }

    let a = run(2024);
    let b = run(2024);
    assert_eq!(a, b);
    assert!(a.iter().any(|r| r.trace.is_some()));

    let c = run(2025);
    assert_ne!(a, c);
}

#[test]
fn reinforcement_hardens_network_over_time() {
    let mut rng = SimRng::new(5);
    let graph = random_graph(100, 300, &mut rng);
    let params = ModelParams::new(Mechanism::Inoculation, 0.5);
    let mut ctx = SimulationContext::new(graph, params, rng).unwrap();
    assert_eq!(ctx.strong_fraction(), 0.0);

    for _ in 0..2000 {
        ctx.step().unwrap();
    }
    assert!(ctx.strong_fraction() > 0.0);
}
