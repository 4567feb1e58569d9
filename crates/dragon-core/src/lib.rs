pub mod error;
pub mod status;
pub mod graph;
pub mod store;
pub mod rng;
pub mod degrade;
pub mod mechanism;
pub mod trace;
pub mod cascade;
pub mod repair;
pub mod context;

// Core types
pub type NodeId = usize;
pub type F = f64;
pub use error::{Error, Result};
pub use status::{NodeStatus, InitialStatus};
pub use rng::SimRng;

// Topology contract
pub use graph::{Topology, Graph, Edge};

// Per-trial state
pub use store::{NodeStateStore, Snapshot};

// Step cycle
pub use degrade::{degrade, degrade_node, Degradation};
pub use mechanism::Mechanism;
pub use trace::CascadeTrace;
pub use cascade::{propagate, CascadeConfig, CascadeOutcome};
pub use repair::{repair_and_reinforce, RepairReport};
pub use context::{SimulationContext, ModelParams, StepResult};
