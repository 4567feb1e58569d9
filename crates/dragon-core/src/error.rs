use crate::NodeId;
use thiserror::Error;

/// Contract violations raised by the simulation engine.
///
/// None of these are expected at runtime: node failures are modelled as data,
/// so any error here means a caller broke a precondition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("graph construction failed: {0}")]
    GraphConstruction(String),

    #[error("invalid status {0}: must be 0 (failed), 1 (weak) or 2 (strong)")]
    InvalidStatus(i64),

    #[error("length mismatch: {nodes} nodes but {statuses} statuses")]
    LengthMismatch { nodes: usize, statuses: usize },

    #[error("state consistency violated: {0}")]
    StateConsistency(String),

    #[error("node {node} out of range for {node_count} nodes")]
    NodeOutOfRange { node: NodeId, node_count: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;
