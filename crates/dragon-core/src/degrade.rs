use crate::error::{Error, Result};
use crate::rng::SimRng;
use crate::status::NodeStatus;
use crate::store::NodeStateStore;
use crate::NodeId;

/// Outcome of weakening one node
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Degradation {
    pub node: NodeId,
    pub previous: NodeStatus,
    pub current: NodeStatus,
    /// Node crossed from non-failed to failed on this call
    pub newly_failed: bool,
}

/// Weaken one node chosen uniformly from all nodes, failed ones included.
pub fn degrade(store: &mut NodeStateStore, rng: &mut SimRng) -> Result<Degradation> {
    if store.is_empty() {
        return Err(Error::StateConsistency("cannot degrade an empty network".to_string()));
    }
    let node = rng.pick_node(store.len());
    degrade_node(store, node)
}

/// Drop `node` by exactly one level. A failed node stays failed.
pub fn degrade_node(store: &mut NodeStateStore, node: NodeId) -> Result<Degradation> {
    let previous = store.get(node)?;
    let current = previous.degraded();
    store.set_status(node, current)?;

    Ok(Degradation {
        node,
        previous,
        current,
        newly_failed: !previous.is_failed() && current.is_failed(),
    })
}
