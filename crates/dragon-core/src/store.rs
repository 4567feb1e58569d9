use crate::error::{Error, Result};
use crate::graph::Topology;
use crate::status::{InitialStatus, NodeStatus};
use crate::{NodeId, F};

/// Per-node status array for a single trial.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeStateStore {
    statuses: Vec<NodeStatus>,
}

/// Opaque copy of a store, only meaningful to [`NodeStateStore::restore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot(Vec<NodeStatus>);

impl Snapshot {
    pub(crate) fn statuses(&self) -> &[NodeStatus] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl NodeStateStore {
    pub fn new(n: usize, status: NodeStatus) -> Self {
        Self { statuses: vec![status; n] }
    }

    pub fn from_statuses(statuses: Vec<NodeStatus>) -> Self {
        Self { statuses }
    }

    /// Fresh store for a trial, seeded from the graph by `policy`.
    pub fn initialize<T: Topology + ?Sized>(graph: &T, policy: InitialStatus) -> Self {
        let statuses = (0..graph.node_count())
            .map(|node| policy.status_for_degree(graph.degree(node)))
            .collect();
        Self { statuses }
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Result<NodeStatus> {
        self.statuses
            .get(node)
            .copied()
            .ok_or(Error::NodeOutOfRange { node, node_count: self.statuses.len() })
    }

    /// Raw write; `status` must be 0, 1 or 2.
    pub fn set(&mut self, node: NodeId, status: i64) -> Result<()> {
        let status = NodeStatus::try_from(status)?;
        self.set_status(node, status)
    }

    pub fn set_status(&mut self, node: NodeId, status: NodeStatus) -> Result<()> {
        let node_count = self.statuses.len();
        let slot = self
            .statuses
            .get_mut(node)
            .ok_or(Error::NodeOutOfRange { node, node_count })?;
        *slot = status;
        Ok(())
    }

    /// Batch write. Validates everything before touching the store, so a
    /// rejected batch leaves no partial update behind.
    pub fn set_many(&mut self, nodes: &[NodeId], statuses: &[i64]) -> Result<()> {
        if nodes.len() != statuses.len() {
            return Err(Error::LengthMismatch { nodes: nodes.len(), statuses: statuses.len() });
        }

        let mut updates = Vec::with_capacity(nodes.len());
        for (&node, &raw) in nodes.iter().zip(statuses) {
            if node >= self.statuses.len() {
                return Err(Error::NodeOutOfRange { node, node_count: self.statuses.len() });
            }
            updates.push((node, NodeStatus::try_from(raw)?));
        }

        for (node, status) in updates {
            self.statuses[node] = status;
        }
        Ok(())
    }

    /// Status of every node, indexed by node id
    pub fn all(&self) -> &[NodeStatus] {
        &self.statuses
    }

    pub fn count(&self, status: NodeStatus) -> usize {
        self.statuses.iter().filter(|&&s| s == status).count()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.statuses.clone())
    }

    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        if snapshot.len() != self.statuses.len() {
            return Err(Error::StateConsistency(format!(
                "snapshot holds {} nodes but store holds {}",
                snapshot.len(),
                self.statuses.len()
            )));
        }
        self.statuses.copy_from_slice(snapshot.statuses());
        Ok(())
    }

    /// Fraction of nodes currently failed. `declared_nodes` is the graph's node
    /// count; a store of any other size is corrupt.
    pub fn failure_fraction(&self, declared_nodes: usize) -> Result<F> {
        if self.statuses.len() != declared_nodes {
            return Err(Error::StateConsistency(format!(
                "store tracks {} nodes but graph declares {}",
                self.statuses.len(),
                declared_nodes
            )));
        }
        if declared_nodes == 0 {
            return Ok(0.0);
        }
        Ok(self.count(NodeStatus::Failed) as F / declared_nodes as F)
    }
}
