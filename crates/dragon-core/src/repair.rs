use crate::error::{Error, Result};
use crate::rng::SimRng;
use crate::status::NodeStatus;
use crate::store::{NodeStateStore, Snapshot};
use crate::NodeId;

/// What repair changed
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Failed nodes brought back up
    pub restored: usize,
    /// Repaired weak nodes hardened to strong
    pub promoted: usize,
}

/// Heal the network after a cascade, then reinforce.
///
/// Every node returns to its pre-degradation value from `snapshot`, so all
/// transient failure is cleared. Each node in `failed` that was weak before
/// degradation then gets one draw and is promoted to strong with probability
/// `epsilon`. Draws happen in ascending node order.
pub fn repair_and_reinforce(
    store: &mut NodeStateStore,
    snapshot: &Snapshot,
    failed: &[NodeId],
    epsilon: f64,
    rng: &mut SimRng,
) -> Result<RepairReport> {
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(Error::InvalidParameter(format!("epsilon {} outside [0, 1]", epsilon)));
    }

    let restored = store.count(NodeStatus::Failed);
    store.restore(snapshot)?;

    // A snapshot taken mid-failure must not reintroduce it
    let prior = snapshot.statuses();
    for (node, &status) in prior.iter().enumerate() {
        if status.is_failed() {
            store.set_status(node, NodeStatus::Weak)?;
        }
    }

    let mut eligible: Vec<NodeId> = failed
        .iter()
        .copied()
        .filter(|&node| prior.get(node).map_or(false, |&s| s != NodeStatus::Strong))
        .collect();
    eligible.sort_unstable();
    eligible.dedup();

    let mut promoted = 0;
    for node in eligible {
        if rng.bernoulli(epsilon) {
            store.set_status(node, NodeStatus::Strong)?;
            promoted += 1;
        }
    }

    Ok(RepairReport { restored, promoted })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_reset_clears_failures() {
        let mut store = NodeStateStore::from_statuses(vec![
            NodeStatus::Weak,
            NodeStatus::Strong,
            NodeStatus::Weak,
        ]);
        let snap = store.snapshot();
        store.set_many(&[0, 1, 2], &[0, 0, 0]).unwrap();

        let mut rng = SimRng::new(3);
        let report = repair_and_reinforce(&mut store, &snap, &[0, 1, 2], 0.0, &mut rng).unwrap();

        assert_eq!(report, RepairReport { restored: 3, promoted: 0 });
        assert_eq!(store.all(), &[NodeStatus::Weak, NodeStatus::Strong, NodeStatus::Weak]);
    }

    #[test]
    fn test_only_cascade_members_reinforced() {
        let mut store = NodeStateStore::new(4, NodeStatus::Weak);
        let snap = store.snapshot();
        store.set_many(&[1, 2], &[0, 0]).unwrap();

        let mut rng = SimRng::new(3);
        let report = repair_and_reinforce(&mut store, &snap, &[1, 2], 1.0, &mut rng).unwrap();

        assert_eq!(report.promoted, 2);
        assert_eq!(
            store.all(),
            &[NodeStatus::Weak, NodeStatus::Strong, NodeStatus::Strong, NodeStatus::Weak]
        );
    }

    #[test]
    fn test_failed_snapshot_entry_healed() {
        let mut store = NodeStateStore::from_statuses(vec![NodeStatus::Failed, NodeStatus::Weak]);
        let snap = store.snapshot();

        let mut rng = SimRng::new(0);
        repair_and_reinforce(&mut store, &snap, &[0], 0.0, &mut rng).unwrap();
        assert_eq!(store.count(NodeStatus::Failed), 0);
    }

    #[test]
    fn test_rejects_bad_epsilon() {
        let mut store = NodeStateStore::new(1, NodeStatus::Weak);
        let snap = store.snapshot();
        let mut rng = SimRng::new(0);
        assert!(repair_and_reinforce(&mut store, &snap, &[], 1.5, &mut rng).is_err());
        assert!(repair_and_reinforce(&mut store, &snap, &[], f64::NAN, &mut rng).is_err());
    }
}
