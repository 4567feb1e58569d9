use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Discrete node strength. The numeric values are part of the data model.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum NodeStatus {
    Failed = 0,
    Weak = 1,
    Strong = 2,
}

impl NodeStatus {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// One level down, clamped at `Failed`.
    pub fn degraded(self) -> Self {
        match self {
            NodeStatus::Strong => NodeStatus::Weak,
            NodeStatus::Weak | NodeStatus::Failed => NodeStatus::Failed,
        }
    }

    pub fn is_failed(self) -> bool {
        self == NodeStatus::Failed
    }
}

impl TryFrom<i64> for NodeStatus {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self> {
        match raw {
            0 => Ok(NodeStatus::Failed),
            1 => Ok(NodeStatus::Weak),
            2 => Ok(NodeStatus::Strong),
            other => Err(Error::InvalidStatus(other)),
        }
    }
}

impl TryFrom<u8> for NodeStatus {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self> {
        NodeStatus::try_from(raw as i64)
    }
}

impl From<NodeStatus> for u8 {
    fn from(status: NodeStatus) -> u8 {
        status.as_u8()
    }
}

/// How a fresh trial assigns statuses before the first step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialStatus {
    /// Every node starts weak.
    AllWeak,
    /// Nodes with degree >= `strong_degree` start strong, the rest weak.
    DegreeSeeded { strong_degree: usize },
}

impl InitialStatus {
    /// Degree clipped into `[1, 2]`.
    pub fn degree_clipped() -> Self {
        InitialStatus::DegreeSeeded { strong_degree: 2 }
    }

    pub fn status_for_degree(&self, degree: usize) -> NodeStatus {
        match *self {
            InitialStatus::AllWeak => NodeStatus::Weak,
            InitialStatus::DegreeSeeded { strong_degree } => {
                if degree >= strong_degree {
                    NodeStatus::Strong
                } else {
                    NodeStatus::Weak
                }
            }
        }
    }
}

impl Default for InitialStatus {
    fn default() -> Self {
        InitialStatus::AllWeak
    }
}
