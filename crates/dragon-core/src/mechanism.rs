use crate::error::{Error, Result};
use crate::status::NodeStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Contagion rule deciding whether a non-failed node joins a cascade.
///
/// Weak nodes always fail with at least one failed neighbor. The variants
/// differ only in how strong nodes react.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mechanism {
    /// IN: strong nodes never fail.
    Inoculation,
    /// CC: strong nodes fail once `strong_threshold` neighbors have failed.
    ComplexContagion { strong_threshold: usize },
}

impl Mechanism {
    pub const DEFAULT_CC_THRESHOLD: usize = 2;

    pub fn complex_contagion() -> Self {
        Mechanism::ComplexContagion { strong_threshold: Self::DEFAULT_CC_THRESHOLD }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Mechanism::ComplexContagion { strong_threshold: 0 } => Err(Error::InvalidParameter(
                "complex contagion threshold must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn should_fail(&self, status: NodeStatus, failed_neighbors: usize) -> bool {
        match (status, *self) {
            (NodeStatus::Failed, _) => false,
            (NodeStatus::Weak, _) => failed_neighbors >= 1,
            (NodeStatus::Strong, Mechanism::Inoculation) => false,
            (NodeStatus::Strong, Mechanism::ComplexContagion { strong_threshold }) => {
                failed_neighbors >= strong_threshold
            }
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Mechanism::Inoculation => "IN",
            Mechanism::ComplexContagion { .. } => "CC",
        }
    }
}

impl Default for Mechanism {
    fn default() -> Self {
        Mechanism::Inoculation
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mechanism::Inoculation => write!(f, "IN"),
            Mechanism::ComplexContagion { strong_threshold } => write!(f, "CC(k={})", strong_threshold),
        }
    }
}

impl FromStr for Mechanism {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "in" | "inoculation" => Ok(Mechanism::Inoculation),
            "cc" | "complex-contagion" | "complex_contagion" => Ok(Mechanism::complex_contagion()),
            other => Err(Error::InvalidParameter(format!("unknown mechanism '{}'", other))),
        }
    }
}
