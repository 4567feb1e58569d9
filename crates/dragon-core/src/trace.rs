use crate::error::Error;
use crate::F;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Failure fraction per cascade iteration, starting at iteration 0.
///
/// Serializes as a JSON object keyed by the iteration index as a string,
/// e.g. `{"0":0.25,"1":0.75,"2":1.0,"3":1.0}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, F>")]
pub struct CascadeTrace {
    fractions: Vec<F>,
}

impl CascadeTrace {
    pub fn new() -> Self {
        Self { fractions: Vec::new() }
    }

    pub fn push(&mut self, fraction: F) {
        self.fractions.push(fraction);
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }

    pub fn get(&self, iteration: usize) -> Option<F> {
        self.fractions.get(iteration).copied()
    }

    pub fn initial_fraction(&self) -> Option<F> {
        self.fractions.first().copied()
    }

    /// Cascade size: the failure fraction at the fixed point
    pub fn final_fraction(&self) -> Option<F> {
        self.fractions.last().copied()
    }

    pub fn fractions(&self) -> &[F] {
        &self.fractions
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, F)> + '_ {
        self.fractions.iter().copied().enumerate()
    }
}

impl Serialize for CascadeTrace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fractions.len()))?;
        for (iteration, fraction) in self.iter() {
            map.serialize_entry(&iteration.to_string(), &fraction)?;
        }
        map.end()
    }
}

impl TryFrom<BTreeMap<String, F>> for CascadeTrace {
    type Error = Error;

    fn try_from(raw: BTreeMap<String, F>) -> Result<Self, Error> {
        let mut entries = Vec::with_capacity(raw.len());
        for (key, fraction) in raw {
            let iteration: usize = key.parse().map_err(|_| {
                Error::InvalidParameter(format!("trace key '{}' is not an iteration index", key))
            })?;
            if !(0.0..=1.0).contains(&fraction) {
                return Err(Error::InvalidParameter(format!(
                    "trace fraction {} at iteration {} outside [0, 1]",
                    fraction, iteration
                )));
            }
            entries.push((iteration, fraction));
        }

        // String keys sort lexicographically ("10" < "2")
        entries.sort_by_key(|&(iteration, _)| iteration);
        for (expected, &(iteration, _)) in entries.iter().enumerate() {
            if iteration != expected {
                return Err(Error::InvalidParameter(format!(
                    "trace iterations are not contiguous: expected {}, found {}",
                    expected, iteration
                )));
            }
        }

        Ok(Self { fractions: entries.into_iter().map(|(_, f)| f).collect() })
    }
}
