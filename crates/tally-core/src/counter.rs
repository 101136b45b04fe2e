//! The counter entity and its persisted JSON shape.

use serde::{Deserialize, Serialize};

/// Total visits observed so far.
///
/// The persisted representation is a single JSON object with one field,
/// e.g. `{"visits": 42}`. The value only ever grows, by exactly one per
/// successful increment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub visits: u64,
}

impl Counter {
    /// A zero-valued counter, used when no prior state exists.
    pub fn zero() -> Self {
        Self::default()
    }

    /// The counter one visit later.
    pub fn incremented(self) -> Self {
        Self {
            visits: self.visits + 1,
        }
    }
}
