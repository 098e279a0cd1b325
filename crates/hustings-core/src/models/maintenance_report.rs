use serde::{Deserialize, Serialize};

/// What a maintenance pass accomplished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceReport {
    /// Questions whose missing embedding was backfilled.
    pub re_embedded: usize,
    /// Pending-index entries pushed into the vector index.
    pub reindexed: usize,
    /// Backfilled questions that turned out to be duplicates and were
    /// merged into an existing cluster.
    pub reclustered: usize,
    /// Clusters whose aggregates disagreed with their member sums and
    /// were repaired.
    pub aggregates_repaired: usize,
}

impl MaintenanceReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}
