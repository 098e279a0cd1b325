use serde::{Deserialize, Serialize};

use super::defaults;

/// Vote ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteConfig {
    /// Bounded internal retries for a lost compare-and-swap.
    pub cas_max_retries: u32,
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            cas_max_retries: defaults::DEFAULT_CAS_MAX_RETRIES,
        }
    }
}
