use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants;

/// Deduplication subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Cosine similarity cutoff for the duplicate verdict.
    pub similarity_threshold: f64,
    /// How many nearest neighbors to consider per check.
    pub query_k: usize,
    /// Expected embedding dimensionality.
    pub embedding_dimensions: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
            query_k: defaults::DEFAULT_DEDUP_QUERY_K,
            embedding_dimensions: constants::EMBEDDING_DIMENSIONS,
        }
    }
}
