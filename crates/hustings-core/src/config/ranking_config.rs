use serde::{Deserialize, Serialize};

use super::defaults;

/// Ranking and top-N selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Size of the top-questions list.
    pub top_questions_count: usize,
    /// Per-issue-tag cap in the main fill phase.
    pub cluster_max_questions: usize,
    /// Seats reserved for disjoint-tag candidates.
    pub minority_concern_slots: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_questions_count: defaults::DEFAULT_TOP_QUESTIONS_COUNT,
            cluster_max_questions: defaults::DEFAULT_CLUSTER_MAX_QUESTIONS,
            minority_concern_slots: defaults::DEFAULT_MINORITY_CONCERN_SLOTS,
        }
    }
}
