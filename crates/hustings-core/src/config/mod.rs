pub mod defaults;

mod dedup_config;
mod ranking_config;
mod submission_config;
mod vote_config;

pub use dedup_config::DedupConfig;
pub use ranking_config::RankingConfig;
pub use submission_config::SubmissionConfig;
pub use vote_config::VoteConfig;

use serde::{Deserialize, Serialize};

/// Top-level engine configuration, one section per subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub dedup: DedupConfig,
    pub ranking: RankingConfig,
    pub submission: SubmissionConfig,
    pub votes: VoteConfig,
}
