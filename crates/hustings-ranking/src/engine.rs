//! RankingEngine — score recomputation and the top-N listing.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use hustings_core::config::RankingConfig;
use hustings_core::errors::EngineResult;
use hustings_core::question::{Question, QuestionStatus};
use hustings_core::traits::{IQuestionStorage, IRankStrategy};

use crate::selection::{self, SelectionCandidate, SelectionParams};

/// Computes rank scores and the quota-aware top list.
pub struct RankingEngine {
    storage: Arc<dyn IQuestionStorage>,
    strategy: Box<dyn IRankStrategy>,
    config: RankingConfig,
}

impl RankingEngine {
    pub fn new(
        storage: Arc<dyn IQuestionStorage>,
        strategy: Box<dyn IRankStrategy>,
        config: RankingConfig,
    ) -> Self {
        Self {
            storage,
            strategy,
            config,
        }
    }

    /// Recompute one question's score from its live vote set and persist
    /// it. Idempotent: with no intervening votes, recomputing yields the
    /// same score.
    pub fn recompute(&self, question_id: &str) -> EngineResult<f64> {
        let votes = self.storage.votes_for_question(question_id)?;
        let score = self.strategy.score(&votes);
        self.storage.set_rank_score(question_id, score)?;
        debug!(
            question_id,
            score,
            strategy = self.strategy.name(),
            votes = votes.len(),
            "rank score recomputed"
        );
        Ok(score)
    }

    /// The top list with the configured defaults.
    pub fn top_n(&self, contest_id: &str) -> EngineResult<Vec<Question>> {
        self.top_n_with(
            contest_id,
            self.config.top_questions_count,
            self.config.cluster_max_questions,
            self.config.minority_concern_slots,
        )
    }

    /// The top list with explicit knobs.
    ///
    /// Best-effort snapshot read: concurrent votes may land while this
    /// gathers, which is acceptable for display data. Deterministic and
    /// re-derivable for unchanged stored state.
    pub fn top_n_with(
        &self,
        contest_id: &str,
        n: usize,
        cluster_cap: usize,
        minority_slots: usize,
    ) -> EngineResult<Vec<Question>> {
        // Approved cluster representatives only: merged members and
        // removed questions never enter selection.
        let mut representatives: HashMap<String, Question> = HashMap::new();
        for cluster in self.storage.clusters_for_contest(contest_id)? {
            if let Some(question) = self
                .storage
                .get_question(&cluster.representative_question_id)?
            {
                if question.status == QuestionStatus::Approved {
                    representatives.insert(question.id.clone(), question);
                }
            }
        }

        let candidates: Vec<SelectionCandidate> = representatives
            .values()
            .map(|q| SelectionCandidate {
                question_id: q.id.clone(),
                rank_score: q.rank_score,
                created_at: q.created_at,
                issue_tags: q.issue_tags.clone(),
            })
            .collect();

        let picked = selection::select(
            &candidates,
            &SelectionParams {
                n,
                cluster_cap,
                minority_slots,
            },
        );

        Ok(picked
            .ordered()
            .into_iter()
            .filter_map(|id| representatives.remove(&id))
            .collect())
    }
}
