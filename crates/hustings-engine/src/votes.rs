//! VoteLedger — one vote per (user, question) with fraud-weight
//! multipliers, compare-and-swap counter updates, and a synchronous rank
//! recompute so the returned score is never stale relative to the vote
//! that produced it.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use hustings_core::config::VoteConfig;
use hustings_core::errors::{EngineError, EngineResult};
use hustings_core::models::{Actor, VoteResult};
use hustings_core::question::{CastValue, Question, Vote, VoteValue};
use hustings_core::traits::{CounterSnapshot, IQuestionStorage, VoteWrite};
use hustings_dedup::ClusterManager;
use hustings_ranking::RankingEngine;

/// Records votes and keeps counters, aggregates, and rank scores in step.
pub struct VoteLedger {
    storage: Arc<dyn IQuestionStorage>,
    ranking: Arc<RankingEngine>,
    clusters: Arc<ClusterManager>,
    config: VoteConfig,
}

impl VoteLedger {
    pub fn new(
        storage: Arc<dyn IQuestionStorage>,
        ranking: Arc<RankingEngine>,
        clusters: Arc<ClusterManager>,
        config: VoteConfig,
    ) -> Self {
        Self {
            storage,
            ranking,
            clusters,
            config,
        }
    }

    /// Fraud-scoring hook. A future risk model may return anything in
    /// [0, 1]; downstream score math treats the result as a multiplier,
    /// never a hard filter.
    pub fn weight(&self, _user_id: &str, _question_id: &str) -> f64 {
        1.0
    }

    /// Cast, change, or retract a vote.
    ///
    /// Counter updates go through storage compare-and-swap with bounded
    /// retries; two concurrent votes by different users are both
    /// reflected, and a lost swap never leaves a partial write.
    pub fn cast(
        &self,
        actor: &Actor,
        question_id: &str,
        value: CastValue,
    ) -> EngineResult<VoteResult> {
        if !actor.is_verified() {
            return Err(EngineError::forbidden(
                "identity verification is required to vote",
            ));
        }

        let weight = self.weight(&actor.user_id, question_id);
        let cast_at = Utc::now();

        for attempt in 1..=self.config.cas_max_retries {
            let question = self.votable_question(question_id)?;
            let previous = self.storage.get_vote(&actor.user_id, question_id)?;

            // Peel the previous vote off the counters, then apply the new
            // one.
            let (mut upvotes, mut downvotes) = (question.upvotes, question.downvotes);
            if let Some(prev) = &previous {
                match prev.value {
                    VoteValue::Up => upvotes -= 1,
                    VoteValue::Down => downvotes -= 1,
                }
            }

            let vote_row;
            let write = match value.as_vote() {
                Some(vote_value) => {
                    match vote_value {
                        VoteValue::Up => upvotes += 1,
                        VoteValue::Down => downvotes += 1,
                    }
                    vote_row = Vote {
                        user_id: actor.user_id.clone(),
                        question_id: question_id.to_string(),
                        value: vote_value,
                        weight,
                        device_risk_score: 0.0,
                        cast_at,
                    };
                    VoteWrite::Upsert(&vote_row)
                }
                None => {
                    if previous.is_none() {
                        // Retracting a vote that does not exist is an
                        // idempotent no-op.
                        return Ok(VoteResult {
                            question_id: question_id.to_string(),
                            value: 0,
                            upvotes: question.upvotes,
                            downvotes: question.downvotes,
                            rank_score: question.rank_score,
                        });
                    }
                    VoteWrite::Delete {
                        user_id: &actor.user_id,
                        question_id,
                    }
                }
            };

            let committed = self.storage.commit_vote(
                write,
                CounterSnapshot {
                    upvotes: question.upvotes,
                    downvotes: question.downvotes,
                },
                CounterSnapshot { upvotes, downvotes },
            )?;

            if !committed {
                debug!(question_id, attempt, "vote counter swap lost, retrying");
                continue;
            }

            // Synchronous recompute: the caller sees a score at least as
            // fresh as their own vote. Score changes can move the cluster
            // representative.
            let rank_score = self.ranking.recompute(question_id)?;
            self.clusters.elect_representative(&question.cluster_id)?;

            return Ok(VoteResult {
                question_id: question_id.to_string(),
                value: value.as_vote().map(VoteValue::signed).unwrap_or(0),
                upvotes,
                downvotes,
                rank_score,
            });
        }

        warn!(
            question_id,
            attempts = self.config.cas_max_retries,
            "vote counter swap exhausted retries"
        );
        Err(EngineError::ConcurrencyConflict {
            attempts: self.config.cas_max_retries,
        })
    }

    /// Votes must target a live, non-merged question: merged members
    /// redirect voters to the cluster representative.
    fn votable_question(&self, question_id: &str) -> EngineResult<Question> {
        self.storage
            .get_question(question_id)?
            .filter(|q| q.status.is_votable())
            .ok_or_else(|| EngineError::not_found("question", question_id))
    }
}
