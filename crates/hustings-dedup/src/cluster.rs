//! ClusterManager — owns membership moves, representative election, and
//! aggregate reconciliation.
//!
//! Representative invariant: exactly one non-merged member per cluster.
//! Election flips statuses accordingly: the winner is promoted out of
//! `Merged`, a displaced `Approved` representative is demoted into it.

use std::sync::Arc;

use tracing::{debug, info};

use hustings_core::errors::{EngineError, EngineResult};
use hustings_core::question::{Cluster, Question, QuestionStatus};
use hustings_core::traits::IQuestionStorage;

/// Owns cluster membership and the representative lifecycle.
pub struct ClusterManager {
    storage: Arc<dyn IQuestionStorage>,
}

impl ClusterManager {
    pub fn new(storage: Arc<dyn IQuestionStorage>) -> Self {
        Self { storage }
    }

    /// Attach a question to an existing cluster as a merged member, then
    /// re-elect representatives on both sides of the move.
    pub fn attach(&self, cluster_id: &str, question_id: &str) -> EngineResult<()> {
        let source_cluster_id = self.require_question(question_id)?.cluster_id;
        self.storage.move_to_cluster(question_id, cluster_id)?;
        self.elect_representative(cluster_id)?;

        // The question may have been the source cluster's representative;
        // a surviving source needs a fresh election.
        if source_cluster_id != cluster_id
            && self.storage.get_cluster(&source_cluster_id)?.is_some()
        {
            self.elect_representative(&source_cluster_id)?;
        }
        Ok(())
    }

    /// Detach a question into a fresh singleton cluster (manual unmerge or
    /// an edit that made it unique again). Returns the new cluster id and
    /// re-elects the source cluster's representative.
    pub fn detach(&self, question_id: &str) -> EngineResult<String> {
        let question = self.require_question(question_id)?;
        let source_cluster_id = question.cluster_id.clone();

        let fresh = Cluster::singleton(&question.contest_id, question_id);
        let fresh_id = fresh.id.clone();
        self.storage.detach_to_singleton(question_id, &fresh)?;

        // The source may have been deleted if this was its last member.
        if self.storage.get_cluster(&source_cluster_id)?.is_some() {
            self.elect_representative(&source_cluster_id)?;
        }
        info!(question_id, from = %source_cluster_id, to = %fresh_id, "detached question");
        Ok(fresh_id)
    }

    /// Elect the representative: highest `rank_score` among non-removed
    /// members, ties broken by earliest `created_at`, then lowest id.
    /// Returns the winner, or `None` when no live member remains.
    pub fn elect_representative(&self, cluster_id: &str) -> EngineResult<Option<String>> {
        let cluster = self
            .storage
            .get_cluster(cluster_id)?
            .ok_or_else(|| EngineError::not_found("cluster", cluster_id))?;

        let mut live: Vec<Question> = Vec::new();
        for member_id in &cluster.member_question_ids {
            if let Some(question) = self.storage.get_question(member_id)? {
                if question.status.is_live() {
                    live.push(question);
                }
            }
        }

        let Some(winner) = live
            .iter()
            .max_by(|a, b| {
                a.rank_score
                    .partial_cmp(&b.rank_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.created_at.cmp(&a.created_at))
                    .then_with(|| b.id.cmp(&a.id))
            })
            .map(|q| q.id.clone())
        else {
            return Ok(None);
        };

        if winner != cluster.representative_question_id {
            debug!(
                cluster_id,
                old = %cluster.representative_question_id,
                new = %winner,
                "representative changed"
            );
            self.storage.set_representative(cluster_id, &winner)?;

            // Demote the displaced representative, promote the winner.
            if let Some(old) = self
                .storage
                .get_question(&cluster.representative_question_id)?
            {
                if old.id != winner && old.status == QuestionStatus::Approved {
                    self.storage.set_status(&old.id, QuestionStatus::Merged)?;
                }
            }
        }
        // Promotion is unconditional: the winner may have been merged even
        // when the representative pointer did not change (e.g. repair).
        let winner_question = self.require_question(&winner)?;
        if winner_question.status == QuestionStatus::Merged {
            self.storage.set_status(&winner, QuestionStatus::Approved)?;
        }

        Ok(Some(winner))
    }

    /// A question was moderated to removed: it stops contributing to
    /// aggregates, and a removed representative is replaced.
    pub fn detach_on_removal(&self, question_id: &str) -> EngineResult<()> {
        let question = self.require_question(question_id)?;
        self.storage
            .refresh_cluster_aggregates(&question.cluster_id)?;

        let cluster = self
            .storage
            .get_cluster(&question.cluster_id)?
            .ok_or_else(|| EngineError::not_found("cluster", &question.cluster_id))?;
        if cluster.representative_question_id == question_id {
            self.elect_representative(&cluster.id)?;
        }
        Ok(())
    }

    /// Verify one cluster's aggregates against the member sums, repairing
    /// on mismatch. Returns whether a repair was needed.
    pub fn reconcile(&self, cluster_id: &str) -> EngineResult<bool> {
        let cluster = self
            .storage
            .get_cluster(cluster_id)?
            .ok_or_else(|| EngineError::not_found("cluster", cluster_id))?;
        let (up, down) = self.storage.refresh_cluster_aggregates(cluster_id)?;
        let repaired = up != cluster.aggregate_upvotes || down != cluster.aggregate_downvotes;
        if repaired {
            info!(
                cluster_id,
                stored_up = cluster.aggregate_upvotes,
                stored_down = cluster.aggregate_downvotes,
                actual_up = up,
                actual_down = down,
                "cluster aggregates repaired"
            );
        }
        Ok(repaired)
    }

    /// Reconcile every cluster in a contest. Returns how many needed
    /// repair.
    pub fn reconcile_contest(&self, contest_id: &str) -> EngineResult<usize> {
        let clusters = self.storage.clusters_for_contest(contest_id)?;
        let mut repaired = 0;
        for cluster in clusters {
            if self.reconcile(&cluster.id)? {
                repaired += 1;
            }
        }
        Ok(repaired)
    }

    fn require_question(&self, question_id: &str) -> EngineResult<Question> {
        self.storage
            .get_question(question_id)?
            .ok_or_else(|| EngineError::not_found("question", question_id))
    }
}
