//! Moderation hooks: flag, remove, manual merge, unmerge, and reports
//! against polymorphic targets.

use std::sync::Arc;

use tracing::info;

use hustings_core::errors::{EngineError, EngineResult};
use hustings_core::models::{Actor, Report, TargetRef};
use hustings_core::question::{Question, QuestionStatus};
use hustings_core::traits::{IQuestionStorage, IVectorIndex};
use hustings_dedup::{ClusterManager, DedupEngine};

/// Moderator-gated state transitions.
pub struct ModerationEngine {
    storage: Arc<dyn IQuestionStorage>,
    index: Arc<dyn IVectorIndex>,
    dedup: Arc<DedupEngine>,
    clusters: Arc<ClusterManager>,
}

impl ModerationEngine {
    pub fn new(
        storage: Arc<dyn IQuestionStorage>,
        index: Arc<dyn IVectorIndex>,
        dedup: Arc<DedupEngine>,
        clusters: Arc<ClusterManager>,
    ) -> Self {
        Self {
            storage,
            index,
            dedup,
            clusters,
        }
    }

    fn require_moderator(actor: &Actor) -> EngineResult<()> {
        if !actor.is_moderator() {
            return Err(EngineError::forbidden("moderator role required"));
        }
        Ok(())
    }

    fn require_question(&self, question_id: &str) -> EngineResult<Question> {
        self.storage
            .get_question(question_id)?
            .ok_or_else(|| EngineError::not_found("question", question_id))
    }

    /// Mark a question for moderator attention. Any authenticated user
    /// may flag.
    pub fn flag(&self, question_id: &str) -> EngineResult<()> {
        self.storage.set_flagged(question_id, true)?;
        info!(question_id, "question flagged");
        Ok(())
    }

    /// Soft-delete a question: status transition only, history and votes
    /// stay auditable. The question leaves the vector index and stops
    /// contributing to its cluster's aggregates.
    pub fn remove(&self, actor: &Actor, question_id: &str) -> EngineResult<()> {
        Self::require_moderator(actor)?;
        let question = self.require_question(question_id)?;
        if question.status == QuestionStatus::Removed {
            return Ok(());
        }
        self.storage
            .set_status(question_id, QuestionStatus::Removed)?;
        self.index.remove(question_id)?;
        self.clusters.detach_on_removal(question_id)?;
        info!(question_id, moderator = %actor.user_id, "question removed");
        Ok(())
    }

    /// Manual override of automatic dedup: fold `source` into `target`'s
    /// cluster.
    pub fn merge(&self, actor: &Actor, source_id: &str, target_id: &str) -> EngineResult<()> {
        Self::require_moderator(actor)?;
        if source_id == target_id {
            return Err(EngineError::validation(
                "cannot merge a question into itself",
            ));
        }
        let source = self.require_question(source_id)?;
        let target = self.require_question(target_id)?;
        if source.status == QuestionStatus::Removed || target.status == QuestionStatus::Removed {
            return Err(EngineError::validation(
                "cannot merge removed questions",
            ));
        }
        if source.contest_id != target.contest_id {
            return Err(EngineError::validation(
                "cannot merge questions across contests",
            ));
        }
        if source.cluster_id == target.cluster_id {
            return Ok(());
        }

        self.clusters.attach(&target.cluster_id, source_id)?;
        info!(
            source_id,
            target_id,
            moderator = %actor.user_id,
            "questions merged manually"
        );
        Ok(())
    }

    /// Split a wrongly merged question back out into its own cluster.
    ///
    /// The question is re-embedded and re-indexed, but automatic dedup is
    /// not re-applied: the moderator's judgment that this is a distinct
    /// question overrides the similarity verdict. Returns the new
    /// cluster id.
    pub fn unmerge(&self, actor: &Actor, question_id: &str) -> EngineResult<String> {
        Self::require_moderator(actor)?;
        let question = self.require_question(question_id)?;
        if question.status != QuestionStatus::Merged {
            return Err(EngineError::validation("question is not merged"));
        }

        let new_cluster_id = self.clusters.detach(question_id)?;

        let outcome = self
            .dedup
            .check(&question.contest_id, &question.text, Some(question_id))?;
        self.storage
            .update_embedding(question_id, outcome.embedding.as_deref())?;

        info!(
            question_id,
            new_cluster_id = %new_cluster_id,
            moderator = %actor.user_id,
            "question unmerged"
        );
        Ok(new_cluster_id)
    }

    /// File a report against a question, answer, or rebuttal. The tagged
    /// target forces exhaustive handling per kind: question reports also
    /// raise the flag bit, answer reports are validated against storage,
    /// rebuttal reports are recorded as-is (rebuttals live outside this
    /// engine).
    pub fn report(&self, actor: &Actor, target: TargetRef, reason: &str) -> EngineResult<Report> {
        match &target {
            TargetRef::Question(id) => {
                self.require_question(id)?;
                self.storage.set_flagged(id, true)?;
            }
            TargetRef::Answer(id) => {
                self.storage
                    .get_answer(id)?
                    .ok_or_else(|| EngineError::not_found("answer", id.clone()))?;
            }
            TargetRef::Rebuttal(_) => {}
        }

        let report = Report::new(target, &actor.user_id, reason);
        self.storage.record_report(&report)?;
        info!(
            report_id = %report.id,
            kind = report.target.kind(),
            target_id = report.target.id(),
            "report recorded"
        );
        Ok(report)
    }
}
