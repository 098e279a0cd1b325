//! Question versioning: submission, edits, and answer binding.
//!
//! Every text change is an immutable snapshot; the question row caches
//! the current text. An edit re-runs dedup against the current cluster
//! landscape (excluding the question itself) and reclassifies membership.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use hustings_core::config::SubmissionConfig;
use hustings_core::errors::{EngineError, EngineResult};
use hustings_core::models::{Actor, Answer};
use hustings_core::question::{Cluster, Question, QuestionStatus, QuestionVersion};
use hustings_core::traits::{ClusterPlacement, IQuestionStorage};
use hustings_dedup::{ClusterManager, DedupEngine};

/// Submission, edit, and version/answer lookups.
pub struct VersioningEngine {
    storage: Arc<dyn IQuestionStorage>,
    dedup: Arc<DedupEngine>,
    clusters: Arc<ClusterManager>,
    config: SubmissionConfig,
}

impl VersioningEngine {
    pub fn new(
        storage: Arc<dyn IQuestionStorage>,
        dedup: Arc<DedupEngine>,
        clusters: Arc<ClusterManager>,
        config: SubmissionConfig,
    ) -> Self {
        Self {
            storage,
            dedup,
            clusters,
            config,
        }
    }

    /// Validate text and tags before any write.
    fn validate(&self, text: &str, tags: &[String]) -> EngineResult<Vec<String>> {
        let chars = text.chars().count();
        if chars < self.config.min_text_chars || chars > self.config.max_text_chars {
            return Err(EngineError::validation(format!(
                "question text must be {}..={} characters, got {chars}",
                self.config.min_text_chars, self.config.max_text_chars
            )));
        }
        let normalized = Question::normalize_tags(tags);
        if normalized.len() > self.config.max_issue_tags {
            return Err(EngineError::validation(format!(
                "at most {} issue tags allowed, got {}",
                self.config.max_issue_tags,
                normalized.len()
            )));
        }
        Ok(normalized)
    }

    /// Submit a new question.
    ///
    /// A duplicate verdict stores the question as a merged member of the
    /// matched cluster instead of an independent entry; the submitter is
    /// not auto-credited a vote.
    pub fn submit(
        &self,
        contest_id: &str,
        actor: &Actor,
        text: &str,
        tags: &[String],
    ) -> EngineResult<Question> {
        let issue_tags = self.validate(text, tags)?;
        let outcome = self.dedup.check(contest_id, text, None)?;

        let question_id = uuid::Uuid::new_v4().to_string();
        let mut question = Question {
            id: question_id.clone(),
            contest_id: contest_id.to_string(),
            author_id: Some(actor.user_id.clone()),
            current_version: hustings_core::constants::FIRST_VERSION_NUMBER,
            text: text.to_string(),
            issue_tags,
            status: QuestionStatus::Approved,
            cluster_id: String::new(),
            embedding: outcome.embedding,
            upvotes: 0,
            downvotes: 0,
            rank_score: 0.0,
            is_flagged: false,
            created_at: Utc::now(),
        };
        let version = QuestionVersion::initial(&question_id, Some(&actor.user_id), text);

        match outcome.verdict.matched_question_id.as_deref() {
            Some(matched_id) if outcome.verdict.is_duplicate => {
                let matched = self
                    .storage
                    .get_question(matched_id)?
                    .ok_or_else(|| EngineError::not_found("question", matched_id))?;
                question.status = QuestionStatus::Merged;
                question.cluster_id = matched.cluster_id.clone();
                self.storage.create_question(
                    &question,
                    &version,
                    ClusterPlacement::Join {
                        cluster_id: &matched.cluster_id,
                    },
                )?;
                self.clusters.elect_representative(&matched.cluster_id)?;
                info!(
                    question_id = %question.id,
                    matched = matched_id,
                    similarity = outcome.verdict.similarity,
                    "submission merged into existing cluster"
                );
            }
            _ => {
                let cluster = Cluster::singleton(contest_id, &question_id);
                question.cluster_id = cluster.id.clone();
                self.storage.create_question(
                    &question,
                    &version,
                    ClusterPlacement::NewCluster(&cluster),
                )?;
                info!(question_id = %question.id, contest_id, "question submitted");
            }
        }

        Ok(question)
    }

    /// Create version n+1. Only the original author or a moderator may
    /// edit. The edit re-runs dedup excluding the question itself and
    /// reclassifies cluster membership in either direction.
    pub fn edit(
        &self,
        question_id: &str,
        actor: &Actor,
        new_text: &str,
        reason: &str,
    ) -> EngineResult<QuestionVersion> {
        let question = self
            .storage
            .get_question(question_id)?
            .filter(|q| q.status != QuestionStatus::Removed)
            .ok_or_else(|| EngineError::not_found("question", question_id))?;

        let is_author = question.author_id.as_deref() == Some(actor.user_id.as_str());
        if !is_author && !actor.is_moderator() {
            return Err(EngineError::forbidden(
                "only the author or a moderator may edit a question",
            ));
        }
        self.validate(new_text, &question.issue_tags)?;

        let version = QuestionVersion {
            question_id: question_id.to_string(),
            version_number: question.current_version + 1,
            text: new_text.to_string(),
            edit_author_id: Some(actor.user_id.clone()),
            created_at: Utc::now(),
        };
        self.storage.append_version(&version)?;
        info!(
            question_id,
            version = version.version_number,
            editor = %actor.user_id,
            reason,
            "question edited"
        );

        // Re-embed and reclassify against the current cluster landscape.
        let outcome = self.dedup.check(&question.contest_id, new_text, Some(question_id))?;
        self.storage
            .update_embedding(question_id, outcome.embedding.as_deref())?;

        match outcome.verdict.matched_question_id.as_deref() {
            // The edit made this a duplicate of another cluster.
            Some(matched_id) if outcome.verdict.is_duplicate => {
                let matched = self
                    .storage
                    .get_question(matched_id)?
                    .ok_or_else(|| EngineError::not_found("question", matched_id))?;
                if matched.cluster_id != question.cluster_id {
                    self.clusters.attach(&matched.cluster_id, question_id)?;
                }
            }
            // The edit made a previously merged member unique again.
            _ => {
                if question.status == QuestionStatus::Merged {
                    self.clusters.detach(question_id)?;
                }
            }
        }

        Ok(version)
    }

    /// Full version history, version 1 first.
    pub fn versions(&self, question_id: &str) -> EngineResult<Vec<QuestionVersion>> {
        let versions = self.storage.versions_for_question(question_id)?;
        if versions.is_empty() {
            return Err(EngineError::not_found("question", question_id));
        }
        Ok(versions)
    }

    /// Record a candidate's answer, bound to the current version.
    pub fn record_answer(
        &self,
        question_id: &str,
        candidate_id: &str,
        text: &str,
    ) -> EngineResult<Answer> {
        let question = self
            .storage
            .get_question(question_id)?
            .filter(|q| q.status != QuestionStatus::Removed)
            .ok_or_else(|| EngineError::not_found("question", question_id))?;

        let answer = Answer {
            id: uuid::Uuid::new_v4().to_string(),
            question_id: question_id.to_string(),
            version_number: question.current_version,
            candidate_id: candidate_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        self.storage.record_answer(&answer)?;
        info!(
            answer_id = %answer.id,
            question_id,
            version = answer.version_number,
            candidate_id,
            "answer recorded"
        );
        Ok(answer)
    }

    /// The question text an answer was given against: always the bound
    /// version's text, regardless of later edits.
    pub fn answered_question_text(&self, answer_id: &str) -> EngineResult<String> {
        let answer = self
            .storage
            .get_answer(answer_id)?
            .ok_or_else(|| EngineError::not_found("answer", answer_id))?;
        let version = self
            .storage
            .get_version(&answer.question_id, answer.version_number)?
            .ok_or_else(|| EngineError::not_found("question version", &answer.question_id))?;
        Ok(version.text)
    }
}
