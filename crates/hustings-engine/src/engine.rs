//! QuestionEngine — wires storage, index, embeddings, dedup, clusters,
//! ranking, versioning, votes, moderation, and maintenance into the
//! surface the API layer calls.

use std::sync::Arc;

use tracing::warn;

use hustings_core::config::EngineConfig;
use hustings_core::errors::{EngineError, EngineResult};
use hustings_core::models::{Actor, Answer, MaintenanceReport, Report, TargetRef, VoteResult};
use hustings_core::question::{CastValue, Question, QuestionVersion};
use hustings_core::traits::{IEmbeddingProvider, IQuestionStorage, IVectorIndex};
use hustings_dedup::{ClusterManager, DedupEngine};
use hustings_embeddings::EmbeddingEngine;
use hustings_index::InMemoryVectorIndex;
use hustings_ranking::{RankingEngine, WeightedNetVotes};
use hustings_storage::StorageEngine;

use crate::maintenance::MaintenanceEngine;
use crate::moderation::ModerationEngine;
use crate::versioning::VersioningEngine;
use crate::votes::VoteLedger;

/// The engine facade.
pub struct QuestionEngine {
    storage: Arc<dyn IQuestionStorage>,
    versioning: VersioningEngine,
    ledger: VoteLedger,
    moderation: ModerationEngine,
    maintenance: MaintenanceEngine,
    ranking: Arc<RankingEngine>,
}

impl QuestionEngine {
    /// Wire an engine from its external collaborators.
    pub fn new(
        storage: Arc<dyn IQuestionStorage>,
        index: Arc<dyn IVectorIndex>,
        embeddings: Arc<dyn IEmbeddingProvider>,
        config: EngineConfig,
    ) -> Self {
        let dedup = Arc::new(DedupEngine::new(
            embeddings,
            index.clone(),
            storage.clone(),
            config.dedup.clone(),
        ));
        let clusters = Arc::new(ClusterManager::new(storage.clone()));
        let ranking = Arc::new(RankingEngine::new(
            storage.clone(),
            Box::new(WeightedNetVotes),
            config.ranking.clone(),
        ));

        let versioning = VersioningEngine::new(
            storage.clone(),
            dedup.clone(),
            clusters.clone(),
            config.submission.clone(),
        );
        let ledger = VoteLedger::new(
            storage.clone(),
            ranking.clone(),
            clusters.clone(),
            config.votes.clone(),
        );
        let moderation = ModerationEngine::new(
            storage.clone(),
            index.clone(),
            dedup.clone(),
            clusters.clone(),
        );
        let maintenance =
            MaintenanceEngine::new(storage.clone(), index, dedup, clusters);

        Self {
            storage,
            versioning,
            ledger,
            moderation,
            maintenance,
            ranking,
        }
    }

    /// A fully in-process engine: in-memory SQLite, in-memory index, and
    /// the deterministic hashing embedder. Used by tests and ephemeral
    /// deployments.
    pub fn open_in_memory(config: EngineConfig) -> EngineResult<Self> {
        let storage: Arc<dyn IQuestionStorage> = Arc::new(StorageEngine::open_in_memory()?);
        let index: Arc<dyn IVectorIndex> = Arc::new(InMemoryVectorIndex::new());
        let embeddings: Arc<dyn IEmbeddingProvider> = Arc::new(
            EmbeddingEngine::with_hashing_provider(config.dedup.embedding_dimensions),
        );
        Ok(Self::new(storage, index, embeddings, config))
    }

    /// Push freshly queued embeddings into the index right away so new
    /// questions become dedup-discoverable without waiting for the next
    /// maintenance pass. Best-effort: the queue retries anything left.
    fn drain_index_queue(&self) {
        if let Err(e) = self.maintenance.flush_pending_index() {
            warn!(error = %e, "inline index drain failed, queue will retry");
        }
    }

    // --- Questions ---

    pub fn submit_question(
        &self,
        contest_id: &str,
        actor: &Actor,
        text: &str,
        tags: &[String],
    ) -> EngineResult<Question> {
        let question = self.versioning.submit(contest_id, actor, text, tags)?;
        self.drain_index_queue();
        Ok(question)
    }

    pub fn edit_question(
        &self,
        question_id: &str,
        actor: &Actor,
        new_text: &str,
        reason: &str,
    ) -> EngineResult<QuestionVersion> {
        let version = self.versioning.edit(question_id, actor, new_text, reason)?;
        self.drain_index_queue();
        Ok(version)
    }

    pub fn get_question(&self, question_id: &str) -> EngineResult<Question> {
        self.storage
            .get_question(question_id)?
            .ok_or_else(|| EngineError::not_found("question", question_id))
    }

    pub fn get_question_versions(&self, question_id: &str) -> EngineResult<Vec<QuestionVersion>> {
        self.versioning.versions(question_id)
    }

    // --- Votes ---

    /// `value` is the wire form: -1, 0 (retract), or +1.
    pub fn cast_vote(
        &self,
        actor: &Actor,
        question_id: &str,
        value: i8,
    ) -> EngineResult<VoteResult> {
        let cast = CastValue::from_signed(value)
            .ok_or_else(|| EngineError::validation(format!("vote value must be -1, 0, or 1, got {value}")))?;
        self.ledger.cast(actor, question_id, cast)
    }

    // --- Top list ---

    pub fn get_top_questions(&self, contest_id: &str) -> EngineResult<Vec<Question>> {
        self.ranking.top_n(contest_id)
    }

    pub fn get_top_questions_with(
        &self,
        contest_id: &str,
        n: usize,
        cluster_cap: usize,
        minority_slots: usize,
    ) -> EngineResult<Vec<Question>> {
        self.ranking
            .top_n_with(contest_id, n, cluster_cap, minority_slots)
    }

    // --- Answers ---

    pub fn record_answer(
        &self,
        question_id: &str,
        candidate_id: &str,
        text: &str,
    ) -> EngineResult<Answer> {
        self.versioning.record_answer(question_id, candidate_id, text)
    }

    /// The exact question text an answer was recorded against.
    pub fn answered_question_text(&self, answer_id: &str) -> EngineResult<String> {
        self.versioning.answered_question_text(answer_id)
    }

    // --- Moderation ---

    pub fn flag(&self, question_id: &str) -> EngineResult<()> {
        self.moderation.flag(question_id)
    }

    pub fn remove(&self, actor: &Actor, question_id: &str) -> EngineResult<()> {
        self.moderation.remove(actor, question_id)
    }

    pub fn merge(&self, actor: &Actor, source_id: &str, target_id: &str) -> EngineResult<()> {
        self.moderation.merge(actor, source_id, target_id)
    }

    pub fn unmerge(&self, actor: &Actor, question_id: &str) -> EngineResult<String> {
        let new_cluster_id = self.moderation.unmerge(actor, question_id)?;
        self.drain_index_queue();
        Ok(new_cluster_id)
    }

    pub fn report(&self, actor: &Actor, target: TargetRef, reason: &str) -> EngineResult<Report> {
        self.moderation.report(actor, target, reason)
    }

    // --- Maintenance ---

    /// The periodic reconciliation/backfill pass: drain the index queue,
    /// re-embed and re-cluster backfilled questions, verify aggregates.
    pub fn run_maintenance(&self) -> EngineResult<MaintenanceReport> {
        self.maintenance.run()
    }
}
