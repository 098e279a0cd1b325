//! The periodic reconciliation/backfill pass.
//!
//! Three jobs, all at-least-once:
//! 1. Drain the pending-index queue into the vector index (question
//!    writes are not transactional with the index, so a brief
//!    dedup-blind window exists until this runs or the inline drain
//!    succeeds).
//! 2. Re-embed questions stored without an embedding (provider outage at
//!    submission time), re-running dedup on each backfilled question.
//! 3. Verify cluster aggregates against member sums.

use std::sync::Arc;

use tracing::{info, warn};

use hustings_core::constants::{MAX_BACKFILL_BATCH, MAX_INDEX_DRAIN_BATCH};
use hustings_core::errors::EngineResult;
use hustings_core::models::MaintenanceReport;
use hustings_core::question::QuestionStatus;
use hustings_core::traits::{IQuestionStorage, IVectorIndex};
use hustings_dedup::{ClusterManager, DedupEngine};

/// Runs the reconciliation/backfill pass.
pub struct MaintenanceEngine {
    storage: Arc<dyn IQuestionStorage>,
    index: Arc<dyn IVectorIndex>,
    dedup: Arc<DedupEngine>,
    clusters: Arc<ClusterManager>,
}

impl MaintenanceEngine {
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

    /// Run the full pass.
    pub fn run(&self) -> EngineResult<MaintenanceReport> {
        let mut report = MaintenanceReport::default();
        report.reindexed = self.flush_pending_index()?;
        self.backfill_embeddings(&mut report)?;

        for contest_id in self.storage.contest_ids()? {
            report.aggregates_repaired += self.clusters.reconcile_contest(&contest_id)?;
        }

        if !report.is_noop() {
            info!(
                reindexed = report.reindexed,
                re_embedded = report.re_embedded,
                reclustered = report.reclustered,
                aggregates_repaired = report.aggregates_repaired,
                "maintenance pass completed"
            );
        }
        Ok(report)
    }

    /// Drain queued index updates. Failed upserts stay queued with a
    /// bumped attempt count; entries for vanished or removed questions
    /// are dropped.
    pub fn flush_pending_index(&self) -> EngineResult<usize> {
        let mut drained = 0;
        for entry in self.storage.pending_index_entries(MAX_INDEX_DRAIN_BATCH)? {
            let question = self.storage.get_question(&entry.question_id)?;
            match question {
                Some(q) if q.status != QuestionStatus::Removed => {
                    let Some(embedding) = q.embedding.as_deref() else {
                        // Nothing to index yet; backfill will re-enqueue.
                        self.storage.complete_index_entry(&entry.question_id)?;
                        continue;
                    };
                    match self.index.upsert(&entry.contest_id, &entry.question_id, embedding) {
                        Ok(()) => {
                            self.storage.complete_index_entry(&entry.question_id)?;
                            drained += 1;
                        }
                        Err(e) => {
                            warn!(
                                question_id = %entry.question_id,
                                attempts = entry.attempts,
                                error = %e,
                                "index upsert failed, keeping entry queued"
                            );
                            self.storage.bump_index_attempts(&entry.question_id)?;
                        }
                    }
                }
                _ => {
                    self.index.remove(&entry.question_id)?;
                    self.storage.complete_index_entry(&entry.question_id)?;
                }
            }
        }
        Ok(drained)
    }

    /// Re-embed questions that were persisted while the provider was
    /// down. A backfilled question that now turns out to be a duplicate
    /// is merged into the matched cluster.
    fn backfill_embeddings(&self, report: &mut MaintenanceReport) -> EngineResult<()> {
        for question in self.storage.questions_missing_embedding(MAX_BACKFILL_BATCH)? {
            let outcome = self
                .dedup
                .check(&question.contest_id, &question.text, Some(&question.id))?;

            let Some(embedding) = outcome.embedding else {
                // Provider is still down; try again next pass.
                return Ok(());
            };
            self.storage
                .update_embedding(&question.id, Some(&embedding))?;
            report.re_embedded += 1;

            if let Some(matched_id) = outcome
                .verdict
                .is_duplicate
                .then_some(outcome.verdict.matched_question_id)
                .flatten()
            {
                if let Some(matched) = self.storage.get_question(&matched_id)? {
                    if matched.cluster_id != question.cluster_id {
                        self.clusters.attach(&matched.cluster_id, &question.id)?;
                        report.reclustered += 1;
                    }
                }
            }
        }

        // Newly stored embeddings are queued; push them into the index
        // within the same pass.
        report.reindexed += self.flush_pending_index()?;
        Ok(())
    }
}
