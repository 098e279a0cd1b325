//! DedupEngine — decides whether a text duplicates an existing question.
//!
//! Fails open: when the embedding provider is down the verdict is
//! non-duplicate with no embedding, the question persists un-indexed, and
//! a later maintenance pass re-embeds and re-clusters it. Question intake
//! availability outranks dedup completeness.

use std::sync::Arc;

use tracing::{debug, warn};

use hustings_core::config::DedupConfig;
use hustings_core::errors::EngineResult;
use hustings_core::models::DuplicateVerdict;
use hustings_core::traits::{IEmbeddingProvider, IQuestionStorage, IVectorIndex};

/// A dedup verdict together with the embedding that produced it, so the
/// caller can persist the vector without re-embedding.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub verdict: DuplicateVerdict,
    pub embedding: Option<Vec<f32>>,
}

impl CheckOutcome {
    /// The degraded outcome when embedding is impossible.
    fn fail_open() -> Self {
        Self {
            verdict: DuplicateVerdict::unique(0.0),
            embedding: None,
        }
    }
}

/// The deduplication engine.
pub struct DedupEngine {
    embeddings: Arc<dyn IEmbeddingProvider>,
    index: Arc<dyn IVectorIndex>,
    storage: Arc<dyn IQuestionStorage>,
    config: DedupConfig,
}

impl DedupEngine {
    pub fn new(
        embeddings: Arc<dyn IEmbeddingProvider>,
        index: Arc<dyn IVectorIndex>,
        storage: Arc<dyn IQuestionStorage>,
        config: DedupConfig,
    ) -> Self {
        Self {
            embeddings,
            index,
            storage,
            config,
        }
    }

    /// Check a text against the contest's indexed questions.
    ///
    /// `exclude` skips one question id — an edited question must not match
    /// itself. Deterministic for equal inputs: the index orders equal
    /// similarities by ascending id, so the oldest question wins as
    /// canonical.
    pub fn check(
        &self,
        contest_id: &str,
        text: &str,
        exclude: Option<&str>,
    ) -> EngineResult<CheckOutcome> {
        let embedding = match self.embeddings.embed(text) {
            Ok(vector) => vector,
            Err(e) => {
                warn!(contest_id, error = %e, "embedding failed, dedup fails open");
                return Ok(CheckOutcome::fail_open());
            }
        };

        let hits = self
            .index
            .query(contest_id, &embedding, self.config.query_k)?;

        let nearest = self.nearest_live(&hits, exclude)?;

        let outcome = match nearest {
            Some((question_id, similarity)) if similarity >= self.config.similarity_threshold => {
                debug!(
                    contest_id,
                    matched = %question_id,
                    similarity,
                    "duplicate detected"
                );
                CheckOutcome {
                    verdict: DuplicateVerdict::duplicate_of(&question_id, similarity),
                    embedding: Some(embedding),
                }
            }
            Some((_, similarity)) => CheckOutcome {
                verdict: DuplicateVerdict::unique(similarity),
                embedding: Some(embedding),
            },
            None => CheckOutcome {
                verdict: DuplicateVerdict::unique(0.0),
                embedding: Some(embedding),
            },
        };
        Ok(outcome)
    }

    /// The best hit that is not excluded and not removed in storage.
    /// Hits are already ordered by similarity desc, then id asc.
    fn nearest_live(
        &self,
        hits: &[(String, f64)],
        exclude: Option<&str>,
    ) -> EngineResult<Option<(String, f64)>> {
        for (question_id, similarity) in hits {
            if exclude == Some(question_id.as_str()) {
                continue;
            }
            match self.storage.get_question(question_id)? {
                Some(question) if question.status.is_live() => {
                    return Ok(Some((question_id.clone(), *similarity)));
                }
                // Removed or index-only ghosts are skipped.
                _ => continue,
            }
        }
        Ok(None)
    }
}
