use chrono::{DateTime, Utc};

use crate::errors::EngineResult;
use crate::models::{Answer, Report};
use crate::question::{Cluster, Question, QuestionStatus, QuestionVersion, Vote};

/// Where a newly created question lands in the cluster landscape.
#[derive(Debug)]
pub enum ClusterPlacement<'a> {
    /// The question is unique: create this fresh singleton cluster with it.
    NewCluster(&'a Cluster),
    /// The question duplicates an existing cluster: attach as a
    /// non-representative member.
    Join { cluster_id: &'a str },
}

/// The vote-row mutation inside a counter compare-and-swap.
#[derive(Debug)]
pub enum VoteWrite<'a> {
    /// Insert or update the (user, question) row, last write wins by
    /// `cast_at`.
    Upsert(&'a Vote),
    /// Delete the row (vote retraction).
    Delete {
        user_id: &'a str,
        question_id: &'a str,
    },
}

/// A question's vote counters as observed before a compare-and-swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub upvotes: u64,
    pub downvotes: u64,
}

/// A queued, not-yet-applied vector index update.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingIndexEntry {
    pub question_id: String,
    pub contest_id: String,
    pub attempts: u32,
    pub enqueued_at: DateTime<Utc>,
}

/// Transactional persistence for questions, versions, votes, clusters,
/// answers, and the pending-index queue.
///
/// Multi-entity operations are all-or-nothing: a caller-aborted submission
/// or vote never leaves partial state.
pub trait IQuestionStorage: Send + Sync {
    // --- Questions ---

    /// Create a question together with its version-1 snapshot and its
    /// cluster placement, in one transaction. Enqueues a pending-index
    /// entry when the question has an embedding.
    fn create_question(
        &self,
        question: &Question,
        first_version: &QuestionVersion,
        placement: ClusterPlacement<'_>,
    ) -> EngineResult<()>;

    fn get_question(&self, id: &str) -> EngineResult<Option<Question>>;

    fn questions_for_contest(&self, contest_id: &str) -> EngineResult<Vec<Question>>;

    /// Distinct contest ids with at least one question (maintenance scans).
    fn contest_ids(&self) -> EngineResult<Vec<String>>;

    fn set_status(&self, question_id: &str, status: QuestionStatus) -> EngineResult<()>;

    fn set_flagged(&self, question_id: &str, flagged: bool) -> EngineResult<()>;

    /// Replace the stored embedding (or clear it) and enqueue a
    /// pending-index entry when one is set.
    fn update_embedding(&self, question_id: &str, embedding: Option<&[f32]>) -> EngineResult<()>;

    // --- Versions ---

    /// Insert an immutable snapshot and update the question's cached text
    /// and current version number, in one transaction.
    fn append_version(&self, version: &QuestionVersion) -> EngineResult<()>;

    fn get_version(
        &self,
        question_id: &str,
        version_number: u32,
    ) -> EngineResult<Option<QuestionVersion>>;

    fn versions_for_question(&self, question_id: &str) -> EngineResult<Vec<QuestionVersion>>;

    // --- Votes ---

    fn get_vote(&self, user_id: &str, question_id: &str) -> EngineResult<Option<Vote>>;

    /// All live votes for a question.
    fn votes_for_question(&self, question_id: &str) -> EngineResult<Vec<Vote>>;

    /// Apply a vote-row write plus the question's counter update as a
    /// compare-and-swap transaction: the counters only move from
    /// `expected` to `updated` if they still equal `expected`. The cluster
    /// aggregate is refreshed in the same transaction. Returns `false`
    /// (with everything rolled back) when the swap is lost.
    fn commit_vote(
        &self,
        write: VoteWrite<'_>,
        expected: CounterSnapshot,
        updated: CounterSnapshot,
    ) -> EngineResult<bool>;

    fn set_rank_score(&self, question_id: &str, score: f64) -> EngineResult<()>;

    // --- Clusters ---

    fn get_cluster(&self, id: &str) -> EngineResult<Option<Cluster>>;

    fn clusters_for_contest(&self, contest_id: &str) -> EngineResult<Vec<Cluster>>;

    fn set_representative(&self, cluster_id: &str, question_id: &str) -> EngineResult<()>;

    /// Move a question into an existing cluster as a merged member, in one
    /// transaction: membership on both sides, the question's `cluster_id`
    /// and `Merged` status, and both clusters' aggregates. An emptied
    /// source cluster is deleted.
    fn move_to_cluster(&self, question_id: &str, target_cluster_id: &str) -> EngineResult<()>;

    /// Detach a question from its cluster into the given fresh singleton,
    /// restoring `Approved` status, in one transaction.
    fn detach_to_singleton(&self, question_id: &str, new_cluster: &Cluster) -> EngineResult<()>;

    /// Re-derive a cluster's aggregates from its non-removed members.
    /// Returns the fresh (upvotes, downvotes).
    fn refresh_cluster_aggregates(&self, cluster_id: &str) -> EngineResult<(u64, u64)>;

    // --- Answers & reports ---

    fn record_answer(&self, answer: &Answer) -> EngineResult<()>;

    fn get_answer(&self, id: &str) -> EngineResult<Option<Answer>>;

    fn record_report(&self, report: &Report) -> EngineResult<()>;

    // --- Maintenance ---

    /// Questions persisted without an embedding (provider was down).
    fn questions_missing_embedding(&self, limit: usize) -> EngineResult<Vec<Question>>;

    fn pending_index_entries(&self, limit: usize) -> EngineResult<Vec<PendingIndexEntry>>;

    fn enqueue_index(&self, question_id: &str, contest_id: &str) -> EngineResult<()>;

    /// Remove a drained entry from the queue.
    fn complete_index_entry(&self, question_id: &str) -> EngineResult<()>;

    /// Record a failed drain attempt so maintenance retries later.
    fn bump_index_attempts(&self, question_id: &str) -> EngineResult<()>;
}
