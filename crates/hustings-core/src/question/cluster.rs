use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A set of near-duplicate questions sharing one canonical representative.
///
/// Aggregate counts are the sum of direct counts over all non-removed
/// members; a reconciliation pass re-derives them after any mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// UUID v4 identifier.
    pub id: String,
    /// Contest the cluster is scoped to.
    pub contest_id: String,
    /// The member shown in listings and voted on. Always a member.
    pub representative_question_id: String,
    /// All member question ids, representative included.
    pub member_question_ids: BTreeSet<String>,
    /// Sum of upvotes across non-removed members.
    pub aggregate_upvotes: u64,
    /// Sum of downvotes across non-removed members.
    pub aggregate_downvotes: u64,
}

impl Cluster {
    /// A fresh cluster containing exactly one question, which is therefore
    /// its own representative.
    pub fn singleton(contest_id: &str, question_id: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            contest_id: contest_id.to_string(),
            representative_question_id: question_id.to_string(),
            member_question_ids: BTreeSet::from([question_id.to_string()]),
            aggregate_upvotes: 0,
            aggregate_downvotes: 0,
        }
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.member_question_ids.contains(question_id)
    }

    pub fn len(&self) -> usize {
        self.member_question_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_question_ids.is_empty()
    }
}

/// Identity equality by cluster id.
impl PartialEq for Cluster {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
