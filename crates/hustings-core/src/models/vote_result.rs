use serde::{Deserialize, Serialize};

/// State returned to the caller after a successful cast.
///
/// Counters and score are the values committed by this request, never
/// stale relative to the vote that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteResult {
    pub question_id: String,
    /// The applied value: +1, -1, or 0 for a retraction.
    pub value: i8,
    pub upvotes: u64,
    pub downvotes: u64,
    pub rank_score: f64,
}
