use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate's answer, bound to the question version that existed when
/// it was recorded. Later edits create new versions; the binding never
/// moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// UUID v4 identifier.
    pub id: String,
    pub question_id: String,
    /// The version the candidate was answering.
    pub version_number: u32,
    pub candidate_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
