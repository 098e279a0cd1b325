use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a question's text at one point in its history.
///
/// Versions are only ever inserted, never mutated or deleted. Candidate
/// answers bind to a specific version number so later edits cannot change
/// what a candidate appears to have answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionVersion {
    /// Question this snapshot belongs to.
    pub question_id: String,
    /// Monotonic version number, starting at 1.
    pub version_number: u32,
    /// The exact text at this version.
    pub text: String,
    /// Who made the edit (the author for version 1).
    pub edit_author_id: Option<String>,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
}

impl QuestionVersion {
    /// The initial snapshot created at submission time.
    pub fn initial(question_id: &str, author_id: Option<&str>, text: &str) -> Self {
        Self {
            question_id: question_id.to_string(),
            version_number: crate::constants::FIRST_VERSION_NUMBER,
            text: text.to_string(),
            edit_author_id: author_id.map(str::to_string),
            created_at: Utc::now(),
        }
    }
}
