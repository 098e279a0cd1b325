use serde::{Deserialize, Serialize};

/// Outcome of a deduplication check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateVerdict {
    /// Whether the text duplicates an existing question.
    pub is_duplicate: bool,
    /// The matched question, present iff `is_duplicate`.
    pub matched_question_id: Option<String>,
    /// Cosine similarity to the nearest neighbor (0.0 when none exists
    /// or the embedding provider was unavailable).
    pub similarity: f64,
}

impl DuplicateVerdict {
    /// No duplicate found (or dedup failed open).
    pub fn unique(similarity: f64) -> Self {
        Self {
            is_duplicate: false,
            matched_question_id: None,
            similarity,
        }
    }

    /// Duplicate of `question_id` at the given similarity.
    pub fn duplicate_of(question_id: &str, similarity: f64) -> Self {
        Self {
            is_duplicate: true,
            matched_question_id: Some(question_id.to_string()),
            similarity,
        }
    }
}
