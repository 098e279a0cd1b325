use serde::{Deserialize, Serialize};

use super::defaults;

/// Submission validation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Minimum question text length in characters.
    pub min_text_chars: usize,
    /// Maximum question text length in characters.
    pub max_text_chars: usize,
    /// Maximum issue tags per question.
    pub max_issue_tags: usize,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            min_text_chars: defaults::DEFAULT_MIN_TEXT_CHARS,
            max_text_chars: defaults::DEFAULT_MAX_TEXT_CHARS,
            max_issue_tags: defaults::DEFAULT_MAX_ISSUE_TAGS,
        }
    }
}
