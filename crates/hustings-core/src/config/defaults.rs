//! Named default values for every configurable knob.

/// Cosine similarity at or above which two questions are duplicates.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Nearest neighbors fetched per dedup query.
pub const DEFAULT_DEDUP_QUERY_K: usize = 8;

/// Size of the top-questions list.
pub const DEFAULT_TOP_QUESTIONS_COUNT: usize = 100;

/// Per-issue-tag cap in the main portion of the top list.
pub const DEFAULT_CLUSTER_MAX_QUESTIONS: usize = 5;

/// Seats reserved for under-represented viewpoints.
pub const DEFAULT_MINORITY_CONCERN_SLOTS: usize = 10;

/// Bounded retries for a lost compare-and-swap on vote counters.
pub const DEFAULT_CAS_MAX_RETRIES: u32 = 5;

/// Question text length bounds (characters).
pub const DEFAULT_MIN_TEXT_CHARS: usize = 10;
pub const DEFAULT_MAX_TEXT_CHARS: usize = 500;

/// Maximum issue tags per question.
pub const DEFAULT_MAX_ISSUE_TAGS: usize = 5;
