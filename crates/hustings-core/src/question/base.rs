use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a question.
///
/// Questions are never hard-deleted; removal is a status transition so the
/// audit trail survives moderation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    /// Awaiting moderation.
    Pending,
    /// Visible and eligible for the top list.
    Approved,
    /// Folded into another question's cluster as a non-representative member.
    Merged,
    /// Soft-deleted by moderation.
    Removed,
}

impl QuestionStatus {
    /// Whether the question still contributes to cluster aggregates.
    pub fn is_live(self) -> bool {
        self != Self::Removed
    }

    /// Whether the question can receive votes directly.
    /// Merged members carry their historical votes but new votes must
    /// target the cluster representative.
    pub fn is_votable(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Merged => "merged",
            Self::Removed => "removed",
        }
    }

    /// Parse the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "merged" => Some(Self::Merged),
            "removed" => Some(Self::Removed),
            _ => None,
        }
    }
}

/// A voter-submitted question in a contest.
///
/// `text` is a cached copy of the current version's text; the immutable
/// history lives in [`super::QuestionVersion`] rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// UUID v4 identifier.
    pub id: String,
    /// Contest this question belongs to.
    pub contest_id: String,
    /// Submitting user. `None` once the author account is deleted.
    pub author_id: Option<String>,
    /// Number of the current version (monotonic, starts at 1).
    pub current_version: u32,
    /// Cached text of the current version.
    pub text: String,
    /// Normalized issue tags, at most five.
    pub issue_tags: Vec<String>,
    /// Lifecycle status.
    pub status: QuestionStatus,
    /// Cluster this question is a member of.
    pub cluster_id: String,
    /// 384-dim embedding. `None` when the provider was unavailable at
    /// write time; a maintenance pass backfills it.
    pub embedding: Option<Vec<f32>>,
    /// Direct upvote count.
    pub upvotes: u64,
    /// Direct downvote count.
    pub downvotes: u64,
    /// Fraud-weighted net vote score.
    pub rank_score: f64,
    /// Flagged for moderator attention.
    pub is_flagged: bool,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl Question {
    /// Normalize user-supplied tags: trim, lowercase, drop empties and
    /// duplicates, preserving first-seen order.
    pub fn normalize_tags(tags: &[String]) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        tags.iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }

    /// Whether any issue tag is shared with `other_tags`.
    pub fn shares_tag_with(&self, other_tags: &[String]) -> bool {
        self.issue_tags.iter().any(|t| other_tags.contains(t))
    }
}

/// Identity equality: two questions are equal if they have the same ID.
/// Content lives in versions; the entity's identity is its UUID.
impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            QuestionStatus::Pending,
            QuestionStatus::Approved,
            QuestionStatus::Merged,
            QuestionStatus::Removed,
        ] {
            assert_eq!(QuestionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(QuestionStatus::parse("bogus"), None);
    }

    #[test]
    fn merged_is_live_but_not_votable() {
        assert!(QuestionStatus::Merged.is_live());
        assert!(!QuestionStatus::Merged.is_votable());
        assert!(!QuestionStatus::Removed.is_live());
    }

    #[test]
    fn tag_normalization_dedups_and_lowercases() {
        let tags = vec![
            " Housing ".to_string(),
            "housing".to_string(),
            "ROADS".to_string(),
            "".to_string(),
        ];
        assert_eq!(Question::normalize_tags(&tags), vec!["housing", "roads"]);
    }
}
