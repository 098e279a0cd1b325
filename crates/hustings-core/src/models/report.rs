use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::target::TargetRef;

/// A user report against a question, answer, or rebuttal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// UUID v4 identifier.
    pub id: String,
    pub target: TargetRef,
    pub reporter_id: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn new(target: TargetRef, reporter_id: &str, reason: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            target,
            reporter_id: reporter_id.to_string(),
            reason: reason.to_string(),
            created_at: Utc::now(),
        }
    }
}
