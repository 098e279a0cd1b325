use serde::{Deserialize, Serialize};

/// Polymorphic moderation/report target.
///
/// A tagged variant instead of a loose (kind string, id) pair so every
/// handler is forced to match each kind exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
#[serde(rename_all = "snake_case")]
pub enum TargetRef {
    Question(String),
    Answer(String),
    Rebuttal(String),
}

impl TargetRef {
    /// Stable kind string for storage and API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Question(_) => "question",
            Self::Answer(_) => "answer",
            Self::Rebuttal(_) => "rebuttal",
        }
    }

    /// The referenced entity id.
    pub fn id(&self) -> &str {
        match self {
            Self::Question(id) | Self::Answer(id) | Self::Rebuttal(id) => id,
        }
    }
}
