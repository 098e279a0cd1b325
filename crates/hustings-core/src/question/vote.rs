use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a stored vote. A retraction deletes the row instead of
/// storing a zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    /// Signed integer form: +1 or -1.
    pub fn signed(self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// Parse the signed storage form.
    pub fn from_signed(v: i8) -> Option<Self> {
        match v {
            1 => Some(Self::Up),
            -1 => Some(Self::Down),
            _ => None,
        }
    }
}

/// What a caller asks the vote ledger to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastValue {
    Up,
    Down,
    /// Remove an existing vote. Idempotent when none exists.
    Retract,
}

impl CastValue {
    /// Parse the wire form: value ∈ {-1, 0, +1}.
    pub fn from_signed(v: i8) -> Option<Self> {
        match v {
            1 => Some(Self::Up),
            0 => Some(Self::Retract),
            -1 => Some(Self::Down),
            _ => None,
        }
    }

    /// The stored direction, or `None` for a retraction.
    pub fn as_vote(self) -> Option<VoteValue> {
        match self {
            Self::Up => Some(VoteValue::Up),
            Self::Down => Some(VoteValue::Down),
            Self::Retract => None,
        }
    }
}

/// One user's vote on one question.
///
/// At most one live row exists per (user, question); re-voting updates the
/// row in place, last write wins by `cast_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: String,
    pub question_id: String,
    pub value: VoteValue,
    /// Fraud-adjusted multiplier in [0, 1]. Always a multiplier in score
    /// math, never a hard filter.
    pub weight: f64,
    /// Raw device risk signal captured at cast time.
    pub device_risk_score: f64,
    /// Request timestamp used for last-write-wins sequencing.
    pub cast_at: DateTime<Utc>,
}

impl Vote {
    /// The vote's contribution to a rank score: `value × weight`.
    pub fn signed_weight(&self) -> f64 {
        f64::from(self.value.signed()) * self.weight
    }
}
