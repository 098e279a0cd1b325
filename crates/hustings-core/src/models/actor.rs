use serde::{Deserialize, Serialize};

/// Role supplied by the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Voter,
    Moderator,
}

/// Identity-verification state supplied by the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
}

/// An already-authenticated, role-tagged actor. The engine never performs
/// authentication itself; it only enforces role and verification checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
    pub verification: VerificationStatus,
}

impl Actor {
    /// A verified voter — the common case in tests.
    pub fn verified_voter(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            role: Role::Voter,
            verification: VerificationStatus::Verified,
        }
    }

    /// A moderator (always verified).
    pub fn moderator(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            role: Role::Moderator,
            verification: VerificationStatus::Verified,
        }
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }

    pub fn is_verified(&self) -> bool {
        self.verification == VerificationStatus::Verified
    }
}
