use thiserror::Error;

/// Result alias used across the workspace.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine-wide error taxonomy.
///
/// Every user-visible failure carries a stable `kind()` string so API
/// callers can branch on cause without parsing messages.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input, rejected before any write. Never retried.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// Caller lacks the right to perform the operation.
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// Entity absent or in a terminal status.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// An external collaborator (embedding provider, vector index) is down.
    /// Recovered locally by fail-open degraded behavior where possible.
    #[error("{dependency} unavailable: {reason}")]
    DependencyUnavailable {
        dependency: &'static str,
        reason: String,
    },

    /// Lost compare-and-swap on vote counters after bounded retries.
    #[error("concurrent update conflict after {attempts} attempts")]
    ConcurrencyConflict { attempts: u32 },

    /// Storage-layer failure (SQLite, serialization).
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl EngineError {
    /// Stable error kind for API callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::DependencyUnavailable { .. } => "dependency_unavailable",
            Self::ConcurrencyConflict { .. } => "concurrency_conflict",
            Self::Storage { .. } => "storage",
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Shorthand for a forbidden failure.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Shorthand for a not-found failure.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(EngineError::validation("x").kind(), "validation");
        assert_eq!(EngineError::forbidden("x").kind(), "forbidden");
        assert_eq!(EngineError::not_found("question", "q1").kind(), "not_found");
        assert_eq!(
            EngineError::ConcurrencyConflict { attempts: 3 }.kind(),
            "concurrency_conflict"
        );
    }

    #[test]
    fn not_found_names_the_entity() {
        let e = EngineError::not_found("cluster", "c42");
        assert_eq!(e.to_string(), "cluster not found: c42");
    }
}
