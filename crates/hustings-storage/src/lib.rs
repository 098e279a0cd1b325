//! # hustings-storage
//!
//! SQLite persistence layer. Owns the connection pool and migrations and
//! implements `IQuestionStorage`: transactional multi-entity writes,
//! compare-and-swap vote counters, and the pending-index queue that keeps
//! the vector index eventually consistent with the store.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use hustings_core::errors::EngineError;

/// Map any storage-layer failure into the engine error taxonomy.
pub(crate) fn to_storage_err(message: impl Into<String>) -> EngineError {
    EngineError::Storage {
        message: message.into(),
    }
}
