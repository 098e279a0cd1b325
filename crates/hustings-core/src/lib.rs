//! # hustings-core
//!
//! Foundation crate for the hustings question ranking engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod question;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::EngineConfig;
pub use errors::{EngineError, EngineResult};
pub use question::{Cluster, Question, QuestionStatus, QuestionVersion, Vote, VoteValue};
