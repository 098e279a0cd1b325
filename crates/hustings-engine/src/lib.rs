//! # hustings-engine
//!
//! The question ranking and deduplication engine for election contests:
//! voters submit free-text questions, near-duplicates merge into
//! clusters behind one representative, fraud-weighted votes drive an
//! auditable rank score, and the top list reserves seats for minority
//! viewpoints. This crate is the facade the API layer talks to.

pub mod engine;
pub mod maintenance;
pub mod moderation;
pub mod versioning;
pub mod votes;

pub use engine::QuestionEngine;
pub use maintenance::MaintenanceEngine;
pub use moderation::ModerationEngine;
pub use versioning::VersioningEngine;
pub use votes::VoteLedger;
