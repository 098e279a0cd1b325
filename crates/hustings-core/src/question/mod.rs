pub mod base;
pub mod cluster;
pub mod version;
pub mod vote;

pub use base::{Question, QuestionStatus};
pub use cluster::Cluster;
pub use version::QuestionVersion;
pub use vote::{CastValue, Vote, VoteValue};
