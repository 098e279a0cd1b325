//! # hustings-ranking
//!
//! Rank scoring (pluggable strategy, default weighted net votes) and the
//! quota-aware top-N selection that reserves seats for under-represented
//! viewpoints.

pub mod engine;
pub mod selection;
pub mod strategy;

pub use engine::RankingEngine;
pub use selection::{select, SelectionCandidate, SelectionParams, TopSelection};
pub use strategy::WeightedNetVotes;
