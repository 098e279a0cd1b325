use crate::question::Vote;

/// Pluggable rank-score strategy.
///
/// The default is a flat weighted net-vote sum; decay or Wilson-interval
/// variants can be substituted without touching quota selection. The
/// contract: vote weight is a multiplier, never a hard filter.
pub trait IRankStrategy: Send + Sync {
    /// Compute a question's rank score from its live votes.
    fn score(&self, votes: &[Vote]) -> f64;

    /// Human-readable strategy name.
    fn name(&self) -> &str;
}
