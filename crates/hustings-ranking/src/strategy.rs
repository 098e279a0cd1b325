//! Rank-score strategies.
//!
//! The default is deliberately a flat weighted net-vote sum: simple,
//! auditable, and re-derivable from the live vote set. Recency decay or
//! Wilson-interval smoothing slot in as alternative `IRankStrategy`
//! implementations without touching quota selection.

use hustings_core::question::Vote;
use hustings_core::traits::IRankStrategy;

/// `rank_score = Σ (value × weight)` over live votes.
///
/// Weight is a multiplier, never a filter: a low-confidence vote still
/// counts, proportionally less.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedNetVotes;

impl IRankStrategy for WeightedNetVotes {
    fn score(&self, votes: &[Vote]) -> f64 {
        votes.iter().map(Vote::signed_weight).sum()
    }

    fn name(&self) -> &str {
        "weighted-net-votes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hustings_core::question::VoteValue;

    fn vote(value: VoteValue, weight: f64) -> Vote {
        Vote {
            user_id: "u".to_string(),
            question_id: "q".to_string(),
            value,
            weight,
            device_risk_score: 0.0,
            cast_at: Utc::now(),
        }
    }

    #[test]
    fn empty_votes_score_zero() {
        assert_eq!(WeightedNetVotes.score(&[]), 0.0);
    }

    #[test]
    fn weights_multiply_instead_of_filtering() {
        let votes = vec![
            vote(VoteValue::Up, 1.0),
            vote(VoteValue::Up, 0.25),
            vote(VoteValue::Down, 0.5),
        ];
        assert!((WeightedNetVotes.score(&votes) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn score_is_reproducible() {
        let votes = vec![vote(VoteValue::Up, 1.0), vote(VoteValue::Down, 1.0)];
        assert_eq!(
            WeightedNetVotes.score(&votes),
            WeightedNetVotes.score(&votes)
        );
    }
}
