//! Quota-aware top-N selection.
//!
//! Two fill phases over the approved cluster representatives:
//!
//! 1. Main phase: `n - minority_slots` seats, greedily by rank, but no
//!    issue tag may appear on more than `cluster_cap` main picks. This
//!    stops one hot topic from monopolizing the list through several
//!    near-duplicate-but-not-merged questions.
//! 2. Minority phase: the remaining seats go to unselected candidates
//!    whose tag sets are disjoint from every tag picked in phase 1,
//!    ranked by score. When the disjoint pool runs dry, seats fall back
//!    to the next-highest-ranked unselected candidates so no seat is
//!    wasted.
//!
//! Pure function of its inputs: no clock, no randomness. Repeated calls
//! over unchanged data return identical output.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// One approved cluster representative entering selection.
#[derive(Debug, Clone)]
pub struct SelectionCandidate {
    pub question_id: String,
    pub rank_score: f64,
    pub created_at: DateTime<Utc>,
    pub issue_tags: Vec<String>,
}

/// Knobs for one selection run.
#[derive(Debug, Clone, Copy)]
pub struct SelectionParams {
    /// Total list size.
    pub n: usize,
    /// Per-tag cap in the main phase.
    pub cluster_cap: usize,
    /// Seats reserved for the diversity phase.
    pub minority_slots: usize,
}

/// Selection output, split by phase for auditability.
#[derive(Debug, Clone, Default)]
pub struct TopSelection {
    /// Main-phase picks, rank order.
    pub main: Vec<String>,
    /// Minority-phase picks, rank order within the phase.
    pub minority: Vec<String>,
    /// How many minority picks were genuine disjoint-tag fills (the rest
    /// were next-best fallbacks).
    pub disjoint_fills: usize,
}

impl TopSelection {
    /// The final ordered list: main picks then minority picks.
    pub fn ordered(&self) -> Vec<String> {
        self.main
            .iter()
            .chain(self.minority.iter())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.main.len() + self.minority.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.minority.is_empty()
    }
}

/// Run the two-phase selection.
pub fn select(candidates: &[SelectionCandidate], params: &SelectionParams) -> TopSelection {
    let mut sorted: Vec<&SelectionCandidate> = candidates.iter().collect();
    // Score descending, then earliest submission, then id for total order.
    sorted.sort_by(|a, b| {
        b.rank_score
            .partial_cmp(&a.rank_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.question_id.cmp(&b.question_id))
    });

    let main_seats = params.n.saturating_sub(params.minority_slots);

    // Phase 1: greedy fill under the per-tag cap.
    let mut selection = TopSelection::default();
    let mut selected: HashSet<&str> = HashSet::new();
    let mut tag_counts: HashMap<&str, usize> = HashMap::new();

    for candidate in &sorted {
        if selection.main.len() >= main_seats {
            break;
        }
        let capped = candidate
            .issue_tags
            .iter()
            .any(|tag| tag_counts.get(tag.as_str()).copied().unwrap_or(0) >= params.cluster_cap);
        if capped {
            continue;
        }
        for tag in &candidate.issue_tags {
            *tag_counts.entry(tag.as_str()).or_insert(0) += 1;
        }
        selected.insert(candidate.question_id.as_str());
        selection.main.push(candidate.question_id.clone());
    }

    // Phase 2: diversity fill, then next-best fallback.
    let main_tags: HashSet<&str> = selection
        .main
        .iter()
        .filter_map(|id| sorted.iter().find(|c| &c.question_id == id))
        .flat_map(|c| c.issue_tags.iter().map(String::as_str))
        .collect();

    let mut remaining = params.n.saturating_sub(selection.main.len());

    for candidate in &sorted {
        if remaining == 0 {
            break;
        }
        if selected.contains(candidate.question_id.as_str()) {
            continue;
        }
        let disjoint = candidate
            .issue_tags
            .iter()
            .all(|tag| !main_tags.contains(tag.as_str()));
        if disjoint {
            selected.insert(candidate.question_id.as_str());
            selection.minority.push(candidate.question_id.clone());
            selection.disjoint_fills += 1;
            remaining -= 1;
        }
    }

    // Fallback: no disjoint-tag candidate left, take the next highest
    // ranked instead of leaving seats empty.
    for candidate in &sorted {
        if remaining == 0 {
            break;
        }
        if selected.contains(candidate.question_id.as_str()) {
            continue;
        }
        selected.insert(candidate.question_id.as_str());
        selection.minority.push(candidate.question_id.clone());
        remaining -= 1;
    }

    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn candidate(id: &str, score: f64, age_secs: i64, tags: &[&str]) -> SelectionCandidate {
        SelectionCandidate {
            question_id: id.to_string(),
            rank_score: score,
            created_at: chrono::DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
                - Duration::seconds(age_secs),
            issue_tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn params(n: usize, cap: usize, slots: usize) -> SelectionParams {
        SelectionParams {
            n,
            cluster_cap: cap,
            minority_slots: slots,
        }
    }

    #[test]
    fn fills_by_rank_when_no_quota_pressure() {
        let candidates = vec![
            candidate("q-a", 10.0, 0, &["roads"]),
            candidate("q-b", 20.0, 0, &["housing"]),
            candidate("q-c", 5.0, 0, &["schools"]),
        ];
        let result = select(&candidates, &params(3, 5, 0));
        assert_eq!(result.ordered(), vec!["q-b", "q-a", "q-c"]);
    }

    #[test]
    fn per_tag_cap_blocks_a_hot_topic() {
        let mut candidates: Vec<SelectionCandidate> = (0..4)
            .map(|i| candidate(&format!("q-road-{i}"), 100.0 - i as f64, 0, &["roads"]))
            .collect();
        candidates.push(candidate("q-h", 1.0, 0, &["housing"]));

        // Main phase has 3 seats, cap 2 per tag: only two road questions
        // may enter; housing takes the third seat despite its low score.
        let result = select(&candidates, &params(3, 2, 0));
        assert_eq!(result.main, vec!["q-road-0", "q-road-1", "q-h"]);
    }

    #[test]
    fn minority_slots_prefer_disjoint_tags() {
        let candidates = vec![
            candidate("q-r1", 50.0, 0, &["roads"]),
            candidate("q-r2", 40.0, 0, &["roads", "budget"]),
            candidate("q-s", 30.0, 0, &["schools"]),
            candidate("q-b", 20.0, 0, &["budget"]),
        ];
        // n=3, one minority seat: main takes q-r1, q-r2 (tags roads,
        // budget). q-s is disjoint, q-b overlaps on budget: q-s wins
        // the seat even though it also out-ranks q-b.
        let result = select(&candidates, &params(3, 5, 1));
        assert_eq!(result.main, vec!["q-r1", "q-r2"]);
        assert_eq!(result.minority, vec!["q-s"]);
        assert_eq!(result.disjoint_fills, 1);
    }

    #[test]
    fn minority_falls_back_when_no_disjoint_candidate_exists() {
        let candidates = vec![
            candidate("q-r1", 50.0, 0, &["roads"]),
            candidate("q-r2", 40.0, 0, &["roads"]),
            candidate("q-r3", 30.0, 0, &["roads"]),
        ];
        let result = select(&candidates, &params(3, 5, 1));
        assert_eq!(result.main, vec!["q-r1", "q-r2"]);
        // No disjoint candidate: the slot is filled by the next-highest
        // unselected representative, not left empty.
        assert_eq!(result.minority, vec!["q-r3"]);
        assert_eq!(result.disjoint_fills, 0);
    }

    #[test]
    fn untagged_questions_are_never_capped() {
        let candidates: Vec<SelectionCandidate> = (0..5)
            .map(|i| candidate(&format!("q-{i}"), 10.0 - i as f64, 0, &[]))
            .collect();
        let result = select(&candidates, &params(5, 1, 0));
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn ties_break_by_earliest_submission() {
        let candidates = vec![
            candidate("q-young", 10.0, 10, &[]),
            candidate("q-old", 10.0, 100, &[]),
        ];
        let result = select(&candidates, &params(2, 5, 0));
        assert_eq!(result.ordered(), vec!["q-old", "q-young"]);
    }

    #[test]
    fn short_pools_return_everything() {
        let candidates = vec![candidate("q-a", 1.0, 0, &["roads"])];
        let result = select(&candidates, &params(100, 5, 10));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn selection_is_deterministic() {
        let candidates: Vec<SelectionCandidate> = (0..30)
            .map(|i| {
                candidate(
                    &format!("q-{i:02}"),
                    (i % 7) as f64,
                    i,
                    &[["roads", "housing", "schools"][i as usize % 3]],
                )
            })
            .collect();
        let p = params(10, 2, 3);
        assert_eq!(select(&candidates, &p).ordered(), select(&candidates, &p).ordered());
    }
}
