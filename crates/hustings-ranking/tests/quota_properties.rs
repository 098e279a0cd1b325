//! Property tests for quota-aware selection.

use chrono::{DateTime, Duration, Utc};
use hustings_ranking::{select, SelectionCandidate, SelectionParams};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

const TAG_POOL: &[&str] = &["roads", "housing", "schools", "budget", "parks", "transit"];

fn arb_candidates() -> impl Strategy<Value = Vec<SelectionCandidate>> {
    prop::collection::vec(
        (
            0.0f64..100.0,
            0i64..10_000,
            prop::collection::vec(0usize..TAG_POOL.len(), 0..4),
        ),
        0..60,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (score, age, tag_idx))| {
                let tags: HashSet<&str> = tag_idx.iter().map(|&t| TAG_POOL[t]).collect();
                SelectionCandidate {
                    question_id: format!("q-{i:03}"),
                    rank_score: score,
                    created_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
                        - Duration::seconds(age),
                    issue_tags: tags.into_iter().map(str::to_string).collect(),
                }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn main_phase_respects_the_per_tag_cap(
        candidates in arb_candidates(),
        n in 1usize..30,
        cap in 1usize..6,
        slots in 0usize..10,
    ) {
        let result = select(&candidates, &SelectionParams { n, cluster_cap: cap, minority_slots: slots });

        let mut tag_counts: HashMap<&str, usize> = HashMap::new();
        for id in &result.main {
            let candidate = candidates.iter().find(|c| &c.question_id == id).unwrap();
            for tag in &candidate.issue_tags {
                *tag_counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }
        for (tag, count) in tag_counts {
            prop_assert!(count <= cap, "tag {tag} appears {count} times, cap {cap}");
        }
    }

    #[test]
    fn output_length_is_bounded_and_duplicate_free(
        candidates in arb_candidates(),
        n in 1usize..30,
        cap in 1usize..6,
        slots in 0usize..10,
    ) {
        let result = select(&candidates, &SelectionParams { n, cluster_cap: cap, minority_slots: slots });
        let ordered = result.ordered();
        prop_assert!(ordered.len() <= n);
        prop_assert!(ordered.len() <= candidates.len());
        let unique: HashSet<&String> = ordered.iter().collect();
        prop_assert_eq!(unique.len(), ordered.len());
    }

    #[test]
    fn disjoint_fills_share_no_tag_with_main_picks(
        candidates in arb_candidates(),
        n in 1usize..30,
        cap in 1usize..6,
        slots in 1usize..10,
    ) {
        let result = select(&candidates, &SelectionParams { n, cluster_cap: cap, minority_slots: slots });

        let main_tags: HashSet<&str> = result
            .main
            .iter()
            .flat_map(|id| {
                candidates
                    .iter()
                    .find(|c| &c.question_id == id)
                    .unwrap()
                    .issue_tags
                    .iter()
                    .map(String::as_str)
            })
            .collect();

        // The first `disjoint_fills` minority picks are the diversity
        // fills; each must be tag-disjoint from the whole main phase.
        for id in result.minority.iter().take(result.disjoint_fills) {
            let candidate = candidates.iter().find(|c| &c.question_id == id).unwrap();
            for tag in &candidate.issue_tags {
                prop_assert!(!main_tags.contains(tag.as_str()));
            }
        }
    }

    #[test]
    fn selection_is_a_pure_function(
        candidates in arb_candidates(),
        n in 1usize..30,
        cap in 1usize..6,
        slots in 0usize..10,
    ) {
        let p = SelectionParams { n, cluster_cap: cap, minority_slots: slots };
        prop_assert_eq!(select(&candidates, &p).ordered(), select(&candidates, &p).ordered());
    }
}
