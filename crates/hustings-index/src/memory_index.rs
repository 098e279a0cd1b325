//! Brute-force in-memory index. A linear cosine scan per contest is
//! plenty at contest scale (thousands of questions) and keeps results
//! exact and deterministic.

use std::collections::HashMap;

use dashmap::DashMap;
use tracing::debug;

use hustings_core::errors::EngineResult;
use hustings_core::traits::IVectorIndex;

use crate::cosine::cosine_similarity;

/// Per-contest vector store, shared across engine instances.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    /// contest_id → (question_id → vector).
    contests: DashMap<String, HashMap<String, Vec<f32>>>,
    /// question_id → contest_id, so removal does not need the contest.
    locations: DashMap<String, String>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IVectorIndex for InMemoryVectorIndex {
    fn upsert(&self, contest_id: &str, question_id: &str, vector: &[f32]) -> EngineResult<()> {
        // Re-indexing under a different contest would leave a stale entry;
        // drop the old location first.
        if let Some(previous) = self.locations.get(question_id) {
            if previous.value() != contest_id {
                let old_contest = previous.value().clone();
                drop(previous);
                if let Some(mut entries) = self.contests.get_mut(&old_contest) {
                    entries.remove(question_id);
                }
            }
        }

        self.contests
            .entry(contest_id.to_string())
            .or_default()
            .insert(question_id.to_string(), vector.to_vec());
        self.locations
            .insert(question_id.to_string(), contest_id.to_string());

        debug!(contest_id, question_id, dims = vector.len(), "indexed vector");
        Ok(())
    }

    fn remove(&self, question_id: &str) -> EngineResult<()> {
        if let Some((_, contest_id)) = self.locations.remove(question_id) {
            if let Some(mut entries) = self.contests.get_mut(&contest_id) {
                entries.remove(question_id);
            }
        }
        Ok(())
    }

    fn query(
        &self,
        contest_id: &str,
        vector: &[f32],
        k: usize,
    ) -> EngineResult<Vec<(String, f64)>> {
        let Some(entries) = self.contests.get(contest_id) else {
            return Ok(vec![]);
        };

        let mut scored: Vec<(String, f64)> = entries
            .iter()
            .map(|(id, stored)| (id.clone(), cosine_similarity(vector, stored)))
            .collect();

        // Similarity descending; equal similarities by ascending id so the
        // oldest (lowest) id wins as canonical.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);
        Ok(scored)
    }

    fn contest_len(&self, contest_id: &str) -> usize {
        self.contests.get(contest_id).map_or(0, |e| e.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_then_query_finds_nearest() {
        let index = InMemoryVectorIndex::new();
        index.upsert("c1", "q-a", &[1.0, 0.0, 0.0]).unwrap();
        index.upsert("c1", "q-b", &[0.0, 1.0, 0.0]).unwrap();

        let hits = index.query("c1", &[0.9, 0.1, 0.0], 2).unwrap();
        assert_eq!(hits[0].0, "q-a");
        assert!(hits[0].1 > hits[1].1);
    }

    #[test]
    fn queries_are_contest_scoped() {
        let index = InMemoryVectorIndex::new();
        index.upsert("c1", "q-a", &[1.0, 0.0]).unwrap();
        index.upsert("c2", "q-b", &[1.0, 0.0]).unwrap();

        let hits = index.query("c1", &[1.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "q-a");
    }

    #[test]
    fn equal_similarity_ties_break_to_lowest_id() {
        let index = InMemoryVectorIndex::new();
        index.upsert("c1", "q-0002", &[1.0, 0.0]).unwrap();
        index.upsert("c1", "q-0001", &[1.0, 0.0]).unwrap();

        let hits = index.query("c1", &[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].0, "q-0001");
        assert_eq!(hits[1].0, "q-0002");
    }

    #[test]
    fn remove_drops_the_entry() {
        let index = InMemoryVectorIndex::new();
        index.upsert("c1", "q-a", &[1.0, 0.0]).unwrap();
        index.remove("q-a").unwrap();
        assert_eq!(index.contest_len("c1"), 0);
        assert!(index.query("c1", &[1.0, 0.0], 1).unwrap().is_empty());
    }

    #[test]
    fn reupsert_moves_between_contests() {
        let index = InMemoryVectorIndex::new();
        index.upsert("c1", "q-a", &[1.0, 0.0]).unwrap();
        index.upsert("c2", "q-a", &[1.0, 0.0]).unwrap();
        assert_eq!(index.contest_len("c1"), 0);
        assert_eq!(index.contest_len("c2"), 1);
    }
}
