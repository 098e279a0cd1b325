//! The worked contest scenario: a popular pothole question, a
//! near-duplicate that auto-merges, and a lower-ranked housing question
//! that the diversity slot must keep in the top list.

use std::collections::HashMap;
use std::sync::Arc;

use hustings_core::config::EngineConfig;
use hustings_core::errors::{EngineError, EngineResult};
use hustings_core::models::Actor;
use hustings_core::question::QuestionStatus;
use hustings_core::traits::{IEmbeddingProvider, IQuestionStorage, IVectorIndex};
use hustings_engine::QuestionEngine;
use hustings_index::InMemoryVectorIndex;
use hustings_storage::StorageEngine;

const Q1_TEXT: &str = "How will you fix potholes?";
const Q2_TEXT: &str = "What is your pothole repair plan?";
const Q3_TEXT: &str = "What is your housing policy?";

struct ScenarioProvider;

impl IEmbeddingProvider for ScenarioProvider {
    fn embed(&self, text: &str) -> EngineResult<Vec<f32>> {
        // Q2's vector is built to sit at cosine 0.91 against Q1's, above
        // the 0.85 threshold; Q3 is orthogonal to both.
        let vectors: HashMap<&str, Vec<f32>> = HashMap::from([
            (Q1_TEXT, vec![1.0, 0.0, 0.0, 0.0]),
            (Q2_TEXT, vec![0.91, 0.414_6, 0.0, 0.0]),
            (Q3_TEXT, vec![0.0, 0.0, 1.0, 0.0]),
        ]);
        vectors
            .get(text)
            .cloned()
            .ok_or_else(|| EngineError::DependencyUnavailable {
                dependency: "embedding provider",
                reason: format!("no vector for: {text}"),
            })
    }
    fn embed_batch(&self, texts: &[String]) -> EngineResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
    fn dimensions(&self) -> usize {
        4
    }
    fn name(&self) -> &str {
        "scenario"
    }
    fn is_available(&self) -> bool {
        true
    }
}

#[test]
fn pothole_contest_scenario() {
    let storage: Arc<dyn IQuestionStorage> = Arc::new(StorageEngine::open_in_memory().unwrap());
    let index: Arc<dyn IVectorIndex> = Arc::new(InMemoryVectorIndex::new());
    let engine = QuestionEngine::new(
        storage.clone(),
        index,
        Arc::new(ScenarioProvider),
        EngineConfig::default(),
    );

    let author = Actor::verified_voter("author");
    let q1 = engine
        .submit_question("contest", &author, Q1_TEXT, &["roads".to_string()])
        .unwrap();
    let q2 = engine
        .submit_question("contest", &author, Q2_TEXT, &["roads".to_string()])
        .unwrap();
    let q3 = engine
        .submit_question("contest", &author, Q3_TEXT, &["housing".to_string()])
        .unwrap();

    // Q2 auto-merged into Q1's cluster; no independent rank.
    assert_eq!(q2.status, QuestionStatus::Merged);
    assert_eq!(q2.cluster_id, q1.cluster_id);

    // 47 upvotes for Q1, 12 for Q3.
    for i in 0..47 {
        let voter = Actor::verified_voter(&format!("pothole-voter-{i}"));
        engine.cast_vote(&voter, &q1.id, 1).unwrap();
    }
    for i in 0..12 {
        let voter = Actor::verified_voter(&format!("housing-voter-{i}"));
        engine.cast_vote(&voter, &q3.id, 1).unwrap();
    }

    // The cluster aggregate equals Q1's votes plus Q2's own (none).
    let q1_state = engine.get_question(&q1.id).unwrap();
    assert_eq!(q1_state.upvotes, 47);
    assert_eq!(q1_state.rank_score, 47.0);
    let cluster = storage.get_cluster(&q1.cluster_id).unwrap().unwrap();
    assert_eq!(cluster.aggregate_upvotes, 47);
    assert_eq!(cluster.len(), 2);

    // top_n(n=2, minority_slots=1): Q1 takes the main seat by score, Q3
    // takes the guaranteed diversity seat. Q2 never appears.
    let top = engine.get_top_questions_with("contest", 2, 5, 1).unwrap();
    let ids: Vec<&str> = top.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec![q1.id.as_str(), q3.id.as_str()]);

    // Deterministic: repeated calls over unchanged data agree.
    let again = engine.get_top_questions_with("contest", 2, 5, 1).unwrap();
    assert_eq!(
        again.iter().map(|q| q.id.as_str()).collect::<Vec<_>>(),
        ids
    );
}
