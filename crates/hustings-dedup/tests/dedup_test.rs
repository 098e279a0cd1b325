//! Dedup verdicts and cluster management against real storage and index.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use hustings_core::config::DedupConfig;
use hustings_core::errors::{EngineError, EngineResult};
use hustings_core::question::{Cluster, Question, QuestionStatus, QuestionVersion};
use hustings_core::traits::{
    ClusterPlacement, IEmbeddingProvider, IQuestionStorage, IVectorIndex,
};
use hustings_dedup::{ClusterManager, DedupEngine};
use hustings_index::InMemoryVectorIndex;
use hustings_storage::StorageEngine;

/// Maps exact texts to fixed vectors so similarities are controlled.
struct StubProvider {
    vectors: HashMap<String, Vec<f32>>,
}

impl StubProvider {
    fn new(entries: &[(&str, Vec<f32>)]) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(t, v)| (t.to_string(), v.clone()))
                .collect(),
        }
    }
}

impl IEmbeddingProvider for StubProvider {
    fn embed(&self, text: &str) -> EngineResult<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| EngineError::DependencyUnavailable {
                dependency: "embedding provider",
                reason: format!("no stub vector for: {text}"),
            })
    }
    fn embed_batch(&self, texts: &[String]) -> EngineResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
    fn dimensions(&self) -> usize {
        4
    }
    fn name(&self) -> &str {
        "stub"
    }
    fn is_available(&self) -> bool {
        true
    }
}

struct Fixture {
    storage: Arc<StorageEngine>,
    index: Arc<InMemoryVectorIndex>,
    dedup: DedupEngine,
    clusters: ClusterManager,
}

fn fixture(provider: StubProvider) -> Fixture {
    let storage: Arc<StorageEngine> = Arc::new(StorageEngine::open_in_memory().unwrap());
    let index = Arc::new(InMemoryVectorIndex::new());
    let dedup = DedupEngine::new(
        Arc::new(provider),
        index.clone(),
        storage.clone(),
        DedupConfig {
            embedding_dimensions: 4,
            ..Default::default()
        },
    );
    let clusters = ClusterManager::new(storage.clone());
    Fixture {
        storage,
        index,
        dedup,
        clusters,
    }
}

/// Create an approved singleton question, indexed immediately.
fn seed_question(fx: &Fixture, id: &str, text: &str, vector: &[f32], age_secs: i64) {
    let mut cluster = Cluster::singleton("c-1", id);
    cluster.id = format!("cluster-{id}");
    let question = Question {
        id: id.to_string(),
        contest_id: "c-1".to_string(),
        author_id: Some("author-1".to_string()),
        current_version: 1,
        text: text.to_string(),
        issue_tags: vec![],
        status: QuestionStatus::Approved,
        cluster_id: cluster.id.clone(),
        embedding: Some(vector.to_vec()),
        upvotes: 0,
        downvotes: 0,
        rank_score: 0.0,
        is_flagged: false,
        created_at: Utc::now() - Duration::seconds(age_secs),
    };
    let version = QuestionVersion::initial(id, Some("author-1"), text);
    fx.storage
        .create_question(&question, &version, ClusterPlacement::NewCluster(&cluster))
        .unwrap();
    fx.index.upsert("c-1", id, vector).unwrap();
}

#[test]
fn near_identical_text_is_a_duplicate() {
    let fx = fixture(StubProvider::new(&[
        ("How will you fix potholes?", vec![1.0, 0.0, 0.0, 0.0]),
        (
            "What is your pothole repair plan?",
            vec![0.95, 0.3, 0.0, 0.0],
        ),
    ]));
    seed_question(
        &fx,
        "q-1",
        "How will you fix potholes?",
        &[1.0, 0.0, 0.0, 0.0],
        100,
    );

    let outcome = fx
        .dedup
        .check("c-1", "What is your pothole repair plan?", None)
        .unwrap();
    assert!(outcome.verdict.is_duplicate);
    assert_eq!(outcome.verdict.matched_question_id.as_deref(), Some("q-1"));
    assert!(outcome.verdict.similarity >= 0.85);
    assert!(outcome.embedding.is_some());
}

#[test]
fn unrelated_text_is_unique() {
    let fx = fixture(StubProvider::new(&[
        ("How will you fix potholes?", vec![1.0, 0.0, 0.0, 0.0]),
        ("What is your housing policy?", vec![0.0, 1.0, 0.0, 0.0]),
    ]));
    seed_question(
        &fx,
        "q-1",
        "How will you fix potholes?",
        &[1.0, 0.0, 0.0, 0.0],
        100,
    );

    let outcome = fx
        .dedup
        .check("c-1", "What is your housing policy?", None)
        .unwrap();
    assert!(!outcome.verdict.is_duplicate);
    assert!(outcome.verdict.matched_question_id.is_none());
}

#[test]
fn equal_similarity_matches_the_lowest_id() {
    let fx = fixture(StubProvider::new(&[(
        "Will you expand bus service downtown?",
        vec![1.0, 0.0, 0.0, 0.0],
    )]));
    // Same vector under two ids: the older (lower) id must win.
    seed_question(&fx, "q-b", "text b", &[1.0, 0.0, 0.0, 0.0], 50);
    seed_question(&fx, "q-a", "text a", &[1.0, 0.0, 0.0, 0.0], 100);

    let outcome = fx
        .dedup
        .check("c-1", "Will you expand bus service downtown?", None)
        .unwrap();
    assert!(outcome.verdict.is_duplicate);
    assert_eq!(outcome.verdict.matched_question_id.as_deref(), Some("q-a"));
}

#[test]
fn edit_check_excludes_self() {
    let fx = fixture(StubProvider::new(&[(
        "How will you fix potholes?",
        vec![1.0, 0.0, 0.0, 0.0],
    )]));
    seed_question(
        &fx,
        "q-1",
        "How will you fix potholes?",
        &[1.0, 0.0, 0.0, 0.0],
        100,
    );

    let outcome = fx
        .dedup
        .check("c-1", "How will you fix potholes?", Some("q-1"))
        .unwrap();
    assert!(!outcome.verdict.is_duplicate);
}

#[test]
fn removed_questions_never_match() {
    let fx = fixture(StubProvider::new(&[(
        "How will you fix potholes?",
        vec![1.0, 0.0, 0.0, 0.0],
    )]));
    seed_question(
        &fx,
        "q-1",
        "How will you fix potholes?",
        &[1.0, 0.0, 0.0, 0.0],
        100,
    );
    fx.storage
        .set_status("q-1", QuestionStatus::Removed)
        .unwrap();

    let outcome = fx
        .dedup
        .check("c-1", "How will you fix potholes?", None)
        .unwrap();
    assert!(!outcome.verdict.is_duplicate);
}

#[test]
fn provider_outage_fails_open() {
    let fx = fixture(StubProvider::new(&[]));
    let outcome = fx
        .dedup
        .check("c-1", "Anything at all, provider is down", None)
        .unwrap();
    assert!(!outcome.verdict.is_duplicate);
    assert!(outcome.embedding.is_none());
    assert_eq!(outcome.verdict.similarity, 0.0);
}

#[test]
fn attach_merges_and_updates_aggregates() {
    let fx = fixture(StubProvider::new(&[]));
    seed_question(&fx, "q-1", "first", &[1.0, 0.0, 0.0, 0.0], 100);
    seed_question(&fx, "q-2", "second", &[1.0, 0.1, 0.0, 0.0], 50);

    fx.clusters.attach("cluster-q-1", "q-2").unwrap();

    let merged = fx.storage.get_question("q-2").unwrap().unwrap();
    assert_eq!(merged.status, QuestionStatus::Merged);

    let cluster = fx.storage.get_cluster("cluster-q-1").unwrap().unwrap();
    assert_eq!(cluster.len(), 2);
    assert_eq!(cluster.representative_question_id, "q-1");
}

#[test]
fn election_promotes_the_highest_scoring_member() {
    let fx = fixture(StubProvider::new(&[]));
    seed_question(&fx, "q-1", "first", &[1.0, 0.0, 0.0, 0.0], 100);
    seed_question(&fx, "q-2", "second", &[1.0, 0.1, 0.0, 0.0], 50);
    fx.clusters.attach("cluster-q-1", "q-2").unwrap();

    // The merged member out-scores the representative.
    fx.storage.set_rank_score("q-2", 12.0).unwrap();
    let winner = fx.clusters.elect_representative("cluster-q-1").unwrap();
    assert_eq!(winner.as_deref(), Some("q-2"));

    let promoted = fx.storage.get_question("q-2").unwrap().unwrap();
    assert_eq!(promoted.status, QuestionStatus::Approved);
    let demoted = fx.storage.get_question("q-1").unwrap().unwrap();
    assert_eq!(demoted.status, QuestionStatus::Merged);
}

#[test]
fn score_tie_elects_the_earliest_member() {
    let fx = fixture(StubProvider::new(&[]));
    seed_question(&fx, "q-1", "first", &[1.0, 0.0, 0.0, 0.0], 100);
    seed_question(&fx, "q-2", "second", &[1.0, 0.1, 0.0, 0.0], 50);
    fx.clusters.attach("cluster-q-1", "q-2").unwrap();

    // Equal scores: q-1 was created earlier and must stay representative.
    let winner = fx.clusters.elect_representative("cluster-q-1").unwrap();
    assert_eq!(winner.as_deref(), Some("q-1"));
}

#[test]
fn removal_of_representative_triggers_reelection() {
    let fx = fixture(StubProvider::new(&[]));
    seed_question(&fx, "q-1", "first", &[1.0, 0.0, 0.0, 0.0], 100);
    seed_question(&fx, "q-2", "second", &[1.0, 0.1, 0.0, 0.0], 50);
    fx.clusters.attach("cluster-q-1", "q-2").unwrap();

    fx.storage
        .set_status("q-1", QuestionStatus::Removed)
        .unwrap();
    fx.clusters.detach_on_removal("q-1").unwrap();

    let cluster = fx.storage.get_cluster("cluster-q-1").unwrap().unwrap();
    assert_eq!(cluster.representative_question_id, "q-2");
    let promoted = fx.storage.get_question("q-2").unwrap().unwrap();
    assert_eq!(promoted.status, QuestionStatus::Approved);
}

#[test]
fn detach_restores_a_singleton() {
    let fx = fixture(StubProvider::new(&[]));
    seed_question(&fx, "q-1", "first", &[1.0, 0.0, 0.0, 0.0], 100);
    seed_question(&fx, "q-2", "second", &[1.0, 0.1, 0.0, 0.0], 50);
    fx.clusters.attach("cluster-q-1", "q-2").unwrap();

    let new_cluster_id = fx.clusters.detach("q-2").unwrap();

    let question = fx.storage.get_question("q-2").unwrap().unwrap();
    assert_eq!(question.status, QuestionStatus::Approved);
    assert_eq!(question.cluster_id, new_cluster_id);

    let fresh = fx.storage.get_cluster(&new_cluster_id).unwrap().unwrap();
    assert_eq!(fresh.representative_question_id, "q-2");
    assert_eq!(fresh.len(), 1);
}

#[test]
fn reconcile_reports_no_repair_when_consistent() {
    let fx = fixture(StubProvider::new(&[]));
    seed_question(&fx, "q-1", "first", &[1.0, 0.0, 0.0, 0.0], 100);
    assert!(!fx.clusters.reconcile("cluster-q-1").unwrap());
    assert_eq!(fx.clusters.reconcile_contest("c-1").unwrap(), 0);
}
