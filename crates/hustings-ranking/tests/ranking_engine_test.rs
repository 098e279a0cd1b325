//! RankingEngine against real storage: recompute reproducibility and
//! representative gathering.

use std::sync::Arc;

use chrono::{Duration, Utc};
use hustings_core::config::RankingConfig;
use hustings_core::question::{Cluster, Question, QuestionStatus, QuestionVersion, Vote, VoteValue};
use hustings_core::traits::{ClusterPlacement, CounterSnapshot, IQuestionStorage, VoteWrite};
use hustings_ranking::{RankingEngine, WeightedNetVotes};
use hustings_storage::StorageEngine;

fn seed(storage: &StorageEngine, id: &str, tags: &[&str], age_secs: i64) {
    let mut cluster = Cluster::singleton("c-1", id);
    cluster.id = format!("cluster-{id}");
    let question = Question {
        id: id.to_string(),
        contest_id: "c-1".to_string(),
        author_id: Some("author-1".to_string()),
        current_version: 1,
        text: format!("Question {id} about something local?"),
        issue_tags: tags.iter().map(|t| t.to_string()).collect(),
        status: QuestionStatus::Approved,
        cluster_id: cluster.id.clone(),
        embedding: None,
        upvotes: 0,
        downvotes: 0,
        rank_score: 0.0,
        is_flagged: false,
        created_at: Utc::now() - Duration::seconds(age_secs),
    };
    let version = QuestionVersion::initial(id, Some("author-1"), &question.text);
    storage
        .create_question(&question, &version, ClusterPlacement::NewCluster(&cluster))
        .unwrap();
}

fn cast(storage: &StorageEngine, user: &str, question_id: &str, value: VoteValue, weight: f64) {
    let question = storage.get_question(question_id).unwrap().unwrap();
    let (up, down) = match value {
        VoteValue::Up => (question.upvotes + 1, question.downvotes),
        VoteValue::Down => (question.upvotes, question.downvotes + 1),
    };
    let vote = Vote {
        user_id: user.to_string(),
        question_id: question_id.to_string(),
        value,
        weight,
        device_risk_score: 0.0,
        cast_at: Utc::now(),
    };
    let committed = storage
        .commit_vote(
            VoteWrite::Upsert(&vote),
            CounterSnapshot {
                upvotes: question.upvotes,
                downvotes: question.downvotes,
            },
            CounterSnapshot {
                upvotes: up,
                downvotes: down,
            },
        )
        .unwrap();
    assert!(committed);
}

fn engine(storage: &Arc<StorageEngine>) -> RankingEngine {
    RankingEngine::new(
        storage.clone(),
        Box::new(WeightedNetVotes),
        RankingConfig::default(),
    )
}

#[test]
fn recompute_matches_the_weighted_sum_and_is_idempotent() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    seed(&storage, "q-1", &["roads"], 100);
    cast(&storage, "u-1", "q-1", VoteValue::Up, 1.0);
    cast(&storage, "u-2", "q-1", VoteValue::Up, 0.5);
    cast(&storage, "u-3", "q-1", VoteValue::Down, 1.0);

    let ranking = engine(&storage);
    let first = ranking.recompute("q-1").unwrap();
    assert!((first - 0.5).abs() < 1e-12);

    // No intervening votes: recompute returns the same score.
    let second = ranking.recompute("q-1").unwrap();
    assert_eq!(first, second);

    let stored = storage.get_question("q-1").unwrap().unwrap();
    assert_eq!(stored.rank_score, first);
}

#[test]
fn top_n_only_lists_approved_representatives() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    seed(&storage, "q-1", &["roads"], 300);
    seed(&storage, "q-2", &["housing"], 200);
    seed(&storage, "q-3", &["schools"], 100);

    // Merge q-2 into q-1's cluster and remove q-3.
    storage.move_to_cluster("q-2", "cluster-q-1").unwrap();
    storage.set_status("q-3", QuestionStatus::Removed).unwrap();

    let ranking = engine(&storage);
    let top = ranking.top_n("c-1").unwrap();
    let ids: Vec<&str> = top.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec!["q-1"]);
}

#[test]
fn top_n_orders_by_stored_score() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    seed(&storage, "q-1", &["roads"], 300);
    seed(&storage, "q-2", &["housing"], 200);

    cast(&storage, "u-1", "q-2", VoteValue::Up, 1.0);
    let ranking = engine(&storage);
    ranking.recompute("q-2").unwrap();

    let top = ranking.top_n("c-1").unwrap();
    let ids: Vec<&str> = top.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec!["q-2", "q-1"]);
}
