//! Integration test: concurrent readers and a writer against one engine.

use std::sync::Arc;

use chrono::Utc;
use hustings_core::question::{Cluster, Question, QuestionStatus, QuestionVersion};
use hustings_core::traits::{ClusterPlacement, IQuestionStorage};
use hustings_storage::StorageEngine;

fn make_question(id: &str, cluster_id: &str) -> Question {
    Question {
        id: id.to_string(),
        contest_id: "c-1".to_string(),
        author_id: Some("author-1".to_string()),
        current_version: 1,
        text: format!("Question number {id} about local issues?"),
        issue_tags: vec![],
        status: QuestionStatus::Approved,
        cluster_id: cluster_id.to_string(),
        embedding: None,
        upvotes: 0,
        downvotes: 0,
        rank_score: 0.0,
        is_flagged: false,
        created_at: Utc::now(),
    }
}

fn create(engine: &StorageEngine, id: &str) {
    let mut cluster = Cluster::singleton("c-1", id);
    cluster.id = format!("cluster-{id}");
    let question = make_question(id, &cluster.id);
    let version = QuestionVersion::initial(id, Some("author-1"), &question.text);
    engine
        .create_question(&question, &version, ClusterPlacement::NewCluster(&cluster))
        .unwrap();
}

#[test]
fn concurrent_reads_during_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concurrent.db");
    let engine = Arc::new(StorageEngine::open(&path).unwrap());

    for i in 0..10 {
        create(&engine, &format!("init-{i}"));
    }

    let mut handles = vec![];
    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(std::thread::spawn(move || {
            for i in 0..10 {
                let _ = engine.get_question(&format!("init-{i}"));
                let _ = engine.questions_for_contest("c-1");
            }
        }));
    }

    let writer_engine = Arc::clone(&engine);
    let writer = std::thread::spawn(move || {
        for i in 10..20 {
            create(&writer_engine, &format!("write-{i}"));
        }
    });

    writer.join().expect("writer should not panic");
    for handle in handles {
        handle.join().expect("reader should not panic");
    }

    for i in 10..20 {
        assert!(
            engine.get_question(&format!("write-{i}")).unwrap().is_some(),
            "write-{i} should exist"
        );
    }
}
