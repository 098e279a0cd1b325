//! StorageEngine — owns the connection pool, runs migrations on open,
//! and implements `IQuestionStorage`.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use hustings_core::errors::{EngineError, EngineResult};
use hustings_core::models::{Answer, Report};
use hustings_core::question::{Cluster, Question, QuestionStatus, QuestionVersion, Vote};
use hustings_core::traits::{
    ClusterPlacement, CounterSnapshot, IQuestionStorage, PendingIndexEntry, VoteWrite,
};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{answer_ops, cluster_ops, index_queue, question_crud, version_ops, vote_ops};
use crate::to_storage_err;

/// The main storage engine.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> EngineResult<Self> {
        let pool = ConnectionPool::open(path)?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> EngineResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> EngineResult<()> {
        self.pool.with_conn(migrations::run_migrations)
    }

    /// Run a closure inside a transaction: commit on Ok, roll back on Err.
    fn in_transaction<F, T>(&self, label: &str, f: F) -> EngineResult<T>
    where
        F: FnOnce(&Connection) -> EngineResult<T>,
    {
        self.pool.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_storage_err(format!("{label} begin: {e}")))?;
            match f(&tx) {
                Ok(value) => {
                    tx.commit()
                        .map_err(|e| to_storage_err(format!("{label} commit: {e}")))?;
                    Ok(value)
                }
                Err(e) => {
                    let _ = tx.rollback();
                    Err(e)
                }
            }
        })
    }

    fn cluster_id_of(conn: &Connection, question_id: &str) -> EngineResult<String> {
        conn.query_row(
            "SELECT cluster_id FROM questions WHERE id = ?1",
            params![question_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?
        .ok_or_else(|| EngineError::not_found("question", question_id))
    }

    fn cluster_member_count(conn: &Connection, cluster_id: &str) -> EngineResult<u64> {
        conn.query_row(
            "SELECT COUNT(*) FROM questions WHERE cluster_id = ?1",
            params![cluster_id],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))
    }

    /// Refresh the source cluster after a member left: delete when empty,
    /// otherwise re-derive aggregates.
    fn refresh_or_delete(conn: &Connection, cluster_id: &str) -> EngineResult<()> {
        if Self::cluster_member_count(conn, cluster_id)? == 0 {
            cluster_ops::delete_cluster(conn, cluster_id)
        } else {
            cluster_ops::refresh_aggregates(conn, cluster_id).map(|_| ())
        }
    }
}

impl IQuestionStorage for StorageEngine {
    fn create_question(
        &self,
        question: &Question,
        first_version: &QuestionVersion,
        placement: ClusterPlacement<'_>,
    ) -> EngineResult<()> {
        self.in_transaction("create_question", |conn| {
            question_crud::insert_question(conn, question)?;
            version_ops::insert_version(conn, first_version)?;
            match placement {
                ClusterPlacement::NewCluster(cluster) => {
                    cluster_ops::insert_cluster(conn, cluster)?;
                }
                ClusterPlacement::Join { cluster_id } => {
                    cluster_ops::refresh_aggregates(conn, cluster_id)?;
                }
            }
            if question.embedding.is_some() {
                index_queue::enqueue(conn, &question.id, &question.contest_id)?;
            }
            Ok(())
        })
    }

    fn get_question(&self, id: &str) -> EngineResult<Option<Question>> {
        self.pool.with_conn(|conn| question_crud::get_question(conn, id))
    }

    fn questions_for_contest(&self, contest_id: &str) -> EngineResult<Vec<Question>> {
        self.pool
            .with_conn(|conn| question_crud::questions_for_contest(conn, contest_id))
    }

    fn contest_ids(&self) -> EngineResult<Vec<String>> {
        self.pool.with_conn(question_crud::contest_ids)
    }

    fn set_status(&self, question_id: &str, status: QuestionStatus) -> EngineResult<()> {
        self.pool
            .with_conn(|conn| question_crud::update_status(conn, question_id, status))
    }

    fn set_flagged(&self, question_id: &str, flagged: bool) -> EngineResult<()> {
        self.pool
            .with_conn(|conn| question_crud::update_flagged(conn, question_id, flagged))
    }

    fn update_embedding(&self, question_id: &str, embedding: Option<&[f32]>) -> EngineResult<()> {
        self.in_transaction("update_embedding", |conn| {
            question_crud::update_embedding(conn, question_id, embedding)?;
            if embedding.is_some() {
                let contest_id: String = conn
                    .query_row(
                        "SELECT contest_id FROM questions WHERE id = ?1",
                        params![question_id],
                        |row| row.get(0),
                    )
                    .map_err(|e| to_storage_err(e.to_string()))?;
                index_queue::enqueue(conn, question_id, &contest_id)?;
            }
            Ok(())
        })
    }

    fn append_version(&self, version: &QuestionVersion) -> EngineResult<()> {
        self.in_transaction("append_version", |conn| {
            version_ops::insert_version(conn, version)?;
            question_crud::update_text_and_version(
                conn,
                &version.question_id,
                &version.text,
                version.version_number,
            )
        })
    }

    fn get_version(
        &self,
        question_id: &str,
        version_number: u32,
    ) -> EngineResult<Option<QuestionVersion>> {
        self.pool
            .with_conn(|conn| version_ops::get_version(conn, question_id, version_number))
    }

    fn versions_for_question(&self, question_id: &str) -> EngineResult<Vec<QuestionVersion>> {
        self.pool
            .with_conn(|conn| version_ops::versions_for_question(conn, question_id))
    }

    fn get_vote(&self, user_id: &str, question_id: &str) -> EngineResult<Option<Vote>> {
        self.pool
            .with_conn(|conn| vote_ops::get_vote(conn, user_id, question_id))
    }

    fn votes_for_question(&self, question_id: &str) -> EngineResult<Vec<Vote>> {
        self.pool
            .with_conn(|conn| vote_ops::votes_for_question(conn, question_id))
    }

    fn commit_vote(
        &self,
        write: VoteWrite<'_>,
        expected: CounterSnapshot,
        updated: CounterSnapshot,
    ) -> EngineResult<bool> {
        let question_id = match &write {
            VoteWrite::Upsert(vote) => vote.question_id.clone(),
            VoteWrite::Delete { question_id, .. } => (*question_id).to_string(),
        };

        self.pool.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_storage_err(format!("commit_vote begin: {e}")))?;

            let result = (|| -> EngineResult<bool> {
                match &write {
                    VoteWrite::Upsert(vote) => vote_ops::upsert_vote(&tx, vote)?,
                    VoteWrite::Delete {
                        user_id,
                        question_id,
                    } => {
                        vote_ops::delete_vote(&tx, user_id, question_id)?;
                    }
                }
                let swapped = question_crud::cas_update_counters(
                    &tx,
                    &question_id,
                    expected.upvotes,
                    expected.downvotes,
                    updated.upvotes,
                    updated.downvotes,
                )?;
                if !swapped {
                    return Ok(false);
                }
                let cluster_id = Self::cluster_id_of(&tx, &question_id)?;
                cluster_ops::refresh_aggregates(&tx, &cluster_id)?;
                Ok(true)
            })();

            match result {
                Ok(true) => {
                    tx.commit()
                        .map_err(|e| to_storage_err(format!("commit_vote commit: {e}")))?;
                    Ok(true)
                }
                // Lost the swap: roll the vote-row write back too.
                Ok(false) => {
                    let _ = tx.rollback();
                    Ok(false)
                }
                Err(e) => {
                    let _ = tx.rollback();
                    Err(e)
                }
            }
        })
    }

    fn set_rank_score(&self, question_id: &str, score: f64) -> EngineResult<()> {
        self.pool
            .with_conn(|conn| question_crud::set_rank_score(conn, question_id, score))
    }

    fn get_cluster(&self, id: &str) -> EngineResult<Option<Cluster>> {
        self.pool.with_conn(|conn| cluster_ops::get_cluster(conn, id))
    }

    fn clusters_for_contest(&self, contest_id: &str) -> EngineResult<Vec<Cluster>> {
        self.pool
            .with_conn(|conn| cluster_ops::clusters_for_contest(conn, contest_id))
    }

    fn set_representative(&self, cluster_id: &str, question_id: &str) -> EngineResult<()> {
        self.pool
            .with_conn(|conn| cluster_ops::set_representative(conn, cluster_id, question_id))
    }

    fn move_to_cluster(&self, question_id: &str, target_cluster_id: &str) -> EngineResult<()> {
        self.in_transaction("move_to_cluster", |conn| {
            let source_cluster_id = Self::cluster_id_of(conn, question_id)?;
            if cluster_ops::get_cluster(conn, target_cluster_id)?.is_none() {
                return Err(EngineError::not_found("cluster", target_cluster_id));
            }
            question_crud::update_cluster(conn, question_id, target_cluster_id)?;
            question_crud::update_status(conn, question_id, QuestionStatus::Merged)?;
            cluster_ops::refresh_aggregates(conn, target_cluster_id)?;
            Self::refresh_or_delete(conn, &source_cluster_id)
        })
    }

    fn detach_to_singleton(&self, question_id: &str, new_cluster: &Cluster) -> EngineResult<()> {
        self.in_transaction("detach_to_singleton", |conn| {
            let source_cluster_id = Self::cluster_id_of(conn, question_id)?;
            cluster_ops::insert_cluster(conn, new_cluster)?;
            question_crud::update_cluster(conn, question_id, &new_cluster.id)?;
            question_crud::update_status(conn, question_id, QuestionStatus::Approved)?;
            cluster_ops::refresh_aggregates(conn, &new_cluster.id)?;
            Self::refresh_or_delete(conn, &source_cluster_id)
        })
    }

    fn refresh_cluster_aggregates(&self, cluster_id: &str) -> EngineResult<(u64, u64)> {
        self.pool
            .with_conn(|conn| cluster_ops::refresh_aggregates(conn, cluster_id))
    }

    fn record_answer(&self, answer: &Answer) -> EngineResult<()> {
        self.pool.with_conn(|conn| answer_ops::insert_answer(conn, answer))
    }

    fn get_answer(&self, id: &str) -> EngineResult<Option<Answer>> {
        self.pool.with_conn(|conn| answer_ops::get_answer(conn, id))
    }

    fn record_report(&self, report: &Report) -> EngineResult<()> {
        self.pool.with_conn(|conn| answer_ops::insert_report(conn, report))
    }

    fn questions_missing_embedding(&self, limit: usize) -> EngineResult<Vec<Question>> {
        self.pool
            .with_conn(|conn| question_crud::questions_missing_embedding(conn, limit))
    }

    fn pending_index_entries(&self, limit: usize) -> EngineResult<Vec<PendingIndexEntry>> {
        self.pool.with_conn(|conn| index_queue::entries(conn, limit))
    }

    fn enqueue_index(&self, question_id: &str, contest_id: &str) -> EngineResult<()> {
        self.pool
            .with_conn(|conn| index_queue::enqueue(conn, question_id, contest_id))
    }

    fn complete_index_entry(&self, question_id: &str) -> EngineResult<()> {
        self.pool.with_conn(|conn| index_queue::complete(conn, question_id))
    }

    fn bump_index_attempts(&self, question_id: &str) -> EngineResult<()> {
        self.pool
            .with_conn(|conn| index_queue::bump_attempts(conn, question_id))
    }
}
