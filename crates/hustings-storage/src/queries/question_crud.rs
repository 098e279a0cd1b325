//! Insert, get, and field updates for question rows.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use hustings_core::errors::EngineResult;
use hustings_core::question::{Question, QuestionStatus};

use crate::to_storage_err;

/// Convert f32 slice to a little-endian byte blob.
pub fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert a byte blob back to an f32 vec.
pub fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

const QUESTION_COLUMNS: &str = "id, contest_id, author_id, current_version, text, issue_tags,
    status, cluster_id, embedding, upvotes, downvotes, rank_score, is_flagged, created_at";

/// Insert a question row. Callers wrap this in a transaction together
/// with the version-1 snapshot and cluster placement.
pub fn insert_question(conn: &Connection, question: &Question) -> EngineResult<()> {
    let tags_json = serde_json::to_string(&question.issue_tags)?;
    conn.execute(
        "INSERT INTO questions (
            id, contest_id, author_id, current_version, text, issue_tags,
            status, cluster_id, embedding, upvotes, downvotes, rank_score,
            is_flagged, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            question.id,
            question.contest_id,
            question.author_id,
            question.current_version,
            question.text,
            tags_json,
            question.status.as_str(),
            question.cluster_id,
            question.embedding.as_deref().map(f32_vec_to_bytes),
            question.upvotes,
            question.downvotes,
            question.rank_score,
            question.is_flagged as i32,
            question.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(format!("insert_question: {e}")))?;
    Ok(())
}

fn row_to_question(row: &Row<'_>) -> rusqlite::Result<EngineResult<Question>> {
    let tags_json: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let embedding_blob: Option<Vec<u8>> = row.get(8)?;
    let created_at_str: String = row.get(13)?;

    Ok((|| {
        let issue_tags: Vec<String> = serde_json::from_str(&tags_json)?;
        let status = QuestionStatus::parse(&status_str)
            .ok_or_else(|| to_storage_err(format!("unknown question status: {status_str}")))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| to_storage_err(format!("created_at parse: {e}")))?
            .with_timezone(&Utc);
        Ok(Question {
            id: row.get(0).map_err(|e| to_storage_err(e.to_string()))?,
            contest_id: row.get(1).map_err(|e| to_storage_err(e.to_string()))?,
            author_id: row.get(2).map_err(|e| to_storage_err(e.to_string()))?,
            current_version: row.get(3).map_err(|e| to_storage_err(e.to_string()))?,
            text: row.get(4).map_err(|e| to_storage_err(e.to_string()))?,
            issue_tags,
            status,
            cluster_id: row.get(7).map_err(|e| to_storage_err(e.to_string()))?,
            embedding: embedding_blob.as_deref().map(bytes_to_f32_vec),
            upvotes: row.get(9).map_err(|e| to_storage_err(e.to_string()))?,
            downvotes: row.get(10).map_err(|e| to_storage_err(e.to_string()))?,
            rank_score: row.get(11).map_err(|e| to_storage_err(e.to_string()))?,
            is_flagged: row
                .get::<_, i32>(12)
                .map_err(|e| to_storage_err(e.to_string()))?
                != 0,
            created_at,
        })
    })())
}

/// Get a single question by id.
pub fn get_question(conn: &Connection, id: &str) -> EngineResult<Option<Question>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let result = stmt
        .query_row(params![id], row_to_question)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    result.transpose()
}

/// All questions in a contest, oldest first.
pub fn questions_for_contest(conn: &Connection, contest_id: &str) -> EngineResult<Vec<Question>> {
    query_questions(
        conn,
        &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE contest_id = ?1 ORDER BY created_at, id"),
        contest_id,
    )
}

/// All member questions of a cluster, oldest first.
pub fn questions_in_cluster(conn: &Connection, cluster_id: &str) -> EngineResult<Vec<Question>> {
    query_questions(
        conn,
        &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE cluster_id = ?1 ORDER BY created_at, id"),
        cluster_id,
    )
}

/// Distinct contest ids with at least one question.
pub fn contest_ids(conn: &Connection) -> EngineResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT contest_id FROM questions ORDER BY contest_id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.map_err(|e| to_storage_err(e.to_string()))?);
    }
    Ok(ids)
}

/// Questions persisted without an embedding, oldest first.
pub fn questions_missing_embedding(conn: &Connection, limit: usize) -> EngineResult<Vec<Question>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions
             WHERE embedding IS NULL AND status != 'removed'
             ORDER BY created_at, id LIMIT ?1"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![limit], row_to_question)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_questions(rows)
}

fn query_questions(conn: &Connection, sql: &str, param: &str) -> EngineResult<Vec<Question>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![param], row_to_question)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_questions(rows)
}

fn collect_questions(
    rows: impl Iterator<Item = rusqlite::Result<EngineResult<Question>>>,
) -> EngineResult<Vec<Question>> {
    let mut questions = Vec::new();
    for row in rows {
        questions.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(questions)
}

/// Update a question's status.
pub fn update_status(
    conn: &Connection,
    question_id: &str,
    status: QuestionStatus,
) -> EngineResult<()> {
    let changed = conn
        .execute(
            "UPDATE questions SET status = ?2 WHERE id = ?1",
            params![question_id, status.as_str()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    ensure_row_touched(changed, question_id)
}

/// Update a question's flagged bit.
pub fn update_flagged(conn: &Connection, question_id: &str, flagged: bool) -> EngineResult<()> {
    let changed = conn
        .execute(
            "UPDATE questions SET is_flagged = ?2 WHERE id = ?1",
            params![question_id, flagged as i32],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    ensure_row_touched(changed, question_id)
}

/// Replace or clear a question's embedding blob.
pub fn update_embedding(
    conn: &Connection,
    question_id: &str,
    embedding: Option<&[f32]>,
) -> EngineResult<()> {
    let changed = conn
        .execute(
            "UPDATE questions SET embedding = ?2 WHERE id = ?1",
            params![question_id, embedding.map(f32_vec_to_bytes)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    ensure_row_touched(changed, question_id)
}

/// Move a question to a different cluster (membership is the
/// back-reference on the question row).
pub fn update_cluster(conn: &Connection, question_id: &str, cluster_id: &str) -> EngineResult<()> {
    let changed = conn
        .execute(
            "UPDATE questions SET cluster_id = ?2 WHERE id = ?1",
            params![question_id, cluster_id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    ensure_row_touched(changed, question_id)
}

/// Cache the current version's text on the question row.
pub fn update_text_and_version(
    conn: &Connection,
    question_id: &str,
    text: &str,
    version_number: u32,
) -> EngineResult<()> {
    let changed = conn
        .execute(
            "UPDATE questions SET text = ?2, current_version = ?3 WHERE id = ?1",
            params![question_id, text, version_number],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    ensure_row_touched(changed, question_id)
}

/// Compare-and-swap the vote counters. Returns false when the observed
/// counters no longer match and nothing was written.
pub fn cas_update_counters(
    conn: &Connection,
    question_id: &str,
    expected_up: u64,
    expected_down: u64,
    new_up: u64,
    new_down: u64,
) -> EngineResult<bool> {
    let changed = conn
        .execute(
            "UPDATE questions SET upvotes = ?2, downvotes = ?3
             WHERE id = ?1 AND upvotes = ?4 AND downvotes = ?5",
            params![question_id, new_up, new_down, expected_up, expected_down],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(changed == 1)
}

/// Persist a freshly computed rank score.
pub fn set_rank_score(conn: &Connection, question_id: &str, score: f64) -> EngineResult<()> {
    let changed = conn
        .execute(
            "UPDATE questions SET rank_score = ?2 WHERE id = ?1",
            params![question_id, score],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    ensure_row_touched(changed, question_id)
}

fn ensure_row_touched(changed: usize, question_id: &str) -> EngineResult<()> {
    if changed == 0 {
        Err(hustings_core::errors::EngineError::not_found(
            "question",
            question_id,
        ))
    } else {
        Ok(())
    }
}
