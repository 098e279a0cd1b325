//! The pending-index queue: question writes are not transactional with
//! the vector index, so each write that changes an embedding enqueues
//! here and maintenance drains the queue at-least-once.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use hustings_core::errors::EngineResult;
use hustings_core::traits::PendingIndexEntry;

use crate::to_storage_err;

/// Enqueue a question for (re-)indexing. Re-enqueueing resets attempts.
pub fn enqueue(conn: &Connection, question_id: &str, contest_id: &str) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO pending_index (question_id, contest_id, attempts, enqueued_at)
         VALUES (?1, ?2, 0, ?3)
         ON CONFLICT(question_id) DO UPDATE SET
            contest_id = excluded.contest_id,
            attempts = 0,
            enqueued_at = excluded.enqueued_at",
        params![question_id, contest_id, Utc::now().to_rfc3339()],
    )
    .map_err(|e| to_storage_err(format!("enqueue_index: {e}")))?;
    Ok(())
}

/// Oldest entries first.
pub fn entries(conn: &Connection, limit: usize) -> EngineResult<Vec<PendingIndexEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT question_id, contest_id, attempts, enqueued_at
             FROM pending_index ORDER BY enqueued_at, question_id LIMIT ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut result = Vec::new();
    for row in rows {
        let (question_id, contest_id, attempts, enqueued_at_str) =
            row.map_err(|e| to_storage_err(e.to_string()))?;
        let enqueued_at = DateTime::parse_from_rfc3339(&enqueued_at_str)
            .map_err(|e| to_storage_err(format!("enqueued_at parse: {e}")))?
            .with_timezone(&Utc);
        result.push(PendingIndexEntry {
            question_id,
            contest_id,
            attempts,
            enqueued_at,
        });
    }
    Ok(result)
}

/// Remove a drained entry.
pub fn complete(conn: &Connection, question_id: &str) -> EngineResult<()> {
    conn.execute(
        "DELETE FROM pending_index WHERE question_id = ?1",
        params![question_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Record a failed drain attempt.
pub fn bump_attempts(conn: &Connection, question_id: &str) -> EngineResult<()> {
    conn.execute(
        "UPDATE pending_index SET attempts = attempts + 1 WHERE question_id = ?1",
        params![question_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
