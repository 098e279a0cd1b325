//! Candidate answers and moderation reports.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use hustings_core::errors::EngineResult;
use hustings_core::models::{Answer, Report, TargetRef};

use crate::to_storage_err;

/// Insert an answer bound to a specific question version.
pub fn insert_answer(conn: &Connection, answer: &Answer) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO answers (id, question_id, version_number, candidate_id, text, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            answer.id,
            answer.question_id,
            answer.version_number,
            answer.candidate_id,
            answer.text,
            answer.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(format!("insert_answer: {e}")))?;
    Ok(())
}

/// Get an answer by id.
pub fn get_answer(conn: &Connection, id: &str) -> EngineResult<Option<Answer>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, question_id, version_number, candidate_id, text, created_at
             FROM answers WHERE id = ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let result = stmt
        .query_row(params![id], |row| {
            let created_at_str: String = row.get(5)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                created_at_str,
            ))
        })
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let Some((id, question_id, version_number, candidate_id, text, created_at_str)) = result
    else {
        return Ok(None);
    };
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| to_storage_err(format!("created_at parse: {e}")))?
        .with_timezone(&Utc);

    Ok(Some(Answer {
        id,
        question_id,
        version_number,
        candidate_id,
        text,
        created_at,
    }))
}

/// Insert a report row against a polymorphic target.
pub fn insert_report(conn: &Connection, report: &Report) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO reports (id, target_kind, target_id, reporter_id, reason, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            report.id,
            report.target.kind(),
            report.target.id(),
            report.reporter_id,
            report.reason,
            report.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(format!("insert_report: {e}")))?;
    Ok(())
}

/// Count reports against a target, for moderation views.
pub fn report_count(conn: &Connection, target: &TargetRef) -> EngineResult<u64> {
    conn.query_row(
        "SELECT COUNT(*) FROM reports WHERE target_kind = ?1 AND target_id = ?2",
        params![target.kind(), target.id()],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
