//! Immutable version snapshots: insert-only, never updated or deleted.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use hustings_core::errors::EngineResult;
use hustings_core::question::QuestionVersion;

use crate::to_storage_err;

/// Insert a snapshot row.
pub fn insert_version(conn: &Connection, version: &QuestionVersion) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO question_versions (question_id, version_number, text, edit_author_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            version.question_id,
            version.version_number,
            version.text,
            version.edit_author_id,
            version.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(format!("insert_version: {e}")))?;
    Ok(())
}

fn row_to_version(row: &Row<'_>) -> rusqlite::Result<EngineResult<QuestionVersion>> {
    let created_at_str: String = row.get(4)?;
    Ok((|| {
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| to_storage_err(format!("created_at parse: {e}")))?
            .with_timezone(&Utc);
        Ok(QuestionVersion {
            question_id: row.get(0).map_err(|e| to_storage_err(e.to_string()))?,
            version_number: row.get(1).map_err(|e| to_storage_err(e.to_string()))?,
            text: row.get(2).map_err(|e| to_storage_err(e.to_string()))?,
            edit_author_id: row.get(3).map_err(|e| to_storage_err(e.to_string()))?,
            created_at,
        })
    })())
}

/// Get one snapshot.
pub fn get_version(
    conn: &Connection,
    question_id: &str,
    version_number: u32,
) -> EngineResult<Option<QuestionVersion>> {
    let mut stmt = conn
        .prepare(
            "SELECT question_id, version_number, text, edit_author_id, created_at
             FROM question_versions WHERE question_id = ?1 AND version_number = ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let result = stmt
        .query_row(params![question_id, version_number], row_to_version)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    result.transpose()
}

/// Full history, version 1 first.
pub fn versions_for_question(
    conn: &Connection,
    question_id: &str,
) -> EngineResult<Vec<QuestionVersion>> {
    let mut stmt = conn
        .prepare(
            "SELECT question_id, version_number, text, edit_author_id, created_at
             FROM question_versions WHERE question_id = ?1 ORDER BY version_number",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![question_id], row_to_version)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut versions = Vec::new();
    for row in rows {
        versions.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(versions)
}
