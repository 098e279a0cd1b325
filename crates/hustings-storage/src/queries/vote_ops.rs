//! Vote rows: one per (user, question), last write wins by cast time.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use hustings_core::errors::EngineResult;
use hustings_core::question::{Vote, VoteValue};

use crate::to_storage_err;

/// Insert or update the (user, question) row. The conditional update
/// sequences concurrent re-votes by the same user: an older request
/// arriving late cannot clobber a newer one.
pub fn upsert_vote(conn: &Connection, vote: &Vote) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO votes (user_id, question_id, value, weight, device_risk_score, cast_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(user_id, question_id) DO UPDATE SET
            value = excluded.value,
            weight = excluded.weight,
            device_risk_score = excluded.device_risk_score,
            cast_at = excluded.cast_at
         WHERE excluded.cast_at >= votes.cast_at",
        params![
            vote.user_id,
            vote.question_id,
            vote.value.signed(),
            vote.weight,
            vote.device_risk_score,
            vote.cast_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(format!("upsert_vote: {e}")))?;
    Ok(())
}

/// Delete a vote row (retraction). Returns whether a row existed.
pub fn delete_vote(conn: &Connection, user_id: &str, question_id: &str) -> EngineResult<bool> {
    let changed = conn
        .execute(
            "DELETE FROM votes WHERE user_id = ?1 AND question_id = ?2",
            params![user_id, question_id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(changed == 1)
}

fn row_to_vote(row: &Row<'_>) -> rusqlite::Result<EngineResult<Vote>> {
    let value_raw: i8 = row.get(2)?;
    let cast_at_str: String = row.get(5)?;
    Ok((|| {
        let value = VoteValue::from_signed(value_raw)
            .ok_or_else(|| to_storage_err(format!("invalid vote value: {value_raw}")))?;
        let cast_at = DateTime::parse_from_rfc3339(&cast_at_str)
            .map_err(|e| to_storage_err(format!("cast_at parse: {e}")))?
            .with_timezone(&Utc);
        Ok(Vote {
            user_id: row.get(0).map_err(|e| to_storage_err(e.to_string()))?,
            question_id: row.get(1).map_err(|e| to_storage_err(e.to_string()))?,
            value,
            weight: row.get(3).map_err(|e| to_storage_err(e.to_string()))?,
            device_risk_score: row.get(4).map_err(|e| to_storage_err(e.to_string()))?,
            cast_at,
        })
    })())
}

/// Fetch one user's vote on one question.
pub fn get_vote(
    conn: &Connection,
    user_id: &str,
    question_id: &str,
) -> EngineResult<Option<Vote>> {
    let mut stmt = conn
        .prepare(
            "SELECT user_id, question_id, value, weight, device_risk_score, cast_at
             FROM votes WHERE user_id = ?1 AND question_id = ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let result = stmt
        .query_row(params![user_id, question_id], row_to_vote)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    result.transpose()
}

/// All live votes on a question.
pub fn votes_for_question(conn: &Connection, question_id: &str) -> EngineResult<Vec<Vote>> {
    let mut stmt = conn
        .prepare(
            "SELECT user_id, question_id, value, weight, device_risk_score, cast_at
             FROM votes WHERE question_id = ?1 ORDER BY user_id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![question_id], row_to_vote)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut votes = Vec::new();
    for row in rows {
        votes.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(votes)
}
