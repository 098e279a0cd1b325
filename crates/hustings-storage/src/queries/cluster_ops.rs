//! Cluster rows. Membership is the back-reference on question rows;
//! the cluster row holds the representative and the cached aggregates.

use std::collections::BTreeSet;

use rusqlite::{params, Connection, OptionalExtension};

use hustings_core::errors::{EngineError, EngineResult};
use hustings_core::question::Cluster;

use crate::to_storage_err;

/// Insert a cluster row.
pub fn insert_cluster(conn: &Connection, cluster: &Cluster) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO clusters (id, contest_id, representative_question_id,
            aggregate_upvotes, aggregate_downvotes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            cluster.id,
            cluster.contest_id,
            cluster.representative_question_id,
            cluster.aggregate_upvotes,
            cluster.aggregate_downvotes,
        ],
    )
    .map_err(|e| to_storage_err(format!("insert_cluster: {e}")))?;
    Ok(())
}

/// Load a cluster with its membership set.
pub fn get_cluster(conn: &Connection, id: &str) -> EngineResult<Option<Cluster>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, contest_id, representative_question_id,
                    aggregate_upvotes, aggregate_downvotes
             FROM clusters WHERE id = ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let base = stmt
        .query_row(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, u64>(4)?,
            ))
        })
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let Some((id, contest_id, representative, up, down)) = base else {
        return Ok(None);
    };

    Ok(Some(Cluster {
        member_question_ids: member_ids(conn, &id)?,
        id,
        contest_id,
        representative_question_id: representative,
        aggregate_upvotes: up,
        aggregate_downvotes: down,
    }))
}

/// All clusters in a contest, with membership sets.
pub fn clusters_for_contest(conn: &Connection, contest_id: &str) -> EngineResult<Vec<Cluster>> {
    let mut stmt = conn
        .prepare("SELECT id FROM clusters WHERE contest_id = ?1 ORDER BY id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let ids = stmt
        .query_map(params![contest_id], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut clusters = Vec::new();
    for id in ids {
        let id = id.map_err(|e| to_storage_err(e.to_string()))?;
        if let Some(cluster) = get_cluster(conn, &id)? {
            clusters.push(cluster);
        }
    }
    Ok(clusters)
}

fn member_ids(conn: &Connection, cluster_id: &str) -> EngineResult<BTreeSet<String>> {
    let mut stmt = conn
        .prepare("SELECT id FROM questions WHERE cluster_id = ?1")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![cluster_id], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut members = BTreeSet::new();
    for row in rows {
        members.insert(row.map_err(|e| to_storage_err(e.to_string()))?);
    }
    Ok(members)
}

/// Point the cluster at a new representative.
pub fn set_representative(
    conn: &Connection,
    cluster_id: &str,
    question_id: &str,
) -> EngineResult<()> {
    let changed = conn
        .execute(
            "UPDATE clusters SET representative_question_id = ?2 WHERE id = ?1",
            params![cluster_id, question_id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(EngineError::not_found("cluster", cluster_id));
    }
    Ok(())
}

/// Delete an emptied cluster row.
pub fn delete_cluster(conn: &Connection, cluster_id: &str) -> EngineResult<()> {
    conn.execute("DELETE FROM clusters WHERE id = ?1", params![cluster_id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Re-derive aggregates from non-removed member counts and persist them.
/// Returns the fresh (upvotes, downvotes).
pub fn refresh_aggregates(conn: &Connection, cluster_id: &str) -> EngineResult<(u64, u64)> {
    let (up, down): (u64, u64) = conn
        .query_row(
            "SELECT COALESCE(SUM(upvotes), 0), COALESCE(SUM(downvotes), 0)
             FROM questions WHERE cluster_id = ?1 AND status != 'removed'",
            params![cluster_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let changed = conn
        .execute(
            "UPDATE clusters SET aggregate_upvotes = ?2, aggregate_downvotes = ?3 WHERE id = ?1",
            params![cluster_id, up, down],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(EngineError::not_found("cluster", cluster_id));
    }
    Ok((up, down))
}
