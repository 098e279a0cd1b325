//! Schema migrations, applied in order on startup.

use rusqlite::Connection;
use tracing::info;

use hustings_core::errors::EngineResult;

use crate::to_storage_err;

/// Current schema version.
const SCHEMA_VERSION: u32 = 1;

const V001_INITIAL: &str = "
CREATE TABLE IF NOT EXISTS questions (
    id              TEXT PRIMARY KEY,
    contest_id      TEXT NOT NULL,
    author_id       TEXT,
    current_version INTEGER NOT NULL,
    text            TEXT NOT NULL,
    issue_tags      TEXT NOT NULL,
    status          TEXT NOT NULL,
    cluster_id      TEXT NOT NULL,
    embedding       BLOB,
    upvotes         INTEGER NOT NULL DEFAULT 0,
    downvotes       INTEGER NOT NULL DEFAULT 0,
    rank_score      REAL NOT NULL DEFAULT 0.0,
    is_flagged      INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_questions_contest ON questions(contest_id);
CREATE INDEX IF NOT EXISTS idx_questions_cluster ON questions(cluster_id);

CREATE TABLE IF NOT EXISTS question_versions (
    question_id    TEXT NOT NULL,
    version_number INTEGER NOT NULL,
    text           TEXT NOT NULL,
    edit_author_id TEXT,
    created_at     TEXT NOT NULL,
    PRIMARY KEY (question_id, version_number)
);

CREATE TABLE IF NOT EXISTS votes (
    user_id           TEXT NOT NULL,
    question_id       TEXT NOT NULL,
    value             INTEGER NOT NULL,
    weight            REAL NOT NULL DEFAULT 1.0,
    device_risk_score REAL NOT NULL DEFAULT 0.0,
    cast_at           TEXT NOT NULL,
    PRIMARY KEY (user_id, question_id)
);
CREATE INDEX IF NOT EXISTS idx_votes_question ON votes(question_id);

CREATE TABLE IF NOT EXISTS clusters (
    id                         TEXT PRIMARY KEY,
    contest_id                 TEXT NOT NULL,
    representative_question_id TEXT NOT NULL,
    aggregate_upvotes          INTEGER NOT NULL DEFAULT 0,
    aggregate_downvotes        INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_clusters_contest ON clusters(contest_id);

CREATE TABLE IF NOT EXISTS answers (
    id             TEXT PRIMARY KEY,
    question_id    TEXT NOT NULL,
    version_number INTEGER NOT NULL,
    candidate_id   TEXT NOT NULL,
    text           TEXT NOT NULL,
    created_at     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_answers_question ON answers(question_id);

CREATE TABLE IF NOT EXISTS reports (
    id          TEXT PRIMARY KEY,
    target_kind TEXT NOT NULL,
    target_id   TEXT NOT NULL,
    reporter_id TEXT NOT NULL,
    reason      TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pending_index (
    question_id TEXT PRIMARY KEY,
    contest_id  TEXT NOT NULL,
    attempts    INTEGER NOT NULL DEFAULT 0,
    enqueued_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_meta (
    version INTEGER NOT NULL
);
";

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> EngineResult<()> {
    conn.execute_batch(V001_INITIAL)
        .map_err(|e| to_storage_err(format!("migration v001: {e}")))?;

    let current: Option<u32> = conn
        .query_row("SELECT version FROM schema_meta LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    match current {
        None => {
            conn.execute(
                "INSERT INTO schema_meta (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map_err(|e| to_storage_err(format!("schema_meta insert: {e}")))?;
            info!(version = SCHEMA_VERSION, "schema initialized");
        }
        Some(v) if v < SCHEMA_VERSION => {
            // Future migrations slot in here, gated on `v`.
            conn.execute("UPDATE schema_meta SET version = ?1", [SCHEMA_VERSION])
                .map_err(|e| to_storage_err(format!("schema_meta update: {e}")))?;
            info!(from = v, to = SCHEMA_VERSION, "schema migrated");
        }
        Some(_) => {}
    }

    Ok(())
}
