//! Connection pragma configuration.

use rusqlite::Connection;

use hustings_core::errors::EngineResult;

use crate::to_storage_err;

/// Apply the standard pragma set to a fresh connection.
/// WAL is skipped for in-memory databases, which do not support it.
pub fn apply(conn: &Connection, in_memory: bool) -> EngineResult<()> {
    if !in_memory {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| to_storage_err(format!("journal_mode: {e}")))?;
    }
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(|e| to_storage_err(format!("synchronous: {e}")))?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| to_storage_err(format!("foreign_keys: {e}")))?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(|e| to_storage_err(format!("busy_timeout: {e}")))?;
    Ok(())
}
