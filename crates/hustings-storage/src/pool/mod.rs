//! Writer connection wrapper.
//!
//! All writes (and, for simplicity at engine scale, reads) are serialized
//! through one connection behind a mutex; SQLite's row-level atomicity
//! plus the compare-and-swap counter updates give the ordering guarantees
//! the vote ledger needs.

pub mod pragmas;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use hustings_core::errors::EngineResult;

use crate::to_storage_err;

/// Serialized access to the underlying SQLite connection.
pub struct ConnectionPool {
    writer: Mutex<Connection>,
}

impl ConnectionPool {
    /// Open a file-backed pool.
    pub fn open(path: &Path) -> EngineResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| to_storage_err(format!("open {}: {e}", path.display())))?;
        pragmas::apply(&conn, false)?;
        Ok(Self {
            writer: Mutex::new(conn),
        })
    }

    /// Open an in-memory pool (tests and ephemeral deployments).
    pub fn open_in_memory() -> EngineResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| to_storage_err(format!("open memory: {e}")))?;
        pragmas::apply(&conn, true)?;
        Ok(Self {
            writer: Mutex::new(conn),
        })
    }

    /// Run a closure against the connection.
    pub fn with_conn<F, T>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&Connection) -> EngineResult<T>,
    {
        let guard = self
            .writer
            .lock()
            .map_err(|_| to_storage_err("connection mutex poisoned"))?;
        f(&guard)
    }
}
