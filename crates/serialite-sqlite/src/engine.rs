// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection management: open, PRAGMA setup, identity and close.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rusqlite::Connection;
use serialite_config::StorageConfig;
use serialite_core::{Engine, EngineError, ResourceId};
use tracing::debug;

use crate::statement::SqliteStatement;

/// Counter giving every in-memory database its own identity.
static NEXT_MEMORY_ID: AtomicU64 = AtomicU64::new(1);

/// Convert a rusqlite error into an [`EngineError`], keeping the extended code.
pub(crate) fn sqlite_err(err: rusqlite::Error) -> EngineError {
    let code = err.sqlite_error().map(|e| e.extended_code);
    EngineError::wrap(code, err)
}

/// A SQLite connection usable as a serialite engine.
///
/// File databases are identified by their canonical path, so two engines
/// opened on the same file cannot be wrapped at the same time. Each in-memory
/// database gets a unique identity.
pub struct SqliteEngine {
    conn: Connection,
    id: ResourceId,
}

impl SqliteEngine {
    /// Opens (or creates) a database file with default connection settings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(sqlite_err)?;
        let id = file_identity(path);
        debug!(resource = %id, "sqlite database opened");
        Ok(Self { conn, id })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, EngineError> {
        let conn = Connection::open_in_memory().map_err(sqlite_err)?;
        Ok(Self {
            conn,
            id: memory_identity(),
        })
    }

    /// Opens the configured database and applies the configured PRAGMAs.
    pub fn open_with(config: &StorageConfig) -> Result<Self, EngineError> {
        let engine = if config.database_path == ":memory:" {
            Self::open_in_memory()?
        } else {
            Self::open(&config.database_path)?
        };
        engine.apply_pragmas(config)?;
        Ok(engine)
    }

    /// Takes ownership of an already-open connection.
    ///
    /// The identity is derived from the connection's file path.
    pub fn from_connection(conn: Connection) -> Self {
        let id = match conn.path() {
            Some(path) if !path.is_empty() => file_identity(Path::new(path)),
            _ => memory_identity(),
        };
        Self { conn, id }
    }

    fn apply_pragmas(&self, config: &StorageConfig) -> Result<(), EngineError> {
        self.conn
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(sqlite_err)?;
        if config.wal_mode {
            self.conn
                .execute_batch("PRAGMA journal_mode = WAL;")
                .map_err(sqlite_err)?;
        }
        let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
        self.conn
            .execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))
            .map_err(sqlite_err)?;
        debug!(
            resource = %self.id,
            wal_mode = config.wal_mode,
            busy_timeout_ms = config.busy_timeout_ms,
            "sqlite pragmas applied"
        );
        Ok(())
    }
}

fn file_identity(path: &Path) -> ResourceId {
    let resolved: PathBuf = std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf());
    ResourceId::new(resolved.display().to_string())
}

fn memory_identity() -> ResourceId {
    ResourceId::new(format!(
        "memory:{}",
        NEXT_MEMORY_ID.fetch_add(1, Ordering::Relaxed)
    ))
}

impl Engine for SqliteEngine {
    type Statement<'conn> = SqliteStatement<'conn>;

    fn resource_id(&self) -> &ResourceId {
        &self.id
    }

    fn execute(&mut self, sql: &str) -> Result<(), EngineError> {
        self.conn.execute_batch(sql).map_err(sqlite_err)
    }

    fn prepare(&mut self, sql: &str) -> Result<SqliteStatement<'_>, EngineError> {
        self.conn
            .prepare(sql)
            .map(SqliteStatement::new)
            .map_err(sqlite_err)
    }

    fn close(self) -> Result<(), EngineError> {
        let id = self.id;
        self.conn.close().map_err(|(_conn, err)| sqlite_err(err))?;
        debug!(resource = %id, "sqlite database closed");
        Ok(())
    }
}

impl std::fmt::Debug for SqliteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteEngine")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
