// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialized, asynchronous job execution over a single-threaded embedded
//! database connection.
//!
//! A [`Wrapper`] takes ownership of an [`Engine`] and runs every job against
//! it on one dedicated consumer thread, in the order jobs were submitted.
//! Callers on any thread submit work without waiting for it:
//!
//! - [`Wrapper::exec`] queues SQL for direct execution.
//! - [`Wrapper::prepare`] returns a [`Statement`] handle to bind parameters,
//!   declare the columns to read, and set a row callback before
//!   [`Statement::submit`].
//!
//! Each submission returns a [`Completion`] that can be awaited or waited on.
//! Rows are delivered to the row callback as [`ResultRow`] views.
//!
//! ```no_run
//! use serialite::{SqliteEngine, WrapExt};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = SqliteEngine::open("app.db")?.serial()?;
//! db.exec("CREATE TABLE IF NOT EXISTS kv (k TEXT PRIMARY KEY, v INTEGER)")?;
//!
//! let insert = db.prepare("INSERT INTO kv (k, v) VALUES (?, ?)")?;
//! insert
//!     .configure(|s| {
//!         s.bind(0, "answer").bind(1, 42i64);
//!     })
//!     .submit()?
//!     .wait()?;
//!
//! db.close()?;
//! # Ok(())
//! # }
//! ```

mod completion;
mod job;
pub mod logging;
mod queue;
pub mod recording;
pub mod registry;
mod row;
mod statement;
mod worker;
mod wrapper;

pub use completion::{Completion, CompletionCallback};
pub use job::RowCallback;
pub use queue::WorkerOptions;
pub use row::ResultRow;
pub use statement::Statement;
pub use wrapper::{WrapExt, Wrapper};

pub use serialite_config::SerialiteConfig;
pub use serialite_core::{
    ColumnReader, ColumnType, Engine, EngineError, JobError, LifecycleState, ParameterBinder,
    PreparedStatement, ResourceId, RestartPolicy, RowError, SerialiteError, TypeTag, TypedValue,
    WorkerState,
};

#[cfg(feature = "sqlite")]
pub use serialite_sqlite::SqliteEngine;

/// Result alias for wrapper-level operations.
pub type Result<T, E = SerialiteError> = std::result::Result<T, E>;

/// Opens the configured SQLite database and wraps it with the configured
/// worker options.
#[cfg(feature = "sqlite")]
pub fn open_sqlite(config: &SerialiteConfig) -> Result<Wrapper<SqliteEngine>> {
    let engine = SqliteEngine::open_with(&config.storage)?;
    Wrapper::wrap_with(engine, WorkerOptions::from(&config.worker))
}
