// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single-threaded resource driven by the consumer worker.

use std::ops::ControlFlow;

use crate::error::EngineError;
use crate::traits::columns::{ColumnReader, ParameterBinder};
use crate::types::ResourceId;

/// An embedded database connection that must only be used from one thread.
///
/// The engine is moved into the wrapper and from then on is only touched by
/// the consumer worker. It needs to be `Send` to cross into that thread, but
/// never `Sync`.
pub trait Engine: Send + 'static {
    /// A prepared statement borrowing the connection. Finalized on drop.
    type Statement<'conn>: PreparedStatement
    where
        Self: 'conn;

    /// Identity used by the wrap-once registry.
    fn resource_id(&self) -> &ResourceId;

    /// Executes SQL directly, discarding any rows.
    fn execute(&mut self, sql: &str) -> Result<(), EngineError>;

    /// Compiles a single statement.
    fn prepare(&mut self, sql: &str) -> Result<Self::Statement<'_>, EngineError>;

    /// Releases the resource.
    fn close(self) -> Result<(), EngineError>
    where
        Self: Sized;
}

/// A compiled statement: binding, then stepping through rows.
pub trait PreparedStatement: ParameterBinder {
    /// Result column names, in column order.
    fn column_names(&self) -> Vec<String>;

    /// Steps the statement, handing each produced row to `visit`.
    ///
    /// Stepping stops when the rows are exhausted, when `visit` returns
    /// `ControlFlow::Break`, or at the first error.
    fn step_rows(
        &mut self,
        visit: &mut dyn FnMut(&dyn ColumnReader) -> Result<ControlFlow<()>, EngineError>,
    ) -> Result<(), EngineError>;
}
