// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statement handles: bind parameters, declare the columns to read, submit.
//!
//! A handle is a builder on the caller's side. Nothing touches the engine
//! until [`Statement::submit`], which snapshots the handle into a job. Rows
//! arrive later, on the consumer thread, through the row callback.
//!
//! ```no_run
//! # use serialite::{Wrapper, SqliteEngine};
//! # fn demo(db: &Wrapper<SqliteEngine>) -> serialite::Result<()> {
//! let mut stmt = db.prepare("SELECT id, name FROM users WHERE id > ?")?;
//! stmt.bind(0, 10i64);
//! stmt.declare::<i64>(0);
//! stmt.declare::<String>(1);
//! stmt.on_row(|row| {
//!     if let (Ok(id), Ok(name)) = (row.get::<i64>(0), row.get::<String>(1)) {
//!         println!("{id}: {name}");
//!     }
//!     true
//! });
//! stmt.submit()?.wait()?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serialite_core::{ColumnType, Engine, EngineError, SerialiteError, TypeTag, TypedValue};

use crate::completion::{Completion, CompletionCallback};
use crate::job::{JobKind, RowCallback, RowSink};
use crate::queue::Shared;
use crate::row::ResultRow;

/// Completion callback shared by every submission of one handle.
pub(crate) type SharedCallback = Arc<dyn Fn(Result<(), &EngineError>) + Send + Sync + 'static>;

/// Builder for a prepared job against a wrapped engine.
pub struct Statement<E: Engine> {
    shared: Arc<Shared<E>>,
    sql: String,
    bindings: BTreeMap<usize, TypedValue>,
    declared: BTreeMap<usize, TypeTag>,
    row_sink: Option<RowSink>,
    on_complete: Option<SharedCallback>,
}

impl<E: Engine> Statement<E> {
    pub(crate) fn new(shared: Arc<Shared<E>>, sql: String, on_complete: Option<SharedCallback>) -> Self {
        Self {
            shared,
            sql,
            bindings: BTreeMap::new(),
            declared: BTreeMap::new(),
            row_sink: None,
            on_complete,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Binds `value` to the 0-based parameter `index`. A later bind to the
    /// same index replaces the earlier one.
    pub fn bind(&mut self, index: usize, value: impl Into<TypedValue>) -> &mut Self {
        self.bindings.insert(index, value.into());
        self
    }

    pub fn bind_null(&mut self, index: usize) -> &mut Self {
        self.bindings.insert(index, TypedValue::Null);
        self
    }

    /// Declares that column `index` is to be read as `T`.
    ///
    /// This records the expectation; it does not read anything. The returned
    /// zero value (`0`, `0.0`, `false`, empty) only lets call sites mirror the
    /// eventual read.
    pub fn declare<T: ColumnType>(&mut self, index: usize) -> T {
        self.declared.insert(index, T::TAG);
        T::placeholder()
    }

    /// Untyped form of [`Statement::declare`].
    pub fn declare_tag(&mut self, index: usize, tag: TypeTag) -> TypedValue {
        self.declared.insert(index, tag);
        tag.placeholder()
    }

    /// Forgets every declared column. Bindings are kept.
    pub fn reset_declared(&mut self) -> &mut Self {
        self.declared.clear();
        self
    }

    /// Forgets every binding. Declared columns are kept.
    pub fn clear_bindings(&mut self) -> &mut Self {
        self.bindings.clear();
        self
    }

    /// Sets the callback receiving each produced row. Returning `false` stops
    /// the statement early; the job still completes successfully.
    pub fn on_row<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&ResultRow<'_>) -> bool + Send + 'static,
    {
        let callback: RowCallback = Box::new(callback);
        self.row_sink = Some(Arc::new(Mutex::new(callback)));
        self
    }

    /// Applies `f` to the handle and returns it, for building a statement in
    /// one expression.
    pub fn configure(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }

    pub fn bindings(&self) -> &BTreeMap<usize, TypedValue> {
        &self.bindings
    }

    pub fn declared(&self) -> &BTreeMap<usize, TypeTag> {
        &self.declared
    }

    /// Enqueues a job built from the current bindings, declarations and row
    /// callback, returning immediately.
    ///
    /// Later changes to the handle do not affect the submitted job, and the
    /// handle can be submitted again.
    pub fn submit(&self) -> Result<Completion, SerialiteError> {
        let kind = JobKind::Prepared {
            bindings: self.bindings.clone(),
            declared: self.declared.clone(),
            row_sink: self.row_sink.clone(),
        };
        let callback = self.on_complete.clone().map(|cb| -> CompletionCallback {
            Box::new(move |outcome: Result<(), &EngineError>| cb(outcome))
        });
        self.shared.enqueue(self.sql.clone(), kind, callback)
    }
}

impl<E: Engine> fmt::Debug for Statement<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("sql", &self.sql)
            .field("bindings", &self.bindings)
            .field("declared", &self.declared)
            .field("has_row_callback", &self.row_sink.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Wrapper;
    use serialite_test_utils::ScriptedEngine;

    #[test]
    fn bindings_overwrite_and_clear_independently() {
        let db = Wrapper::wrap(ScriptedEngine::new("statement-test:bindings")).unwrap();
        let mut stmt = db.prepare("SELECT ?").unwrap();
        stmt.bind(0, 1i32).bind(0, "two").bind_null(1);
        assert_eq!(stmt.bindings()[&0], TypedValue::Text("two".into()));
        assert_eq!(stmt.bindings()[&1], TypedValue::Null);

        stmt.declare::<i64>(0);
        stmt.clear_bindings();
        assert!(stmt.bindings().is_empty());
        assert_eq!(stmt.declared().len(), 1);

        stmt.bind(0, 5i64);
        stmt.reset_declared();
        assert!(stmt.declared().is_empty());
        assert_eq!(stmt.bindings().len(), 1);
    }

    #[test]
    fn declarations_return_placeholders() {
        let db = Wrapper::wrap(ScriptedEngine::new("statement-test:declare")).unwrap();
        let mut stmt = db.prepare("SELECT a, b, c, d").unwrap();
        assert_eq!(stmt.declare::<i32>(0), 0);
        assert_eq!(stmt.declare::<String>(1), "");
        assert!(!stmt.declare::<bool>(2));
        assert_eq!(stmt.declare_tag(3, TypeTag::Null), TypedValue::Null);
        assert_eq!(stmt.declare::<f64>(3), 0.0);

        assert_eq!(stmt.declared()[&0], TypeTag::Int32);
        assert_eq!(stmt.declared()[&3], TypeTag::Double);
    }

    #[test]
    fn configure_builds_in_one_expression() {
        let db = Wrapper::wrap(ScriptedEngine::new("statement-test:configure")).unwrap();
        let stmt = db
            .prepare("SELECT name FROM users WHERE id = ?")
            .unwrap()
            .configure(|s| {
                s.bind(0, 7i64);
                s.declare::<String>(0);
            });
        assert_eq!(stmt.sql(), "SELECT name FROM users WHERE id = ?");
        assert_eq!(stmt.bindings()[&0], TypedValue::Int64(7));
        assert_eq!(stmt.declared()[&0], TypeTag::Text);
    }

    #[test]
    fn each_submission_snapshots_bindings() {
        let engine = ScriptedEngine::new("statement-test:snapshot");
        let handle = engine.handle();
        let db = Wrapper::wrap(engine).unwrap();
        let mut stmt = db.prepare("INSERT INTO t VALUES (?)").unwrap();

        stmt.bind(0, 1i64);
        let first = stmt.submit().unwrap();
        stmt.bind(0, 2i64);
        let second = stmt.submit().unwrap();
        first.wait().unwrap();
        second.wait().unwrap();

        let bound: Vec<TypedValue> = handle
            .bindings()
            .into_iter()
            .map(|(_, b)| b[&0].clone())
            .collect();
        assert_eq!(bound, vec![TypedValue::Int64(1), TypedValue::Int64(2)]);
    }
}
