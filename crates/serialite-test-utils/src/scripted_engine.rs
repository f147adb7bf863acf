// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fake engine driven by a per-SQL script.
//!
//! `ScriptedEngine` implements `Engine` without a database: each SQL string
//! can be scripted to return rows, fail at a chosen step, panic, or block on a
//! [`Gate`]. A [`ScriptHandle`] kept by the test observes what the consumer
//! did after the engine has been moved into a wrapper.

use std::collections::{BTreeMap, HashMap};
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serialite_core::{
    ColumnReader, Engine, EngineError, ParameterBinder, PreparedStatement, ResourceId, TypedValue,
};

use crate::gate::Gate;

/// Where a scripted failure is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Execute,
    Prepare,
    Bind,
    Step,
}

#[derive(Default)]
struct Script {
    columns: HashMap<String, Vec<String>>,
    rows: HashMap<String, Vec<Vec<TypedValue>>>,
    failures: HashMap<String, (FailAt, String)>,
    panics: HashMap<String, String>,
    gates: HashMap<String, Gate>,
    close_error: Option<String>,
    close_gate: Option<Gate>,
    /// Every SQL string the consumer ran, in order.
    log: Vec<String>,
    /// Bindings applied per prepared run, in order.
    bindings: Vec<(String, BTreeMap<usize, TypedValue>)>,
    rows_delivered: usize,
    closes: usize,
}

fn lock(script: &Mutex<Script>) -> MutexGuard<'_, Script> {
    script.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-process engine following a script.
pub struct ScriptedEngine {
    id: ResourceId,
    script: Arc<Mutex<Script>>,
}

impl ScriptedEngine {
    /// Create an engine with the given identity and an empty script.
    ///
    /// Unscripted SQL succeeds and produces no rows.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(id),
            script: Arc::new(Mutex::new(Script::default())),
        }
    }

    /// Script the result set returned for `sql`.
    pub fn with_rows(
        self,
        sql: &str,
        columns: &[&str],
        rows: Vec<Vec<TypedValue>>,
    ) -> Self {
        {
            let mut script = lock(&self.script);
            script.columns.insert(
                sql.to_string(),
                columns.iter().map(|c| c.to_string()).collect(),
            );
            script.rows.insert(sql.to_string(), rows);
        }
        self
    }

    /// Make `sql` fail at `stage` with `message`.
    pub fn failing(self, sql: &str, stage: FailAt, message: &str) -> Self {
        lock(&self.script)
            .failures
            .insert(sql.to_string(), (stage, message.to_string()));
        self
    }

    /// Make running `sql` panic on the consumer thread.
    pub fn panicking(self, sql: &str, message: &str) -> Self {
        lock(&self.script)
            .panics
            .insert(sql.to_string(), message.to_string());
        self
    }

    /// Block the consumer on `gate` whenever it starts running `sql`.
    pub fn gated(self, sql: &str, gate: &Gate) -> Self {
        lock(&self.script)
            .gates
            .insert(sql.to_string(), gate.clone());
        self
    }

    /// Make `close()` fail with `message`.
    pub fn failing_close(self, message: &str) -> Self {
        lock(&self.script).close_error = Some(message.to_string());
        self
    }

    /// Block `close()` on `gate` before the engine counts as closed.
    pub fn gated_close(self, gate: &Gate) -> Self {
        lock(&self.script).close_gate = Some(gate.clone());
        self
    }

    /// A handle for observing the engine after it has been wrapped.
    pub fn handle(&self) -> ScriptHandle {
        ScriptHandle {
            script: Arc::clone(&self.script),
        }
    }

    /// Records `sql`, then applies its gate, panic and `stage` failure.
    fn enter(&self, sql: &str, stage: FailAt) -> Result<(), EngineError> {
        let (gate, panic, failure) = {
            let mut script = lock(&self.script);
            script.log.push(sql.to_string());
            (
                script.gates.get(sql).cloned(),
                script.panics.get(sql).cloned(),
                script.failures.get(sql).cloned(),
            )
        };
        if let Some(gate) = gate {
            gate.pass();
        }
        if let Some(message) = panic {
            panic!("{message}");
        }
        fail_if(failure.as_ref(), stage)
    }
}

fn fail_if(failure: Option<&(FailAt, String)>, stage: FailAt) -> Result<(), EngineError> {
    match failure {
        Some((at, message)) if *at == stage => Err(EngineError::with_code(1, message.clone())),
        _ => Ok(()),
    }
}

impl Engine for ScriptedEngine {
    type Statement<'conn> = ScriptedStatement;

    fn resource_id(&self) -> &ResourceId {
        &self.id
    }

    fn execute(&mut self, sql: &str) -> Result<(), EngineError> {
        self.enter(sql, FailAt::Execute)
    }

    fn prepare(&mut self, sql: &str) -> Result<ScriptedStatement, EngineError> {
        self.enter(sql, FailAt::Prepare)?;
        let script = lock(&self.script);
        Ok(ScriptedStatement {
            sql: sql.to_string(),
            failure: script.failures.get(sql).cloned(),
            columns: script.columns.get(sql).cloned().unwrap_or_default(),
            rows: script.rows.get(sql).cloned().unwrap_or_default(),
            bound: BTreeMap::new(),
            script: Arc::clone(&self.script),
        })
    }

    fn close(self) -> Result<(), EngineError> {
        let gate = lock(&self.script).close_gate.clone();
        if let Some(gate) = gate {
            gate.pass();
        }
        let mut script = lock(&self.script);
        script.closes += 1;
        match script.close_error.take() {
            Some(message) => Err(EngineError::new(message)),
            None => Ok(()),
        }
    }
}

/// Statement produced by [`ScriptedEngine::prepare`].
pub struct ScriptedStatement {
    sql: String,
    failure: Option<(FailAt, String)>,
    columns: Vec<String>,
    rows: Vec<Vec<TypedValue>>,
    bound: BTreeMap<usize, TypedValue>,
    script: Arc<Mutex<Script>>,
}

impl ScriptedStatement {
    fn record(&mut self, index: usize, value: TypedValue) -> Result<(), EngineError> {
        fail_if(self.failure.as_ref(), FailAt::Bind)?;
        self.bound.insert(index, value);
        Ok(())
    }
}

impl ParameterBinder for ScriptedStatement {
    fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<(), EngineError> {
        self.record(index, TypedValue::Blob(value.to_vec()))
    }
    fn bind_boolean(&mut self, index: usize, value: bool) -> Result<(), EngineError> {
        self.record(index, TypedValue::Boolean(value))
    }
    fn bind_double(&mut self, index: usize, value: f64) -> Result<(), EngineError> {
        self.record(index, TypedValue::Double(value))
    }
    fn bind_float(&mut self, index: usize, value: f32) -> Result<(), EngineError> {
        self.record(index, TypedValue::Float(value))
    }
    fn bind_int32(&mut self, index: usize, value: i32) -> Result<(), EngineError> {
        self.record(index, TypedValue::Int32(value))
    }
    fn bind_int64(&mut self, index: usize, value: i64) -> Result<(), EngineError> {
        self.record(index, TypedValue::Int64(value))
    }
    fn bind_text(&mut self, index: usize, value: &str) -> Result<(), EngineError> {
        self.record(index, TypedValue::Text(value.to_string()))
    }
    fn bind_null(&mut self, index: usize) -> Result<(), EngineError> {
        self.record(index, TypedValue::Null)
    }
}

impl PreparedStatement for ScriptedStatement {
    fn column_names(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn step_rows(
        &mut self,
        visit: &mut dyn FnMut(&dyn ColumnReader) -> Result<ControlFlow<()>, EngineError>,
    ) -> Result<(), EngineError> {
        lock(&self.script)
            .bindings
            .push((self.sql.clone(), self.bound.clone()));
        fail_if(self.failure.as_ref(), FailAt::Step)?;

        for row in &self.rows {
            lock(&self.script).rows_delivered += 1;
            if visit(&ScriptedRow { values: row })?.is_break() {
                break;
            }
        }
        Ok(())
    }
}

/// Reader over one scripted row. Reads are strict: the requested kind must
/// match the scripted kind, apart from widening between the integer kinds and
/// between the floating kinds.
struct ScriptedRow<'a> {
    values: &'a [TypedValue],
}

impl ScriptedRow<'_> {
    fn value(&self, index: usize) -> Result<&TypedValue, EngineError> {
        self.values.get(index).ok_or_else(|| {
            EngineError::with_code(25, format!("column index {index} out of range"))
        })
    }

    fn mismatch(&self, index: usize, wanted: &str) -> EngineError {
        let found = self
            .values
            .get(index)
            .map(|v| v.tag().to_string())
            .unwrap_or_default();
        EngineError::new(format!("column {index} holds {found}, not {wanted}"))
    }
}

impl ColumnReader for ScriptedRow<'_> {
    fn column_count(&self) -> usize {
        self.values.len()
    }

    fn is_null(&self, index: usize) -> Result<bool, EngineError> {
        Ok(self.value(index)?.is_null())
    }

    fn get_blob(&self, index: usize) -> Result<Vec<u8>, EngineError> {
        match self.value(index)? {
            TypedValue::Blob(v) => Ok(v.clone()),
            _ => Err(self.mismatch(index, "Blob")),
        }
    }

    fn get_boolean(&self, index: usize) -> Result<bool, EngineError> {
        match self.value(index)? {
            TypedValue::Boolean(v) => Ok(*v),
            _ => Err(self.mismatch(index, "Boolean")),
        }
    }

    fn get_double(&self, index: usize) -> Result<f64, EngineError> {
        match self.value(index)? {
            TypedValue::Double(v) => Ok(*v),
            TypedValue::Float(v) => Ok(f64::from(*v)),
            _ => Err(self.mismatch(index, "Double")),
        }
    }

    fn get_float(&self, index: usize) -> Result<f32, EngineError> {
        match self.value(index)? {
            TypedValue::Float(v) => Ok(*v),
            TypedValue::Double(v) => Ok(*v as f32),
            _ => Err(self.mismatch(index, "Float")),
        }
    }

    fn get_int32(&self, index: usize) -> Result<i32, EngineError> {
        match self.value(index)? {
            TypedValue::Int32(v) => Ok(*v),
            TypedValue::Int64(v) => Ok(*v as i32),
            _ => Err(self.mismatch(index, "Int32")),
        }
    }

    fn get_int64(&self, index: usize) -> Result<i64, EngineError> {
        match self.value(index)? {
            TypedValue::Int64(v) => Ok(*v),
            TypedValue::Int32(v) => Ok(i64::from(*v)),
            _ => Err(self.mismatch(index, "Int64")),
        }
    }

    fn get_text(&self, index: usize) -> Result<String, EngineError> {
        match self.value(index)? {
            TypedValue::Text(v) => Ok(v.clone()),
            _ => Err(self.mismatch(index, "Text")),
        }
    }

    fn get_dynamic(&self, index: usize) -> Result<TypedValue, EngineError> {
        self.value(index).cloned()
    }
}

/// Observer for a [`ScriptedEngine`] that has been moved elsewhere.
#[derive(Clone)]
pub struct ScriptHandle {
    script: Arc<Mutex<Script>>,
}

impl ScriptHandle {
    /// SQL strings the consumer started, in execution order.
    pub fn executed(&self) -> Vec<String> {
        lock(&self.script).log.clone()
    }

    /// Bindings seen by each prepared statement that reached the step stage.
    pub fn bindings(&self) -> Vec<(String, BTreeMap<usize, TypedValue>)> {
        lock(&self.script).bindings.clone()
    }

    /// Rows handed to visitors so far, across all statements.
    pub fn rows_delivered(&self) -> usize {
        lock(&self.script).rows_delivered
    }

    /// How many times `close()` was called on the engine.
    pub fn close_count(&self) -> usize {
        lock(&self.script).closes
    }
}
