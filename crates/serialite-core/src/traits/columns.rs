// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-kind bind and get primitives.
//!
//! Indices are 0-based on both sides. Adapters translate to whatever their
//! library expects (SQLite parameters are 1-based).

use crate::error::EngineError;
use crate::value::TypedValue;

/// Bind primitives of a prepared statement, one per value kind.
pub trait ParameterBinder {
    fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<(), EngineError>;
    fn bind_boolean(&mut self, index: usize, value: bool) -> Result<(), EngineError>;
    fn bind_double(&mut self, index: usize, value: f64) -> Result<(), EngineError>;
    fn bind_float(&mut self, index: usize, value: f32) -> Result<(), EngineError>;
    fn bind_int32(&mut self, index: usize, value: i32) -> Result<(), EngineError>;
    fn bind_int64(&mut self, index: usize, value: i64) -> Result<(), EngineError>;
    fn bind_text(&mut self, index: usize, value: &str) -> Result<(), EngineError>;
    fn bind_null(&mut self, index: usize) -> Result<(), EngineError>;
}

/// Get primitives of the row the statement is currently positioned on.
pub trait ColumnReader {
    /// Number of columns in the result set.
    fn column_count(&self) -> usize;

    /// Whether the column holds SQL NULL.
    fn is_null(&self, index: usize) -> Result<bool, EngineError>;

    fn get_blob(&self, index: usize) -> Result<Vec<u8>, EngineError>;
    fn get_boolean(&self, index: usize) -> Result<bool, EngineError>;
    fn get_double(&self, index: usize) -> Result<f64, EngineError>;
    fn get_float(&self, index: usize) -> Result<f32, EngineError>;
    fn get_int32(&self, index: usize) -> Result<i32, EngineError>;
    fn get_int64(&self, index: usize) -> Result<i64, EngineError>;
    fn get_text(&self, index: usize) -> Result<String, EngineError>;

    /// Reads the column with whatever storage class the engine reports.
    ///
    /// Text that is not valid UTF-8 comes back as `TypedValue::Blob` with the
    /// raw bytes rather than being replaced lossily.
    fn get_dynamic(&self, index: usize) -> Result<TypedValue, EngineError>;
}
