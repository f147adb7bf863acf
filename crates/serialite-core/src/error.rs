// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for serialite.
//!
//! Errors fall into three groups:
//! - [`SerialiteError`]: raised synchronously by the wrapper (wrap, submit, close).
//! - [`JobError`] / [`EngineError`]: delivered asynchronously through a job's completion.
//! - [`RowError`]: raised while reading a produced row inside a row callback.

use thiserror::Error;

use crate::types::ResourceId;
use crate::value::TypeTag;

/// Errors surfaced synchronously at the call site of a wrapper operation.
#[derive(Debug, Error)]
pub enum SerialiteError {
    /// The wrapper is closing or closed; the job was not enqueued.
    #[error("connection is closing or closed; job rejected")]
    AlreadyClosed,

    /// The resource is already owned by another live wrapper.
    #[error("resource `{resource}` is already wrapped")]
    AlreadyWrapped { resource: ResourceId },

    /// The consumer worker exited while jobs were still queued.
    #[error("consumer worker stopped with {pending} job(s) still queued")]
    QueueNotDrained { pending: usize },

    /// The consumer worker crashed and the restart policy is terminal.
    #[error("consumer worker crashed; wrapper must be discarded")]
    WorkerCrashed,

    /// `close()` was called from the consumer thread itself (e.g. inside a row callback).
    #[error("close() cannot be called from the consumer thread")]
    CloseFromWorker,

    /// The OS refused to spawn the consumer thread.
    #[error("failed to spawn consumer worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// The engine failed while being released.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// A failure reported by the underlying database engine.
#[derive(Debug, Error)]
#[error("engine error: {message}")]
pub struct EngineError {
    /// Engine-specific (extended) result code, when the engine provides one.
    pub code: Option<i32>,
    /// Human-readable message.
    pub message: String,
    /// Original error, when the engine error wraps a library error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl EngineError {
    /// Creates an engine error from a message alone.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an engine error carrying an engine result code.
    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a library error, keeping it as the error source.
    pub fn wrap<E>(code: Option<i32>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            code,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Outcome error of one job, delivered through its completion.
#[derive(Debug, Error)]
pub enum JobError {
    /// The engine failed during execute/prepare/bind/step/get.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The consumer crashed while running this job, so it never resolved.
    #[error("job abandoned: consumer worker crashed before completing it")]
    Abandoned,
}

/// Errors raised while reading a produced row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// The index was read with a different type than it was declared with.
    #[error("column {index} was declared as {declared}, not {expected}")]
    TypeMismatch {
        index: usize,
        expected: TypeTag,
        declared: TypeTag,
    },

    /// The index was never declared on the statement before submission.
    #[error("column {index} was not declared before the statement was submitted")]
    IndexNotDeclared { index: usize },

    /// A typed read found SQL NULL.
    #[error("column {index} is NULL")]
    UnexpectedNull { index: usize },

    /// Column metadata lookup past the end of the result set.
    #[error("column {index} is out of range ({count} column(s))")]
    ColumnOutOfRange { index: usize, count: usize },
}

/// Result alias for wrapper-level operations.
pub type Result<T, E = SerialiteError> = std::result::Result<T, E>;
