// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The unit of work carried by the queue.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serialite_core::{TypeTag, TypedValue};

use crate::completion::Resolver;
use crate::row::ResultRow;

/// Row callback. Returning `false` stops stepping the statement.
pub type RowCallback = Box<dyn FnMut(&ResultRow<'_>) -> bool + Send + 'static>;

/// A row callback shared by every job submitted from the same statement
/// handle. Jobs run one at a time, so the lock is never contended.
pub(crate) type RowSink = Arc<Mutex<RowCallback>>;

/// What the consumer does with a job's SQL.
pub(crate) enum JobKind {
    /// Execute directly, discarding rows.
    Fire,
    /// Prepare, bind in index order, step, and hand declared columns of each
    /// row to the sink.
    Prepared {
        bindings: BTreeMap<usize, TypedValue>,
        declared: BTreeMap<usize, TypeTag>,
        row_sink: Option<RowSink>,
    },
}

impl JobKind {
    /// Label used in spans and metrics.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            JobKind::Fire => "fire",
            JobKind::Prepared { .. } => "prepared",
        }
    }
}

/// An immutable, queued unit of work.
pub(crate) struct Job {
    pub(crate) sequence: u64,
    pub(crate) sql: String,
    pub(crate) kind: JobKind,
    pub(crate) resolver: Resolver,
}
