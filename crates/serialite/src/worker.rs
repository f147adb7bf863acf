// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The consumer loop: the only code that touches the engine while the
//! wrapper is open.

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::{Arc, PoisonError};
use std::thread;
use std::time::Instant;

use serialite_core::{
    Engine, EngineError, LifecycleState, PreparedStatement, RestartPolicy, TypeTag, TypedValue,
    WorkerState,
};
use tracing::{debug, debug_span, error, warn};

use crate::job::{Job, JobKind, RowSink};
use crate::queue::Shared;
use crate::recording;
use crate::row::ResultRow;

/// Marks the worker stopped or crashed however the loop is left. After a
/// crash with jobs still queued, the restart policy may hand them to a fresh
/// consumer straight away.
struct ExitGuard<'a, E: Engine> {
    shared: &'a Arc<Shared<E>>,
}

impl<E: Engine> Drop for ExitGuard<'_, E> {
    fn drop(&mut self) {
        let shared = self.shared;
        let crashed = thread::panicking();
        let mut state = shared.lock_state();
        state.transition(if crashed {
            WorkerState::Crashed
        } else {
            WorkerState::Stopped
        });
        state.worker_thread = None;
        let pending = state.jobs.len();

        if !crashed {
            drop(state);
            shared.worker_exited.notify_all();
            debug!(resource = %shared.resource, "consumer worker stopped");
            return;
        }

        error!(resource = %shared.resource, pending, "consumer worker crashed");
        if pending > 0 && shared.options.restart_policy == RestartPolicy::Restart {
            // This thread is exiting; detach its own handle rather than join it.
            drop(state.handle.take());
            if let Err(err) = shared.restart_worker(&mut state) {
                error!(resource = %shared.resource, error = %err, "could not restart consumer worker");
            }
        }
        drop(state);
        shared.worker_exited.notify_all();
    }
}

/// Body of the consumer thread.
pub(crate) fn run<E: Engine>(shared: Arc<Shared<E>>) {
    let _guard = ExitGuard { shared: &shared };
    debug!(resource = %shared.resource, "consumer worker started");

    while let Some(job) = next_job(&shared) {
        execute(&shared, job);
    }
}

/// Pops the next job, sleeping while the queue is empty. Returns `None` once
/// the queue is empty and closing has begun.
fn next_job<E: Engine>(shared: &Shared<E>) -> Option<Job> {
    let mut state = shared.lock_state();
    loop {
        if let Some(job) = state.jobs.pop_front() {
            recording::set_queue_depth(state.jobs.len());
            return Some(job);
        }
        if state.lifecycle != LifecycleState::Open {
            return None;
        }
        state = shared
            .work_available
            .wait(state)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

fn execute<E: Engine>(shared: &Shared<E>, job: Job) {
    let Job {
        sequence,
        sql,
        kind,
        resolver,
    } = job;
    let label = kind.label();
    let span = debug_span!("job", seq = sequence, kind = label);
    let _enter = span.enter();

    let started = Instant::now();
    let outcome = {
        let mut engine = shared.lock_engine();
        match engine.as_mut() {
            Some(engine) => match &kind {
                JobKind::Fire => engine.execute(&sql),
                JobKind::Prepared {
                    bindings,
                    declared,
                    row_sink,
                } => run_prepared(engine, &sql, bindings, declared, row_sink.as_ref()),
            },
            None => Err(EngineError::new("engine already released")),
        }
    };
    let elapsed = started.elapsed();

    match &outcome {
        Ok(()) => debug!(elapsed_ms = elapsed.as_millis() as u64, "job completed"),
        Err(err) => warn!(error = %err, code = ?err.code, "job failed"),
    }
    recording::record_completed(label, outcome.is_ok(), elapsed);
    resolver.resolve(outcome);
}

/// Prepare, bind, step. The statement is finalized when it drops, on every
/// exit path.
fn run_prepared<E: Engine>(
    engine: &mut E,
    sql: &str,
    bindings: &BTreeMap<usize, TypedValue>,
    declared: &BTreeMap<usize, TypeTag>,
    row_sink: Option<&RowSink>,
) -> Result<(), EngineError> {
    let mut stmt = engine.prepare(sql)?;
    for (&index, value) in bindings {
        value.bind_to(&mut stmt, index)?;
    }
    let column_names = stmt.column_names();

    let mut sink = row_sink.map(|sink| sink.lock().unwrap_or_else(PoisonError::into_inner));
    let mut delivered = 0usize;
    stmt.step_rows(&mut |reader| {
        let Some(callback) = sink.as_deref_mut() else {
            return Ok(ControlFlow::Continue(()));
        };
        let row = ResultRow::read(reader, declared, &column_names)?;
        delivered += 1;
        if callback(&row) {
            Ok(ControlFlow::Continue(()))
        } else {
            debug!(rows = delivered, "row callback stopped the statement");
            Ok(ControlFlow::Break(()))
        }
    })
}
