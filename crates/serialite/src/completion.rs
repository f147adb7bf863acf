// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job completion: an awaitable handle for the caller and the resolving side
//! held by the job.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serialite_core::{EngineError, JobError};
use tokio::sync::oneshot;

/// Callback invoked on the consumer thread when a job finishes.
///
/// Receives `Ok(())` on success (including an early stop requested by the
/// row callback) or the engine error that ended the job.
pub type CompletionCallback = Box<dyn FnOnce(Result<(), &EngineError>) + Send + 'static>;

/// Outcome of a submitted job.
///
/// Await it from async code, or call [`Completion::wait`] from a plain
/// thread. Dropping it does not cancel the job.
#[must_use = "a Completion reports the job's outcome; dropping it ignores errors"]
#[derive(Debug)]
pub struct Completion {
    sequence: u64,
    rx: oneshot::Receiver<Result<(), JobError>>,
}

impl Completion {
    /// Queue sequence number of the job this completion belongs to.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Blocks the current thread until the job finishes.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context; await
    /// the completion there instead.
    pub fn wait(self) -> Result<(), JobError> {
        self.rx.blocking_recv().unwrap_or(Err(JobError::Abandoned))
    }

    /// Returns the outcome if the job has already finished.
    pub fn try_outcome(&mut self) -> Option<Result<(), JobError>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(JobError::Abandoned)),
        }
    }
}

impl Future for Completion {
    type Output = Result<(), JobError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(JobError::Abandoned)))
    }
}

/// Resolving half of a completion, owned by the job.
///
/// Dropping it unresolved (the worker panicked mid-job) resolves the
/// caller's side with [`JobError::Abandoned`].
pub(crate) struct Resolver {
    tx: oneshot::Sender<Result<(), JobError>>,
    callback: Option<CompletionCallback>,
}

impl Resolver {
    /// Runs the callback, then wakes whoever holds the [`Completion`].
    pub(crate) fn resolve(self, outcome: Result<(), EngineError>) {
        if let Some(callback) = self.callback {
            callback(outcome.as_ref().map(|_| ()));
        }
        // The receiver may already be gone; that is allowed.
        let _ = self.tx.send(outcome.map_err(JobError::Engine));
    }
}

pub(crate) fn channel(sequence: u64, callback: Option<CompletionCallback>) -> (Resolver, Completion) {
    let (tx, rx) = oneshot::channel();
    (Resolver { tx, callback }, Completion { sequence, rx })
}
