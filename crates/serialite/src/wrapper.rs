// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The connection wrapper: owns an engine, its queue and its consumer.

use std::sync::{Arc, PoisonError};
use std::thread;

use serialite_core::{Engine, EngineError, LifecycleState, ResourceId, SerialiteError, WorkerState};
use tracing::{debug, info, warn};

use crate::completion::{Completion, CompletionCallback};
use crate::job::JobKind;
use crate::queue::{Shared, WorkerOptions};
use crate::registry::RegistryToken;
use crate::statement::{SharedCallback, Statement};

/// Serializes all use of an engine onto one consumer thread.
///
/// Any number of threads may submit work through a shared `&Wrapper`; jobs
/// run one at a time in submission order. The consumer starts with the first
/// job.
pub struct Wrapper<E: Engine> {
    shared: Arc<Shared<E>>,
}

impl<E: Engine> Wrapper<E> {
    /// Takes ownership of `engine` with default worker options.
    ///
    /// Fails with `AlreadyWrapped` while another wrapper owns the same
    /// resource.
    pub fn wrap(engine: E) -> Result<Self, SerialiteError> {
        Self::wrap_with(engine, WorkerOptions::default())
    }

    pub fn wrap_with(engine: E, options: WorkerOptions) -> Result<Self, SerialiteError> {
        let token = RegistryToken::acquire(engine.resource_id().clone())?;
        info!(
            resource = %token.resource(),
            thread = %options.thread_name,
            restart_policy = %options.restart_policy,
            "resource wrapped"
        );
        Ok(Self {
            shared: Arc::new(Shared::new(engine, token, options)),
        })
    }

    /// Queues `sql` for direct execution. Rows, if any, are discarded.
    pub fn exec(&self, sql: impl Into<String>) -> Result<Completion, SerialiteError> {
        self.shared.enqueue(sql.into(), JobKind::Fire, None)
    }

    /// Like [`Wrapper::exec`], also invoking `on_complete` on the consumer
    /// thread when the job finishes.
    pub fn exec_with<F>(&self, sql: impl Into<String>, on_complete: F) -> Result<Completion, SerialiteError>
    where
        F: FnOnce(Result<(), &EngineError>) + Send + 'static,
    {
        let callback: CompletionCallback = Box::new(on_complete);
        self.shared.enqueue(sql.into(), JobKind::Fire, Some(callback))
    }

    /// Starts a statement handle. Nothing is compiled until it is submitted.
    pub fn prepare(&self, sql: impl Into<String>) -> Result<Statement<E>, SerialiteError> {
        self.new_statement(sql.into(), None)
    }

    /// Like [`Wrapper::prepare`]; `on_complete` runs once per submission.
    pub fn prepare_with<F>(&self, sql: impl Into<String>, on_complete: F) -> Result<Statement<E>, SerialiteError>
    where
        F: Fn(Result<(), &EngineError>) + Send + Sync + 'static,
    {
        let callback: SharedCallback = Arc::new(on_complete);
        self.new_statement(sql.into(), Some(callback))
    }

    fn new_statement(
        &self,
        sql: String,
        on_complete: Option<SharedCallback>,
    ) -> Result<Statement<E>, SerialiteError> {
        if self.state() != LifecycleState::Open {
            return Err(SerialiteError::AlreadyClosed);
        }
        Ok(Statement::new(Arc::clone(&self.shared), sql, on_complete))
    }

    /// Stops accepting jobs, waits for queued jobs to finish, then closes the
    /// engine and releases the resource.
    ///
    /// Closing an already closed wrapper is a no-op. Concurrent callers all
    /// return only once the resource is released; the engine is closed by
    /// exactly one of them. If the consumer crashed with jobs still queued,
    /// returns `QueueNotDrained` and keeps the resource. An engine error while
    /// closing is returned, but the wrapper is closed regardless.
    pub fn close(&self) -> Result<(), SerialiteError> {
        let shared = &self.shared;
        let mut state = shared.lock_state();
        if state.worker_thread == Some(thread::current().id()) {
            return Err(SerialiteError::CloseFromWorker);
        }
        if state.lifecycle == LifecycleState::Open {
            state.lifecycle = LifecycleState::Closing;
            debug!(
                resource = %shared.resource,
                pending = state.jobs.len(),
                "closing; draining queue"
            );
        }
        shared.work_available.notify_all();

        loop {
            if state.lifecycle == LifecycleState::Closed {
                return Ok(());
            }
            if state.worker != WorkerState::Running && !state.releasing {
                break;
            }
            state = shared
                .worker_exited
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        let handle = state.handle.take();
        let pending = state.jobs.len();
        if pending == 0 {
            state.releasing = true;
        }
        drop(state);

        // The consumer already recorded how it ended.
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        if pending > 0 {
            warn!(resource = %shared.resource, pending, "consumer stopped before draining the queue");
            return Err(SerialiteError::QueueNotDrained { pending });
        }

        let engine = shared.lock_engine().take();
        let closed = match engine {
            Some(engine) => engine.close(),
            None => Ok(()),
        };
        shared.release_registration();
        {
            let mut state = shared.lock_state();
            state.lifecycle = LifecycleState::Closed;
            state.releasing = false;
        }
        shared.worker_exited.notify_all();

        match closed {
            Ok(()) => {
                info!(resource = %shared.resource, "resource closed");
                Ok(())
            }
            Err(err) => {
                warn!(resource = %shared.resource, error = %err, "engine failed to close cleanly");
                Err(SerialiteError::Engine(err))
            }
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.lock_state().lifecycle
    }

    pub fn worker_state(&self) -> WorkerState {
        self.shared.lock_state().worker
    }

    /// Jobs accepted but not yet started.
    pub fn pending_jobs(&self) -> usize {
        self.shared.lock_state().jobs.len()
    }

    pub fn resource_id(&self) -> &ResourceId {
        &self.shared.resource
    }
}

impl<E: Engine> Drop for Wrapper<E> {
    fn drop(&mut self) {
        if self.state() == LifecycleState::Closed {
            return;
        }
        if let Err(err) = self.close() {
            warn!(resource = %self.shared.resource, error = %err, "close on drop failed");
        }
    }
}

impl<E: Engine> std::fmt::Debug for Wrapper<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock_state();
        f.debug_struct("Wrapper")
            .field("resource", &self.shared.resource)
            .field("lifecycle", &state.lifecycle)
            .field("worker", &state.worker)
            .field("pending", &state.jobs.len())
            .finish()
    }
}

/// Wrap an engine directly: `SqliteEngine::open(path)?.serial()?`.
pub trait WrapExt: Engine + Sized {
    fn serial(self) -> Result<Wrapper<Self>, SerialiteError> {
        Wrapper::wrap(self)
    }

    fn serial_with(self, options: WorkerOptions) -> Result<Wrapper<Self>, SerialiteError> {
        Wrapper::wrap_with(self, options)
    }
}

impl<E: Engine> WrapExt for E {}
