// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The FIFO job queue and the state it shares with the consumer worker.
//!
//! Producers and the consumer meet at one mutex-guarded [`QueueState`].
//! `work_available` wakes the consumer when a job arrives or closing begins;
//! `worker_exited` wakes `close()` when the consumer leaves its loop.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use serialite_config::WorkerConfig;
use serialite_core::{Engine, LifecycleState, ResourceId, RestartPolicy, SerialiteError, WorkerState};
use tracing::{debug, warn};

use crate::completion::{self, Completion, CompletionCallback};
use crate::job::{Job, JobKind};
use crate::recording;
use crate::registry::RegistryToken;
use crate::worker;

/// Settings for the consumer worker of one wrapper.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// OS thread name of the consumer.
    pub thread_name: String,
    /// What happens after the consumer panics.
    pub restart_policy: RestartPolicy,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self::from(&WorkerConfig::default())
    }
}

impl From<&WorkerConfig> for WorkerOptions {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            thread_name: config.thread_name.clone(),
            restart_policy: config.restart_policy,
        }
    }
}

/// Everything guarded by the queue lock.
pub(crate) struct QueueState {
    pub(crate) jobs: VecDeque<Job>,
    pub(crate) lifecycle: LifecycleState,
    pub(crate) worker: WorkerState,
    pub(crate) handle: Option<JoinHandle<()>>,
    pub(crate) worker_thread: Option<ThreadId>,
    /// Set while one `close()` call is releasing the engine. Other callers
    /// wait for `Closed` instead of racing it.
    pub(crate) releasing: bool,
    next_sequence: u64,
}

impl QueueState {
    /// Moves the worker to `next`, logging transitions outside the table.
    pub(crate) fn transition(&mut self, next: WorkerState) {
        if !self.worker.can_transition_to(next) {
            warn!(from = %self.worker, to = %next, "unexpected worker state transition");
        }
        self.worker = next;
    }
}

/// State shared between a wrapper, its statement handles and its consumer.
pub(crate) struct Shared<E: Engine> {
    state: Mutex<QueueState>,
    pub(crate) work_available: Condvar,
    pub(crate) worker_exited: Condvar,
    engine: Mutex<Option<E>>,
    registration: Mutex<Option<RegistryToken>>,
    pub(crate) resource: ResourceId,
    pub(crate) options: WorkerOptions,
}

impl<E: Engine> Shared<E> {
    pub(crate) fn new(engine: E, token: RegistryToken, options: WorkerOptions) -> Self {
        Self {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                lifecycle: LifecycleState::Open,
                worker: WorkerState::NotStarted,
                handle: None,
                worker_thread: None,
                releasing: false,
                next_sequence: 1,
            }),
            work_available: Condvar::new(),
            worker_exited: Condvar::new(),
            resource: token.resource().clone(),
            engine: Mutex::new(Some(engine)),
            registration: Mutex::new(Some(token)),
            options,
        }
    }

    /// Locks the queue state, recovering from poisoning.
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the engine slot. Poisoned when a row or completion callback
    /// panicked mid-job; the engine itself is still usable.
    pub(crate) fn lock_engine(&self) -> MutexGuard<'_, Option<E>> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops the registry token, making the resource wrappable again.
    pub(crate) fn release_registration(&self) {
        self.registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Appends a job, starting or restarting the consumer as needed.
    ///
    /// Never waits on execution: the only blocking is the queue lock itself.
    pub(crate) fn enqueue(
        self: &Arc<Self>,
        sql: String,
        kind: JobKind,
        callback: Option<CompletionCallback>,
    ) -> Result<Completion, SerialiteError> {
        let label = kind.label();
        let mut state = self.lock_state();
        if state.lifecycle != LifecycleState::Open {
            return Err(SerialiteError::AlreadyClosed);
        }

        match state.worker {
            WorkerState::Running => {}
            WorkerState::NotStarted => self.spawn_worker(&mut state)?,
            WorkerState::Crashed => match self.options.restart_policy {
                RestartPolicy::Restart => self.restart_worker(&mut state)?,
                RestartPolicy::Terminal => return Err(SerialiteError::WorkerCrashed),
            },
            // Only reachable once closing has begun.
            WorkerState::Stopped => return Err(SerialiteError::AlreadyClosed),
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        let (resolver, completion) = completion::channel(sequence, callback);
        state.jobs.push_back(Job {
            sequence,
            sql,
            kind,
            resolver,
        });
        let depth = state.jobs.len();
        drop(state);

        self.work_available.notify_one();
        recording::record_enqueued(label, depth);
        Ok(completion)
    }

    /// Replaces a crashed consumer. Called with the queue lock held.
    ///
    /// A crashed consumer that still holds its own handle has already been
    /// detached by the caller, so any handle left here belongs to a thread
    /// that has finished.
    pub(crate) fn restart_worker(self: &Arc<Self>, state: &mut QueueState) -> Result<(), SerialiteError> {
        if let Some(previous) = state.handle.take()
            && previous.join().is_err()
        {
            debug!(resource = %self.resource, "reaped crashed consumer worker");
        }
        self.spawn_worker(state)?;
        recording::record_worker_restart();
        warn!(
            resource = %self.resource,
            pending = state.jobs.len(),
            "consumer worker restarted after crash"
        );
        Ok(())
    }

    /// Spawns a consumer thread. Called with the queue lock held.
    fn spawn_worker(self: &Arc<Self>, state: &mut QueueState) -> Result<(), SerialiteError> {
        let shared = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(self.options.thread_name.clone())
            .spawn(move || worker::run(shared))
            .map_err(SerialiteError::Spawn)?;

        state.worker_thread = Some(handle.thread().id());
        state.handle = Some(handle);
        state.transition(WorkerState::Running);
        debug!(
            resource = %self.resource,
            thread = %self.options.thread_name,
            "consumer worker spawned"
        );
        Ok(())
    }
}
