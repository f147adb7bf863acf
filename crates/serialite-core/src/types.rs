// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the wrapper, the engine adapters and configuration.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identity of a wrapped resource.
///
/// Two engines that resolve to the same identity refer to the same underlying
/// database and may not be wrapped at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(String);

impl ResourceId {
    /// Creates an identity from any string-like key.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a connection wrapper. Transitions are monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LifecycleState {
    /// Accepting jobs.
    Open,
    /// `close()` has been called; draining, new jobs rejected.
    Closing,
    /// Drained and the resource released.
    Closed,
}

/// State of the consumer worker thread.
///
/// Allowed transitions:
///
/// | from         | to                    |
/// |--------------|-----------------------|
/// | `NotStarted` | `Running`             |
/// | `Running`    | `Stopped`, `Crashed`  |
/// | `Crashed`    | `Running` (restart)   |
/// | `Stopped`    | (terminal)            |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum WorkerState {
    NotStarted,
    Running,
    Stopped,
    Crashed,
}

impl WorkerState {
    /// Whether the transition table permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: WorkerState) -> bool {
        matches!(
            (self, next),
            (WorkerState::NotStarted, WorkerState::Running)
                | (WorkerState::Running, WorkerState::Stopped)
                | (WorkerState::Running, WorkerState::Crashed)
                | (WorkerState::Crashed, WorkerState::Running)
        )
    }
}

/// What to do when the consumer worker dies from a panic.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RestartPolicy {
    /// Start a fresh worker: at once when jobs are still queued, otherwise on
    /// the next enqueue. Queued jobs survive.
    #[default]
    Restart,
    /// A crash is final: further submissions fail with `WorkerCrashed`.
    Terminal,
}
