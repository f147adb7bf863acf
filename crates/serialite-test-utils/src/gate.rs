// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A one-shot latch for holding the consumer worker inside a job.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Default)]
struct GateState {
    open: bool,
    waiting: usize,
}

/// A latch shared between a test and a scripted job.
///
/// The job calls [`Gate::pass`], which blocks until the test calls
/// [`Gate::open`]. [`Gate::wait_for_arrival`] lets the test know the consumer
/// has actually reached the gate.
#[derive(Clone, Default)]
pub struct Gate {
    inner: Arc<(Mutex<GateState>, Condvar)>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases every current and future caller of [`Gate::pass`].
    pub fn open(&self) {
        let (lock, cvar) = &*self.inner;
        lock.lock().unwrap_or_else(PoisonError::into_inner).open = true;
        cvar.notify_all();
    }

    /// Blocks until the gate is open.
    pub fn pass(&self) {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock().unwrap_or_else(PoisonError::into_inner);
        state.waiting += 1;
        cvar.notify_all();
        while !state.open {
            state = cvar.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state.waiting -= 1;
    }

    /// Waits until some thread is blocked in [`Gate::pass`] or the gate is
    /// open. Returns false on timeout.
    pub fn wait_for_arrival(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let state = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (state, _) = cvar
            .wait_timeout_while(state, timeout, |s| s.waiting == 0 && !s.open)
            .unwrap_or_else(PoisonError::into_inner);
        state.waiting > 0 || state.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn pass_blocks_until_open() {
        let gate = Gate::new();
        let worker_gate = gate.clone();
        let handle = thread::spawn(move || worker_gate.pass());

        assert!(gate.wait_for_arrival(Duration::from_secs(5)));
        assert!(!handle.is_finished());
        gate.open();
        handle.join().unwrap();
    }

    #[test]
    fn open_gate_passes_immediately() {
        let gate = Gate::new();
        gate.open();
        gate.pass();
        assert!(gate.wait_for_arrival(Duration::from_millis(1)));
    }
}
