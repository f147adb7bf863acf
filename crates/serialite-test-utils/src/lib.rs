// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for serialite integration tests.
//!
//! Provides an in-process engine so queue and lifecycle behavior can be
//! tested deterministically, without a real database.
//!
//! # Components
//!
//! - [`ScriptedEngine`] - Fake engine with scripted rows and injectable failures
//! - [`Gate`] - Blocks the consumer inside a job until the test opens it

pub mod gate;
pub mod scripted_engine;

pub use gate::Gate;
pub use scripted_engine::{FailAt, ScriptHandle, ScriptedEngine};
