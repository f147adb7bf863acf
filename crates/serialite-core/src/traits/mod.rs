// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine boundary traits.
//!
//! The wrapper never touches a database library directly. It drives an
//! [`Engine`] through the synchronous primitives defined here: execute,
//! prepare, bind, step, get and close.

pub mod columns;
pub mod engine;

pub use columns::{ColumnReader, ParameterBinder};
pub use engine::{Engine, PreparedStatement};
