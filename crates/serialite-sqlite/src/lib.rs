// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite engine for serialite, backed by `rusqlite`.
//!
//! [`SqliteEngine`] implements [`serialite_core::Engine`] so a connection can
//! be wrapped and driven by a single consumer worker. Column reads follow
//! SQLite's own conversion rules, so a column can be read as the type the
//! caller declared regardless of its storage class.

mod coerce;
pub mod engine;
pub mod statement;

pub use engine::SqliteEngine;
pub use statement::SqliteStatement;
