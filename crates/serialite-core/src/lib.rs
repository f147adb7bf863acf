// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for serialite.
//!
//! This crate holds the pieces shared by every other serialite crate: the
//! error taxonomy, the [`TypedValue`] dispatch table, lifecycle and worker
//! state types, and the [`Engine`] traits an embedded database implements to
//! be driven by a serialite consumer worker.

pub mod error;
pub mod traits;
pub mod types;
pub mod value;

// Re-export key items at crate root for ergonomic imports.
pub use error::{EngineError, JobError, RowError, SerialiteError};
pub use types::{LifecycleState, ResourceId, RestartPolicy, WorkerState};
pub use value::{ColumnType, TypeTag, TypedValue};

pub use traits::{ColumnReader, Engine, ParameterBinder, PreparedStatement};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialite_error_has_all_variants() {
        let _closed = SerialiteError::AlreadyClosed;
        let _wrapped = SerialiteError::AlreadyWrapped {
            resource: ResourceId::new("x"),
        };
        let _drained = SerialiteError::QueueNotDrained { pending: 1 };
        let _crashed = SerialiteError::WorkerCrashed;
        let _reentrant = SerialiteError::CloseFromWorker;
        let _spawn = SerialiteError::Spawn(std::io::Error::other("test"));
        let _engine = SerialiteError::Engine(EngineError::new("test"));
    }

    #[test]
    fn type_tag_has_eight_variants() {
        use std::str::FromStr;

        let variants = [
            TypeTag::Blob,
            TypeTag::Boolean,
            TypeTag::Double,
            TypeTag::Float,
            TypeTag::Int32,
            TypeTag::Int64,
            TypeTag::Text,
            TypeTag::Null,
        ];

        assert_eq!(variants.len(), 8, "TypeTag must have exactly 8 variants");

        for variant in &variants {
            let s = variant.to_string();
            let parsed = TypeTag::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn engine_traits_are_exported() {
        fn _assert_engine<T: Engine>() {}
        fn _assert_statement<T: PreparedStatement>() {}
        fn _assert_reader<T: ColumnReader + ?Sized>() {}
    }
}
