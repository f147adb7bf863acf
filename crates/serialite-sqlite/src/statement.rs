// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prepared statements and row readers over `rusqlite`.

use std::ops::ControlFlow;

use rusqlite::types::ValueRef;
use rusqlite::{Row, ToSql};
use serialite_core::{ColumnReader, EngineError, ParameterBinder, PreparedStatement, TypedValue};

use crate::coerce;
use crate::engine::sqlite_err;

/// A compiled statement borrowing its [`SqliteEngine`](crate::SqliteEngine).
///
/// Parameter indices are 0-based here and shifted to SQLite's 1-based
/// numbering on bind.
pub struct SqliteStatement<'conn> {
    stmt: rusqlite::Statement<'conn>,
}

impl<'conn> SqliteStatement<'conn> {
    pub(crate) fn new(stmt: rusqlite::Statement<'conn>) -> Self {
        Self { stmt }
    }

    fn bind<T: ToSql>(&mut self, index: usize, value: T) -> Result<(), EngineError> {
        self.stmt
            .raw_bind_parameter(index + 1, value)
            .map_err(sqlite_err)
    }
}

impl ParameterBinder for SqliteStatement<'_> {
    fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<(), EngineError> {
        self.bind(index, value)
    }

    fn bind_boolean(&mut self, index: usize, value: bool) -> Result<(), EngineError> {
        self.bind(index, i64::from(value))
    }

    fn bind_double(&mut self, index: usize, value: f64) -> Result<(), EngineError> {
        self.bind(index, value)
    }

    fn bind_float(&mut self, index: usize, value: f32) -> Result<(), EngineError> {
        self.bind(index, f64::from(value))
    }

    fn bind_int32(&mut self, index: usize, value: i32) -> Result<(), EngineError> {
        self.bind(index, i64::from(value))
    }

    fn bind_int64(&mut self, index: usize, value: i64) -> Result<(), EngineError> {
        self.bind(index, value)
    }

    fn bind_text(&mut self, index: usize, value: &str) -> Result<(), EngineError> {
        self.bind(index, value)
    }

    fn bind_null(&mut self, index: usize) -> Result<(), EngineError> {
        self.bind(index, rusqlite::types::Null)
    }
}

impl PreparedStatement for SqliteStatement<'_> {
    fn column_names(&self) -> Vec<String> {
        self.stmt
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    fn step_rows(
        &mut self,
        visit: &mut dyn FnMut(&dyn ColumnReader) -> Result<ControlFlow<()>, EngineError>,
    ) -> Result<(), EngineError> {
        let column_count = self.stmt.column_count();
        let mut rows = self.stmt.raw_query();
        while let Some(row) = rows.next().map_err(sqlite_err)? {
            let reader = SqliteRow { row, column_count };
            if visit(&reader)?.is_break() {
                break;
            }
        }
        Ok(())
    }
}

/// The row a statement is currently positioned on.
struct SqliteRow<'r, 'stmt> {
    row: &'r Row<'stmt>,
    column_count: usize,
}

impl SqliteRow<'_, '_> {
    fn value(&self, index: usize) -> Result<ValueRef<'_>, EngineError> {
        self.row.get_ref(index).map_err(sqlite_err)
    }
}

impl ColumnReader for SqliteRow<'_, '_> {
    fn column_count(&self) -> usize {
        self.column_count
    }

    fn is_null(&self, index: usize) -> Result<bool, EngineError> {
        Ok(matches!(self.value(index)?, ValueRef::Null))
    }

    fn get_blob(&self, index: usize) -> Result<Vec<u8>, EngineError> {
        Ok(coerce::to_blob(self.value(index)?))
    }

    fn get_boolean(&self, index: usize) -> Result<bool, EngineError> {
        Ok(coerce::to_i64(self.value(index)?) != 0)
    }

    fn get_double(&self, index: usize) -> Result<f64, EngineError> {
        Ok(coerce::to_f64(self.value(index)?))
    }

    fn get_float(&self, index: usize) -> Result<f32, EngineError> {
        Ok(coerce::to_f64(self.value(index)?) as f32)
    }

    fn get_int32(&self, index: usize) -> Result<i32, EngineError> {
        Ok(coerce::to_i64(self.value(index)?) as i32)
    }

    fn get_int64(&self, index: usize) -> Result<i64, EngineError> {
        Ok(coerce::to_i64(self.value(index)?))
    }

    fn get_text(&self, index: usize) -> Result<String, EngineError> {
        Ok(coerce::to_text(self.value(index)?))
    }

    fn get_dynamic(&self, index: usize) -> Result<TypedValue, EngineError> {
        Ok(match self.value(index)? {
            ValueRef::Null => TypedValue::Null,
            ValueRef::Integer(i) => TypedValue::Int64(i),
            ValueRef::Real(f) => TypedValue::Double(f),
            // SQLite does not validate TEXT encoding; keep the bytes intact.
            ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => TypedValue::Text(text.to_owned()),
                Err(_) => TypedValue::Blob(bytes.to_vec()),
            },
            ValueRef::Blob(bytes) => TypedValue::Blob(bytes.to_vec()),
        })
    }
}

#[cfg(test)]
mod tests {
    use serialite_core::{Engine, TypeTag};

    use super::*;
    use crate::SqliteEngine;

    fn seeded() -> SqliteEngine {
        let mut engine = SqliteEngine::open_in_memory().unwrap();
        engine
            .execute("CREATE TABLE items (id INTEGER, name TEXT, price REAL, data BLOB)")
            .unwrap();
        engine
    }

    fn collect(engine: &mut SqliteEngine, sql: &str, tags: &[TypeTag]) -> Vec<Vec<TypedValue>> {
        let mut stmt = engine.prepare(sql).unwrap();
        let mut out = Vec::new();
        stmt.step_rows(&mut |row| {
            let values = tags
                .iter()
                .enumerate()
                .map(|(i, tag)| TypedValue::read_from(row, i, *tag))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(values);
            Ok(ControlFlow::Continue(()))
        })
        .unwrap();
        out
    }

    #[test]
    fn binds_every_kind_with_zero_based_indices() {
        let mut engine = seeded();
        {
            let mut stmt = engine
                .prepare("INSERT INTO items (id, name, price, data) VALUES (?, ?, ?, ?)")
                .unwrap();
            TypedValue::Int32(7).bind_to(&mut stmt, 0).unwrap();
            TypedValue::from("widget").bind_to(&mut stmt, 1).unwrap();
            TypedValue::Float(2.5).bind_to(&mut stmt, 2).unwrap();
            TypedValue::Blob(vec![1, 2, 3]).bind_to(&mut stmt, 3).unwrap();
            stmt.step_rows(&mut |_| Ok(ControlFlow::Continue(()))).unwrap();
        }

        let rows = collect(
            &mut engine,
            "SELECT id, name, price, data FROM items",
            &[TypeTag::Int64, TypeTag::Text, TypeTag::Double, TypeTag::Blob],
        );
        assert_eq!(
            rows,
            vec![vec![
                TypedValue::Int64(7),
                TypedValue::Text("widget".into()),
                TypedValue::Double(2.5),
                TypedValue::Blob(vec![1, 2, 3]),
            ]]
        );
    }

    #[test]
    fn booleans_round_trip_through_integers() {
        let mut engine = seeded();
        {
            let mut stmt = engine.prepare("INSERT INTO items (id) VALUES (?)").unwrap();
            stmt.bind_boolean(0, true).unwrap();
            stmt.step_rows(&mut |_| Ok(ControlFlow::Continue(()))).unwrap();
        }
        let rows = collect(&mut engine, "SELECT id FROM items", &[TypeTag::Boolean]);
        assert_eq!(rows, vec![vec![TypedValue::Boolean(true)]]);
    }

    #[test]
    fn declared_type_converts_storage_class() {
        let mut engine = seeded();
        engine
            .execute("INSERT INTO items (id, name) VALUES (42, '17')")
            .unwrap();
        let rows = collect(
            &mut engine,
            "SELECT id, name FROM items",
            &[TypeTag::Text, TypeTag::Int32],
        );
        assert_eq!(
            rows,
            vec![vec![TypedValue::Text("42".into()), TypedValue::Int32(17)]]
        );
    }

    #[test]
    fn null_columns_read_as_null() {
        let mut engine = seeded();
        engine.execute("INSERT INTO items (id) VALUES (1)").unwrap();
        let rows = collect(
            &mut engine,
            "SELECT name, price FROM items",
            &[TypeTag::Text, TypeTag::Null],
        );
        assert_eq!(rows, vec![vec![TypedValue::Null, TypedValue::Null]]);
    }

    #[test]
    fn dynamic_read_reports_storage_class() {
        let mut engine = seeded();
        engine
            .execute("INSERT INTO items (id, price) VALUES (3, 1.25)")
            .unwrap();
        let rows = collect(
            &mut engine,
            "SELECT id, price FROM items",
            &[TypeTag::Null, TypeTag::Null],
        );
        assert_eq!(
            rows,
            vec![vec![TypedValue::Int64(3), TypedValue::Double(1.25)]]
        );
    }

    #[test]
    fn dynamic_read_keeps_invalid_utf8_text_as_bytes() {
        let mut engine = seeded();
        let rows = collect(
            &mut engine,
            "SELECT CAST(x'fffe' AS TEXT), typeof(CAST(x'fffe' AS TEXT)), 'ok'",
            &[TypeTag::Null, TypeTag::Text, TypeTag::Null],
        );
        assert_eq!(
            rows,
            vec![vec![
                TypedValue::Blob(vec![0xff, 0xfe]),
                TypedValue::Text("text".into()),
                TypedValue::Text("ok".into()),
            ]]
        );
    }

    #[test]
    fn break_stops_stepping() {
        let mut engine = seeded();
        engine
            .execute("INSERT INTO items (id) VALUES (1), (2), (3), (4), (5)")
            .unwrap();
        let mut stmt = engine.prepare("SELECT id FROM items ORDER BY id").unwrap();
        let mut seen = 0;
        stmt.step_rows(&mut |_| {
            seen += 1;
            Ok(if seen == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        })
        .unwrap();
        assert_eq!(seen, 2);
    }

    #[test]
    fn column_names_follow_select_order() {
        let mut engine = seeded();
        let stmt = engine.prepare("SELECT name, id AS ident FROM items").unwrap();
        assert_eq!(stmt.column_names(), vec!["name", "ident"]);
    }

    #[test]
    fn out_of_range_bind_is_an_engine_error() {
        let mut engine = seeded();
        let mut stmt = engine.prepare("SELECT id FROM items WHERE id = ?").unwrap();
        assert!(stmt.bind_int64(5, 1).is_err());
    }

    #[test]
    fn out_of_range_column_is_an_engine_error() {
        let mut engine = seeded();
        engine.execute("INSERT INTO items (id) VALUES (1)").unwrap();
        let mut stmt = engine.prepare("SELECT id FROM items").unwrap();
        let result = stmt.step_rows(&mut |row| {
            row.get_int64(3)?;
            Ok(ControlFlow::Continue(()))
        });
        assert!(result.is_err());
    }
}
