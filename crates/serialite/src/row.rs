// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only view of one produced row.
//!
//! A [`ResultRow`] holds only the columns declared on the statement before it
//! was submitted, each read with its declared type. It is lent to the row
//! callback and cannot outlive the call.

use std::collections::BTreeMap;

use serialite_core::{ColumnReader, ColumnType, EngineError, RowError, TypeTag, TypedValue};

/// Snapshot of the declared columns of the current row.
#[derive(Debug)]
pub struct ResultRow<'a> {
    values: BTreeMap<usize, (TypeTag, TypedValue)>,
    column_count: usize,
    column_names: &'a [String],
}

impl<'a> ResultRow<'a> {
    /// Reads every declared index from `reader` using its declared tag.
    pub(crate) fn read(
        reader: &dyn ColumnReader,
        declared: &BTreeMap<usize, TypeTag>,
        column_names: &'a [String],
    ) -> Result<Self, EngineError> {
        let values = declared
            .iter()
            .map(|(&index, &tag)| Ok((index, (tag, TypedValue::read_from(reader, index, tag)?))))
            .collect::<Result<_, EngineError>>()?;
        Ok(Self {
            values,
            column_count: reader.column_count(),
            column_names,
        })
    }

    fn declared(&self, index: usize) -> Result<&(TypeTag, TypedValue), RowError> {
        self.values
            .get(&index)
            .ok_or(RowError::IndexNotDeclared { index })
    }

    /// Value at `index`, provided it was declared as `expected`.
    pub fn get_value(&self, index: usize, expected: TypeTag) -> Result<&TypedValue, RowError> {
        let (declared, value) = self.declared(index)?;
        if *declared != expected {
            return Err(RowError::TypeMismatch {
                index,
                expected,
                declared: *declared,
            });
        }
        Ok(value)
    }

    /// Typed value at `index`. SQL NULL is an error; see [`ResultRow::get_opt`].
    pub fn get<T: ColumnType>(&self, index: usize) -> Result<T, RowError> {
        self.get_opt(index)?
            .ok_or(RowError::UnexpectedNull { index })
    }

    /// Typed value at `index`, with SQL NULL as `None`.
    pub fn get_opt<T: ColumnType>(&self, index: usize) -> Result<Option<T>, RowError> {
        Ok(T::from_value(self.get_value(index, T::TAG)?))
    }

    /// Whether the declared column at `index` is SQL NULL.
    pub fn is_null(&self, index: usize) -> Result<bool, RowError> {
        Ok(self.declared(index)?.1.is_null())
    }

    /// Declared tag of `index`, if any.
    pub fn declared_tag(&self, index: usize) -> Option<TypeTag> {
        self.values.get(&index).map(|(tag, _)| *tag)
    }

    /// Number of columns in the result set, declared or not.
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn column_name(&self, index: usize) -> Result<&str, RowError> {
        self.column_names
            .get(index)
            .map(String::as_str)
            .ok_or(RowError::ColumnOutOfRange {
                index,
                count: self.column_names.len(),
            })
    }

    pub fn column_names(&self) -> &[String] {
        self.column_names
    }
}
