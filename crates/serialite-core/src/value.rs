// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed values and the bind/read dispatch table.
//!
//! [`TypedValue`] is the closed set of eight value kinds that can be bound to a
//! statement parameter or read from a result column. Binding dispatches on the
//! value's own kind; reading dispatches on the [`TypeTag`] the caller declared
//! before the statement ran.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::EngineError;
use crate::traits::{ColumnReader, ParameterBinder};

/// A value bound to a parameter or captured from a column.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Blob(Vec<u8>),
    Boolean(bool),
    Double(f64),
    Float(f32),
    Int32(i32),
    Int64(i64),
    Text(String),
    Null,
}

/// The kind of a [`TypedValue`], used to declare expected column types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
pub enum TypeTag {
    Blob,
    Boolean,
    Double,
    Float,
    Int32,
    Int64,
    Text,
    Null,
}

impl TypeTag {
    /// Zero value handed back by a declaration so call sites read naturally
    /// before any row exists.
    pub fn placeholder(self) -> TypedValue {
        match self {
            TypeTag::Blob => TypedValue::Blob(Vec::new()),
            TypeTag::Boolean => TypedValue::Boolean(false),
            TypeTag::Double => TypedValue::Double(0.0),
            TypeTag::Float => TypedValue::Float(0.0),
            TypeTag::Int32 => TypedValue::Int32(0),
            TypeTag::Int64 => TypedValue::Int64(0),
            TypeTag::Text => TypedValue::Text(String::new()),
            TypeTag::Null => TypedValue::Null,
        }
    }
}

impl TypedValue {
    /// The kind of this value.
    pub fn tag(&self) -> TypeTag {
        match self {
            TypedValue::Blob(_) => TypeTag::Blob,
            TypedValue::Boolean(_) => TypeTag::Boolean,
            TypedValue::Double(_) => TypeTag::Double,
            TypedValue::Float(_) => TypeTag::Float,
            TypedValue::Int32(_) => TypeTag::Int32,
            TypedValue::Int64(_) => TypeTag::Int64,
            TypedValue::Text(_) => TypeTag::Text,
            TypedValue::Null => TypeTag::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    /// Binds this value at `index` using the primitive matching its kind.
    pub fn bind_to<B>(&self, binder: &mut B, index: usize) -> Result<(), EngineError>
    where
        B: ParameterBinder + ?Sized,
    {
        match self {
            TypedValue::Blob(v) => binder.bind_blob(index, v),
            TypedValue::Boolean(v) => binder.bind_boolean(index, *v),
            TypedValue::Double(v) => binder.bind_double(index, *v),
            TypedValue::Float(v) => binder.bind_float(index, *v),
            TypedValue::Int32(v) => binder.bind_int32(index, *v),
            TypedValue::Int64(v) => binder.bind_int64(index, *v),
            TypedValue::Text(v) => binder.bind_text(index, v),
            TypedValue::Null => binder.bind_null(index),
        }
    }

    /// Reads column `index` as the declared `tag`.
    ///
    /// SQL NULL always reads as [`TypedValue::Null`]. A `Null` declaration on a
    /// present value returns the value with whatever kind the engine reports.
    pub fn read_from<R>(reader: &R, index: usize, tag: TypeTag) -> Result<Self, EngineError>
    where
        R: ColumnReader + ?Sized,
    {
        if reader.is_null(index)? {
            return Ok(TypedValue::Null);
        }
        let value = match tag {
            TypeTag::Blob => TypedValue::Blob(reader.get_blob(index)?),
            TypeTag::Boolean => TypedValue::Boolean(reader.get_boolean(index)?),
            TypeTag::Double => TypedValue::Double(reader.get_double(index)?),
            TypeTag::Float => TypedValue::Float(reader.get_float(index)?),
            TypeTag::Int32 => TypedValue::Int32(reader.get_int32(index)?),
            TypeTag::Int64 => TypedValue::Int64(reader.get_int64(index)?),
            TypeTag::Text => TypedValue::Text(reader.get_text(index)?),
            TypeTag::Null => reader.get_dynamic(index)?,
        };
        Ok(value)
    }
}

impl From<Vec<u8>> for TypedValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<&[u8]> for TypedValue {
    fn from(v: &[u8]) -> Self {
        Self::Blob(v.to_vec())
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<f32> for TypedValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for TypedValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<String> for TypedValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<()> for TypedValue {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl<T: Into<TypedValue>> From<Option<T>> for TypedValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// A Rust type that corresponds to exactly one [`TypeTag`].
///
/// Used by typed declarations (`Statement::declare::<i32>(0)`) and typed
/// reads (`ResultRow::get::<i32>(0)`).
pub trait ColumnType: Sized {
    /// The tag recorded when this type is declared.
    const TAG: TypeTag;

    /// Zero value returned from a declaration.
    fn placeholder() -> Self;

    /// Extracts `Self` from a value of the matching kind.
    fn from_value(value: &TypedValue) -> Option<Self>;
}

macro_rules! column_type {
    ($ty:ty, $tag:ident, $zero:expr, $pat:pat => $out:expr) => {
        impl ColumnType for $ty {
            const TAG: TypeTag = TypeTag::$tag;

            fn placeholder() -> Self {
                $zero
            }

            fn from_value(value: &TypedValue) -> Option<Self> {
                match value {
                    $pat => Some($out),
                    _ => None,
                }
            }
        }
    };
}

column_type!(Vec<u8>, Blob, Vec::new(), TypedValue::Blob(v) => v.clone());
column_type!(bool, Boolean, false, TypedValue::Boolean(v) => *v);
column_type!(f64, Double, 0.0, TypedValue::Double(v) => *v);
column_type!(f32, Float, 0.0, TypedValue::Float(v) => *v);
column_type!(i32, Int32, 0, TypedValue::Int32(v) => *v);
column_type!(i64, Int64, 0, TypedValue::Int64(v) => *v);
column_type!(String, Text, String::new(), TypedValue::Text(v) => v.clone());

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    /// Records which bind primitive was called.
    #[derive(Default)]
    struct RecordingBinder {
        calls: Vec<(usize, &'static str)>,
    }

    impl ParameterBinder for RecordingBinder {
        fn bind_blob(&mut self, index: usize, _: &[u8]) -> Result<(), EngineError> {
            self.calls.push((index, "blob"));
            Ok(())
        }
        fn bind_boolean(&mut self, index: usize, _: bool) -> Result<(), EngineError> {
            self.calls.push((index, "boolean"));
            Ok(())
        }
        fn bind_double(&mut self, index: usize, _: f64) -> Result<(), EngineError> {
            self.calls.push((index, "double"));
            Ok(())
        }
        fn bind_float(&mut self, index: usize, _: f32) -> Result<(), EngineError> {
            self.calls.push((index, "float"));
            Ok(())
        }
        fn bind_int32(&mut self, index: usize, _: i32) -> Result<(), EngineError> {
            self.calls.push((index, "int32"));
            Ok(())
        }
        fn bind_int64(&mut self, index: usize, _: i64) -> Result<(), EngineError> {
            self.calls.push((index, "int64"));
            Ok(())
        }
        fn bind_text(&mut self, index: usize, _: &str) -> Result<(), EngineError> {
            self.calls.push((index, "text"));
            Ok(())
        }
        fn bind_null(&mut self, index: usize) -> Result<(), EngineError> {
            self.calls.push((index, "null"));
            Ok(())
        }
    }

    /// A single-column reader holding one dynamic value.
    struct OneColumn(TypedValue);

    impl ColumnReader for OneColumn {
        fn column_count(&self) -> usize {
            1
        }
        fn is_null(&self, _: usize) -> Result<bool, EngineError> {
            Ok(self.0.is_null())
        }
        fn get_blob(&self, _: usize) -> Result<Vec<u8>, EngineError> {
            Ok(b"blob".to_vec())
        }
        fn get_boolean(&self, _: usize) -> Result<bool, EngineError> {
            Ok(true)
        }
        fn get_double(&self, _: usize) -> Result<f64, EngineError> {
            Ok(1.5)
        }
        fn get_float(&self, _: usize) -> Result<f32, EngineError> {
            Ok(2.5)
        }
        fn get_int32(&self, _: usize) -> Result<i32, EngineError> {
            Ok(32)
        }
        fn get_int64(&self, _: usize) -> Result<i64, EngineError> {
            Ok(64)
        }
        fn get_text(&self, _: usize) -> Result<String, EngineError> {
            Ok("text".into())
        }
        fn get_dynamic(&self, _: usize) -> Result<TypedValue, EngineError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn bind_dispatches_on_runtime_kind() {
        let values: Vec<TypedValue> = vec![
            vec![1u8, 2].into(),
            true.into(),
            1.0f64.into(),
            1.0f32.into(),
            1i32.into(),
            1i64.into(),
            "x".into(),
            Option::<i32>::None.into(),
        ];
        let mut binder = RecordingBinder::default();
        for (i, v) in values.iter().enumerate() {
            v.bind_to(&mut binder, i).unwrap();
        }
        let kinds: Vec<_> = binder.calls.iter().map(|(_, k)| *k).collect();
        assert_eq!(
            kinds,
            ["blob", "boolean", "double", "float", "int32", "int64", "text", "null"]
        );
    }

    #[test]
    fn read_dispatches_on_declared_tag_not_stored_kind() {
        let reader = OneColumn(TypedValue::Text("stored as text".into()));
        assert_eq!(
            TypedValue::read_from(&reader, 0, TypeTag::Int32).unwrap(),
            TypedValue::Int32(32)
        );
        assert_eq!(
            TypedValue::read_from(&reader, 0, TypeTag::Float).unwrap(),
            TypedValue::Float(2.5)
        );
    }

    #[test]
    fn sql_null_reads_as_null_for_every_tag() {
        let reader = OneColumn(TypedValue::Null);
        for tag in [TypeTag::Blob, TypeTag::Int64, TypeTag::Text, TypeTag::Null] {
            assert_eq!(TypedValue::read_from(&reader, 0, tag).unwrap(), TypedValue::Null);
        }
    }

    #[test]
    fn null_declaration_on_present_value_returns_real_value() {
        let reader = OneColumn(TypedValue::Int64(9));
        assert_eq!(
            TypedValue::read_from(&reader, 0, TypeTag::Null).unwrap(),
            TypedValue::Int64(9)
        );
    }

    #[test]
    fn placeholders_match_their_tag() {
        for tag in [
            TypeTag::Blob,
            TypeTag::Boolean,
            TypeTag::Double,
            TypeTag::Float,
            TypeTag::Int32,
            TypeTag::Int64,
            TypeTag::Text,
            TypeTag::Null,
        ] {
            assert_eq!(tag.placeholder().tag(), tag);
        }
        assert_eq!(<i32 as ColumnType>::placeholder(), 0);
        assert_eq!(<String as ColumnType>::TAG, TypeTag::Text);
    }

    #[test]
    fn type_tag_parses_by_name() {
        assert_eq!(TypeTag::from_str("Int64").unwrap(), TypeTag::Int64);
        assert!(TypeTag::from_str("Integer").is_err());
    }

    proptest! {
        #[test]
        fn i64_conversion_keeps_kind_and_value(n in any::<i64>()) {
            let v = TypedValue::from(n);
            prop_assert_eq!(v.tag(), TypeTag::Int64);
            prop_assert_eq!(i64::from_value(&v), Some(n));
            prop_assert_eq!(i32::from_value(&v), None);
        }

        #[test]
        fn text_conversion_keeps_kind_and_value(s in ".*") {
            let v = TypedValue::from(s.as_str());
            prop_assert_eq!(v.tag(), TypeTag::Text);
            prop_assert_eq!(String::from_value(&v), Some(s));
        }
    }
}
