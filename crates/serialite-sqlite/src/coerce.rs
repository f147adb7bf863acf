// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-class conversions matching `sqlite3_column_*` semantics.
//!
//! SQLite converts between storage classes when a column is fetched as a type
//! other than the one it was stored with. rusqlite's `FromSql` is strict, so
//! these helpers reproduce SQLite's lenient rules on top of `ValueRef`.

use rusqlite::types::ValueRef;

pub(crate) fn to_i64(value: ValueRef<'_>) -> i64 {
    match value {
        ValueRef::Null => 0,
        ValueRef::Integer(i) => i,
        ValueRef::Real(f) => f as i64,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => match NumericPrefix::scan(bytes) {
            Some(prefix) if prefix.integral => prefix.to_i64(),
            // `as` saturates, and the scanner never admits inf or nan.
            Some(prefix) => prefix.to_f64() as i64,
            None => 0,
        },
    }
}

pub(crate) fn to_f64(value: ValueRef<'_>) -> f64 {
    match value {
        ValueRef::Null => 0.0,
        ValueRef::Integer(i) => i as f64,
        ValueRef::Real(f) => f,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            NumericPrefix::scan(bytes).map_or(0.0, |prefix| prefix.to_f64())
        }
    }
}

pub(crate) fn to_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => format_real(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

pub(crate) fn to_blob(value: ValueRef<'_>) -> Vec<u8> {
    match value {
        ValueRef::Null => Vec::new(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => bytes.to_vec(),
        other => to_text(other).into_bytes(),
    }
}

/// SQLite renders whole reals with a trailing `.0`.
fn format_real(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

/// The longest SQLite numeric literal at the start of a value, after
/// leading whitespace: sign, digits, optional fraction, optional exponent.
/// Found in one pass, so the cost is linear in the input length.
struct NumericPrefix<'a> {
    /// ASCII only, sign included.
    literal: &'a [u8],
    /// No fraction and no exponent.
    integral: bool,
}

impl<'a> NumericPrefix<'a> {
    fn scan(bytes: &'a [u8]) -> Option<Self> {
        let start = bytes.iter().position(|b| !b.is_ascii_whitespace())?;
        let rest = &bytes[start..];
        let digits_from = |at: usize| rest[at..].iter().take_while(|b| b.is_ascii_digit()).count();

        let mut end = usize::from(matches!(rest.first(), Some(b'+' | b'-')));
        let whole = digits_from(end);
        end += whole;
        let mut integral = true;

        let mut fraction = 0;
        if rest.get(end) == Some(&b'.') {
            fraction = digits_from(end + 1);
            if whole + fraction > 0 {
                end += 1 + fraction;
                integral = false;
            }
        }
        if whole + fraction == 0 {
            return None;
        }

        if matches!(rest.get(end), Some(b'e' | b'E')) {
            let mut at = end + 1;
            if matches!(rest.get(at), Some(b'+' | b'-')) {
                at += 1;
            }
            let exponent = digits_from(at);
            if exponent > 0 {
                end = at + exponent;
                integral = false;
            }
        }

        Some(Self {
            literal: &rest[..end],
            integral,
        })
    }

    /// Integer value of an integral literal, saturating at the i64 bounds.
    fn to_i64(&self) -> i64 {
        let (negative, digits) = match self.literal.split_first() {
            Some((b'-', digits)) => (true, digits),
            Some((b'+', digits)) => (false, digits),
            _ => (false, self.literal),
        };
        let mut value: i64 = 0;
        for &digit in digits {
            let digit = i64::from(digit - b'0');
            let next = value.checked_mul(10).and_then(|v| {
                if negative {
                    v.checked_sub(digit)
                } else {
                    v.checked_add(digit)
                }
            });
            match next {
                Some(next) => value = next,
                None => return if negative { i64::MIN } else { i64::MAX },
            }
        }
        value
    }

    fn to_f64(&self) -> f64 {
        std::str::from_utf8(self.literal)
            .ok()
            .and_then(|literal| literal.parse().ok())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_convert_to_text_and_real() {
        assert_eq!(to_text(ValueRef::Integer(42)), "42");
        assert_eq!(to_f64(ValueRef::Integer(3)), 3.0);
    }

    #[test]
    fn reals_truncate_to_integers() {
        assert_eq!(to_i64(ValueRef::Real(2.9)), 2);
        assert_eq!(to_i64(ValueRef::Real(-2.9)), -2);
        assert_eq!(to_text(ValueRef::Real(1.0)), "1.0");
        assert_eq!(to_text(ValueRef::Real(1.5)), "1.5");
    }

    #[test]
    fn text_parses_leading_number() {
        assert_eq!(to_i64(ValueRef::Text(b"123abc")), 123);
        assert_eq!(to_f64(ValueRef::Text(b"  4.5 apples")), 4.5);
        assert_eq!(to_i64(ValueRef::Text(b"abc")), 0);
        assert_eq!(to_f64(ValueRef::Text(b"1e3")), 1000.0);
    }

    #[test]
    fn large_integer_text_stays_exact() {
        assert_eq!(to_i64(ValueRef::Text(b"9007199254740993")), 9_007_199_254_740_993);
        assert_eq!(to_i64(ValueRef::Text(b"-9223372036854775808")), i64::MIN);
        assert_eq!(to_i64(ValueRef::Text(b"99999999999999999999")), i64::MAX);
        assert_eq!(to_i64(ValueRef::Text(b"-99999999999999999999")), i64::MIN);
    }

    #[test]
    fn fraction_and_exponent_go_through_real() {
        assert_eq!(to_i64(ValueRef::Text(b"12.9kg")), 12);
        assert_eq!(to_i64(ValueRef::Text(b"-1.5e2")), -150);
        assert_eq!(to_i64(ValueRef::Text(b"1e999")), i64::MAX);
        assert_eq!(to_f64(ValueRef::Text(b".5")), 0.5);
        assert_eq!(to_f64(ValueRef::Text(b"7.")), 7.0);
        // A dangling exponent marker is not part of the number.
        assert_eq!(to_f64(ValueRef::Text(b"3e+")), 3.0);
        assert_eq!(to_i64(ValueRef::Text(b"3e+")), 3);
    }

    #[test]
    fn float_spellings_are_not_numbers() {
        for text in ["-inf", "inf", "+nan", "NaN", "infinity", "+", "-.", ".", "e5"] {
            assert_eq!(to_i64(ValueRef::Text(text.as_bytes())), 0, "{text}");
            assert_eq!(to_f64(ValueRef::Text(text.as_bytes())), 0.0, "{text}");
        }
    }

    #[test]
    fn long_digit_text_is_read_in_one_pass() {
        let digits = "7".repeat(2_000_000);
        let started = std::time::Instant::now();
        assert_eq!(to_i64(ValueRef::Text(digits.as_bytes())), i64::MAX);
        assert_eq!(to_f64(ValueRef::Text(digits.as_bytes())), f64::INFINITY);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn null_converts_to_zero_values() {
        assert_eq!(to_i64(ValueRef::Null), 0);
        assert_eq!(to_text(ValueRef::Null), "");
        assert!(to_blob(ValueRef::Null).is_empty());
    }

    #[test]
    fn blobs_and_text_share_bytes() {
        assert_eq!(to_blob(ValueRef::Text(b"hi")), b"hi".to_vec());
        assert_eq!(to_text(ValueRef::Blob(b"hi")), "hi");
        assert_eq!(to_blob(ValueRef::Integer(7)), b"7".to_vec());
    }
}
