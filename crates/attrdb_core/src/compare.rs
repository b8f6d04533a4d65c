//! Type-aware value coercion and comparison.
//!
//! Every comparison is keyed on the attribute's declared type tag; there
//! is no dynamic dispatch. For a declared type, both the stored value and
//! the query literal are coerced to one canonical comparable form:
//!
//! - text compares on case-folded forms
//! - integers and floats compare numerically across shapes (`10 == 10.0`),
//!   exactly, with no epsilon
//! - booleans compare on the two-valued domain
//! - datetimes parse to a canonical instant; a date-only literal means
//!   midnight of that date, not a range
//! - unregistered (opaque) names compare by raw structural equality
//!
//! A literal that cannot be coerced is a [`CoreError::TypeMismatch`] and
//! aborts the query that supplied it. A *stored* value that cannot be
//! coerced never errors: it simply fails to match, and sorts with the
//! rows that lack the key.

use crate::error::{CoreError, CoreResult};
use crate::schema::AttributeType;
use attrdb_value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

/// A numeric value coerced to a common comparable representation.
///
/// Two integers compare exactly as `i64`; any pairing involving a float
/// compares as `f64`. NaN is rejected at construction, so the ordering
/// is total.
#[derive(Debug, Clone, Copy)]
pub enum Numeric {
    /// Integer-shaped number.
    Int(i64),
    /// Float-shaped number (never NaN).
    Float(f64),
}

impl Numeric {
    fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(n) => n as f64,
            Numeric::Float(f) => f,
        }
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl Eq for Numeric {}

impl Ord for Numeric {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => a.cmp(b),
            // NaN is excluded at construction, so partial_cmp is total here.
            _ => self
                .as_f64()
                .partial_cmp(&other.as_f64())
                .unwrap_or(Ordering::Equal),
        }
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Canonical comparable form of a stored value under a declared type.
///
/// Within one sort every key comes from the same declared type, so the
/// cross-variant ordering only exists to keep `Ord` total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// Boolean key; false orders before true.
    Bool(bool),
    /// Numeric key.
    Number(Numeric),
    /// Case-folded text key.
    Text(String),
    /// Canonical instant key.
    Instant(NaiveDateTime),
    /// Canonical JSON rendering of a structured value.
    Opaque(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Bool(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
            SortKey::Instant(_) => 3,
            SortKey::Opaque(_) => 4,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Instant(a), SortKey::Instant(b)) => a.cmp(b),
            (SortKey::Opaque(a), SortKey::Opaque(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Case-folds text for comparison. Locale-independent.
fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

/// Coerces a value to a numeric representation.
///
/// Text that parses as a number coerces; NaN never does.
fn as_numeric(value: &Value) -> Option<Numeric> {
    match value {
        Value::Integer(n) => Some(Numeric::Int(*n)),
        Value::Float(f) if !f.is_nan() => Some(Numeric::Float(*f)),
        Value::Text(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                Some(Numeric::Int(n))
            } else {
                s.parse::<f64>().ok().filter(|f| !f.is_nan()).map(Numeric::Float)
            }
        }
        _ => None,
    }
}

/// Parses a value to the canonical instant form.
///
/// Accepted text forms: date-only (missing time components default to
/// zero), `T`- or space-separated date-times with optional seconds and
/// sub-second fraction, and RFC 3339 (the offset is applied and the
/// instant converted to UTC).
fn as_instant(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Timestamp(t) => Some(t.naive_utc()),
        Value::Text(s) => parse_instant_text(s.trim()),
        _ => None,
    }
}

fn parse_instant_text(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn render_literal(literal: &Value) -> String {
    serde_json::to_string(literal).unwrap_or_else(|_| literal.type_name().to_string())
}

/// Tests a stored value against a query literal under a declared type.
///
/// `stored` is `None` when the key is absent from the (resolved) document.
/// A `Null` literal matches both the explicit-null and the absent case,
/// for every declared type and for opaque names alike.
///
/// # Errors
///
/// Returns [`CoreError::TypeMismatch`] if the literal cannot be coerced
/// to `declared`. This is checked before any per-row short-circuit, so a
/// bad literal fails the query deterministically instead of depending on
/// which rows it meets.
pub fn values_equal(
    attribute: &str,
    declared: Option<AttributeType>,
    stored: Option<&Value>,
    literal: &Value,
) -> CoreResult<bool> {
    if literal.is_null() {
        return Ok(matches!(stored, None | Some(Value::Null)));
    }

    let Some(declared) = declared else {
        // Opaque attribute: raw structural equality, no coercion.
        return Ok(stored == Some(literal));
    };

    let mismatch = || CoreError::type_mismatch(attribute, declared, render_literal(literal));

    match declared {
        AttributeType::Text => {
            let wanted = fold_case(literal.as_text().ok_or_else(mismatch)?);
            Ok(match stored {
                Some(Value::Text(s)) => fold_case(s) == wanted,
                _ => false,
            })
        }
        AttributeType::Integer | AttributeType::Float => {
            let wanted = as_numeric(literal).ok_or_else(mismatch)?;
            Ok(stored.and_then(as_numeric) == Some(wanted))
        }
        AttributeType::Boolean => {
            let wanted = literal.as_bool().ok_or_else(mismatch)?;
            Ok(stored.and_then(Value::as_bool) == Some(wanted))
        }
        AttributeType::DateTime => {
            let wanted = as_instant(literal).ok_or_else(mismatch)?;
            Ok(stored.and_then(|v| as_instant(v)) == Some(wanted))
        }
        AttributeType::Json => Ok(stored == Some(literal)),
    }
}

/// Produces the comparable key for a stored value under a declared type.
///
/// `None` means the value yields no ordering position (explicit null, or
/// a shape that cannot coerce to `declared`); such rows sort with the
/// rows that lack the key entirely.
#[must_use]
pub fn sort_key(declared: AttributeType, stored: &Value) -> Option<SortKey> {
    match declared {
        AttributeType::Text => stored.as_text().map(|s| SortKey::Text(fold_case(s))),
        AttributeType::Integer | AttributeType::Float => {
            as_numeric(stored).map(SortKey::Number)
        }
        AttributeType::Boolean => stored.as_bool().map(SortKey::Bool),
        AttributeType::DateTime => as_instant(stored).map(SortKey::Instant),
        AttributeType::Json => match stored {
            Value::Null => None,
            other => serde_json::to_string(other).ok().map(SortKey::Opaque),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn text_comparison_is_case_insensitive() {
        let declared = Some(AttributeType::Text);
        assert!(values_equal("s", declared, Some(&text("a")), &text("A")).unwrap());
        assert!(values_equal("s", declared, Some(&text("A")), &text("a")).unwrap());
        assert!(values_equal("s", declared, Some(&text("Straße")), &text("straße")).unwrap());
        assert!(!values_equal("s", declared, Some(&text("a")), &text("b")).unwrap());
    }

    #[test]
    fn text_literal_must_be_text() {
        let err = values_equal("s", Some(AttributeType::Text), None, &Value::Integer(1));
        assert!(matches!(err, Err(CoreError::TypeMismatch { .. })));
    }

    #[test]
    fn integer_matches_float_literal_when_numerically_equal() {
        let declared = Some(AttributeType::Integer);
        let stored = Value::Integer(10);
        assert!(values_equal("n", declared, Some(&stored), &Value::Integer(10)).unwrap());
        assert!(values_equal("n", declared, Some(&stored), &Value::Float(10.0)).unwrap());
        assert!(!values_equal("n", declared, Some(&stored), &Value::Float(10.5)).unwrap());
    }

    #[test]
    fn float_equality_is_exact() {
        let declared = Some(AttributeType::Float);
        let stored = Value::Float(0.1);
        assert!(values_equal("f", declared, Some(&stored), &Value::Float(0.1)).unwrap());
        assert!(
            !values_equal("f", declared, Some(&stored), &Value::Float(0.099_999_999_999_999))
                .unwrap()
        );
    }

    #[test]
    fn zero_matches_zero_but_not_absent() {
        let declared = Some(AttributeType::Integer);
        assert!(values_equal("n", declared, Some(&Value::Integer(0)), &Value::Integer(0)).unwrap());
        assert!(!values_equal("n", declared, None, &Value::Integer(0)).unwrap());
    }

    #[test]
    fn numeric_text_literal_coerces() {
        let declared = Some(AttributeType::Integer);
        let stored = Value::Integer(10);
        assert!(values_equal("n", declared, Some(&stored), &text("10")).unwrap());

        let err = values_equal("n", declared, Some(&stored), &text("ten"));
        assert!(matches!(err, Err(CoreError::TypeMismatch { .. })));
    }

    #[test]
    fn null_literal_matches_null_and_absent() {
        for declared in [
            Some(AttributeType::Boolean),
            Some(AttributeType::Integer),
            Some(AttributeType::Text),
            None,
        ] {
            assert!(values_equal("x", declared, None, &Value::Null).unwrap());
            assert!(values_equal("x", declared, Some(&Value::Null), &Value::Null).unwrap());
            assert!(!values_equal("x", declared, Some(&Value::Bool(false)), &Value::Null).unwrap());
        }
    }

    #[test]
    fn boolean_is_exact() {
        let declared = Some(AttributeType::Boolean);
        let stored = Value::Bool(false);
        assert!(values_equal("b", declared, Some(&stored), &Value::Bool(false)).unwrap());
        assert!(!values_equal("b", declared, Some(&stored), &Value::Bool(true)).unwrap());
        assert!(!values_equal("b", declared, None, &Value::Bool(false)).unwrap());
    }

    #[test]
    fn datetime_representations_collapse_to_one_instant() {
        let declared = Some(AttributeType::DateTime);
        let representations = [
            "1990-01-01",
            "1990-01-01T00:00",
            "1990-01-01T00:00:00",
            "1990-01-01T00:00:00.000000",
            "1990-01-01 00:00:00",
            "1990-01-01T00:00:00+00:00",
        ];
        for stored in representations {
            for literal in representations {
                assert!(
                    values_equal("d", declared, Some(&text(stored)), &text(literal)).unwrap(),
                    "{stored} should equal {literal}"
                );
            }
        }
    }

    #[test]
    fn date_only_literal_is_midnight_not_a_range() {
        let declared = Some(AttributeType::DateTime);
        let stored = text("1990-01-01T12:00:00");
        assert!(!values_equal("d", declared, Some(&stored), &text("1990-01-01")).unwrap());
    }

    #[test]
    fn datetime_timestamp_value_matches_text() {
        let declared = Some(AttributeType::DateTime);
        let stored = Value::Timestamp(Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap());
        assert!(values_equal("d", declared, Some(&stored), &text("1990-01-01")).unwrap());
    }

    #[test]
    fn datetime_offset_converts_to_utc() {
        let declared = Some(AttributeType::DateTime);
        let stored = text("1990-01-01T02:00:00+02:00");
        assert!(values_equal("d", declared, Some(&stored), &text("1990-01-01")).unwrap());
    }

    #[test]
    fn bad_datetime_literal_is_a_mismatch() {
        let err = values_equal("d", Some(AttributeType::DateTime), None, &text("not a date"));
        assert!(matches!(err, Err(CoreError::TypeMismatch { .. })));
    }

    #[test]
    fn opaque_names_compare_structurally() {
        let stored = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
        let equal = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
        let other = Value::Array(vec![Value::Integer(2), Value::Integer(1)]);

        assert!(values_equal("o", None, Some(&stored), &equal).unwrap());
        assert!(!values_equal("o", None, Some(&stored), &other).unwrap());
        // No numeric coercion without a declared type.
        assert!(!values_equal("o", None, Some(&Value::Integer(10)), &Value::Float(10.0)).unwrap());
    }

    #[test]
    fn json_attribute_compares_structurally() {
        let declared = Some(AttributeType::Json);
        let stored = Value::Array(vec![text("foo"), text("bar")]);
        let equal = Value::Array(vec![text("foo"), text("bar")]);
        assert!(values_equal("j", declared, Some(&stored), &equal).unwrap());
        assert!(!values_equal("j", declared, Some(&stored), &text("foo")).unwrap());
    }

    #[test]
    fn bad_literal_errors_even_when_key_is_absent() {
        // The literal is validated before any per-row short-circuit.
        let err = values_equal("n", Some(AttributeType::Integer), None, &text("ten"));
        assert!(matches!(err, Err(CoreError::TypeMismatch { .. })));
    }

    #[test]
    fn sort_keys_order_numbers_numerically() {
        let declared = AttributeType::Integer;
        let two = sort_key(declared, &Value::Integer(2)).unwrap();
        let ten = sort_key(declared, &Value::Integer(10)).unwrap();
        let two_and_half = sort_key(declared, &Value::Float(2.5)).unwrap();

        assert!(two < two_and_half);
        assert!(two_and_half < ten);
    }

    #[test]
    fn sort_keys_fold_text_case() {
        let a = sort_key(AttributeType::Text, &text("Apple")).unwrap();
        let b = sort_key(AttributeType::Text, &text("apple")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sort_keys_order_instants_chronologically() {
        let earlier = sort_key(AttributeType::DateTime, &text("1990-01-01")).unwrap();
        let later = sort_key(AttributeType::DateTime, &text("1990-01-01T00:01")).unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn null_and_uncoercible_values_yield_no_key() {
        assert_eq!(sort_key(AttributeType::Integer, &Value::Null), None);
        assert_eq!(sort_key(AttributeType::Integer, &text("ten")), None);
        assert_eq!(sort_key(AttributeType::DateTime, &Value::Bool(true)), None);
        assert_eq!(sort_key(AttributeType::Json, &Value::Null), None);
    }

    #[test]
    fn numeric_ordering_is_total_across_shapes() {
        let mut values = vec![
            Numeric::Float(1.5),
            Numeric::Int(10),
            Numeric::Int(-3),
            Numeric::Float(-0.5),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Numeric::Int(-3),
                Numeric::Float(-0.5),
                Numeric::Float(1.5),
                Numeric::Int(10),
            ]
        );
    }
}
