use std::{cmp::Ordering, fmt};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{prelude::ToPrimitive, Decimal};

/// Literal values accepted by predicate operands and produced by storage cells.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    /// An empty cell, or a missing operand.
    Null,
    /// Boolean literal.
    Boolean(bool),
    /// Signed 64-bit integer.
    Int64(i64),
    /// 64-bit floating point.
    Float64(f64),
    /// Arbitrary-precision decimal.
    Decimal(Decimal),
    /// UTF-8 string.
    Utf8(String),
    /// Calendar date without time of day.
    Date(NaiveDate),
    /// Date and time of day without a zone.
    Timestamp(NaiveDateTime),
    /// Time of day.
    Time(NaiveTime),
}

impl ScalarValue {
    /// Returns true when the literal is the `Null` variant.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Short name of the literal's type, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Null => "null",
            ScalarValue::Boolean(_) => "boolean",
            ScalarValue::Int64(_) => "int64",
            ScalarValue::Float64(_) => "float64",
            ScalarValue::Decimal(_) => "decimal",
            ScalarValue::Utf8(_) => "utf8",
            ScalarValue::Date(_) => "date",
            ScalarValue::Timestamp(_) => "timestamp",
            ScalarValue::Time(_) => "time",
        }
    }

    /// Returns the string slice when the literal is `Utf8`.
    #[must_use]
    pub fn as_utf8(&self) -> Option<&str> {
        match self {
            ScalarValue::Utf8(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Compares this scalar with another, returning the ordering when both sides are comparable.
    ///
    /// Numeric variants (including booleans as 0/1) compare across widths, and
    /// dates compare against timestamps at midnight. `Null` is never comparable.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        use ScalarValue::*;
        match (self, other) {
            (Null, _) | (_, Null) => None,
            (Boolean(lhs), Boolean(rhs)) => Some(lhs.cmp(rhs)),
            (Int64(lhs), Int64(rhs)) => Some(lhs.cmp(rhs)),
            (Float64(lhs), Float64(rhs)) => lhs.partial_cmp(rhs),
            (Decimal(lhs), Decimal(rhs)) => Some(lhs.cmp(rhs)),
            (Utf8(lhs), Utf8(rhs)) => Some(lhs.as_str().cmp(rhs.as_str())),
            (Date(lhs), Date(rhs)) => Some(lhs.cmp(rhs)),
            (Timestamp(lhs), Timestamp(rhs)) => Some(lhs.cmp(rhs)),
            (Date(lhs), Timestamp(rhs)) => Some(lhs.and_time(NaiveTime::MIN).cmp(rhs)),
            (Timestamp(lhs), Date(rhs)) => Some(lhs.cmp(&rhs.and_time(NaiveTime::MIN))),
            (Time(lhs), Time(rhs)) => Some(lhs.cmp(rhs)),
            (lhs, rhs) => compare_numeric(lhs, rhs),
        }
    }
}

// Mixed-width numeric comparison: exact through `Decimal` when both sides fit,
// falling back to f64 for floats outside the decimal range.
fn compare_numeric(lhs: &ScalarValue, rhs: &ScalarValue) -> Option<Ordering> {
    if let (Some(l), Some(r)) = (as_decimal(lhs), as_decimal(rhs)) {
        return Some(l.cmp(&r));
    }
    as_f64(lhs)?.partial_cmp(&as_f64(rhs)?)
}

fn as_decimal(value: &ScalarValue) -> Option<Decimal> {
    match value {
        ScalarValue::Boolean(v) => Some(Decimal::from(u8::from(*v))),
        ScalarValue::Int64(v) => Some(Decimal::from(*v)),
        ScalarValue::Float64(v) => Decimal::from_f64_retain(*v),
        ScalarValue::Decimal(v) => Some(*v),
        _ => None,
    }
}

fn as_f64(value: &ScalarValue) -> Option<f64> {
    match value {
        ScalarValue::Boolean(v) => Some(f64::from(u8::from(*v))),
        ScalarValue::Int64(v) => Some(*v as f64),
        ScalarValue::Float64(v) => Some(*v),
        ScalarValue::Decimal(v) => v.to_f64(),
        _ => None,
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => f.write_str("NULL"),
            ScalarValue::Boolean(v) => write!(f, "{v}"),
            ScalarValue::Int64(v) => write!(f, "{v}"),
            ScalarValue::Float64(v) => write!(f, "{v}"),
            ScalarValue::Decimal(v) => write!(f, "{v}"),
            ScalarValue::Utf8(v) => write!(f, "'{v}'"),
            ScalarValue::Date(v) => write!(f, "{v}"),
            ScalarValue::Timestamp(v) => write!(f, "{v}"),
            ScalarValue::Time(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int64(i64::from(value))
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float64(value)
    }
}

impl From<Decimal> for ScalarValue {
    fn from(value: Decimal) -> Self {
        ScalarValue::Decimal(value)
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_owned())
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(value: NaiveDate) -> Self {
        ScalarValue::Date(value)
    }
}

impl From<NaiveDateTime> for ScalarValue {
    fn from(value: NaiveDateTime) -> Self {
        ScalarValue::Timestamp(value)
    }
}

impl From<NaiveTime> for ScalarValue {
    fn from(value: NaiveTime) -> Self {
        ScalarValue::Time(value)
    }
}

impl<T> From<Option<T>> for ScalarValue
where
    T: Into<ScalarValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(ScalarValue::Null, Into::into)
    }
}
