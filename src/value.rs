//! Coerced cell values and the conversion rules behind the coercion matrix.

use std::fmt;

use bigread_predicate::ScalarValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::{prelude::FromPrimitive, Decimal};

use crate::{
    error::CoercionError,
    format::DisplayFormat,
    types::{ColumnType, DesiredType, TypeTag},
};

/// Date that anchors time-of-day cells when they are read as dates or timestamps.
pub const TIME_ANCHOR: NaiveDate = match NaiveDate::from_ymd_opt(1, 1, 1) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

/// A non-empty cell converted to the requested representation.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    DateTime(DateTime<Utc>),
    String(String),
}

impl Value {
    /// The tag this value was produced for.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Int8(_) => TypeTag::Int8,
            Value::Int16(_) => TypeTag::Int16,
            Value::Int32(_) => TypeTag::Int32,
            Value::Int64(_) => TypeTag::Int64,
            Value::Float32(_) => TypeTag::Float32,
            Value::Float64(_) => TypeTag::Float64,
            Value::Decimal(_) => TypeTag::Decimal,
            Value::Date(_) => TypeTag::Date,
            Value::Timestamp(_) => TypeTag::Timestamp,
            Value::DateTime(_) => TypeTag::DateTime,
            Value::String(_) => TypeTag::String,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer payload of any integer variant, widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(v) => Some(i64::from(*v)),
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating payload of either float variant, widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(f64::from(*v)),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
        }
    }
}

/// How an empty cell is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Empty {
    /// The caller asked for an optional value.
    Absent,
    /// The caller asked for a bare value; distinct from every real value.
    Null,
}

/// Result of reading one cell: a value, or an empty marker.
#[derive(Clone, Debug, PartialEq)]
pub enum Fetched {
    Value(Value),
    Empty(Empty),
}

impl Fetched {
    pub(crate) fn empty_for(desired: DesiredType) -> Self {
        if desired.optional {
            Fetched::Empty(Empty::Absent)
        } else {
            Fetched::Empty(Empty::Null)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Fetched::Empty(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Fetched::Value(value) => Some(value),
            Fetched::Empty(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Fetched::Value(value) => Some(value),
            Fetched::Empty(_) => None,
        }
    }
}

/// Converts a stored cell of `column_type` into the requested representation.
///
/// The matrix check runs first, so an illegal request fails even for empty
/// cells. String columns never read as empty: a missing string is `""`.
pub fn coerce(
    column_type: ColumnType,
    format: Option<&DisplayFormat>,
    cell: &ScalarValue,
    desired: DesiredType,
) -> Result<Fetched, CoercionError> {
    column_type.check_coercion(desired.tag)?;
    let requested = desired.tag;
    let unsupported = || CoercionError::Unsupported {
        column_type,
        requested,
    };

    let value = match cell {
        ScalarValue::Null if column_type == ColumnType::String => Value::String(String::new()),
        ScalarValue::Null => return Ok(Fetched::empty_for(desired)),
        ScalarValue::Boolean(v) => from_integer(i64::from(*v), requested)
            .or_else(|| (requested == TypeTag::Boolean).then_some(Ok(Value::Boolean(*v))))
            .ok_or_else(unsupported)??,
        ScalarValue::Int64(v) => from_integer(*v, requested).ok_or_else(unsupported)??,
        ScalarValue::Float64(v) => from_float(*v, requested).ok_or_else(unsupported)??,
        ScalarValue::Decimal(v) => match requested {
            TypeTag::Decimal => Value::Decimal(*v),
            _ => return Err(unsupported()),
        },
        ScalarValue::Utf8(text) => match requested {
            TypeTag::String => Value::String(match format {
                Some(format) => format.apply(text),
                None => text.clone(),
            }),
            _ => return Err(unsupported()),
        },
        ScalarValue::Date(date) => {
            from_timestamp(date.and_time(NaiveTime::MIN), requested).ok_or_else(unsupported)?
        }
        ScalarValue::Timestamp(ts) => from_timestamp(*ts, requested).ok_or_else(unsupported)?,
        ScalarValue::Time(time) => {
            from_timestamp(TIME_ANCHOR.and_time(*time), requested).ok_or_else(unsupported)?
        }
    };
    Ok(Fetched::Value(value))
}

// Numeric targets shared by boolean and long cells. `None` means the tag is
// not a numeric target; `Some(Err)` means the value does not fit.
fn from_integer(v: i64, requested: TypeTag) -> Option<Result<Value, CoercionError>> {
    let out_of_range = || CoercionError::OutOfRange {
        value: v.to_string(),
        requested,
    };
    Some(match requested {
        TypeTag::Int8 => i8::try_from(v).map(Value::Int8).map_err(|_| out_of_range()),
        TypeTag::Int16 => i16::try_from(v).map(Value::Int16).map_err(|_| out_of_range()),
        TypeTag::Int32 => i32::try_from(v).map(Value::Int32).map_err(|_| out_of_range()),
        TypeTag::Int64 => Ok(Value::Int64(v)),
        TypeTag::Float32 => Ok(Value::Float32(v as f32)),
        TypeTag::Float64 => Ok(Value::Float64(v as f64)),
        TypeTag::Decimal => Ok(Value::Decimal(Decimal::from(v))),
        _ => return None,
    })
}

fn from_float(v: f64, requested: TypeTag) -> Option<Result<Value, CoercionError>> {
    let out_of_range = || CoercionError::OutOfRange {
        value: v.to_string(),
        requested,
    };
    Some(match requested {
        TypeTag::Float64 => Ok(Value::Float64(v)),
        TypeTag::Float32 => Ok(Value::Float32(v as f32)),
        TypeTag::Decimal => Decimal::from_f64(v)
            .map(Value::Decimal)
            .ok_or_else(out_of_range),
        TypeTag::Int8 | TypeTag::Int16 | TypeTag::Int32 | TypeTag::Int64 => {
            let truncated = v.trunc();
            // i64::MAX is not representable as f64; 2^63 is the first value out of range.
            if !truncated.is_finite()
                || truncated < -9.223_372_036_854_776e18
                || truncated >= 9.223_372_036_854_776e18
            {
                Err(out_of_range())
            } else {
                match from_integer(truncated as i64, requested)? {
                    Ok(value) => Ok(value),
                    Err(_) => Err(out_of_range()),
                }
            }
        }
        _ => return None,
    })
}

fn from_timestamp(ts: NaiveDateTime, requested: TypeTag) -> Option<Value> {
    let millis = ts.and_utc().timestamp_millis();
    Some(match requested {
        TypeTag::Date => Value::Date(ts.date()),
        TypeTag::Timestamp => Value::Timestamp(ts),
        TypeTag::DateTime => Value::DateTime(ts.and_utc()),
        TypeTag::Int64 => Value::Int64(millis),
        TypeTag::Decimal => Value::Decimal(Decimal::from(millis)),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn bare(tag: TypeTag) -> DesiredType {
        DesiredType::bare(tag)
    }

    fn read(column_type: ColumnType, cell: ScalarValue, tag: TypeTag) -> Value {
        coerce(column_type, None, &cell, bare(tag))
            .expect("legal coercion")
            .into_value()
            .expect("non-empty cell")
    }

    #[test]
    fn empty_cells_follow_the_optional_flag() {
        let null = ScalarValue::Null;
        assert_eq!(
            coerce(ColumnType::Long, None, &null, DesiredType::optional(TypeTag::Int64)),
            Ok(Fetched::Empty(Empty::Absent))
        );
        assert_eq!(
            coerce(ColumnType::Long, None, &null, bare(TypeTag::Int64)),
            Ok(Fetched::Empty(Empty::Null))
        );
        assert_eq!(
            coerce(ColumnType::String, None, &null, DesiredType::optional(TypeTag::String)),
            Ok(Fetched::Value(Value::String(String::new())))
        );
    }

    #[test]
    fn illegal_requests_fail_even_for_empty_cells() {
        let err = coerce(ColumnType::Boolean, None, &ScalarValue::Null, bare(TypeTag::Date))
            .expect_err("boolean cannot be a date");
        assert_eq!(
            err,
            CoercionError::Unsupported {
                column_type: ColumnType::Boolean,
                requested: TypeTag::Date
            }
        );
    }

    #[test]
    fn booleans_widen_to_numbers() {
        assert_eq!(
            read(ColumnType::Boolean, true.into(), TypeTag::Boolean),
            Value::Boolean(true)
        );
        assert_eq!(read(ColumnType::Boolean, true.into(), TypeTag::Int8), Value::Int8(1));
        assert_eq!(
            read(ColumnType::Boolean, false.into(), TypeTag::Float64),
            Value::Float64(0.0)
        );
        assert_eq!(
            read(ColumnType::Boolean, true.into(), TypeTag::Decimal),
            Value::Decimal(Decimal::ONE)
        );
    }

    #[test]
    fn longs_narrow_with_range_checks() {
        assert_eq!(read(ColumnType::Long, 120i64.into(), TypeTag::Int8), Value::Int8(120));
        assert_eq!(
            read(ColumnType::Long, 7i64.into(), TypeTag::Float32),
            Value::Float32(7.0)
        );
        let err = coerce(ColumnType::Long, None, &300i64.into(), bare(TypeTag::Int8))
            .expect_err("300 does not fit i8");
        assert_eq!(
            err,
            CoercionError::OutOfRange {
                value: "300".to_string(),
                requested: TypeTag::Int8
            }
        );
    }

    #[test]
    fn doubles_truncate_toward_zero() {
        assert_eq!(read(ColumnType::Double, (-2.9f64).into(), TypeTag::Int32), Value::Int32(-2));
        assert_eq!(read(ColumnType::Double, 2.9f64.into(), TypeTag::Int64), Value::Int64(2));
        assert_eq!(
            read(ColumnType::Double, 0.1f64.into(), TypeTag::Decimal),
            Value::Decimal(Decimal::from_str("0.1").expect("decimal"))
        );
        for bad in [f64::NAN, f64::INFINITY, 1e19] {
            assert!(matches!(
                coerce(ColumnType::Double, None, &bad.into(), bare(TypeTag::Int64)),
                Err(CoercionError::OutOfRange { .. })
            ));
        }
        assert!(matches!(
            coerce(ColumnType::Double, None, &200.5f64.into(), bare(TypeTag::Int8)),
            Err(CoercionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn dates_read_as_epoch_millis() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 2).expect("date");
        assert_eq!(
            read(ColumnType::Date, date.into(), TypeTag::Int64),
            Value::Int64(86_400_000)
        );
        assert_eq!(
            read(ColumnType::Date, date.into(), TypeTag::Timestamp),
            Value::Timestamp(date.and_hms_opt(0, 0, 0).expect("midnight"))
        );
        assert_eq!(
            read(ColumnType::Date, date.into(), TypeTag::Decimal),
            Value::Decimal(Decimal::from(86_400_000i64))
        );
    }

    #[test]
    fn datetimes_offer_the_combined_representation() {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 6)
            .and_then(|d| d.and_hms_milli_opt(7, 8, 9, 10))
            .expect("timestamp");
        let combined = read(ColumnType::DateTime, ts.into(), TypeTag::DateTime);
        assert_eq!(combined, Value::DateTime(ts.and_utc()));
        assert_eq!(
            read(ColumnType::DateTime, ts.into(), TypeTag::Date),
            Value::Date(ts.date())
        );
        assert_eq!(
            read(ColumnType::DateTime, ts.into(), TypeTag::Int64),
            Value::Int64(ts.and_utc().timestamp_millis())
        );
        assert!(coerce(ColumnType::Date, None, &ts.date().into(), bare(TypeTag::DateTime)).is_err());
    }

    #[test]
    fn times_are_anchored_at_year_one() {
        let time = NaiveTime::from_hms_opt(13, 30, 0).expect("time");
        let anchored = NaiveDate::from_ymd_opt(1, 1, 1)
            .expect("anchor")
            .and_time(time);
        assert_eq!(
            read(ColumnType::Time, time.into(), TypeTag::Timestamp),
            Value::Timestamp(anchored)
        );
        assert_eq!(
            read(ColumnType::Time, time.into(), TypeTag::Date),
            Value::Date(TIME_ANCHOR)
        );
        assert_eq!(
            read(ColumnType::Time, time.into(), TypeTag::Int64),
            Value::Int64(anchored.and_utc().timestamp_millis())
        );
    }

    #[test]
    fn strings_apply_display_format() {
        let format = DisplayFormat::new("\"#\"@");
        let fetched = coerce(
            ColumnType::String,
            Some(&format),
            &"17".into(),
            bare(TypeTag::String),
        )
        .expect("string read");
        assert_eq!(fetched.value().and_then(Value::as_str), Some("#17"));
        assert!(matches!(
            coerce(ColumnType::String, Some(&format), &"17".into(), bare(TypeTag::Int64)),
            Err(CoercionError::Unsupported { .. })
        ));
    }
}
