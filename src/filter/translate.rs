//! Compiles public filters into storage predicates and binds them to a column.

use std::str::FromStr;

use bigread_predicate::{ComparisonOp, NullityKind, Predicate, PredicateNode, StringOp};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{prelude::ToPrimitive, Decimal};

use super::{Filter, Operand, ScalarValue, StringOperand};
use crate::{error::FilterError, types::ColumnType, value::TIME_ANCHOR};

/// Translates a filter into the predicate tree handed to storage engines.
///
/// Pure and total: every filter variant has exactly one predicate shape, and
/// `And`/`Or` children keep their order.
pub fn translate(filter: &Filter) -> Predicate {
    let compare = |op, operand: &Operand| Predicate::compare(op, operand.value().clone());
    let string = |op, operand: &StringOperand| {
        Predicate::string_match(op, operand.case_sensitive(), operand.text())
    };
    match filter {
        Filter::And(children) => Predicate::and(children.iter().map(translate)),
        Filter::Or(children) => Predicate::or(children.iter().map(translate)),
        Filter::IsEqual(operand) => compare(ComparisonOp::Equal, operand),
        Filter::IsNotEqual(operand) => compare(ComparisonOp::NotEqual, operand),
        Filter::IsGreaterThan(operand) => compare(ComparisonOp::GreaterThan, operand),
        Filter::IsGreaterThanOrEqual(operand) => {
            compare(ComparisonOp::GreaterThanOrEqual, operand)
        }
        Filter::IsLessThan(operand) => compare(ComparisonOp::LessThan, operand),
        Filter::IsLessThanOrEqual(operand) => compare(ComparisonOp::LessThanOrEqual, operand),
        Filter::StringIsEqual(operand) => string(StringOp::Equal, operand),
        Filter::StringIsNotEqual(operand) => string(StringOp::NotEqual, operand),
        Filter::StringIsGreaterThan(operand) => string(StringOp::GreaterThan, operand),
        Filter::StringIsGreaterThanOrEqual(operand) => {
            string(StringOp::GreaterThanOrEqual, operand)
        }
        Filter::StringIsLessThan(operand) => string(StringOp::LessThan, operand),
        Filter::StringIsLessThanOrEqual(operand) => string(StringOp::LessThanOrEqual, operand),
        Filter::StringContains(operand) => string(StringOp::Contains, operand),
        Filter::StringDoesNotContain(operand) => string(StringOp::DoesNotContain, operand),
        Filter::StringStartsWith(operand) => string(StringOp::StartsWith, operand),
        Filter::StringDoesNotStartWith(operand) => string(StringOp::DoesNotStartWith, operand),
        Filter::StringEndsWith(operand) => string(StringOp::EndsWith, operand),
        Filter::StringDoesNotEndWith(operand) => string(StringOp::DoesNotEndWith, operand),
        Filter::IsNull => Predicate::nullity(NullityKind::IsNull),
        Filter::IsNotNull => Predicate::nullity(NullityKind::IsNotNull),
    }
}

impl TryFrom<&Predicate> for Filter {
    type Error = FilterError;

    /// Rebuilds the public filter a predicate was translated from.
    fn try_from(predicate: &Predicate) -> Result<Self, Self::Error> {
        Ok(match predicate.kind() {
            PredicateNode::And(children) => Filter::And(
                children
                    .iter()
                    .map(Filter::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            PredicateNode::Or(children) => Filter::Or(
                children
                    .iter()
                    .map(Filter::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            PredicateNode::Compare { op, operand } => {
                let operand = Operand::new(operand.clone())?;
                match op {
                    ComparisonOp::Equal => Filter::IsEqual(operand),
                    ComparisonOp::NotEqual => Filter::IsNotEqual(operand),
                    ComparisonOp::GreaterThan => Filter::IsGreaterThan(operand),
                    ComparisonOp::GreaterThanOrEqual => Filter::IsGreaterThanOrEqual(operand),
                    ComparisonOp::LessThan => Filter::IsLessThan(operand),
                    ComparisonOp::LessThanOrEqual => Filter::IsLessThanOrEqual(operand),
                }
            }
            PredicateNode::StringMatch {
                op,
                case_sensitive,
                operand,
            } => {
                let operand = StringOperand::new(operand.as_str(), *case_sensitive)?;
                match op {
                    StringOp::Equal => Filter::StringIsEqual(operand),
                    StringOp::NotEqual => Filter::StringIsNotEqual(operand),
                    StringOp::GreaterThan => Filter::StringIsGreaterThan(operand),
                    StringOp::GreaterThanOrEqual => Filter::StringIsGreaterThanOrEqual(operand),
                    StringOp::LessThan => Filter::StringIsLessThan(operand),
                    StringOp::LessThanOrEqual => Filter::StringIsLessThanOrEqual(operand),
                    StringOp::Contains => Filter::StringContains(operand),
                    StringOp::DoesNotContain => Filter::StringDoesNotContain(operand),
                    StringOp::StartsWith => Filter::StringStartsWith(operand),
                    StringOp::DoesNotStartWith => Filter::StringDoesNotStartWith(operand),
                    StringOp::EndsWith => Filter::StringEndsWith(operand),
                    StringOp::DoesNotEndWith => Filter::StringDoesNotEndWith(operand),
                }
            }
            PredicateNode::Nullity(NullityKind::IsNull) => Filter::IsNull,
            PredicateNode::Nullity(NullityKind::IsNotNull) => Filter::IsNotNull,
        })
    }
}

/// Checks a translated predicate against the column it targets and rewrites
/// operands into the column's cell domain.
///
/// Text operands are parsed as the column's type, numeric operands on
/// temporal columns are read as epoch milliseconds, and string filters are
/// only accepted on String columns.
pub fn bind(predicate: Predicate, column_type: ColumnType) -> Result<Predicate, FilterError> {
    match predicate.into_kind() {
        PredicateNode::And(children) => Ok(Predicate::and(
            children
                .into_iter()
                .map(|child| bind(child, column_type))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        PredicateNode::Or(children) => Ok(Predicate::or(
            children
                .into_iter()
                .map(|child| bind(child, column_type))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        PredicateNode::Compare { op, operand } => Ok(Predicate::compare(
            op,
            bind_operand(operand, column_type)?,
        )),
        node @ PredicateNode::StringMatch { .. } => {
            if column_type == ColumnType::String {
                Ok(Predicate::from_kind(node))
            } else {
                Err(FilterError::StringFilterOnNonString { column_type })
            }
        }
        node @ PredicateNode::Nullity(_) => Ok(Predicate::from_kind(node)),
    }
}

fn bind_operand(operand: ScalarValue, column_type: ColumnType) -> Result<ScalarValue, FilterError> {
    let incompatible = |operand: &ScalarValue| FilterError::IncompatibleOperand {
        column_type,
        operand: operand.to_string(),
        operand_type: operand.type_name(),
    };
    if operand.is_null() {
        return Err(FilterError::NullOperand { name: "operand" });
    }
    if matches!(operand, ScalarValue::Float64(v) if v.is_nan()) {
        return Err(incompatible(&operand));
    }
    let bound = match (column_type, &operand) {
        (ColumnType::String, ScalarValue::Utf8(_)) => Some(operand.clone()),
        (ColumnType::String, _) => None,

        (ColumnType::Boolean, ScalarValue::Utf8(text)) => parse_bool(text),
        (
            ColumnType::Boolean,
            ScalarValue::Boolean(_)
            | ScalarValue::Int64(_)
            | ScalarValue::Float64(_)
            | ScalarValue::Decimal(_),
        ) => Some(operand.clone()),
        (ColumnType::Boolean, _) => None,

        (ColumnType::Long, ScalarValue::Utf8(text)) => parse_number(text),
        (
            ColumnType::Long,
            ScalarValue::Int64(_) | ScalarValue::Float64(_) | ScalarValue::Decimal(_),
        ) => Some(operand.clone()),
        (ColumnType::Long, _) => None,

        // Double cells compare in f64, the same domain they are read back in.
        (ColumnType::Double, ScalarValue::Utf8(text)) => parse_double(text),
        (ColumnType::Double, ScalarValue::Decimal(v)) => v.to_f64().map(ScalarValue::Float64),
        (ColumnType::Double, ScalarValue::Int64(_) | ScalarValue::Float64(_)) => {
            Some(operand.clone())
        }
        (ColumnType::Double, _) => None,

        (ColumnType::Date | ColumnType::DateTime, ScalarValue::Utf8(text)) => {
            parse_date_or_timestamp(text)
        }
        (ColumnType::Date | ColumnType::DateTime, ScalarValue::Date(_) | ScalarValue::Timestamp(_)) => {
            Some(operand.clone())
        }
        (ColumnType::Date | ColumnType::DateTime, ScalarValue::Int64(_) | ScalarValue::Decimal(_)) => {
            epoch_millis(&operand)
                .and_then(DateTime::from_timestamp_millis)
                .map(|ts| ScalarValue::Timestamp(ts.naive_utc()))
        }
        (ColumnType::Date | ColumnType::DateTime, _) => None,

        (ColumnType::Time, ScalarValue::Utf8(text)) => parse_time(text),
        (ColumnType::Time, ScalarValue::Time(_)) => Some(operand.clone()),
        (ColumnType::Time, ScalarValue::Timestamp(ts)) => anchored_time(*ts),
        (ColumnType::Time, ScalarValue::Int64(_) | ScalarValue::Decimal(_)) => {
            epoch_millis(&operand)
                .and_then(DateTime::from_timestamp_millis)
                .and_then(|ts| anchored_time(ts.naive_utc()))
        }
        (ColumnType::Time, _) => None,
    };
    bound.ok_or_else(|| incompatible(&operand))
}

fn epoch_millis(operand: &ScalarValue) -> Option<i64> {
    match operand {
        ScalarValue::Int64(v) => Some(*v),
        ScalarValue::Decimal(v) if v.fract().is_zero() => i64::try_from(*v).ok(),
        _ => None,
    }
}

// A time-of-day cell reads as a timestamp on the anchor date, so only
// timestamps on that date can equal one.
fn anchored_time(ts: NaiveDateTime) -> Option<ScalarValue> {
    (ts.date() == TIME_ANCHOR).then(|| ScalarValue::Time(ts.time()))
}

fn parse_bool(text: &str) -> Option<ScalarValue> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(ScalarValue::Boolean(true))
    } else if text.eq_ignore_ascii_case("false") {
        Some(ScalarValue::Boolean(false))
    } else {
        parse_number(text)
    }
}

fn parse_number(text: &str) -> Option<ScalarValue> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Some(ScalarValue::Int64(v));
    }
    if let Ok(v) = Decimal::from_str(text) {
        return Some(ScalarValue::Decimal(v));
    }
    parse_double(text)
}

fn parse_double(text: &str) -> Option<ScalarValue> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .map(ScalarValue::Float64)
}

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_date_or_timestamp(text: &str) -> Option<ScalarValue> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(ScalarValue::Timestamp)
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(ScalarValue::Date)
        })
}

fn parse_time(text: &str) -> Option<ScalarValue> {
    let text = text.trim();
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
        .map(ScalarValue::Time)
}
