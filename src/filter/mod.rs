//! Public filter algebra.
//!
//! A [`Filter`] describes a condition over the values of a single column.
//! Leaf operands are validated when the filter is built, so a filter that
//! exists is always well formed; filters are immutable and can be reused
//! across queries.

mod translate;

use std::fmt;

pub use bigread_predicate::ScalarValue;
pub use translate::{bind, translate};

use crate::error::FilterError;

/// Non-null comparison operand.
#[derive(Clone, Debug, PartialEq)]
pub struct Operand(ScalarValue);

impl Operand {
    /// Wraps `value`, rejecting `Null`.
    pub fn new(value: impl Into<ScalarValue>) -> Result<Self, FilterError> {
        match value.into() {
            ScalarValue::Null => Err(FilterError::NullOperand { name: "operand" }),
            value => Ok(Self(value)),
        }
    }

    pub fn value(&self) -> &ScalarValue {
        &self.0
    }

    pub fn into_value(self) -> ScalarValue {
        self.0
    }
}

/// Non-null text operand plus its case sensitivity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringOperand {
    text: String,
    case_sensitive: bool,
}

impl StringOperand {
    /// Wraps `value`, rejecting `Null` and non-text literals.
    pub fn new(value: impl Into<ScalarValue>, case_sensitive: bool) -> Result<Self, FilterError> {
        match value.into() {
            ScalarValue::Null => Err(FilterError::NullOperand { name: "operand" }),
            ScalarValue::Utf8(text) => Ok(Self {
                text,
                case_sensitive,
            }),
            other => Err(FilterError::NonStringOperand {
                operand_type: other.type_name(),
            }),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }
}

/// Condition over one column's values.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Every child holds; an empty list always holds.
    And(Vec<Filter>),
    /// Some child holds; an empty list never holds.
    Or(Vec<Filter>),
    IsEqual(Operand),
    IsNotEqual(Operand),
    IsGreaterThan(Operand),
    IsGreaterThanOrEqual(Operand),
    IsLessThan(Operand),
    IsLessThanOrEqual(Operand),
    StringIsEqual(StringOperand),
    StringIsNotEqual(StringOperand),
    StringIsGreaterThan(StringOperand),
    StringIsGreaterThanOrEqual(StringOperand),
    StringIsLessThan(StringOperand),
    StringIsLessThanOrEqual(StringOperand),
    StringContains(StringOperand),
    StringDoesNotContain(StringOperand),
    StringStartsWith(StringOperand),
    StringDoesNotStartWith(StringOperand),
    StringEndsWith(StringOperand),
    StringDoesNotEndWith(StringOperand),
    IsNull,
    IsNotNull,
}

macro_rules! comparison_factories {
    ($($(#[$doc:meta])* $name:ident => $variant:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(operand: impl Into<ScalarValue>) -> Result<Filter, FilterError> {
                Operand::new(operand).map(Filter::$variant)
            }
        )*
    };
}

macro_rules! string_factories {
    ($($name:ident => $variant:ident),* $(,)?) => {
        $(
            pub fn $name(
                operand: impl Into<ScalarValue>,
                case_sensitive: bool,
            ) -> Result<Filter, FilterError> {
                StringOperand::new(operand, case_sensitive).map(Filter::$variant)
            }
        )*
    };
}

impl Filter {
    pub fn and<I>(filters: I) -> Filter
    where
        I: IntoIterator<Item = Filter>,
    {
        Filter::And(filters.into_iter().collect())
    }

    pub fn or<I>(filters: I) -> Filter
    where
        I: IntoIterator<Item = Filter>,
    {
        Filter::Or(filters.into_iter().collect())
    }

    pub fn is_null() -> Filter {
        Filter::IsNull
    }

    pub fn is_not_null() -> Filter {
        Filter::IsNotNull
    }

    comparison_factories! {
        /// Cell equals the operand.
        equal => IsEqual,
        not_equal => IsNotEqual,
        greater_than => IsGreaterThan,
        greater_than_or_equal => IsGreaterThanOrEqual,
        less_than => IsLessThan,
        less_than_or_equal => IsLessThanOrEqual,
    }

    string_factories! {
        string_equal => StringIsEqual,
        string_not_equal => StringIsNotEqual,
        string_greater_than => StringIsGreaterThan,
        string_greater_than_or_equal => StringIsGreaterThanOrEqual,
        string_less_than => StringIsLessThan,
        string_less_than_or_equal => StringIsLessThanOrEqual,
        contains => StringContains,
        does_not_contain => StringDoesNotContain,
        starts_with => StringStartsWith,
        does_not_start_with => StringDoesNotStartWith,
        ends_with => StringEndsWith,
        does_not_end_with => StringDoesNotEndWith,
    }

    /// Child filters of `And`/`Or`; empty for leaves.
    pub fn children(&self) -> &[Filter] {
        match self {
            Filter::And(children) | Filter::Or(children) => children,
            _ => &[],
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", translate(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Factory = fn(ScalarValue) -> Result<Filter, FilterError>;
    type StringFactory = fn(ScalarValue, bool) -> Result<Filter, FilterError>;

    fn comparison_factories() -> [Factory; 6] {
        [
            |v| Filter::equal(v),
            |v| Filter::not_equal(v),
            |v| Filter::greater_than(v),
            |v| Filter::greater_than_or_equal(v),
            |v| Filter::less_than(v),
            |v| Filter::less_than_or_equal(v),
        ]
    }

    fn string_factories() -> [StringFactory; 12] {
        [
            |v, cs| Filter::string_equal(v, cs),
            |v, cs| Filter::string_not_equal(v, cs),
            |v, cs| Filter::string_greater_than(v, cs),
            |v, cs| Filter::string_greater_than_or_equal(v, cs),
            |v, cs| Filter::string_less_than(v, cs),
            |v, cs| Filter::string_less_than_or_equal(v, cs),
            |v, cs| Filter::contains(v, cs),
            |v, cs| Filter::does_not_contain(v, cs),
            |v, cs| Filter::starts_with(v, cs),
            |v, cs| Filter::does_not_start_with(v, cs),
            |v, cs| Filter::ends_with(v, cs),
            |v, cs| Filter::does_not_end_with(v, cs),
        ]
    }

    #[test]
    fn every_comparison_rejects_null_operands() {
        for factory in comparison_factories() {
            assert_eq!(
                factory(ScalarValue::Null),
                Err(FilterError::NullOperand { name: "operand" })
            );
            assert!(factory(ScalarValue::Int64(1)).is_ok());
        }
        assert!(Filter::equal(None::<i64>).is_err());
    }

    #[test]
    fn every_string_filter_rejects_null_and_non_text() {
        for factory in string_factories() {
            assert_eq!(
                factory(ScalarValue::Null, true),
                Err(FilterError::NullOperand { name: "operand" })
            );
            assert_eq!(
                factory(ScalarValue::Int64(3), false),
                Err(FilterError::NonStringOperand {
                    operand_type: "int64"
                })
            );
            assert!(factory(ScalarValue::from("x"), false).is_ok());
        }
    }

    #[test]
    fn string_operands_keep_case_flag() {
        let filter = Filter::starts_with("Ab", false).expect("valid filter");
        match filter {
            Filter::StringStartsWith(operand) => {
                assert_eq!(operand.text(), "Ab");
                assert!(!operand.case_sensitive());
            }
            other => panic!("unexpected filter {other:?}"),
        }
    }

    #[test]
    fn groups_keep_children_in_order() {
        let first = Filter::is_not_null();
        let second = Filter::greater_than(5i64).expect("valid filter");
        let group = Filter::and([first.clone(), second.clone()]);
        assert_eq!(group.children(), &[first, second]);
        assert!(Filter::or([]).children().is_empty());
        assert!(Filter::IsNull.children().is_empty());
    }

    #[test]
    fn filters_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Filter>();
    }
}
