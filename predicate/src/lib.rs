#![deny(missing_docs)]
//! Storage-facing predicate trees for bigread worksheets.
//!
//! Every predicate targets exactly one column: the column is implied by the
//! query slot the predicate is attached to, so nodes carry operands but never
//! column references. Operands are plain [`ScalarValue`]s and comparisons
//! follow worksheet semantics, where an empty cell never satisfies a
//! comparison and only a nullity check can observe it.

mod core;

pub use crate::core::{
    BitmapRowSet, ComparisonOp, NullityKind, Predicate, PredicateNode, PredicateVisitor, RowId,
    RowIdIter, RowSet, ScalarValue, StringOp,
};
