#![deny(missing_docs)]
//! Core predicate structures shared by the reader facade and storage engines.

mod node;
mod row_set;
mod value;
mod visitor;

pub use node::{ComparisonOp, NullityKind, Predicate, PredicateNode, StringOp};
pub use row_set::{BitmapRowSet, RowId, RowIdIter, RowSet};
pub use value::ScalarValue;
pub use visitor::PredicateVisitor;
