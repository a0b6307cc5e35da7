//! Typed, filtered reads over a columnar worksheet file.
//!
//! Callers build [`Filter`] trees and per-column [`QueryColumn`] requests; the
//! [`Reader`] validates them, compiles each filter into the predicate form a
//! [`Storage`] engine evaluates, and hands matching rows back with every cell
//! coerced to the requested [`TypeTag`]. The set of legal column type to
//! requested type conversions is fixed, see [`ColumnType::coercions`].
//!
//! ```no_run
//! use std::collections::BTreeMap;
//!
//! use bigread::{Filter, QueryColumn, Reader, TypeTag};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = Reader::open("orders.parquet")?;
//! let columns = BTreeMap::from([(
//!     0,
//!     QueryColumn::projected_with_filter(TypeTag::Int64, Filter::greater_than(10i64)?)?,
//! )]);
//! let last = reader.row_count(0)? - 1;
//! reader.row_values(0, 0, last, &columns, |row, values| {
//!     println!("{row}: {:?}", values.get(0));
//! })?;
//! # Ok(())
//! # }
//! ```

mod logging;

pub mod error;
pub mod filter;
pub mod format;
pub mod option;
pub mod query;
pub mod reader;
pub mod storage;
pub mod types;
pub mod value;

pub use bigread_predicate::{Predicate, ScalarValue};

pub use crate::{
    error::{CoercionError, Dimension, FilterError, ReaderError, StorageError},
    filter::Filter,
    format::DisplayFormat,
    option::ReaderOptions,
    query::{ColumnAttributes, QueryColumn},
    reader::{Reader, RowValues},
    storage::{BatchStorage, ColumnInfo, RowSource, Storage, WorksheetInfo},
    types::{ColumnType, DesiredType, TypeTag},
    value::{coerce, Empty, Fetched, Value},
};
