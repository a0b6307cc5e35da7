//! Error taxonomy for the reader facade, filter binding, coercion and storage.

use std::{fmt, io, path::PathBuf};

use arrow::{datatypes::DataType, error::ArrowError};
use parquet::errors::ParquetError;
use thiserror::Error;

use crate::types::{ColumnType, TypeTag};

/// Index dimension named by range errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    /// Worksheet index.
    Worksheet,
    /// Row index.
    Row,
    /// Column index.
    Column,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dimension::Worksheet => "Worksheet",
            Dimension::Row => "Row",
            Dimension::Column => "Column",
        })
    }
}

/// Errors surfaced by [`Reader`](crate::Reader) operations.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("missing required argument: {name}")]
    MissingArgument { name: &'static str },
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },
    #[error("{dimension} index '{index}' out of range (must be < {bound})")]
    IndexOutOfRange {
        dimension: Dimension,
        index: usize,
        bound: usize,
    },
    #[error("end row {end} out of range (must be < {row_count})")]
    EndRowOutOfRange { end: usize, row_count: usize },
    #[error("start row {start} must be <= end row {end}")]
    InvertedRowRange { start: usize, end: usize },
    #[error("at least one query column is required")]
    EmptyColumnSet,
    #[error("column {column} was not projected by this query")]
    ColumnNotProjected { column: usize },
    #[error("reader is closed")]
    ReaderClosed,
    #[error("filter on column {column}: {source}")]
    Filter {
        column: usize,
        #[source]
        source: FilterError,
    },
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),
    #[error(transparent)]
    Coercion(#[from] CoercionError),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for ReaderError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Coercion(err) => ReaderError::Coercion(err),
            err => ReaderError::Storage(err),
        }
    }
}

/// Errors raised while constructing filters or binding them to a column.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("filter operand '{name}' must not be null")]
    NullOperand { name: &'static str },
    #[error("string filter operand must be text, got {operand_type}")]
    NonStringOperand { operand_type: &'static str },
    #[error("operand {operand} ({operand_type}) is not compatible with {column_type} column")]
    IncompatibleOperand {
        column_type: ColumnType,
        operand: String,
        operand_type: &'static str,
    },
    #[error("string filters require a String column, got {column_type}")]
    StringFilterOnNonString { column_type: ColumnType },
}

/// Errors raised when a cell cannot be produced as the requested type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CoercionError {
    #[error("cannot convert {column_type} column to {requested}")]
    Unsupported {
        column_type: ColumnType,
        requested: TypeTag,
    },
    #[error("value {value} does not fit in {requested}")]
    OutOfRange { value: String, requested: TypeTag },
    #[error("value {value} cannot be represented as a timestamp")]
    InvalidTimestamp { value: String },
}

/// Errors raised by storage engines.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parquet error: {0}")]
    Parquet(#[from] ParquetError),
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("column '{column}' has unsupported data type {data_type:?}")]
    UnsupportedDataType { column: String, data_type: DataType },
    #[error("worksheet {index} not found (worksheet count {count})")]
    WorksheetOutOfRange { index: usize, count: usize },
    #[error("row {index} not found (row count {count})")]
    RowOutOfRange { index: usize, count: usize },
    #[error("column {index} not found (column count {count})")]
    ColumnOutOfRange { index: usize, count: usize },
    #[error("row window exceeds the addressable row range: {rows}")]
    TooManyRows { rows: usize },
    #[error(transparent)]
    Coercion(#[from] CoercionError),
}
