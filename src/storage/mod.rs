//! Storage engines the reader forwards validated requests to.

mod batch;
mod parquet_file;

use std::collections::BTreeMap;

pub use batch::BatchStorage;
pub use parquet_file::{FORMAT_METADATA_KEY, WORKSHEET_METADATA_KEY};

use crate::{
    error::StorageError,
    format::DisplayFormat,
    query::ColumnAttributes,
    types::{ColumnType, DesiredType},
    value::Fetched,
};

/// Name, type and display format of one worksheet column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: ColumnType,
    pub display_format: Option<DisplayFormat>,
}

/// Shape of one worksheet.
#[derive(Clone, Debug, PartialEq)]
pub struct WorksheetInfo {
    pub name: String,
    pub row_count: usize,
    pub columns: Vec<ColumnInfo>,
}

/// Cells of one emitted row, read on demand.
pub trait RowSource {
    fn value_as(&self, column: usize, desired: DesiredType) -> Result<Fetched, StorageError>;
}

/// Row callback used by [`Storage::stream_rows`].
pub type RowCallback<'a> = dyn FnMut(usize, &dyn RowSource) -> Result<(), StorageError> + 'a;

/// Engine that owns the worksheet data and evaluates bound predicates.
///
/// Indices handed to an engine have already been validated by the reader;
/// engines still report out-of-range requests as errors instead of panicking.
pub trait Storage {
    fn worksheet_count(&self) -> usize;

    fn open_worksheet(&self, index: usize) -> Result<WorksheetInfo, StorageError>;

    /// Reads one cell coerced to `desired`.
    fn value_as(
        &self,
        worksheet: usize,
        row: usize,
        column: usize,
        desired: DesiredType,
    ) -> Result<Fetched, StorageError>;

    /// Calls `on_row` once for every row in `start..=end` that satisfies the
    /// predicate of every column in `columns`, in ascending row order.
    fn stream_rows(
        &self,
        worksheet: usize,
        start: usize,
        end: usize,
        columns: &BTreeMap<usize, ColumnAttributes>,
        on_row: &mut RowCallback<'_>,
    ) -> Result<(), StorageError>;
}
