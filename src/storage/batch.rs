//! In-memory engine over a single Arrow record batch.

use std::collections::BTreeMap;

use arrow::{
    array::{Array, AsArray, RecordBatch},
    datatypes::{
        DataType, Date32Type, Float64Type, Int64Type, Time64MicrosecondType, TimeUnit,
        TimestampMillisecondType,
    },
};
use bigread_predicate::{
    BitmapRowSet, Predicate, PredicateNode, PredicateVisitor, RowId, RowSet, ScalarValue,
};

use super::{ColumnInfo, RowCallback, RowSource, Storage, WorksheetInfo};
use crate::{
    error::{CoercionError, StorageError},
    format::DisplayFormat,
    query::ColumnAttributes,
    types::{ColumnType, DesiredType},
    value::{coerce, Fetched},
};

/// Worksheet held as one Arrow [`RecordBatch`].
#[derive(Debug)]
pub struct BatchStorage {
    info: WorksheetInfo,
    batch: RecordBatch,
}

impl BatchStorage {
    /// Wraps `batch` as the worksheet `name`.
    ///
    /// Display formats are read from each field's `bigread.format` metadata.
    /// Fails if any column has an Arrow type without a worksheet counterpart.
    pub fn try_new(name: impl Into<String>, batch: RecordBatch) -> Result<Self, StorageError> {
        let columns = batch
            .schema()
            .fields()
            .iter()
            .map(|field| {
                let column_type = column_type_of(field.data_type()).ok_or_else(|| {
                    StorageError::UnsupportedDataType {
                        column: field.name().clone(),
                        data_type: field.data_type().clone(),
                    }
                })?;
                let display_format = field
                    .metadata()
                    .get(super::FORMAT_METADATA_KEY)
                    .map(|pattern| DisplayFormat::new(pattern.as_str()));
                Ok(ColumnInfo {
                    name: field.name().clone(),
                    column_type,
                    display_format,
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;
        let info = WorksheetInfo {
            name: name.into(),
            row_count: batch.num_rows(),
            columns,
        };
        Ok(Self { info, batch })
    }

    fn check_worksheet(&self, index: usize) -> Result<(), StorageError> {
        if index == 0 {
            Ok(())
        } else {
            Err(StorageError::WorksheetOutOfRange { index, count: 1 })
        }
    }

    fn check_row(&self, index: usize) -> Result<(), StorageError> {
        if index < self.info.row_count {
            Ok(())
        } else {
            Err(StorageError::RowOutOfRange {
                index,
                count: self.info.row_count,
            })
        }
    }

    fn column(&self, index: usize) -> Result<(&ColumnInfo, &dyn Array), StorageError> {
        match self.info.columns.get(index) {
            Some(info) => Ok((info, self.batch.column(index).as_ref())),
            None => Err(StorageError::ColumnOutOfRange {
                index,
                count: self.info.columns.len(),
            }),
        }
    }

    fn read(&self, row: usize, column: usize, desired: DesiredType) -> Result<Fetched, StorageError> {
        let (info, array) = self.column(column)?;
        let cell = scalar_at(&info.name, array, row)?;
        Ok(coerce(
            info.column_type,
            info.display_format.as_ref(),
            &cell,
            desired,
        )?)
    }
}

impl Storage for BatchStorage {
    fn worksheet_count(&self) -> usize {
        1
    }

    fn open_worksheet(&self, index: usize) -> Result<WorksheetInfo, StorageError> {
        self.check_worksheet(index)?;
        Ok(self.info.clone())
    }

    fn value_as(
        &self,
        worksheet: usize,
        row: usize,
        column: usize,
        desired: DesiredType,
    ) -> Result<Fetched, StorageError> {
        self.check_worksheet(worksheet)?;
        self.check_row(row)?;
        self.read(row, column, desired)
    }

    fn stream_rows(
        &self,
        worksheet: usize,
        start: usize,
        end: usize,
        columns: &BTreeMap<usize, ColumnAttributes>,
        on_row: &mut RowCallback<'_>,
    ) -> Result<(), StorageError> {
        self.check_worksheet(worksheet)?;
        self.check_row(end)?;
        let rows = end + 1;
        let window = RowId::try_from(start)
            .ok()
            .zip(RowId::try_from(rows).ok())
            .map(|(first, last)| first..last)
            .ok_or(StorageError::TooManyRows { rows })?;

        let mut selected = BitmapRowSet::from_range(window.clone());
        for (&index, attributes) in columns {
            let (info, array) = self.column(index)?;
            if let Some(predicate) = &attributes.predicate {
                let mut visitor = WindowVisitor {
                    column: &info.name,
                    array,
                    window: window.clone(),
                };
                selected = selected.intersect(&predicate.accept(&mut visitor)?);
            }
        }

        for row in selected.iter() {
            let row = BatchRow {
                storage: self,
                row: row as usize,
            };
            on_row(row.row, &row)?;
        }
        Ok(())
    }
}

struct BatchRow<'a> {
    storage: &'a BatchStorage,
    row: usize,
}

impl RowSource for BatchRow<'_> {
    fn value_as(&self, column: usize, desired: DesiredType) -> Result<Fetched, StorageError> {
        self.storage.read(self.row, column, desired)
    }
}

/// Evaluates a predicate over the rows of one column inside a window.
struct WindowVisitor<'a> {
    column: &'a str,
    array: &'a dyn Array,
    window: std::ops::Range<RowId>,
}

impl PredicateVisitor for WindowVisitor<'_> {
    type Error = StorageError;
    type Value = BitmapRowSet;

    fn visit_leaf(&mut self, leaf: &PredicateNode) -> Result<BitmapRowSet, StorageError> {
        let mut rows = BitmapRowSet::new();
        for row in self.window.clone() {
            if leaf.matches(&scalar_at(self.column, self.array, row as usize)?) {
                rows.insert(row);
            }
        }
        Ok(rows)
    }

    fn combine_and(
        &mut self,
        _: &Predicate,
        children: Vec<BitmapRowSet>,
    ) -> Result<BitmapRowSet, StorageError> {
        Ok(children
            .iter()
            .fold(BitmapRowSet::from_range(self.window.clone()), |acc, rows| {
                acc.intersect(rows)
            }))
    }

    fn combine_or(
        &mut self,
        _: &Predicate,
        children: Vec<BitmapRowSet>,
    ) -> Result<BitmapRowSet, StorageError> {
        Ok(children
            .iter()
            .fold(BitmapRowSet::new(), |acc, rows| acc.union(rows)))
    }
}

fn column_type_of(data_type: &DataType) -> Option<ColumnType> {
    Some(match data_type {
        DataType::Boolean => ColumnType::Boolean,
        DataType::Date32 => ColumnType::Date,
        DataType::Timestamp(TimeUnit::Millisecond, None) => ColumnType::DateTime,
        DataType::Float64 => ColumnType::Double,
        DataType::Int64 => ColumnType::Long,
        DataType::Utf8 => ColumnType::String,
        DataType::Time64(TimeUnit::Microsecond) => ColumnType::Time,
        _ => return None,
    })
}

fn scalar_at(column: &str, array: &dyn Array, row: usize) -> Result<ScalarValue, StorageError> {
    if array.is_null(row) {
        return Ok(ScalarValue::Null);
    }
    let invalid = |value: String| StorageError::Coercion(CoercionError::InvalidTimestamp { value });
    Ok(match array.data_type() {
        DataType::Boolean => ScalarValue::Boolean(array.as_boolean().value(row)),
        DataType::Date32 => {
            let dates = array.as_primitive::<Date32Type>();
            dates
                .value_as_date(row)
                .map(ScalarValue::Date)
                .ok_or_else(|| invalid(dates.value(row).to_string()))?
        }
        DataType::Timestamp(TimeUnit::Millisecond, None) => {
            let timestamps = array.as_primitive::<TimestampMillisecondType>();
            timestamps
                .value_as_datetime(row)
                .map(ScalarValue::Timestamp)
                .ok_or_else(|| invalid(timestamps.value(row).to_string()))?
        }
        DataType::Float64 => ScalarValue::Float64(array.as_primitive::<Float64Type>().value(row)),
        DataType::Int64 => ScalarValue::Int64(array.as_primitive::<Int64Type>().value(row)),
        DataType::Utf8 => ScalarValue::Utf8(array.as_string::<i32>().value(row).to_owned()),
        DataType::Time64(TimeUnit::Microsecond) => {
            let times = array.as_primitive::<Time64MicrosecondType>();
            times
                .value_as_time(row)
                .map(ScalarValue::Time)
                .ok_or_else(|| invalid(times.value(row).to_string()))?
        }
        other => {
            return Err(StorageError::UnsupportedDataType {
                column: column.to_owned(),
                data_type: other.clone(),
            })
        }
    })
}
