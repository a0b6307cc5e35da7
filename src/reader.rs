//! The reader handle: bounds checks, filter binding and coerced reads.

use std::{collections::BTreeMap, fs, path::Path};

use crate::{
    error::{Dimension, ReaderError},
    filter::{bind, translate},
    logging::bigread_log,
    option::ReaderOptions,
    query::{ColumnAttributes, QueryColumn},
    storage::{BatchStorage, ColumnInfo, RowSource, Storage, WorksheetInfo},
    types::{ColumnType, DesiredType},
    value::Fetched,
};

/// Open handle on one worksheet file.
///
/// Reads take `&self`; [`Reader::close`] releases the storage and every later
/// call fails with [`ReaderError::ReaderClosed`].
#[derive(Debug)]
pub struct Reader<S: Storage = BatchStorage> {
    storage: Option<S>,
    worksheets: Vec<WorksheetInfo>,
    options: ReaderOptions,
}

impl Reader<BatchStorage> {
    /// Opens the Parquet worksheet file at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReaderError> {
        Self::open_with_options(path, ReaderOptions::default())
    }

    pub fn open_with_options(
        path: impl AsRef<Path>,
        options: ReaderOptions,
    ) -> Result<Self, ReaderError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ReaderError::MissingArgument { name: "path" });
        }
        match fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => {
                return Err(ReaderError::InvalidArgument {
                    name: "path",
                    reason: format!("{} is a directory", path.display()),
                })
            }
            Ok(_) => {}
            Err(_) => {
                return Err(ReaderError::InvalidArgument {
                    name: "path",
                    reason: format!("{} does not exist", path.display()),
                })
            }
        }

        let storage = BatchStorage::from_parquet(path, options.batch_size)?;
        bigread_log!(
            log::Level::Debug,
            ctx: options.log_context,
            "worksheet_loaded",
            "path={} batch_size={}",
            path.display(),
            options.batch_size,
        );
        Self::from_storage(storage, options)
    }
}

impl<S: Storage> Reader<S> {
    /// Wraps an already opened storage engine.
    pub fn from_storage(storage: S, options: ReaderOptions) -> Result<Self, ReaderError> {
        let worksheets = (0..storage.worksheet_count())
            .map(|index| storage.open_worksheet(index))
            .collect::<Result<Vec<_>, _>>()?;
        bigread_log!(
            log::Level::Info,
            ctx: options.log_context,
            "reader_opened",
            "worksheets={} rows={}",
            worksheets.len(),
            worksheets.first().map_or(0, |sheet| sheet.row_count),
        );
        Ok(Self {
            storage: Some(storage),
            worksheets,
            options,
        })
    }

    /// Releases the storage. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.storage.take().is_some() {
            bigread_log!(log::Level::Info, ctx: self.options.log_context, "reader_closed", "");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.storage.is_none()
    }

    pub fn worksheet_count(&self) -> Result<usize, ReaderError> {
        self.storage()?;
        Ok(self.worksheets.len())
    }

    pub fn worksheet_name(&self, worksheet: usize) -> Result<&str, ReaderError> {
        Ok(&self.worksheet(worksheet)?.name)
    }

    pub fn row_count(&self, worksheet: usize) -> Result<usize, ReaderError> {
        Ok(self.worksheet(worksheet)?.row_count)
    }

    pub fn column_count(&self, worksheet: usize) -> Result<usize, ReaderError> {
        Ok(self.worksheet(worksheet)?.columns.len())
    }

    pub fn column_name(&self, worksheet: usize, column: usize) -> Result<&str, ReaderError> {
        Ok(&self.column(worksheet, column)?.name)
    }

    pub fn column_type(&self, worksheet: usize, column: usize) -> Result<ColumnType, ReaderError> {
        Ok(self.column(worksheet, column)?.column_type)
    }

    /// Reads one cell as `desired`.
    ///
    /// Indices are checked against the worksheet shape and the requested type
    /// against the column's coercion matrix before storage is touched.
    pub fn value(
        &self,
        worksheet: usize,
        row: usize,
        column: usize,
        desired: impl Into<DesiredType>,
    ) -> Result<Fetched, ReaderError> {
        let desired = desired.into();
        let sheet = self.worksheet(worksheet)?;
        check_index(Dimension::Row, row, sheet.row_count)?;
        let info = self.column(worksheet, column)?;
        info.column_type.check_coercion(desired.tag)?;

        let fetched = self.storage()?.value_as(worksheet, row, column, desired)?;
        bigread_log!(
            log::Level::Trace,
            ctx: self.options.log_context,
            "value_read",
            "worksheet={} row={} column={} desired={} empty={}",
            worksheet,
            row,
            column,
            desired,
            fetched.is_empty(),
        );
        Ok(fetched)
    }

    /// Streams the rows of `start..=end` whose cells satisfy every column
    /// filter in `columns`, in ascending order.
    ///
    /// `callback` receives the row index and a [`RowValues`] resolving the
    /// projected columns on demand.
    pub fn row_values<F>(
        &self,
        worksheet: usize,
        start: usize,
        end: usize,
        columns: &BTreeMap<usize, QueryColumn>,
        mut callback: F,
    ) -> Result<(), ReaderError>
    where
        F: FnMut(usize, &RowValues<'_>),
    {
        let sheet = self.worksheet(worksheet)?;
        if end >= sheet.row_count {
            return Err(ReaderError::EndRowOutOfRange {
                end,
                row_count: sheet.row_count,
            });
        }
        if start > end {
            return Err(ReaderError::InvertedRowRange { start, end });
        }
        if columns.is_empty() {
            return Err(ReaderError::EmptyColumnSet);
        }
        let attributes = self.bind_columns(sheet, columns)?;

        bigread_log!(
            log::Level::Debug,
            ctx: self.options.log_context,
            "scan_started",
            "worksheet={} start={} end={} columns={}",
            worksheet,
            start,
            end,
            attributes.len(),
        );
        let mut emitted = 0usize;
        self.storage()?.stream_rows(
            worksheet,
            start,
            end,
            &attributes,
            &mut |row, source| {
                let values = RowValues {
                    row,
                    source,
                    columns: &attributes,
                };
                callback(row, &values);
                emitted += 1;
                Ok(())
            },
        )?;
        bigread_log!(
            log::Level::Debug,
            ctx: self.options.log_context,
            "scan_finished",
            "worksheet={} rows_scanned={} rows_emitted={}",
            worksheet,
            end - start + 1,
            emitted,
        );
        Ok(())
    }

    fn bind_columns(
        &self,
        sheet: &WorksheetInfo,
        columns: &BTreeMap<usize, QueryColumn>,
    ) -> Result<BTreeMap<usize, ColumnAttributes>, ReaderError> {
        let mut attributes = BTreeMap::new();
        for (&index, query) in columns {
            let info = sheet
                .columns
                .get(index)
                .ok_or(ReaderError::IndexOutOfRange {
                    dimension: Dimension::Column,
                    index,
                    bound: sheet.columns.len(),
                })?;
            let predicate = match query.filter() {
                Some(filter) => {
                    let predicate = bind(translate(filter), info.column_type)
                        .map_err(|source| ReaderError::Filter {
                            column: index,
                            source,
                        })?;
                    bigread_log!(
                        log::Level::Debug,
                        ctx: self.options.log_context,
                        "filter_bound",
                        "column={} type={} predicate={}",
                        index,
                        info.column_type,
                        predicate,
                    );
                    Some(predicate)
                }
                None => None,
            };
            if query.project() {
                info.column_type.check_coercion(query.desired().tag)?;
            }
            attributes.insert(
                index,
                ColumnAttributes {
                    project: query.project(),
                    desired: query.desired(),
                    predicate,
                },
            );
        }
        Ok(attributes)
    }

    fn storage(&self) -> Result<&S, ReaderError> {
        self.storage.as_ref().ok_or(ReaderError::ReaderClosed)
    }

    fn worksheet(&self, index: usize) -> Result<&WorksheetInfo, ReaderError> {
        self.storage()?;
        self.worksheets
            .get(index)
            .ok_or(ReaderError::IndexOutOfRange {
                dimension: Dimension::Worksheet,
                index,
                bound: self.worksheets.len(),
            })
    }

    fn column(&self, worksheet: usize, column: usize) -> Result<&ColumnInfo, ReaderError> {
        let sheet = self.worksheet(worksheet)?;
        check_index(Dimension::Column, column, sheet.columns.len())?;
        Ok(&sheet.columns[column])
    }
}

fn check_index(dimension: Dimension, index: usize, bound: usize) -> Result<(), ReaderError> {
    if index < bound {
        Ok(())
    } else {
        Err(ReaderError::IndexOutOfRange {
            dimension,
            index,
            bound,
        })
    }
}

/// Lazy accessor for the projected cells of one emitted row.
pub struct RowValues<'a> {
    row: usize,
    source: &'a dyn RowSource,
    columns: &'a BTreeMap<usize, ColumnAttributes>,
}

impl RowValues<'_> {
    pub fn row(&self) -> usize {
        self.row
    }

    /// Reads `column` as the type its query requested.
    pub fn get(&self, column: usize) -> Result<Fetched, ReaderError> {
        match self.columns.get(&column) {
            Some(attributes) if attributes.project => {
                Ok(self.source.value_as(column, attributes.desired)?)
            }
            _ => Err(ReaderError::ColumnNotProjected { column }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{Int64Array, RecordBatch, StringArray},
        datatypes::{DataType, Field, Schema},
    };

    use super::*;
    use crate::{
        error::{CoercionError, FilterError},
        filter::Filter,
        types::TypeTag,
        value::{Empty, Value},
    };

    fn reader(qty: Vec<Option<i64>>) -> Reader {
        let names: Vec<Option<String>> = (0..qty.len()).map(|i| Some(format!("r{i}"))).collect();
        let schema = Arc::new(Schema::new(vec![
            Field::new("qty", DataType::Int64, true),
            Field::new("name", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(qty)),
                Arc::new(StringArray::from(names)),
            ],
        )
        .expect("batch");
        let storage = BatchStorage::try_new("Sheet", batch).expect("storage");
        Reader::from_storage(storage, ReaderOptions::default()).expect("reader")
    }

    fn collect(
        reader: &Reader,
        start: usize,
        end: usize,
        columns: &BTreeMap<usize, QueryColumn>,
        read: usize,
    ) -> Result<Vec<(usize, Fetched)>, ReaderError> {
        let mut rows = Vec::new();
        reader.row_values(0, start, end, columns, |row, values| {
            rows.push((row, values.get(read).expect("projected column")));
        })?;
        Ok(rows)
    }

    #[test]
    fn greater_than_skips_nulls() {
        let reader = reader(vec![Some(5), None, Some(15)]);
        let columns = BTreeMap::from([(
            0,
            QueryColumn::projected_with_filter(
                TypeTag::Int64,
                Filter::greater_than(10i64).expect("valid filter"),
            )
            .expect("query"),
        )]);
        let rows = collect(&reader, 0, 2, &columns, 0).expect("scan");
        assert_eq!(rows, vec![(2, Fetched::Value(Value::Int64(15)))]);
    }

    #[test]
    fn conjunction_over_one_column() {
        let reader = reader(vec![None, Some(5), Some(4)]);
        let filter = Filter::and([
            Filter::is_not_null(),
            Filter::greater_than_or_equal(5i64).expect("valid filter"),
        ]);
        let columns = BTreeMap::from([(
            0,
            QueryColumn::projected_with_filter(TypeTag::Int64, filter).expect("query"),
        )]);
        let rows = collect(&reader, 0, 2, &columns, 0).expect("scan");
        assert_eq!(rows, vec![(1, Fetched::Value(Value::Int64(5)))]);
    }

    #[test]
    fn filter_only_columns_restrict_rows() {
        let reader = reader(vec![Some(1), Some(2), Some(3)]);
        let columns = BTreeMap::from([
            (
                0,
                QueryColumn::filtered(Filter::not_equal(2i64).expect("valid filter")),
            ),
            (1, QueryColumn::projected(TypeTag::String).expect("query")),
        ]);
        let rows = collect(&reader, 0, 2, &columns, 1).expect("scan");
        let rows: Vec<usize> = rows.into_iter().map(|(row, _)| row).collect();
        assert_eq!(rows, vec![0, 2]);

        reader
            .row_values(0, 0, 0, &columns, |_, values| {
                assert!(matches!(
                    values.get(0),
                    Err(ReaderError::ColumnNotProjected { column: 0 })
                ));
                assert!(matches!(
                    values.get(5),
                    Err(ReaderError::ColumnNotProjected { column: 5 })
                ));
            })
            .expect("scan");
    }

    #[test]
    fn bulk_bounds_are_validated_in_order() {
        let reader = reader(vec![Some(1), Some(2), Some(3)]);
        let columns = BTreeMap::from([(0, QueryColumn::projected(TypeTag::Int64).expect("query"))]);
        let noop = |_: usize, _: &RowValues<'_>| {};

        assert!(matches!(
            reader.row_values(1, 0, 1, &columns, noop),
            Err(ReaderError::IndexOutOfRange {
                dimension: Dimension::Worksheet,
                index: 1,
                bound: 1
            })
        ));
        assert!(matches!(
            reader.row_values(0, 0, 3, &columns, noop),
            Err(ReaderError::EndRowOutOfRange {
                end: 3,
                row_count: 3
            })
        ));
        assert!(matches!(
            reader.row_values(0, 2, 1, &columns, noop),
            Err(ReaderError::InvertedRowRange { start: 2, end: 1 })
        ));
        assert!(matches!(
            reader.row_values(0, 0, 1, &BTreeMap::new(), noop),
            Err(ReaderError::EmptyColumnSet)
        ));
        let wide = BTreeMap::from([(2, QueryColumn::projected(TypeTag::Int64).expect("query"))]);
        assert!(matches!(
            reader.row_values(0, 0, 1, &wide, noop),
            Err(ReaderError::IndexOutOfRange {
                dimension: Dimension::Column,
                index: 2,
                bound: 2
            })
        ));
    }

    #[test]
    fn bulk_requests_are_checked_before_streaming() {
        let reader = reader(vec![Some(1)]);
        let bad_filter = BTreeMap::from([(
            0,
            QueryColumn::filtered(Filter::contains("x", true).expect("valid filter")),
        )]);
        assert!(matches!(
            reader.row_values(0, 0, 0, &bad_filter, |_, _| panic!("no rows expected")),
            Err(ReaderError::Filter {
                column: 0,
                source: FilterError::StringFilterOnNonString { .. }
            })
        ));

        let bad_type = BTreeMap::from([(1, QueryColumn::projected(TypeTag::Int32).expect("query"))]);
        assert!(matches!(
            reader.row_values(0, 0, 0, &bad_type, |_, _| panic!("no rows expected")),
            Err(ReaderError::Coercion(CoercionError::Unsupported {
                column_type: ColumnType::String,
                requested: TypeTag::Int32
            }))
        ));
    }

    #[test]
    fn point_reads_follow_the_optional_flag() {
        let reader = reader(vec![Some(7), None]);
        assert_eq!(
            reader.value(0, 0, 0, TypeTag::Int16).expect("read"),
            Fetched::Value(Value::Int16(7))
        );
        assert_eq!(
            reader.value(0, 1, 0, TypeTag::Int64).expect("read"),
            Fetched::Empty(Empty::Null)
        );
        assert_eq!(
            reader
                .value(0, 1, 0, DesiredType::optional(TypeTag::Int64))
                .expect("read"),
            Fetched::Empty(Empty::Absent)
        );
        assert!(matches!(
            reader.value(0, 2, 0, TypeTag::Int64),
            Err(ReaderError::IndexOutOfRange {
                dimension: Dimension::Row,
                index: 2,
                bound: 2
            })
        ));
        assert!(matches!(
            reader.value(0, 0, 1, TypeTag::Int64),
            Err(ReaderError::Coercion(CoercionError::Unsupported { .. }))
        ));
    }

    #[test]
    fn metadata_reflects_the_worksheet() {
        let reader = reader(vec![Some(1), Some(2)]);
        assert_eq!(reader.worksheet_count().expect("count"), 1);
        assert_eq!(reader.worksheet_name(0).expect("name"), "Sheet");
        assert_eq!(reader.row_count(0).expect("rows"), 2);
        assert_eq!(reader.column_count(0).expect("columns"), 2);
        assert_eq!(reader.column_name(0, 1).expect("name"), "name");
        assert_eq!(reader.column_type(0, 0).expect("type"), ColumnType::Long);
        assert!(matches!(
            reader.column_name(0, 2),
            Err(ReaderError::IndexOutOfRange {
                dimension: Dimension::Column,
                ..
            })
        ));
    }

    #[test]
    fn closed_readers_reject_every_call() {
        let mut reader = reader(vec![Some(1)]);
        reader.close();
        reader.close();
        assert!(reader.is_closed());
        assert!(matches!(reader.worksheet_count(), Err(ReaderError::ReaderClosed)));
        assert!(matches!(reader.row_count(0), Err(ReaderError::ReaderClosed)));
        assert!(matches!(
            reader.value(0, 0, 0, TypeTag::Int64),
            Err(ReaderError::ReaderClosed)
        ));
        let columns = BTreeMap::from([(0, QueryColumn::projected(TypeTag::Int64).expect("query"))]);
        assert!(matches!(
            reader.row_values(0, 0, 0, &columns, |_, _| {}),
            Err(ReaderError::ReaderClosed)
        ));
    }

    #[test]
    fn open_rejects_bad_paths() {
        assert!(matches!(
            Reader::open(""),
            Err(ReaderError::MissingArgument { name: "path" })
        ));
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            Reader::open(dir.path()),
            Err(ReaderError::InvalidArgument { name: "path", .. })
        ));
        assert!(matches!(
            Reader::open(dir.path().join("missing.parquet")),
            Err(ReaderError::InvalidArgument { name: "path", .. })
        ));
    }
}
