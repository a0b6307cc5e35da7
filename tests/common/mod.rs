//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::{collections::HashMap, fs::File, path::PathBuf, sync::Arc};

use arrow::{
    array::{
        ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, RecordBatch, StringArray,
        Time64MicrosecondArray, TimestampMillisecondArray,
    },
    datatypes::{DataType, Field, Schema, TimeUnit},
};
use bigread::storage::{FORMAT_METADATA_KEY, WORKSHEET_METADATA_KEY};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};
use tempfile::TempDir;

/// Routes reader logs to the test output when `RUST_LOG` is set.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Writes `batch` as a Parquet worksheet inside `dir`, in row groups of two rows.
pub fn write_worksheet(dir: &TempDir, file_name: &str, batch: &RecordBatch) -> PathBuf {
    let path = dir.path().join(file_name);
    let props = WriterProperties::builder()
        .set_max_row_group_size(2)
        .build();
    let file = File::create(&path).expect("worksheet file should be creatable");
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), Some(props)).expect("parquet writer");
    writer.write(batch).expect("write worksheet batch");
    writer.close().expect("close worksheet file");
    path
}

/// Single Long column named `qty`.
pub fn long_column(values: Vec<Option<i64>>) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new("qty", DataType::Int64, true)]));
    RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values)) as ArrayRef])
        .expect("record batch")
}

/// Single Double column named `price`.
pub fn double_column(values: Vec<Option<f64>>) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new("price", DataType::Float64, true)]));
    RecordBatch::try_new(schema, vec![Arc::new(Float64Array::from(values)) as ArrayRef])
        .expect("record batch")
}

/// Three rows covering every column type; row 2 is empty in every column.
///
/// Columns: `flag`, `day`, `stamp`, `price`, `qty`, `label` (display format
/// `"SKU-"@`), `clock`.
pub fn every_type() -> RecordBatch {
    let label = Field::new("label", DataType::Utf8, true).with_metadata(HashMap::from([(
        FORMAT_METADATA_KEY.to_string(),
        "\"SKU-\"@".to_string(),
    )]));
    let schema = Arc::new(
        Schema::new(vec![
            Field::new("flag", DataType::Boolean, true),
            Field::new("day", DataType::Date32, true),
            Field::new(
                "stamp",
                DataType::Timestamp(TimeUnit::Millisecond, None),
                true,
            ),
            Field::new("price", DataType::Float64, true),
            Field::new("qty", DataType::Int64, true),
            label,
            Field::new("clock", DataType::Time64(TimeUnit::Microsecond), true),
        ])
        .with_metadata(HashMap::from([(
            WORKSHEET_METADATA_KEY.to_string(),
            "Inventory".to_string(),
        )])),
    );
    let columns: Vec<ArrayRef> = vec![
        Arc::new(BooleanArray::from(vec![Some(true), Some(false), None])),
        // 1970-01-02 and 2024-02-29
        Arc::new(Date32Array::from(vec![Some(1), Some(19_782), None])),
        // 1970-01-01T00:00:01.500 and 2024-02-29T12:30:00
        Arc::new(TimestampMillisecondArray::from(vec![
            Some(1_500),
            Some(1_709_209_800_000),
            None,
        ])),
        Arc::new(Float64Array::from(vec![Some(2.75), Some(-300.5), None])),
        Arc::new(Int64Array::from(vec![Some(42), Some(70_000), None])),
        Arc::new(StringArray::from(vec![Some("apple"), Some("Banana"), None])),
        // 08:30:00 and 23:59:59.250
        Arc::new(Time64MicrosecondArray::from(vec![
            Some(30_600_000_000),
            Some(86_399_250_000),
            None,
        ])),
    ];
    RecordBatch::try_new(schema, columns).expect("record batch")
}
