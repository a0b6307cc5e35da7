use std::{fs::File, path::Path};

use arrow::{compute::concat_batches, error::ArrowError, record_batch::RecordBatch};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::BatchStorage;
use crate::error::StorageError;

/// Field metadata key holding a column's display format.
pub const FORMAT_METADATA_KEY: &str = "bigread.format";
/// Schema metadata key holding the worksheet name.
pub const WORKSHEET_METADATA_KEY: &str = "bigread.worksheet";

const DEFAULT_WORKSHEET_NAME: &str = "Worksheet";

impl BatchStorage {
    /// Decodes the Parquet worksheet file at `path` into memory.
    pub fn from_parquet(path: &Path, batch_size: usize) -> Result<Self, StorageError> {
        let file = File::open(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?.with_batch_size(batch_size);
        let schema = builder.schema().clone();
        let name = schema
            .metadata()
            .get(WORKSHEET_METADATA_KEY)
            .cloned()
            .unwrap_or_else(|| DEFAULT_WORKSHEET_NAME.to_string());

        let batches = builder
            .build()?
            .collect::<Result<Vec<RecordBatch>, ArrowError>>()?;
        let batch = concat_batches(&schema, &batches)?;
        BatchStorage::try_new(name, batch)
    }
}
