use std::sync::Arc;

use crate::logging::LogContext;

/// Rows decoded per Parquet batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 8192;

#[derive(Debug, Clone)]
pub struct ReaderOptions {
    pub(crate) batch_size: usize,
    pub(crate) log_context: LogContext,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            batch_size: DEFAULT_BATCH_SIZE,
            log_context: LogContext::default(),
        }
    }
}

impl ReaderOptions {
    pub fn batch_size(self, batch_size: usize) -> Self {
        ReaderOptions {
            batch_size: batch_size.max(1),
            ..self
        }
    }

    /// Key/value pairs appended to every log event of the reader, e.g. `"tenant=a"`.
    pub fn log_context(self, common_kv: impl Into<Arc<str>>) -> Self {
        ReaderOptions {
            log_context: LogContext::new(common_kv),
            ..self
        }
    }
}
