//! Internal logging helpers for structured reader events.

use std::sync::Arc;

/// Single logging target for the reader.
pub(crate) const LOG_TARGET: &str = "bigread";

/// Optional common key/value fields appended to all logs of one reader.
#[derive(Clone, Debug, Default)]
pub(crate) struct LogContext {
    common_kv: Option<Arc<str>>,
}

impl LogContext {
    /// Build a context that appends the provided key/value pairs.
    pub(crate) fn new(common_kv: impl Into<Arc<str>>) -> Self {
        let common_kv: Arc<str> = common_kv.into();
        Self {
            common_kv: (!common_kv.is_empty()).then_some(common_kv),
        }
    }

    pub(crate) fn common_kv(&self) -> Option<&str> {
        self.common_kv.as_deref()
    }
}

macro_rules! bigread_log {
    ($level:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!(target: crate::logging::LOG_TARGET, $level) {
            log::log!(
                target: crate::logging::LOG_TARGET,
                $level,
                "event={} {}",
                $event,
                format_args!($fmt $(, $args)*)
            );
        }
    }};
    ($level:expr, ctx: $ctx:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!(target: crate::logging::LOG_TARGET, $level) {
            if let Some(common_kv) = $ctx.common_kv() {
                log::log!(
                    target: crate::logging::LOG_TARGET,
                    $level,
                    "event={} {} {}",
                    $event,
                    common_kv,
                    format_args!($fmt $(, $args)*)
                );
            } else {
                log::log!(
                    target: crate::logging::LOG_TARGET,
                    $level,
                    "event={} {}",
                    $event,
                    format_args!($fmt $(, $args)*)
                );
            }
        }
    }};
}

pub(crate) use bigread_log;
