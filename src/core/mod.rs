//! Core logger types and traits

pub mod caller;
pub mod config;
pub mod error;
pub mod formatter;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod severity;
pub mod sink;

pub use caller::{CallSite, CallerResolver, Frame, SourceRoots, TrackedCallerResolver, UNKNOWN_FILE};
pub use config::LoggerConfig;
pub use error::{LoggerError, Result};
#[cfg(feature = "console")]
pub use formatter::colored_format;
pub use formatter::{
    default_format, format_line, format_timestamp, format_with_caller, FormatSettings, Formatter,
    DEFAULT_TIME_LAYOUT,
};
pub use logger::{ByteSink, Logger, LoggerBuilder, DEFAULT_DEPTH, FATAL_EXIT_CODE};
pub use metrics::LoggerMetrics;
pub use record::{Record, RecordSnapshot};
pub use severity::Severity;
pub use sink::{fan_out, FanoutSink, RecordSink};
