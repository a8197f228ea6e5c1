//! # Rust Leveled Log
//!
//! A leveled, pluggable logging facility with caller-location reporting.
//!
//! ## Features
//!
//! - **Leveled**: seven ordered severities with a cheap, lock-free rejection path
//! - **Call sites**: every line carries the file and line of the code that logged
//! - **Two outputs**: a byte stream for formatted lines and a structured record sink
//! - **Pluggable**: injectable formatter, caller resolver and sinks
//! - **Default logger**: free functions and macros over a replaceable shared instance
//!
//! ## Example
//!
//! ```
//! use rust_leveled_log::prelude::*;
//! use std::sync::Arc;
//!
//! let memory = Arc::new(MemorySink::new());
//! let logger = Logger::builder()
//!     .level(Severity::Info)
//!     .output(std::io::stdout())
//!     .record_sink(Arc::clone(&memory))
//!     .build();
//!
//! logger.debug("below the threshold");
//! logger.info("request served");
//!
//! assert_eq!(memory.messages(), vec!["request served"]);
//! ```

pub mod core;
pub mod facade;
pub mod macros;
pub mod sinks;

pub mod prelude {
    #[cfg(feature = "file")]
    pub use crate::sinks::{RecordFormat, RotatingFileSink};
    pub use crate::core::{
        CallSite, CallerResolver, FormatSettings, Frame, Logger, LoggerBuilder, LoggerConfig,
        LoggerError, LoggerMetrics, Record, RecordSink, RecordSnapshot, Result, Severity,
        SourceRoots, DEFAULT_DEPTH,
    };
    pub use crate::sinks::{AsyncSink, FanoutSink, MemorySink, MultiWriter};
}

pub use crate::core::{
    default_format, fan_out, format_line, format_timestamp, format_with_caller, CallSite,
    CallerResolver, FanoutSink, FormatSettings, Formatter, Frame, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, LoggerMetrics, Record, RecordSink, RecordSnapshot, Result,
    Severity, SourceRoots, TrackedCallerResolver, DEFAULT_DEPTH, DEFAULT_TIME_LAYOUT,
    FATAL_EXIT_CODE, UNKNOWN_FILE,
};
#[cfg(feature = "console")]
pub use crate::core::colored_format;
pub use facade::{
    add_source_root, default_logger, set_build_dir, set_default_logger, set_formatter,
    set_level, set_output, set_record_sink, set_time_layout,
};
pub use sinks::{AsyncSink, MemorySink, MultiWriter, DEFAULT_SHUTDOWN_TIMEOUT};
#[cfg(feature = "file")]
pub use sinks::{RecordFormat, RotatingFileSink};
