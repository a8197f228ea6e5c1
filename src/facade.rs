//! Process-wide default logger
//!
//! Free functions forwarding to one shared [`Logger`], so call sites do not
//! have to pass a logger around. The shared instance is created lazily with
//! a `Debug` threshold, standard output and the default formatter.
//!
//! Each free function is one more forwarding layer between application code
//! and the logger, so the default instance records a depth of
//! [`DEFAULT_DEPTH`]` + 1`. Every function here is `#[track_caller]`; the
//! reported file and line are those of the code calling the facade.
//!
//! The instance can be swapped with [`set_default_logger`], typically to
//! capture output in tests.
//!
//! # Example
//!
//! ```
//! use rust_leveled_log::{facade, Severity};
//!
//! facade::set_level(Severity::Info);
//! facade::info("service started");
//! facade::debug("not shown");
//! ```

use crate::core::{Logger, Record, RecordSink, Severity, DEFAULT_DEPTH};
use crate::core::error::Result;
use parking_lot::RwLock;
use std::fmt;
use std::io::Write;
use std::sync::{Arc, OnceLock};

static DEFAULT_LOGGER: OnceLock<RwLock<Arc<Logger>>> = OnceLock::new();

fn slot() -> &'static RwLock<Arc<Logger>> {
    DEFAULT_LOGGER.get_or_init(|| RwLock::new(Arc::new(default_instance())))
}

fn default_instance() -> Logger {
    Logger::builder().depth(DEFAULT_DEPTH + 1).build()
}

/// The shared logger the free functions forward to
pub fn default_logger() -> Arc<Logger> {
    Arc::clone(&slot().read())
}

/// Replace the shared logger, returning the previous one.
///
/// Build the replacement with [`DEFAULT_DEPTH`]` + 1` to keep the recorded
/// depth consistent with the forwarding layer.
pub fn set_default_logger(logger: Logger) -> Arc<Logger> {
    std::mem::replace(&mut *slot().write(), Arc::new(logger))
}

/// Restore a freshly built default instance
pub fn reset_default_logger() -> Arc<Logger> {
    set_default_logger(default_instance())
}

#[track_caller]
pub fn debug(message: impl fmt::Display) {
    default_logger().debug(message);
}

#[track_caller]
pub fn info(message: impl fmt::Display) {
    default_logger().info(message);
}

#[track_caller]
pub fn warn(message: impl fmt::Display) {
    default_logger().warn(message);
}

#[track_caller]
pub fn error(message: impl fmt::Display) {
    default_logger().error(message);
}

/// See [`Logger::panic`]
#[track_caller]
pub fn panic(message: impl fmt::Display) {
    default_logger().panic(message);
}

/// See [`Logger::fatal`]
#[track_caller]
pub fn fatal(message: impl fmt::Display) {
    default_logger().fatal(message);
}

#[track_caller]
pub fn log(level: Severity, message: impl fmt::Display) {
    default_logger().log(level, message);
}

#[track_caller]
pub fn print(message: impl fmt::Display) {
    default_logger().print(message);
}

#[track_caller]
pub fn println(message: impl fmt::Display) {
    default_logger().println(message);
}

pub fn level() -> Severity {
    default_logger().level()
}

pub fn set_level(level: Severity) {
    default_logger().set_level(level);
}

/// Set the threshold from a numeric rank; aborts the process outside `0..=7`
#[track_caller]
pub fn set_level_value(value: i64) {
    default_logger().set_level_value(value);
}

pub fn enabled(level: Severity) -> bool {
    default_logger().enabled(level)
}

pub fn set_output<W: Write + Send + 'static>(output: W) {
    default_logger().set_output(output);
}

pub fn set_record_sink<S: RecordSink + 'static>(sink: S) {
    default_logger().set_record_sink(sink);
}

pub fn set_formatter<F>(formatter: F)
where
    F: Fn(&Record) -> String + Send + Sync + 'static,
{
    default_logger().set_formatter(formatter);
}

pub fn set_time_layout(layout: impl Into<String>) {
    default_logger().set_time_layout(layout);
}

pub fn set_full_path(full_path: bool) {
    default_logger().set_full_path(full_path);
}

/// Anchor full-path output on the parent of `dir` and enable full-path mode.
///
/// Only the default logger switches to full-path mode; loggers built later
/// with [`Logger::new`] still start in basename mode. Local crates report
/// workspace-relative paths, which an absolute root does not strip.
///
/// Returns the registered prefix, or `None` when `dir` has no parent.
pub fn set_build_dir(dir: impl AsRef<str>) -> Option<String> {
    let logger = default_logger();
    let prefix = logger.source_roots().add_build_dir(dir)?;
    logger.set_full_path(true);
    Some(prefix)
}

/// Register an additional source root and enable full-path mode
pub fn add_source_root(dir: impl AsRef<str>) -> bool {
    let logger = default_logger();
    let added = logger.source_roots().add(dir);
    logger.set_full_path(true);
    added
}

pub fn flush() -> Result<()> {
    default_logger().flush()
}
