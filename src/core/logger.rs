//! Main logger implementation
//!
//! Emission protocol for a leveled call:
//!
//! 1. compare the severity with the threshold and return on rejection
//!    (no allocation, no lock);
//! 2. take the output lock, stamp and build the [`Record`];
//! 3. format and write the line plus `\n` to the byte-stream output;
//! 4. release the lock;
//! 5. hand the record to the record sink outside the lock.
//!
//! Two threads racing a leveled call may therefore reach the record sink in
//! a different order than their lines reached the byte stream. Sink
//! delivery is synchronous: a slow sink stalls only the calling thread.

use super::{
    caller::{CallerResolver, SourceRoots},
    config::LoggerConfig,
    error::Result,
    formatter::{self, FormatSettings},
    metrics::LoggerMetrics,
    record::Record,
    severity::Severity,
    sink::{self, RecordSink},
};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::io::{self, Write};
use std::panic::{catch_unwind, AssertUnwindSafe, Location};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Stack depth recorded by a logger called directly by application code
pub const DEFAULT_DEPTH: usize = 2;

/// Exit status used by [`Logger::fatal`]
pub const FATAL_EXIT_CODE: i32 = -1;

/// Byte-stream output target
pub type ByteSink = Box<dyn Write + Send>;

pub(crate) struct LoggerShared {
    level: AtomicU8,
    depth: usize,
    output: Mutex<Option<ByteSink>>,
    sink: RwLock<Option<Arc<dyn RecordSink>>>,
    settings: RwLock<Arc<FormatSettings>>,
    metrics: LoggerMetrics,
}

impl LoggerShared {
    pub(crate) fn format_settings(&self) -> Arc<FormatSettings> {
        Arc::clone(&self.settings.read())
    }
}

impl Drop for LoggerShared {
    fn drop(&mut self) {
        if let Some(out) = self.output.get_mut().as_mut() {
            let _ = out.flush();
        }
        if let Some(sink) = self.sink.get_mut().as_ref() {
            let _ = catch_unwind(AssertUnwindSafe(|| sink.flush()));
        }
    }
}

/// Leveled logger with a byte-stream output and a structured record sink.
///
/// Every emission method is `#[track_caller]`, so the reported file and line
/// are those of the code calling the method. Wrappers around a `Logger` must
/// also be `#[track_caller]` to keep that property, and should construct
/// their logger with one extra unit of [`depth`](LoggerBuilder::depth) per
/// forwarding layer.
///
/// # Example
///
/// ```
/// use rust_leveled_log::{Logger, Severity};
///
/// let logger = Logger::builder()
///     .level(Severity::Warn)
///     .output(std::io::sink())
///     .build();
///
/// logger.info("dropped by the threshold");
/// logger.warn(format_args!("{} retries left", 2));
/// ```
pub struct Logger {
    shared: Arc<LoggerShared>,
}

impl Logger {
    /// Logger writing to standard output at `Debug` threshold.
    ///
    /// Starts in basename mode whether or not a build dir has been registered
    /// with the facade.
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn level(&self) -> Severity {
        let rank = self.shared.level.load(Ordering::Relaxed);
        Severity::try_from(i64::from(rank)).unwrap_or(Severity::None)
    }

    pub fn set_level(&self, level: Severity) {
        self.shared.level.store(level.rank(), Ordering::Relaxed);
    }

    /// Set the threshold from a numeric rank.
    ///
    /// A `value` outside `0..=7` prints a message naming the caller to
    /// stderr and aborts the process. It cannot be caught, whichever thread
    /// makes the call.
    #[track_caller]
    pub fn set_level_value(&self, value: i64) {
        match Severity::try_from(value) {
            Ok(level) => self.set_level(level),
            Err(e) => {
                let caller = Location::caller();
                eprintln!("log set_level error: {e} (at {}:{})", caller.file(), caller.line());
                let _ = self.flush();
                std::process::abort();
            }
        }
    }

    /// Whether a leveled call at `level` would be emitted
    #[inline]
    pub fn enabled(&self, level: Severity) -> bool {
        level != Severity::None && level.rank() >= self.shared.level.load(Ordering::Relaxed)
    }

    pub fn depth(&self) -> usize {
        self.shared.depth
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    pub fn set_output<W: Write + Send + 'static>(&self, output: W) {
        *self.shared.output.lock() = Some(Box::new(output));
    }

    /// Stop writing to the byte stream; records still reach the record sink
    pub fn disable_output(&self) {
        *self.shared.output.lock() = None;
    }

    pub fn set_record_sink<S: RecordSink + 'static>(&self, sink: S) {
        *self.shared.sink.write() = Some(Arc::new(sink));
    }

    pub fn remove_record_sink(&self) {
        *self.shared.sink.write() = None;
    }

    pub fn set_formatter<F>(&self, formatter: F)
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        self.update_settings(|settings| settings.formatter = Arc::new(formatter));
    }

    pub fn reset_formatter(&self) {
        self.update_settings(|settings| settings.formatter = Arc::new(formatter::default_format));
    }

    pub fn set_time_layout(&self, layout: impl Into<String>) {
        let layout = layout.into();
        self.update_settings(|settings| settings.time_layout = layout);
    }

    pub fn time_layout(&self) -> String {
        self.shared.format_settings().time_layout.clone()
    }

    pub fn set_full_path(&self, full_path: bool) {
        self.update_settings(|settings| settings.full_path = full_path);
    }

    pub fn full_path(&self) -> bool {
        self.shared.format_settings().full_path
    }

    pub fn set_resolver<R: CallerResolver + 'static>(&self, resolver: R) {
        self.update_settings(|settings| settings.resolver = Arc::new(resolver));
    }

    pub fn set_source_roots(&self, roots: Arc<SourceRoots>) {
        self.update_settings(|settings| settings.source_roots = roots);
    }

    pub fn source_roots(&self) -> Arc<SourceRoots> {
        Arc::clone(&self.shared.format_settings().source_roots)
    }

    pub fn format_settings(&self) -> Arc<FormatSettings> {
        self.shared.format_settings()
    }

    fn update_settings(&self, update: impl FnOnce(&mut FormatSettings)) {
        let mut settings = self.shared.settings.write();
        update(Arc::make_mut(&mut settings));
    }

    /// Flush the byte-stream output and the record sink
    pub fn flush(&self) -> Result<()> {
        if let Some(out) = self.shared.output.lock().as_mut() {
            out.flush()?;
        }
        let sink = self.shared.sink.read().clone();
        if let Some(sink) = sink {
            sink.flush()?;
        }
        Ok(())
    }

    #[track_caller]
    #[inline]
    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(Severity::Debug, message, Location::caller());
    }

    #[track_caller]
    #[inline]
    pub fn info(&self, message: impl fmt::Display) {
        self.emit(Severity::Info, message, Location::caller());
    }

    #[track_caller]
    #[inline]
    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(Severity::Warn, message, Location::caller());
    }

    #[track_caller]
    #[inline]
    pub fn error(&self, message: impl fmt::Display) {
        self.emit(Severity::Error, message, Location::caller());
    }

    /// Log at `Panic`, then panic with the formatted line.
    ///
    /// The panic is raised only after the output and the record sink have
    /// seen the record; below the threshold this is a no-op.
    #[track_caller]
    pub fn panic(&self, message: impl fmt::Display) {
        if let Some(line) = self.emit(Severity::Panic, message, Location::caller()) {
            panic!("{line}");
        }
    }

    /// Log at `Fatal`, then terminate the process with [`FATAL_EXIT_CODE`].
    ///
    /// Below the threshold this is a no-op.
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) {
        if self.emit(Severity::Fatal, message, Location::caller()).is_some() {
            let _ = self.flush();
            std::process::exit(FATAL_EXIT_CODE);
        }
    }

    /// Log at an arbitrary severity.
    ///
    /// `Print` behaves like [`println`](Self::println) and `None` is ignored.
    #[track_caller]
    pub fn log(&self, level: Severity, message: impl fmt::Display) {
        match level {
            Severity::Print => self.println(message),
            Severity::None => {}
            Severity::Panic => self.panic(message),
            Severity::Fatal => self.fatal(message),
            _ => {
                self.emit(level, message, Location::caller());
            }
        }
    }

    /// Write `message` verbatim, bypassing the threshold and the formatter
    #[track_caller]
    pub fn print(&self, message: impl fmt::Display) {
        self.emit_print(message.to_string(), false, Location::caller());
    }

    /// Write `message` followed by a newline, bypassing the threshold and the formatter
    #[track_caller]
    pub fn println(&self, message: impl fmt::Display) {
        self.emit_print(message.to_string(), true, Location::caller());
    }

    /// Returns `Some` when the call passed the threshold. The line is only
    /// rendered when an output is configured or the level is `Panic`.
    fn emit(
        &self,
        level: Severity,
        message: impl fmt::Display,
        location: &'static Location<'static>,
    ) -> Option<String> {
        if !self.enabled(level) {
            return None;
        }

        let (record, line) = {
            let mut output = self.shared.output.lock();
            let record = Record::emitted(
                level,
                self.shared.depth,
                message.to_string(),
                location,
                Arc::downgrade(&self.shared),
            );
            let line = if output.is_some() || level == Severity::Panic {
                self.render(&record)
            } else {
                String::new()
            };
            if let Some(out) = output.as_mut() {
                let mut bytes = String::with_capacity(line.len() + 1);
                bytes.push_str(&line);
                bytes.push('\n');
                self.write_output(out, bytes.as_bytes());
                if level >= Severity::Panic {
                    let _ = out.flush();
                }
            }
            (record, line)
        };

        self.shared.metrics.record_emitted();
        self.dispatch(&record);
        Some(line)
    }

    fn emit_print(&self, mut text: String, newline: bool, location: &'static Location<'static>) {
        {
            let mut output = self.shared.output.lock();
            if let Some(out) = output.as_mut() {
                if newline {
                    text.push('\n');
                    self.write_output(out, text.as_bytes());
                    text.pop();
                } else {
                    self.write_output(out, text.as_bytes());
                }
            }
        }

        self.shared.metrics.record_emitted();
        if self.shared.sink.read().is_some() {
            let record = Record::emitted(
                Severity::Print,
                self.shared.depth,
                text,
                location,
                Arc::downgrade(&self.shared),
            );
            self.dispatch(&record);
        }
    }

    /// Run the configured formatter, falling back to the default one if it panics
    fn render(&self, record: &Record) -> String {
        let settings = self.shared.format_settings();
        catch_unwind(AssertUnwindSafe(|| (settings.formatter)(record)))
            .unwrap_or_else(|_| formatter::default_format(record))
    }

    fn write_output(&self, out: &mut ByteSink, bytes: &[u8]) {
        if let Err(e) = out.write_all(bytes) {
            let previous = self.shared.metrics.record_write_failure();
            if LoggerMetrics::should_alert(previous) {
                eprintln!(
                    "[LOGGER ERROR] Output write failed: {} ({} failures so far)",
                    e,
                    previous + 1
                );
            }
        }
    }

    fn dispatch(&self, record: &Record) {
        let sink = self.shared.sink.read().clone();
        let Some(sink) = sink else {
            return;
        };
        if let Err(e) = sink::deliver(sink.as_ref(), record) {
            let previous = self.shared.metrics.record_sink_failure();
            if LoggerMetrics::should_alert(previous) {
                eprintln!(
                    "[LOGGER ERROR] Record sink '{}' failed: {} ({} failures so far)",
                    sink.name(),
                    e,
                    previous + 1
                );
            }
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("depth", &self.shared.depth)
            .field("settings", &self.shared.format_settings())
            .field("metrics", &self.shared.metrics)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Logger`] with a fluent API
///
/// # Example
/// ```
/// use rust_leveled_log::prelude::*;
///
/// let logger = Logger::builder()
///     .level(Severity::Info)
///     .time_layout("%H:%M:%S")
///     .record_sink(MemorySink::new())
///     .build();
/// ```
pub struct LoggerBuilder {
    level: Severity,
    depth: usize,
    output: Option<ByteSink>,
    sink: Option<Arc<dyn RecordSink>>,
    settings: FormatSettings,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            level: Severity::Debug,
            depth: DEFAULT_DEPTH,
            output: Some(Box::new(io::stdout())),
            sink: None,
            settings: FormatSettings::default(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    /// Stack depth recorded in every record; add one per forwarding layer
    #[must_use = "builder methods return a new value"]
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn output<W: Write + Send + 'static>(mut self, output: W) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn no_output(mut self) -> Self {
        self.output = None;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn record_sink<S: RecordSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        self.settings.formatter = Arc::new(formatter);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn time_layout(mut self, layout: impl Into<String>) -> Self {
        self.settings.time_layout = layout.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn full_path(mut self, full_path: bool) -> Self {
        self.settings.full_path = full_path;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn resolver<R: CallerResolver + 'static>(mut self, resolver: R) -> Self {
        self.settings.resolver = Arc::new(resolver);
        self
    }

    /// Use a private root set instead of the process-wide one
    #[must_use = "builder methods return a new value"]
    pub fn source_roots(mut self, roots: Arc<SourceRoots>) -> Self {
        self.settings.source_roots = roots;
        self
    }

    /// Apply a declarative configuration.
    ///
    /// Build directory and extra roots are registered in the builder's
    /// current root set, so call [`source_roots`](Self::source_roots) first
    /// to keep them out of the process-wide set.
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: &LoggerConfig) -> Self {
        self.level = config.level;
        self.settings.time_layout = config.time_layout.clone();
        self.settings.full_path = config.full_path;
        if let Some(dir) = &config.build_dir {
            if self.settings.source_roots.add_build_dir(dir).is_some() {
                self.settings.full_path = true;
            }
        }
        for root in &config.source_roots {
            self.settings.source_roots.add(root);
        }
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            shared: Arc::new(LoggerShared {
                level: AtomicU8::new(self.level.rank()),
                depth: self.depth,
                output: Mutex::new(self.output),
                sink: RwLock::new(self.sink),
                settings: RwLock::new(Arc::new(self.settings)),
                metrics: LoggerMetrics::new(),
            }),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
