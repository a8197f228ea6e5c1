//! Line formatting for the byte-stream sink
//!
//! The default layout of a formatted line is
//! `<timestamp> [<label>] [<file>:<line>] <message>` with a five character,
//! right-aligned severity label and no trailing newline.

use super::caller::{self, CallSite, CallerResolver, SourceRoots, TrackedCallerResolver};
use super::record::Record;
use super::severity::Severity;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::{self, Write as _};
use std::panic::Location;
use std::sync::{Arc, OnceLock};

/// Default timestamp layout (strftime): `2025-01-08 10:30:45.123`
pub const DEFAULT_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Injectable `Record -> line` formatting function
pub type Formatter = Arc<dyn Fn(&Record) -> String + Send + Sync>;

/// Formatting configuration read through a record's logger reference
#[derive(Clone)]
pub struct FormatSettings {
    pub time_layout: String,
    pub full_path: bool,
    pub formatter: Formatter,
    pub resolver: Arc<dyn CallerResolver>,
    pub source_roots: Arc<SourceRoots>,
}

impl FormatSettings {
    /// Shared default settings used by detached records
    pub fn shared_default() -> Arc<FormatSettings> {
        static DEFAULT: OnceLock<Arc<FormatSettings>> = OnceLock::new();
        Arc::clone(DEFAULT.get_or_init(|| Arc::new(FormatSettings::default())))
    }
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            time_layout: DEFAULT_TIME_LAYOUT.to_string(),
            full_path: false,
            formatter: Arc::new(default_format),
            resolver: Arc::new(TrackedCallerResolver),
            source_roots: SourceRoots::global(),
        }
    }
}

impl fmt::Debug for FormatSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatSettings")
            .field("time_layout", &self.time_layout)
            .field("full_path", &self.full_path)
            .field("source_roots", &self.source_roots)
            .finish_non_exhaustive()
    }
}

/// Format `timestamp` with a strftime `layout`.
///
/// An invalid layout falls back to [`DEFAULT_TIME_LAYOUT`] instead of panicking.
pub fn format_timestamp<Tz>(timestamp: &DateTime<Tz>, layout: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    if write!(out, "{}", timestamp.format(layout)).is_err() {
        out.clear();
        let _ = write!(out, "{}", timestamp.format(DEFAULT_TIME_LAYOUT));
    }
    out
}

/// Assemble one line from already-rendered parts
pub fn format_line(timestamp: &str, level: Severity, call_site: &CallSite, message: &str) -> String {
    format!("{} [{}] [{}] {}", timestamp, level.label(), call_site, message)
}

/// Default formatter.
///
/// Resolves the call site (caching it in the record for downstream sinks)
/// and renders the timestamp with the owning logger's layout.
pub fn default_format(record: &Record) -> String {
    match record.level() {
        Severity::Print => record.message().to_string(),
        Severity::None => String::new(),
        level => format_line(
            &record.formatted_timestamp(),
            level,
            record.call_site(),
            record.message(),
        ),
    }
}

/// Same layout as [`default_format`] with the severity label colorized
#[cfg(feature = "console")]
pub fn colored_format(record: &Record) -> String {
    use colored::Colorize;

    match record.level() {
        Severity::Print => record.message().to_string(),
        Severity::None => String::new(),
        level => format!(
            "{} [{}] [{}] {}",
            record.formatted_timestamp(),
            level.label().color(level.color_code()),
            record.call_site(),
            record.message()
        ),
    }
}

/// Format a line for the caller's own location without going through a logger.
///
/// Uses basename mode and the current local time.
#[track_caller]
pub fn format_with_caller(level: Severity, layout: &str, message: impl fmt::Display) -> String {
    if matches!(level, Severity::Print | Severity::None) {
        return String::new();
    }
    let location = Location::caller();
    let call_site = CallSite::new(caller::basename(location.file()), i64::from(location.line()));
    format_line(
        &format_timestamp(&Local::now(), layout),
        level,
        &call_site,
        &message.to_string(),
    )
}
