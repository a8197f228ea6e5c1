//! Log record structure

use super::caller::{self, CallSite};
use super::formatter::{self, FormatSettings};
use super::logger::LoggerShared;
use super::severity::Severity;
use chrono::{DateTime, Local};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::Deserialize;
use std::panic::Location;
use std::sync::{Arc, OnceLock, Weak};

/// One captured log event.
///
/// A record is built once per emission call and handed to every sink by
/// reference. The file and line of the originating call are resolved lazily
/// on first access and cached, so the byte-stream formatter and all
/// downstream sinks observe the same call site.
///
/// The owning-logger reference is weak: it is only used to read the current
/// formatting configuration and never keeps the logger alive.
#[derive(Debug, Clone)]
pub struct Record {
    timestamp: Option<DateTime<Local>>,
    depth: usize,
    level: Severity,
    message: String,
    location: Option<&'static Location<'static>>,
    call_site: OnceLock<CallSite>,
    logger: Weak<LoggerShared>,
}

impl Record {
    /// Create a detached record stamped with the current local time.
    ///
    /// Print records carry no timestamp.
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        let timestamp = (level != Severity::Print).then(Local::now);
        Self {
            timestamp,
            depth: 0,
            level,
            message: message.into(),
            location: None,
            call_site: OnceLock::new(),
            logger: Weak::new(),
        }
    }

    pub(crate) fn emitted(
        level: Severity,
        depth: usize,
        message: String,
        location: &'static Location<'static>,
        logger: Weak<LoggerShared>,
    ) -> Self {
        Self {
            timestamp: (level != Severity::Print).then(Local::now),
            depth,
            level,
            message,
            location: Some(location),
            call_site: OnceLock::new(),
            logger,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Option<DateTime<Local>>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: &'static Location<'static>) -> Self {
        self.location = Some(location);
        self
    }

    /// Pre-resolve the call site, skipping the caller resolver entirely
    #[must_use]
    pub fn with_call_site(self, call_site: CallSite) -> Self {
        let _ = self.call_site.set(call_site);
        self
    }

    pub fn timestamp(&self) -> Option<&DateTime<Local>> {
        self.timestamp.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Location captured by `#[track_caller]` at the public entry point
    pub fn location(&self) -> Option<&'static Location<'static>> {
        self.location
    }

    /// Resolved call site, computed on first access
    pub fn call_site(&self) -> &CallSite {
        self.call_site
            .get_or_init(|| caller::resolve(self, &self.settings()))
    }

    pub fn file(&self) -> &str {
        &self.call_site().file
    }

    pub fn line(&self) -> i64 {
        self.call_site().line
    }

    /// Formatting configuration of the owning logger, or the defaults when
    /// the record is detached or the logger has been dropped.
    pub fn settings(&self) -> Arc<FormatSettings> {
        self.logger
            .upgrade()
            .map(|shared| shared.format_settings())
            .unwrap_or_else(FormatSettings::shared_default)
    }

    /// Render the record with the owning logger's current formatter.
    ///
    /// Print records render as their raw message.
    pub fn render(&self) -> String {
        if self.level == Severity::Print {
            return self.message.clone();
        }
        let settings = self.settings();
        (settings.formatter)(self)
    }

    /// Formatted timestamp using the owning logger's layout, empty for prints
    pub fn formatted_timestamp(&self) -> String {
        match &self.timestamp {
            Some(ts) => formatter::format_timestamp(ts, &self.settings().time_layout),
            None => String::new(),
        }
    }

    /// Owned copy of the record's fields, safe to retain past the logging call
    pub fn snapshot(&self) -> RecordSnapshot {
        let site = self.call_site();
        RecordSnapshot {
            timestamp: self.timestamp,
            depth: self.depth,
            level: self.level,
            file: site.file.clone(),
            line: site.line,
            message: self.message.clone(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let site = self.call_site();
        let mut state = serializer.serialize_struct("Record", 6)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("depth", &self.depth)?;
        state.serialize_field("level", &self.level)?;
        state.serialize_field("file", &site.file)?;
        state.serialize_field("line", &site.line)?;
        state.serialize_field("message", &self.message)?;
        state.end()
    }
}

/// Owned, serializable copy of a [`Record`]
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub timestamp: Option<DateTime<Local>>,
    pub depth: usize,
    pub level: Severity,
    pub file: String,
    pub line: i64,
    pub message: String,
}
