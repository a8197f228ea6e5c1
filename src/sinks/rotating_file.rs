//! Rotating file sink
//!
//! Writes records below a root directory using time-based layouts for both
//! the subdirectory and the file name, so a new directory and file start
//! when the formatted period changes (e.g. every day). Within a period, a
//! file that would grow past the size limit rolls over to `<name>.1`,
//! `<name>.2`, and so on.

use crate::core::error::{LoggerError, Result};
use crate::core::formatter::format_timestamp;
use crate::core::record::Record;
use crate::core::sink::RecordSink;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Encoding of each line written by a [`RotatingFileSink`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordFormat {
    /// The owning logger's formatter output
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

enum FileOutput {
    Plain(File),
    Buffered(BufWriter<File>),
}

impl FileOutput {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            FileOutput::Plain(file) => file,
            FileOutput::Buffered(writer) => writer,
        }
    }
}

#[derive(Default)]
struct FileState {
    output: Option<FileOutput>,
    period: String,
    base_path: PathBuf,
    index: u32,
    size: u64,
}

/// Record sink writing to day (or any period) partitioned files.
///
/// # Examples
///
/// ```no_run
/// use rust_leveled_log::sinks::{RecordFormat, RotatingFileSink};
///
/// // logs/20250108/20250108.log, rolling over every 32 MiB
/// let sink = RotatingFileSink::new("logs")
///     .unwrap()
///     .with_dir_layout("%Y%m%d")
///     .with_file_layout("%Y%m%d.log")
///     .with_max_file_size(32 * 1024 * 1024)
///     .with_format(RecordFormat::Text);
/// ```
pub struct RotatingFileSink {
    root_dir: PathBuf,
    dir_layout: String,
    file_layout: String,
    max_file_size: u64,
    buffered: bool,
    format: RecordFormat,
    state: Mutex<FileState>,
}

impl RotatingFileSink {
    /// Create a sink rooted at `root_dir`, creating the directory if needed.
    ///
    /// Defaults: one subdirectory and one file per day, no size limit,
    /// unbuffered text output.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Result<Self> {
        let root_dir = root_dir.as_ref().to_path_buf();
        if root_dir.as_os_str().is_empty() {
            return Err(LoggerError::config("RotatingFileSink", "root directory must not be empty"));
        }
        fs::create_dir_all(&root_dir).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", root_dir.display()),
                e,
            )
        })?;

        Ok(Self {
            root_dir,
            dir_layout: "%Y%m%d".to_string(),
            file_layout: "%Y%m%d.log".to_string(),
            max_file_size: 0,
            buffered: false,
            format: RecordFormat::default(),
            state: Mutex::new(FileState::default()),
        })
    }

    /// strftime layout of the per-period subdirectory; empty writes into the root
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_dir_layout(mut self, layout: impl Into<String>) -> Self {
        self.dir_layout = layout.into();
        self
    }

    /// strftime layout of the per-period file name
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_file_layout(mut self, layout: impl Into<String>) -> Self {
        self.file_layout = layout.into();
        self
    }

    /// Size limit in bytes before rolling to the next numbered file; 0 disables it
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_buffering(mut self, buffered: bool) -> Self {
        self.buffered = buffered;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path of the file currently written, if any record has been written
    pub fn current_path(&self) -> Option<PathBuf> {
        let state = self.state.lock();
        state
            .output
            .as_ref()
            .map(|_| indexed_path(&state.base_path, state.index))
    }

    fn base_path_for(&self, now: &DateTime<Local>) -> PathBuf {
        let mut path = self.root_dir.clone();
        let dir = format_timestamp(now, &self.dir_layout);
        if !dir.is_empty() {
            path.push(dir.trim_matches('/'));
        }
        let file = format_timestamp(now, &self.file_layout);
        path.push(if file.is_empty() { "app.log".to_string() } else { file });
        path
    }

    fn encode(&self, record: &Record) -> Result<String> {
        let mut line = match self.format {
            RecordFormat::Text => record.render(),
            RecordFormat::Json => serde_json::to_string(record)?,
        };
        line.push('\n');
        Ok(line)
    }

    fn open(&self, path: &Path) -> Result<FileOutput> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "open log file",
                    format!("Failed to open '{}'", path.display()),
                    e,
                )
            })?;
        Ok(if self.buffered {
            FileOutput::Buffered(BufWriter::new(file))
        } else {
            FileOutput::Plain(file)
        })
    }

    /// Switch to the period identified by `base_path`, skipping numbered
    /// files that have no room left for a `len` byte line.
    fn enter_period(&self, state: &mut FileState, period: String, base_path: PathBuf, len: u64) -> Result<()> {
        if let Some(mut output) = state.output.take() {
            output.writer().flush()?;
        }
        let (index, size) = self.next_free(&base_path, 0, len);
        state.output = Some(self.open(&indexed_path(&base_path, index))?);
        state.period = period;
        state.base_path = base_path;
        state.index = index;
        state.size = size;
        Ok(())
    }

    fn roll_over(&self, state: &mut FileState, len: u64) -> Result<()> {
        if let Some(mut output) = state.output.take() {
            output.writer().flush().map_err(|e| {
                LoggerError::io_operation(
                    "rotate log file",
                    format!("Failed to flush '{}'", state.base_path.display()),
                    e,
                )
            })?;
        }
        let (index, size) = self.next_free(&state.base_path, state.index + 1, len);
        state.output = Some(self.open(&indexed_path(&state.base_path, index))?);
        state.index = index;
        state.size = size;
        Ok(())
    }

    /// First index from `start` whose file can take `len` more bytes, with
    /// that file's current size. Files left by an earlier run count.
    fn next_free(&self, base_path: &Path, start: u32, len: u64) -> (u32, u64) {
        let mut index = start;
        let mut size = file_len(&indexed_path(base_path, index));
        while self.max_file_size > 0 && size > 0 && size + len > self.max_file_size {
            index += 1;
            size = file_len(&indexed_path(base_path, index));
        }
        (index, size)
    }
}

impl RecordSink for RotatingFileSink {
    fn write_record(&self, record: &Record) -> Result<usize> {
        let line = self.encode(record)?;
        let now = record.timestamp().copied().unwrap_or_else(Local::now);
        let base_path = self.base_path_for(&now);
        let period = base_path.to_string_lossy().into_owned();

        let len = line.len() as u64;
        let mut state = self.state.lock();
        if state.output.is_none() || state.period != period {
            self.enter_period(&mut state, period, base_path, len)?;
        } else if self.max_file_size > 0 && state.size > 0 && state.size + len > self.max_file_size {
            self.roll_over(&mut state, len)?;
        }

        let output = state
            .output
            .as_mut()
            .ok_or_else(|| LoggerError::sink("rotating file sink has no open file"))?;
        output.writer().write_all(line.as_bytes())?;
        state.size += len;
        Ok(line.len())
    }

    fn flush(&self) -> Result<()> {
        if let Some(output) = self.state.lock().output.as_mut() {
            output.writer().flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Some(output) = self.state.get_mut().output.as_mut() {
            let _ = output.writer().flush();
        }
    }
}

fn indexed_path(base: &Path, index: u32) -> PathBuf {
    if index == 0 {
        return base.to_path_buf();
    }
    let mut path = base.to_path_buf();
    let name = base
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("app.log");
    path.set_file_name(format!("{}.{}", name, index));
    path
}

fn file_len(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
