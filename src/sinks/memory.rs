//! In-memory record capture

use crate::core::{Record, RecordSink, RecordSnapshot, Result, Severity};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Keeps owned snapshots of the records it receives.
///
/// Useful in tests and for applications that expose recent log lines.
/// With a capacity, only the most recent records are kept.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<VecDeque<RecordSnapshot>>,
    capacity: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` records, evicting the oldest
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: Some(capacity),
        }
    }

    pub fn snapshots(&self) -> Vec<RecordSnapshot> {
        self.records.lock().iter().cloned().collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.message.clone()).collect()
    }

    pub fn count_at(&self, level: Severity) -> usize {
        self.records.lock().iter().filter(|r| r.level == level).count()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl RecordSink for MemorySink {
    fn write_record(&self, record: &Record) -> Result<usize> {
        let snapshot = record.snapshot();
        let size = snapshot.message.len();
        let mut records = self.records.lock();
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return Ok(0);
            }
            while records.len() >= capacity {
                records.pop_front();
            }
        }
        records.push_back(snapshot);
        Ok(size)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
