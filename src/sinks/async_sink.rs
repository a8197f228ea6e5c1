//! Queue-decoupled record sink
//!
//! The logger delivers records synchronously. Wrapping a slow sink in an
//! [`AsyncSink`] moves the slow part onto a worker thread behind a bounded
//! queue, so the logging thread only pays for an enqueue.

use crate::core::error::{LoggerError, Result};
use crate::core::record::Record;
use crate::core::sink::{deliver, RecordSink};
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default time allowed for the worker to drain on shutdown (5 seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Counters {
    in_flight: AtomicUsize,
    dropped: AtomicU64,
    failed: AtomicU64,
}

/// Runs another sink on a dedicated worker thread.
///
/// When the queue is full the record is dropped, counted, and
/// [`LoggerError::QueueFull`] is returned to the logger (which never passes
/// it on to the code that logged).
///
/// # Example
///
/// ```
/// use rust_leveled_log::prelude::*;
/// use std::sync::Arc;
///
/// let memory = Arc::new(MemorySink::new());
/// let sink = AsyncSink::new(Arc::clone(&memory), 1024).unwrap();
/// let logger = Logger::builder().no_output().record_sink(sink).build();
///
/// logger.info("queued");
/// logger.flush().unwrap();
/// assert_eq!(memory.messages(), vec!["queued"]);
/// ```
pub struct AsyncSink {
    sender: RwLock<Option<Sender<Record>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    worker_id: thread::ThreadId,
    inner: Arc<dyn RecordSink>,
    capacity: usize,
    counters: Arc<Counters>,
}

impl AsyncSink {
    /// Spawn the worker thread for `inner` with a queue of `capacity` records.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero or the thread cannot be spawned.
    pub fn new<S: RecordSink + 'static>(inner: S, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(LoggerError::config("AsyncSink", "capacity must be greater than 0"));
        }

        let (sender, receiver) = bounded::<Record>(capacity);
        let inner: Arc<dyn RecordSink> = Arc::new(inner);
        let counters = Arc::new(Counters::default());

        let worker_inner = Arc::clone(&inner);
        let worker_counters = Arc::clone(&counters);
        let handle = thread::Builder::new()
            .name("log-sink-worker".to_string())
            .spawn(move || {
                for record in receiver {
                    if deliver(worker_inner.as_ref(), &record).is_err() {
                        worker_counters.failed.fetch_add(1, Ordering::Relaxed);
                    }
                    worker_counters.in_flight.fetch_sub(1, Ordering::AcqRel);
                }
                let _ = worker_inner.flush();
            })
            .map_err(|e| LoggerError::io_operation("spawn sink worker", "thread spawn failed", e))?;

        Ok(Self {
            sender: RwLock::new(Some(sender)),
            worker_id: handle.thread().id(),
            worker: Mutex::new(Some(handle)),
            inner,
            capacity,
            counters,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records dropped because the queue was full
    pub fn dropped_count(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }

    /// Records the wrapped sink failed to accept
    pub fn failed_count(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }

    /// Records queued or being delivered
    pub fn pending(&self) -> usize {
        self.counters.in_flight.load(Ordering::Acquire)
    }

    /// Stop accepting records and wait up to `timeout` for the queue to drain.
    ///
    /// Returns `true` if the worker finished within the timeout.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        drop(self.sender.write().take());
        // The worker can end up dropping the last logger reference itself
        if self.on_worker() {
            return false;
        }

        let Some(handle) = self.worker.lock().take() else {
            return true;
        };
        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if handle.join().is_err() {
                    eprintln!("[LOGGER ERROR] Sink worker thread panicked during shutdown");
                    return false;
                }
                return true;
            }
            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Sink worker did not finish within {:?}. Some records may be lost.",
                    timeout
                );
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    fn on_worker(&self) -> bool {
        thread::current().id() == self.worker_id
    }
}

impl RecordSink for AsyncSink {
    fn write_record(&self, record: &Record) -> Result<usize> {
        let sender = self.sender.read();
        let Some(sender) = sender.as_ref() else {
            return Err(LoggerError::SinkClosed);
        };

        // Resolve on the logging thread so the worker sees the same call site
        record.call_site();
        let size = record.message().len();

        self.counters.in_flight.fetch_add(1, Ordering::AcqRel);
        match sender.try_send(record.clone()) {
            Ok(()) => Ok(size),
            Err(TrySendError::Full(_)) => {
                self.counters.in_flight.fetch_sub(1, Ordering::AcqRel);
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                Err(LoggerError::QueueFull {
                    capacity: self.capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => {
                self.counters.in_flight.fetch_sub(1, Ordering::AcqRel);
                Err(LoggerError::SinkClosed)
            }
        }
    }

    /// Wait for queued records to be delivered, then flush the wrapped sink
    fn flush(&self) -> Result<()> {
        let start = Instant::now();
        while self.pending() > 0 && !self.on_worker() {
            if start.elapsed() >= DEFAULT_SHUTDOWN_TIMEOUT {
                return Err(LoggerError::sink(format!(
                    "{} records still pending after {:?}",
                    self.pending(),
                    DEFAULT_SHUTDOWN_TIMEOUT
                )));
            }
            thread::sleep(Duration::from_millis(1));
        }
        self.inner.flush()
    }

    fn name(&self) -> &str {
        "async"
    }
}

impl Drop for AsyncSink {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CallSite, Severity};
    use crate::sinks::MemorySink;

    struct Slow(Arc<MemorySink>, Duration);

    impl RecordSink for Slow {
        fn write_record(&self, record: &Record) -> Result<usize> {
            thread::sleep(self.1);
            self.0.write_record(record)
        }
    }

    fn record(message: &str) -> Record {
        Record::new(Severity::Info, message).with_call_site(CallSite::new("a.rs", 1))
    }

    #[test]
    fn test_delivers_in_order() {
        let memory = Arc::new(MemorySink::new());
        let sink = AsyncSink::new(Arc::clone(&memory), 64).unwrap();

        for i in 0..20 {
            sink.write_record(&record(&format!("m{i}"))).unwrap();
        }
        sink.flush().unwrap();

        let expected: Vec<String> = (0..20).map(|i| format!("m{i}")).collect();
        assert_eq!(memory.messages(), expected);
        assert_eq!(sink.pending(), 0);
    }

    #[test]
    fn test_full_queue_drops() {
        let memory = Arc::new(MemorySink::new());
        let sink = AsyncSink::new(Slow(Arc::clone(&memory), Duration::from_millis(50)), 1).unwrap();

        let results: Vec<_> = (0..10).map(|i| sink.write_record(&record(&i.to_string()))).collect();

        let full = results
            .iter()
            .filter(|r| matches!(r, Err(LoggerError::QueueFull { capacity: 1 })))
            .count();
        assert!(full > 0);
        assert_eq!(sink.dropped_count(), full as u64);
        assert!(sink.shutdown(DEFAULT_SHUTDOWN_TIMEOUT));
        assert_eq!(memory.len() as u64 + sink.dropped_count(), 10);
    }

    #[test]
    fn test_closed_after_shutdown() {
        let sink = AsyncSink::new(MemorySink::new(), 4).unwrap();
        assert!(sink.shutdown(Duration::from_secs(1)));
        assert!(matches!(sink.write_record(&record("late")), Err(LoggerError::SinkClosed)));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(AsyncSink::new(MemorySink::new(), 0).is_err());
    }
}
