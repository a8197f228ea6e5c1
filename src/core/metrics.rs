//! Logger metrics for observability
//!
//! Counters describing what a logger did with the calls that passed its
//! threshold. Rejected calls are not counted to keep rejection free. Sink
//! and writer failures never reach the caller of a logging method, so these
//! counters are the place to look when output goes missing.

use std::sync::atomic::{AtomicU64, Ordering};

/// Report the first failure and every 1000th after it
const ALERT_INTERVAL: u64 = 1000;

/// # Example
///
/// ```
/// use rust_leveled_log::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_emitted();
/// metrics.record_sink_failure();
///
/// assert_eq!(metrics.emitted(), 1);
/// assert_eq!(metrics.sink_failures(), 1);
/// ```
#[derive(Debug, Default)]
pub struct LoggerMetrics {
    /// Calls that passed the threshold (prints included)
    emitted: AtomicU64,

    /// Failed writes to the byte-stream sink
    write_failures: AtomicU64,

    /// Failed or panicking record sink deliveries
    sink_failures: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            emitted: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.emitted.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a byte-stream write failure; returns the previous count
    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a sink failure; returns the previous count
    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Whether a failure with the given previous count should be reported
    #[inline]
    pub fn should_alert(previous: u64) -> bool {
        previous % ALERT_INTERVAL == 0
    }

    /// Share of passing calls whose byte-stream or sink delivery failed (0.0 - 100.0)
    pub fn failure_rate(&self) -> f64 {
        let emitted = self.emitted();
        if emitted == 0 {
            return 0.0;
        }
        let failed = self.write_failures() + self.sink_failures();
        (failed as f64 / emitted as f64) * 100.0
    }

    pub fn reset(&self) {
        self.emitted.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
    }
}
