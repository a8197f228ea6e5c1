//! Structured record sinks

use super::error::{LoggerError, Result};
use super::record::Record;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Consumer of [`Record`]s.
///
/// Returns the number of bytes accepted. Failures are reported as values;
/// the logger still isolates panics so a misbehaving sink cannot unwind
/// through a logging call. Sinks receive records concurrently from many
/// threads and use interior mutability for their own state.
pub trait RecordSink: Send + Sync {
    fn write_record(&self, record: &Record) -> Result<usize>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "sink"
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Arc<S> {
    fn write_record(&self, record: &Record) -> Result<usize> {
        (**self).write_record(record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn write_record(&self, record: &Record) -> Result<usize> {
        (**self).write_record(record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Deliver `record` to `sink`, converting a panic into an error value
pub(crate) fn deliver(sink: &dyn RecordSink, record: &Record) -> Result<usize> {
    match catch_unwind(AssertUnwindSafe(|| sink.write_record(record))) {
        Ok(result) => result,
        Err(payload) => Err(LoggerError::sink(format!(
            "{} panicked: {}",
            sink.name(),
            panic_message(payload.as_ref())
        ))),
    }
}

/// Broadcasts every record to an ordered list of child sinks.
///
/// Delivery is best effort: a child that fails or panics is counted and
/// skipped, and the remaining children still receive the record.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn RecordSink>>,
    failures: AtomicU64,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn RecordSink>>) -> Self {
        Self {
            sinks,
            failures: AtomicU64::new(0),
        }
    }

    /// Append a child sink
    #[must_use]
    pub fn with<S: RecordSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Number of child deliveries that failed
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl RecordSink for FanoutSink {
    /// Returns the bytes accepted by the children that succeeded; never fails.
    fn write_record(&self, record: &Record) -> Result<usize> {
        let mut accepted = 0;
        for sink in &self.sinks {
            match deliver(sink.as_ref(), record) {
                Ok(n) => accepted += n,
                Err(_) => {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        Ok(accepted)
    }

    fn flush(&self) -> Result<()> {
        for sink in &self.sinks {
            let _ = catch_unwind(AssertUnwindSafe(|| sink.flush()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "fanout"
    }
}

/// Compose many sinks behind one
pub fn fan_out<I>(sinks: I) -> FanoutSink
where
    I: IntoIterator<Item = Arc<dyn RecordSink>>,
{
    FanoutSink::new(sinks.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::severity::Severity;
    use parking_lot::Mutex;

    struct Collect(Mutex<Vec<String>>);

    impl RecordSink for Collect {
        fn write_record(&self, record: &Record) -> Result<usize> {
            self.0.lock().push(record.message().to_string());
            Ok(record.message().len())
        }
    }

    struct Failing;

    impl RecordSink for Failing {
        fn write_record(&self, _record: &Record) -> Result<usize> {
            Err(LoggerError::sink("disk gone"))
        }
    }

    struct Panicking;

    impl RecordSink for Panicking {
        fn write_record(&self, _record: &Record) -> Result<usize> {
            panic!("sink exploded");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[test]
    fn test_fanout_isolates_failures() {
        let first = Arc::new(Collect(Mutex::new(Vec::new())));
        let last = Arc::new(Collect(Mutex::new(Vec::new())));
        let fanout = FanoutSink::new(vec![
            first.clone() as Arc<dyn RecordSink>,
            Arc::new(Failing),
            Arc::new(Panicking),
            last.clone(),
        ]);

        let accepted = fanout.write_record(&Record::new(Severity::Info, "hello")).unwrap();

        assert_eq!(accepted, 10);
        assert_eq!(*first.0.lock(), vec!["hello"]);
        assert_eq!(*last.0.lock(), vec!["hello"]);
        assert_eq!(fanout.failure_count(), 2);
    }

    #[test]
    fn test_deliver_converts_panic() {
        let err = deliver(&Panicking, &Record::new(Severity::Error, "x")).unwrap_err();
        assert!(err.to_string().contains("panicking panicked: sink exploded"));
    }

    #[test]
    fn test_fan_out_builder() {
        let sink = fan_out(Vec::<Arc<dyn RecordSink>>::new()).with(Failing);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.write_record(&Record::new(Severity::Warn, "x")).unwrap(), 0);
    }
}
