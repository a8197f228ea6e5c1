//! Byte-stream fan-out

use std::fmt;
use std::io::{self, Write};

/// Duplicates every write to a list of writers.
///
/// Unlike a fail-fast tee, a failing writer does not stop the others; the
/// write only fails when every writer failed.
///
/// # Example
///
/// ```
/// use rust_leveled_log::sinks::MultiWriter;
/// use rust_leveled_log::Logger;
///
/// let out = MultiWriter::new().with(std::io::stdout()).with(std::io::sink());
/// let logger = Logger::builder().output(out).build();
/// logger.info("to both");
/// ```
#[derive(Default)]
pub struct MultiWriter {
    writers: Vec<Box<dyn Write + Send>>,
}

impl MultiWriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.writers.push(Box::new(writer));
        self
    }

    pub fn push<W: Write + Send + 'static>(&mut self, writer: W) {
        self.writers.push(Box::new(writer));
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    fn each(&mut self, mut op: impl FnMut(&mut dyn Write) -> io::Result<()>) -> io::Result<()> {
        let mut first_error = None;
        let mut succeeded = self.writers.is_empty();
        for writer in &mut self.writers {
            match op(writer.as_mut()) {
                Ok(()) => succeeded = true,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) if !succeeded => Err(e),
            _ => Ok(()),
        }
    }
}

impl Write for MultiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.each(|w| w.write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.each(|w| w.flush())
    }
}

impl fmt::Debug for MultiWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiWriter")
            .field("writers", &self.writers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buf(Arc<Mutex<Vec<u8>>>);

    impl Write for Buf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_duplicates_writes_past_failures() {
        let a = Buf::default();
        let b = Buf::default();
        let mut out = MultiWriter::new().with(a.clone()).with(Broken).with(b.clone());

        out.write_all(b"line\n").unwrap();

        assert_eq!(&*a.0.lock(), b"line\n");
        assert_eq!(&*b.0.lock(), b"line\n");
    }

    #[test]
    fn test_fails_when_all_writers_fail() {
        let mut out = MultiWriter::new().with(Broken);
        assert!(out.write_all(b"x").is_err());
    }
}
