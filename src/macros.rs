//! Logging macros for ergonomic log message formatting.
//!
//! Every macro has two forms: with a logger expression as the first argument,
//! or starting with a format string literal, which logs through the
//! [default logger](crate::facade). Arguments are formatted lazily with
//! `format_args!`, so a rejected call never allocates the message.
//!
//! # Examples
//!
//! ```
//! use rust_leveled_log::prelude::*;
//! use rust_leveled_log::{info, warn};
//!
//! let logger = Logger::builder().output(std::io::sink()).build();
//!
//! // Explicit logger
//! info!(logger, "Server started");
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // Default logger
//! warn!("disk usage at {}%", 91);
//! ```

/// Log a message at a given severity.
///
/// # Examples
///
/// ```
/// # use rust_leveled_log::prelude::*;
/// # let logger = Logger::builder().output(std::io::sink()).build();
/// use rust_leveled_log::log;
/// log!(logger, Severity::Info, "Simple message");
/// log!(logger, Severity::Error, "Error code: {}", 500);
/// log!(Severity::Warn, "through the default logger");
/// ```
#[macro_export]
macro_rules! log {
    ($level:expr, $fmt:literal $($arg:tt)*) => {
        $crate::facade::log($level, format_args!($fmt $($arg)*))
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format_args!($($arg)+))
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_leveled_log::prelude::*;
/// # let logger = Logger::builder().output(std::io::sink()).build();
/// use rust_leveled_log::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($fmt:literal $($arg:tt)*) => {
        $crate::facade::debug(format_args!($fmt $($arg)*))
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(format_args!($($arg)+))
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_leveled_log::prelude::*;
/// # let logger = Logger::builder().output(std::io::sink()).build();
/// use rust_leveled_log::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($fmt:literal $($arg:tt)*) => {
        $crate::facade::info(format_args!($fmt $($arg)*))
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(format_args!($($arg)+))
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_leveled_log::prelude::*;
/// # let logger = Logger::builder().output(std::io::sink()).build();
/// use rust_leveled_log::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($fmt:literal $($arg:tt)*) => {
        $crate::facade::warn(format_args!($fmt $($arg)*))
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(format_args!($($arg)+))
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_leveled_log::prelude::*;
/// # let logger = Logger::builder().output(std::io::sink()).build();
/// use rust_leveled_log::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($fmt:literal $($arg:tt)*) => {
        $crate::facade::error(format_args!($fmt $($arg)*))
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(format_args!($($arg)+))
    };
}

/// Log a panic-level message, then panic with the formatted line.
///
/// Named `log_panic!` to stay clear of `std::panic!`.
///
/// # Examples
///
/// ```should_panic
/// # use rust_leveled_log::prelude::*;
/// # let logger = Logger::builder().output(std::io::sink()).build();
/// use rust_leveled_log::log_panic;
/// log_panic!(logger, "invariant violated: {}", "queue empty");
/// ```
#[macro_export]
macro_rules! log_panic {
    ($fmt:literal $($arg:tt)*) => {
        $crate::facade::panic(format_args!($fmt $($arg)*))
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.panic(format_args!($($arg)+))
    };
}

/// Log a fatal-level message, then exit the process.
///
/// # Examples
///
/// ```no_run
/// # use rust_leveled_log::prelude::*;
/// # let logger = Logger::new();
/// use rust_leveled_log::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($fmt:literal $($arg:tt)*) => {
        $crate::facade::fatal(format_args!($fmt $($arg)*))
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(format_args!($($arg)+))
    };
}

/// Write a message verbatim, regardless of the threshold.
///
/// # Examples
///
/// ```
/// # use rust_leveled_log::prelude::*;
/// # let logger = Logger::builder().output(std::io::sink()).build();
/// use rust_leveled_log::log_print;
/// log_print!(logger, "progress: {}%\r", 40);
/// ```
#[macro_export]
macro_rules! log_print {
    ($fmt:literal $($arg:tt)*) => {
        $crate::facade::print(format_args!($fmt $($arg)*))
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.print(format_args!($($arg)+))
    };
}

/// Write a message and a newline verbatim, regardless of the threshold.
#[macro_export]
macro_rules! log_println {
    ($fmt:literal $($arg:tt)*) => {
        $crate::facade::println(format_args!($fmt $($arg)*))
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.println(format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Logger, Severity};
    use crate::sinks::MemorySink;
    use std::sync::Arc;

    fn capture(level: Severity) -> (Logger, Arc<MemorySink>) {
        let memory = Arc::new(MemorySink::new());
        let logger = Logger::builder()
            .level(level)
            .no_output()
            .record_sink(Arc::clone(&memory))
            .build();
        (logger, memory)
    }

    #[test]
    fn test_log_macro() {
        let (logger, memory) = capture(Severity::Debug);
        log!(logger, Severity::Info, "Test message");
        log!(logger, Severity::Info, "Formatted: {}", 42);
        assert_eq!(memory.messages(), vec!["Test message", "Formatted: 42"]);
    }

    #[test]
    fn test_leveled_macros() {
        let (logger, memory) = capture(Severity::Debug);
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);

        assert_eq!(
            memory.messages(),
            vec!["Count: 5", "Items: 100", "Retry 1 of 3", "Code: 500"]
        );
        assert_eq!(memory.count_at(Severity::Warn), 1);
    }

    #[test]
    fn test_macros_respect_threshold() {
        let (logger, memory) = capture(Severity::Error);
        debug!(logger, "skip");
        warn!(logger, "skip {}", 1);
        error!(logger, "keep");
        assert_eq!(memory.messages(), vec!["keep"]);
    }

    #[test]
    fn test_macro_reports_invocation_site() {
        let (logger, memory) = capture(Severity::Debug);
        let line = line!() + 1;
        info!(logger, "here");

        let snapshot = &memory.snapshots()[0];
        assert_eq!(snapshot.file, "macros.rs");
        assert_eq!(snapshot.line, i64::from(line));
    }

    #[test]
    fn test_print_macros() {
        let (logger, memory) = capture(Severity::None);
        log_print!(logger, "a={}", 1);
        log_println!(logger, "b={}", 2);

        assert_eq!(memory.messages(), vec!["a=1", "b=2"]);
        assert_eq!(memory.count_at(Severity::Print), 2);
    }

    #[test]
    fn test_panic_macro() {
        let (logger, memory) = capture(Severity::Debug);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            log_panic!(logger, "broken {}", "invariant");
        }));

        assert!(result.is_err());
        assert_eq!(memory.count_at(Severity::Panic), 1);
    }
}
