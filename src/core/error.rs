//! Error types for the logging facility

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Numeric severity outside the valid range
    #[error("Invalid log level: {value} (expected 0..={max})")]
    InvalidLevel { value: i64, max: u8 },

    /// Severity name that does not parse
    #[error("Invalid log level: '{0}'")]
    UnknownLevel(String),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record sink rejected a record
    #[error("Sink error: {0}")]
    SinkError(String),

    /// The sink has been shut down
    #[error("Sink already closed")]
    SinkClosed,

    /// Asynchronous sink queue is full
    #[error("Sink queue full: capacity {capacity}")]
    QueueFull { capacity: usize },
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a sink error
    pub fn sink<S: Into<String>>(msg: S) -> Self {
        LoggerError::SinkError(msg.into())
    }
}
