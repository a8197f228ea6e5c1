//! Record sink and byte-stream output implementations

pub mod async_sink;
pub mod memory;
pub mod multi_writer;

#[cfg(feature = "file")]
pub mod rotating_file;

pub use async_sink::{AsyncSink, DEFAULT_SHUTDOWN_TIMEOUT};
pub use memory::MemorySink;
pub use multi_writer::MultiWriter;

#[cfg(feature = "file")]
pub use rotating_file::{RecordFormat, RotatingFileSink};

// Re-export the sink traits alongside their implementations
pub use crate::core::{fan_out, FanoutSink, RecordSink};
