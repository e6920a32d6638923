//! Built-in report sinks

mod file;
mod log;

pub use file::{FileSink, FileSinkConfig, DEFAULT_REPORT_FILE};
pub use log::LogSink;
