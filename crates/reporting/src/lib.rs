//! # Reporting
//!
//! Runs QC suites and delivers the resulting session report.
//!
//! ## Architecture
//!
//! ```text
//! QcRunner --SessionReport--> ReportDispatcher --+--> SinkHandle(LogSink)
//!                                                +--> SinkHandle(FileSink)
//! ```
//!
//! 每个 sink 拥有独立的有界队列和 worker 任务；单个 sink 失败不会影响其他 sink。

mod dispatcher;
mod error;
mod handle;
mod metrics;
mod runner;
pub mod sinks;

pub use dispatcher::ReportDispatcher;
pub use error::ReportingError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use runner::QcRunner;
pub use sinks::{FileSink, FileSinkConfig, LogSink};
