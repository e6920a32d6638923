//! ReportSink trait - reporting output interface
//!
//! Defines the abstract interface for report sinks.

use crate::{ContractError, SessionReport};

/// Report output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(ReportSink: Send)]
pub trait LocalReportSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Publish a session report
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn publish(&mut self, report: &SessionReport) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
