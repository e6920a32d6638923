//! LogSink - logs every check outcome via tracing

use contracts::{CheckStatus, ContractError, ReportSink, SessionReport};
use tracing::{info, instrument, warn};

/// Sink that writes the report to the log
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_report(&self, report: &SessionReport) {
        for outcome in &report.outcomes {
            match outcome.status {
                CheckStatus::Failed => warn!(
                    sink = %self.name,
                    suite = %outcome.suite,
                    check = %outcome.check,
                    message = %outcome.message,
                    "Check failed"
                ),
                status => info!(
                    sink = %self.name,
                    suite = %outcome.suite,
                    check = %outcome.check,
                    status = status.as_str(),
                    message = %outcome.message,
                    "Check finished"
                ),
            }
        }

        info!(
            sink = %self.name,
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            passing = report.is_passing(),
            "Session report"
        );
    }
}

impl ReportSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_publish",
        skip(self, report),
        fields(sink = %self.name, outcomes = report.outcomes.len())
    )]
    async fn publish(&mut self, report: &SessionReport) -> Result<(), ContractError> {
        self.log_report(report);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
