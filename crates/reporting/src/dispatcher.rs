//! ReportDispatcher - fan-out of session reports to sinks

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use contracts::{SessionReport, SinkConfig, SinkType};

use crate::error::ReportingError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{FileSink, LogSink};

/// Create a SinkHandle from configuration
#[instrument(
    name = "report_dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, ReportingError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| ReportingError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Fans every session report out to all configured sinks
pub struct ReportDispatcher {
    handles: Vec<SinkHandle>,
}

impl ReportDispatcher {
    /// Build handles for every sink config. Must be called inside a tokio runtime.
    #[instrument(
        name = "report_dispatcher_from_configs",
        skip(configs),
        fields(sink_count = configs.len())
    )]
    pub fn from_configs(configs: &[SinkConfig]) -> Result<Self, ReportingError> {
        let handles = configs
            .iter()
            .map(create_sink_handle)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { handles })
    }

    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self { handles }
    }

    pub fn sink_count(&self) -> usize {
        self.handles.len()
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Queue one report on every sink
    ///
    /// A closed sink is logged and skipped; the other sinks still receive the report.
    pub async fn dispatch(&self, report: Arc<SessionReport>) {
        for handle in &self.handles {
            if let Err(e) = handle.send(Arc::clone(&report)).await {
                error!(sink = %handle.name(), error = %e, "Failed to queue report");
            }
        }
    }

    /// Consume reports until the input channel closes, then shut every sink down
    #[instrument(name = "report_dispatcher_run", skip(self, input_rx))]
    pub async fn run(self, mut input_rx: mpsc::Receiver<SessionReport>) {
        info!(sinks = self.handles.len(), "Report dispatcher started");

        let mut report_count: u64 = 0;
        while let Some(report) = input_rx.recv().await {
            report_count += 1;
            self.dispatch(Arc::new(report)).await;
        }

        info!(reports = report_count, "Report input closed, shutting down");
        self.shutdown().await;
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self, input_rx: mpsc::Receiver<SessionReport>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run(input_rx).await;
        })
    }

    /// Drain and close every sink
    pub async fn shutdown(self) {
        for handle in self.handles {
            handle.shutdown().await;
        }
        info!("Report dispatcher shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::CheckOutcome;
    use std::collections::HashMap;

    fn report() -> SessionReport {
        SessionReport::from_outcomes(vec![
            CheckOutcome::passed("binary_quad_state", "ok").in_suite("Rendering"),
            CheckOutcome::failed("render_latency", "too noisy").in_suite("Rendering"),
        ])
    }

    #[tokio::test]
    async fn test_dispatcher_fanout() {
        let (input_tx, input_rx) = mpsc::channel(4);

        let handles = vec![
            SinkHandle::spawn(LogSink::new("sink1"), 4),
            SinkHandle::spawn(LogSink::new("sink2"), 4),
        ];
        let dispatcher = ReportDispatcher::with_handles(handles);
        assert_eq!(dispatcher.sink_count(), 2);
        let task = dispatcher.spawn(input_rx);

        for _ in 0..3 {
            input_tx.send(report()).await.unwrap();
        }
        drop(input_tx);

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), task).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_dispatch_counts_publishes() {
        let dispatcher = ReportDispatcher::with_handles(vec![SinkHandle::spawn(
            LogSink::new("counted"),
            2,
        )]);

        let shared = Arc::new(report());
        dispatcher.dispatch(Arc::clone(&shared)).await;
        dispatcher.dispatch(shared).await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let metrics = dispatcher.metrics();
        assert_eq!(metrics[0].0, "counted");
        assert_eq!(metrics[0].1.publish_count, 2);
        assert_eq!(metrics[0].1.failure_count, 0);

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_from_configs_builds_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = HashMap::new();
        params.insert(
            "base_path".to_string(),
            dir.path().to_string_lossy().into_owned(),
        );
        let configs = vec![
            SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                queue_capacity: 4,
                params: HashMap::new(),
            },
            SinkConfig {
                name: "json".into(),
                sink_type: SinkType::File,
                queue_capacity: 4,
                params,
            },
        ];

        let dispatcher = ReportDispatcher::from_configs(&configs).unwrap();
        dispatcher.dispatch(Arc::new(report())).await;
        dispatcher.shutdown().await;

        assert!(dir.path().join("qc_report.json").exists());
    }
}
