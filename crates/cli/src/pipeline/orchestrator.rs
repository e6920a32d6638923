//! QC pipeline orchestrator - load tables, run suites, dispatch the report.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{QcBlueprint, SessionReport};
use ingestion::{
    DataContractSuite, DigitalInputColumns, SessionSuite, DIGITAL_INPUT_STREAM, RENDER_SYNC_STREAM,
};
use render_sync::RenderingSuite;
use reporting::{QcRunner, ReportDispatcher};
use tracing::{info, warn};

use super::RunStats;
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct QcPipelineConfig {
    /// Loaded blueprint with session paths already resolved
    pub blueprint: QcBlueprint,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Render diagnostic figures (also gated by `artifacts.render_plots`)
    pub render_plots: bool,
}

/// Row counts of the session tables that loaded
#[derive(Debug, Clone, Copy, Default)]
struct LoadedInputs {
    render_sync_rows: Option<usize>,
    photodiode_events: Option<usize>,
}

/// Main QC orchestrator
pub struct QcPipeline {
    config: QcPipelineConfig,
}

impl QcPipeline {
    pub fn new(config: QcPipelineConfig) -> Self {
        Self { config }
    }

    /// Run the session checks to completion and deliver the report
    pub async fn run(self) -> Result<RunStats> {
        let start_time = Instant::now();

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let blueprint = self.config.blueprint.clone();
        let render_plots = self.config.render_plots && blueprint.artifacts.render_plots;

        // Table loading and the checks are CPU/IO bound
        let task = tokio::task::spawn_blocking(move || run_checks(&blueprint, render_plots));
        let joined = match self.config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, task).await.map_err(|_| {
                warn!(timeout_secs = timeout.as_secs(), "QC run timed out");
                CliError::Timeout {
                    seconds: timeout.as_secs(),
                }
            })?,
            None => task.await,
        };
        let (report, inputs) = joined.context("QC task panicked")?;

        let report = Arc::new(report);
        let sinks = self.config.blueprint.sinks.len();
        if sinks == 0 {
            warn!("No sinks configured - report is only printed");
        } else {
            let dispatcher = ReportDispatcher::from_configs(&self.config.blueprint.sinks)
                .context("Failed to create report dispatcher")?;
            dispatcher.dispatch(Arc::clone(&report)).await;
            // Wait for sinks to drain
            if tokio::time::timeout(Duration::from_secs(5), dispatcher.shutdown())
                .await
                .is_err()
            {
                warn!("Report sinks did not shut down within 5s");
            }
        }

        let stats = RunStats {
            report,
            render_sync_rows: inputs.render_sync_rows,
            photodiode_events: inputs.photodiode_events,
            active_sinks: sinks,
            duration: start_time.elapsed(),
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            passing = stats.report.is_passing(),
            "QC run complete"
        );

        Ok(stats)
    }
}

/// Load the session tables and run every suite
///
/// A table that fails to load becomes a failed data-contract outcome; the
/// checks that do not depend on it still run.
fn run_checks(blueprint: &QcBlueprint, render_plots: bool) -> (SessionReport, LoadedInputs) {
    let session = &blueprint.session;
    let mut contract = DataContractSuite::new();

    info!(path = %session.render_sync_path.display(), "Loading render-sync table");
    let samples = contract.track(
        RENDER_SYNC_STREAM,
        &session.render_sync_path,
        ingestion::load_render_sync(&session.render_sync_path),
    );

    let detections = match &session.digital_input_path {
        Some(path) => {
            info!(path = %path.display(), port = %session.photodiode_port, "Loading digital-input table");
            let columns = DigitalInputColumns {
                time: session.time_column.clone(),
                port: session.photodiode_port.clone(),
            };
            Some(contract.track(
                DIGITAL_INPUT_STREAM,
                path,
                ingestion::load_photodiode_events(path, &columns),
            ))
        }
        None => {
            warn!("No digital-input table configured - render latency check will be skipped");
            contract.not_configured(DIGITAL_INPUT_STREAM);
            None
        }
    };

    let inputs = LoadedInputs {
        render_sync_rows: samples.as_ref().ok().map(Vec::len),
        photodiode_events: detections
            .as_ref()
            .and_then(|loaded| loaded.as_ref().ok())
            .map(Vec::len),
    };
    if contract.has_failures() {
        warn!("Some session tables failed to load - see the data contract checks");
    }

    let mut runner = QcRunner::new();
    runner
        .add_suite(Box::new(contract))
        .add_suite(Box::new(SessionSuite::new(session.end_session_path.clone())));

    match samples {
        Ok(samples) => {
            let (detections, load_error) = match detections {
                Some(Ok(events)) => (Some(events), None),
                Some(Err(e)) => (None, Some(e.to_string())),
                None => (None, None),
            };
            let mut suite = RenderingSuite::new(samples, detections, session.expected_fps)
                .with_config(blueprint.rendering.clone());
            if let Some(error) = load_error {
                suite = suite.with_detection_load_error(error);
            }
            if render_plots {
                suite = suite.with_artifact_dir(&blueprint.artifacts.dir);
            }
            runner.add_suite(Box::new(suite));
        }
        Err(_) => warn!("Render-sync table unavailable - rendering suite not run"),
    }

    (runner.run_all(), inputs)
}
