//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{QcPipeline, QcPipelineConfig};

use super::load_blueprint;

/// Execute the `run` command
///
/// Fails when the session does not pass, so the exit code reflects the verdict.
pub async fn run_qc(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let blueprint = load_blueprint(&args.config, args.data_root.as_ref())?;

    info!(
        render_sync = %blueprint.session.render_sync_path.display(),
        digital_input = ?blueprint.session.digital_input_path,
        end_session = ?blueprint.session.end_session_path,
        expected_fps = blueprint.session.expected_fps,
        max_latency_s = blueprint.effective_max_latency(),
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    let pipeline_config = QcPipelineConfig {
        blueprint,
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
        render_plots: !args.no_plots,
    };

    let stats = QcPipeline::new(pipeline_config)
        .run()
        .await
        .context("QC run failed")?;

    stats.print_summary();

    if stats.report.is_passing() {
        info!("Session passed QC");
        Ok(())
    } else {
        warn!(failed = stats.report.failed, "Session failed QC");
        Err(CliError::SessionFailed {
            failed: stats.report.failed,
        }
        .into())
    }
}
