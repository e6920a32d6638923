//! Rendering QC suite.
//!
//! Bundles the ancillary checks and the render-latency check over one
//! session's render-sync log and photodiode detections.

use std::path::PathBuf;

use contracts::{
    AlignedPair, CheckOutcome, DetectionEvent, Event, EventSeries, QcSuite, QuadState,
    RenderSyncSample, RenderingQcConfig,
};
use tracing::{debug, info, instrument, warn};

use crate::checks::{
    check_all_frames_logged, check_binary_quad_state, check_expected_fps, RENDER_LATENCY,
};
use crate::error::{RenderSyncError, Result};
use crate::matcher::DriftCorrectedMatcher;
use crate::plots::render_latency_figure;
use crate::regression::RegressionValidator;
use crate::report::LatencyReport;
use crate::toggle::ToggleExtractor;

pub const SUITE_NAME: &str = "Rendering";

/// Zero-anchored inputs for the matcher, with the origins needed to map
/// matches back onto the recorded clocks
#[derive(Debug, Clone)]
pub struct PreparedAlignment {
    pub gpu: EventSeries<QuadState>,
    pub sensor: EventSeries<QuadState>,
    pub gpu_origin: f64,
    pub sensor_origin: f64,
}

impl PreparedAlignment {
    /// Shift matched pairs back onto the recorded clocks
    pub fn rebase(&self, pairs: &[AlignedPair]) -> Vec<AlignedPair> {
        pairs
            .iter()
            .map(|p| p.rebased(self.gpu_origin, self.sensor_origin))
            .collect()
    }
}

/// Build matcher inputs from toggles and detections
///
/// Starts at the first toggle whose state equals the first detection's
/// polarity, drops the first event of both streams (it may have been caught
/// mid-transition) and zero-anchors what is left.
///
/// # Errors
/// - `PolarityMismatch` when no toggle has the first detection's polarity, or
///   the remaining first events disagree
/// - `EmptySeries` when either stream runs out
pub fn prepare_alignment(
    toggles: &EventSeries<QuadState>,
    detections: &EventSeries<QuadState>,
) -> Result<PreparedAlignment> {
    let detection_polarity = detections
        .get(0)
        .map(|event| *event.value)
        .ok_or(RenderSyncError::EmptySeries {
            series: "photodiode",
        })?;

    let start = toggles
        .values()
        .iter()
        .position(|&state| state == detection_polarity)
        .ok_or(RenderSyncError::PolarityMismatch {
            toggle: None,
            detection: detection_polarity,
        })?;

    let gpu = toggles.skip(start + 1);
    let sensor = detections.skip(1);

    let (first_toggle, first_detection) = match (gpu.values().first(), sensor.values().first()) {
        (Some(&t), Some(&d)) => (t, d),
        (None, _) => return Err(RenderSyncError::EmptySeries { series: "gpu" }),
        (_, None) => return Err(RenderSyncError::EmptySeries { series: "photodiode" }),
    };
    if first_toggle != first_detection {
        return Err(RenderSyncError::PolarityMismatch {
            toggle: Some(first_toggle),
            detection: first_detection,
        });
    }

    let (gpu, gpu_origin) = gpu.zero_anchored();
    let (sensor, sensor_origin) = sensor.zero_anchored();

    Ok(PreparedAlignment {
        gpu,
        sensor,
        gpu_origin,
        sensor_origin,
    })
}

/// Rendering suite for one session
#[derive(Debug, Clone)]
pub struct RenderingSuite {
    samples: Vec<RenderSyncSample>,
    detections: Option<Vec<DetectionEvent>>,
    detection_error: Option<String>,
    expected_fps: f64,
    config: RenderingQcConfig,
    artifact_dir: Option<PathBuf>,
}

impl RenderingSuite {
    /// Without detections the latency check is skipped
    pub fn new(
        samples: Vec<RenderSyncSample>,
        detections: Option<Vec<DetectionEvent>>,
        expected_fps: f64,
    ) -> Self {
        Self {
            samples,
            detections,
            detection_error: None,
            expected_fps,
            config: RenderingQcConfig::default(),
            artifact_dir: None,
        }
    }

    pub fn with_config(mut self, config: RenderingQcConfig) -> Self {
        self.config = config;
        self
    }

    /// Write diagnostic figures into `dir`
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    /// Photodiode events were configured but could not be loaded
    ///
    /// The latency check then fails with `message` instead of being skipped.
    pub fn with_detection_load_error(mut self, message: impl Into<String>) -> Self {
        self.detections = None;
        self.detection_error = Some(message.into());
        self
    }

    pub fn max_latency(&self) -> f64 {
        self.config.effective_max_latency(self.expected_fps)
    }

    /// Render-latency check as an outcome
    pub fn check_render_latency(&self) -> CheckOutcome {
        let Some(detections) = &self.detections else {
            return match &self.detection_error {
                Some(error) => CheckOutcome::failed(
                    RENDER_LATENCY,
                    format!("Photodiode events could not be loaded: {error}"),
                ),
                None => CheckOutcome::skipped(RENDER_LATENCY, "No photodiode events available."),
            };
        };
        match self.latency_report(detections) {
            Ok(report) => report.into_outcome(RENDER_LATENCY),
            Err(e) => CheckOutcome::failed(RENDER_LATENCY, e.to_string()),
        }
    }

    /// Full latency pipeline: toggles, preparation, matching, statistics, verdict
    #[instrument(name = "render_latency", skip_all, fields(samples = self.samples.len(), detections = detections.len()))]
    pub fn latency_report(&self, detections: &[DetectionEvent]) -> Result<LatencyReport> {
        let extraction = ToggleExtractor.extract(&self.samples)?;
        let toggles = extraction.to_series()?;

        let detections = EventSeries::from_events(detections.iter().map(|d| Event {
            timestamp: d.detection_timestamp,
            value: d.polarity,
        }))?;
        let (detections, duplicates) = detections.monotonic_subset();
        if duplicates > 0 {
            warn!(duplicates, "dropped photodiode events with repeated timestamps");
        }

        let prepared = prepare_alignment(&toggles, &detections)?;
        let max_latency = self.max_latency();
        let pairs = DriftCorrectedMatcher::new(max_latency)
            .align(prepared.gpu.timestamps(), prepared.sensor.timestamps())?;
        let pairs = prepared.rebase(&pairs);

        let metrics = RegressionValidator.evaluate(&pairs, max_latency)?;
        observability::record_latency_metrics(&metrics);

        let mut report = LatencyReport::evaluate(metrics, &self.config.latency_thresholds());
        info!(
            verdict = ?report.verdict(),
            samples = extraction.sample_count(),
            matched = metrics.toggles_photodiode,
            toggles = metrics.toggles_gpu,
            std_toggle_diff_diff = metrics.std_toggle_diff_diff,
            "render latency evaluated"
        );

        if let Some(dir) = &self.artifact_dir {
            let figure = std::fs::create_dir_all(dir)
                .map_err(|e| RenderSyncError::plot(e.to_string()))
                .and_then(|_| {
                    render_latency_figure(&dir.join("render_latency.svg"), &pairs, &metrics)
                });
            match figure {
                Ok(artifact) => report = report.with_artifact(artifact),
                Err(e) => warn!(error = %e, "latency figure not rendered"),
            }
        }

        Ok(report)
    }
}

impl QcSuite for RenderingSuite {
    fn name(&self) -> &str {
        SUITE_NAME
    }

    fn run(&self) -> Vec<CheckOutcome> {
        debug!(samples = self.samples.len(), "running rendering suite");
        vec![
            check_binary_quad_state(&self.samples),
            check_all_frames_logged(&self.samples),
            check_expected_fps(
                &self.samples,
                self.expected_fps,
                &self.config.fps_thresholds(),
            ),
            self.check_render_latency(),
        ]
    }
}
