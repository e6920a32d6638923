//! Ancillary render-sync checks: signal domain, frame completeness, frame rate.

use contracts::{
    CheckOutcome, EventSeries, FpsMetrics, FpsThresholds, MetricValue, RenderSyncSample,
};
use observability::RunningStats;
use tracing::instrument;

use crate::error::{RenderSyncError, Result};
use crate::toggle::{frame_gaps, signal_domain};

pub const BINARY_QUAD_STATE: &str = "binary_quad_state";
pub const ALL_FRAMES_LOGGED: &str = "all_frames_logged";
pub const EXPECTED_FPS: &str = "expected_fps";
pub const RENDER_LATENCY: &str = "render_latency";

/// Passes only when the distinct quad values are exactly {0, 1}
pub fn check_binary_quad_state(samples: &[RenderSyncSample]) -> CheckOutcome {
    let domain = signal_domain(samples);
    if domain == [0.0, 1.0] {
        CheckOutcome::passed(
            BINARY_QUAD_STATE,
            "Two quad states found in render sync log (0, 1).",
        )
    } else {
        CheckOutcome::failed(
            BINARY_QUAD_STATE,
            format!("Quad states in render sync log are not binary. Found: {domain:?}"),
        )
    }
}

/// Passes only when every frame-index step is exactly 1
pub fn check_all_frames_logged(samples: &[RenderSyncSample]) -> CheckOutcome {
    let gaps = frame_gaps(samples);
    let breaks = ("frame_breaks".to_string(), MetricValue::Count(gaps.len() as u64));
    match gaps.first() {
        None => CheckOutcome::passed(ALL_FRAMES_LOGGED, "All frames are logged.")
            .with_metrics([breaks]),
        Some(&first) => {
            let frames: Vec<i64> = gaps.iter().map(|g| g.after_frame).collect();
            CheckOutcome::failed(
                ALL_FRAMES_LOGGED,
                format!(
                    "{} ({} break(s), after frames {frames:?})",
                    RenderSyncError::from(first),
                    gaps.len()
                ),
            )
            .with_metrics([breaks])
        }
    }
}

/// Inter-frame interval statistics
///
/// # Errors
/// - `EmptySeries` when fewer than two frames are logged
/// - `Contract` when frame timestamps go backwards
pub fn fps_metrics(
    samples: &[RenderSyncSample],
    expected_fps: f64,
    thresholds: &FpsThresholds,
) -> Result<FpsMetrics> {
    let frames = EventSeries::from_timestamps(
        samples.iter().map(|s| s.frame_timestamp).collect(),
    )?;
    let intervals = frames.diff();
    if intervals.is_empty() {
        return Err(RenderSyncError::EmptySeries {
            series: "frame_interval",
        });
    }

    let expected_period = 1.0 / expected_fps;
    let stats = RunningStats::from_values(intervals.iter().copied());
    let interval_mean = stats.mean();
    let interval_std = stats.std_dev();

    let mut sorted = intervals;
    sorted.sort_by(f64::total_cmp);
    let interval_p01 = quantile(&sorted, 0.01);
    let interval_p99 = quantile(&sorted, 0.99);

    Ok(FpsMetrics {
        expected_period,
        interval_mean,
        interval_std,
        interval_p01,
        interval_p99,
        is_mean_ok: (interval_mean - expected_period).abs() <= thresholds.mean_interval_tolerance,
        is_p99_ok: interval_p99 - expected_period < thresholds.max_percentile_excess,
    })
}

/// Frame-rate check
#[instrument(name = "check_expected_fps", skip_all, fields(expected_fps = expected_fps))]
pub fn check_expected_fps(
    samples: &[RenderSyncSample],
    expected_fps: f64,
    thresholds: &FpsThresholds,
) -> CheckOutcome {
    match fps_metrics(samples, expected_fps, thresholds) {
        Ok(metrics) if metrics.is_ok() => CheckOutcome::passed(
            EXPECTED_FPS,
            "FPS metrics are within expected bounds.",
        )
        .with_metrics(metrics.to_metric_map()),
        Ok(metrics) => CheckOutcome::failed(
            EXPECTED_FPS,
            "FPS metrics are not within expected bounds.",
        )
        .with_metrics(metrics.to_metric_map()),
        Err(e) => CheckOutcome::failed(EXPECTED_FPS, e.to_string()),
    }
}

/// Linear-interpolated quantile of sorted data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let h = (len - 1) as f64 * q;
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(len - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}
