//! Typed metric records produced by the rendering checks.

use serde::{Deserialize, Serialize};

use crate::MetricValue;

/// Affine fit `detection_time ≈ slope · gpu_time + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// `NaN` when the detection times have zero variance
    pub r_squared: f64,
}

impl RegressionResult {
    /// Whether every field is a usable number
    pub fn is_well_defined(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite() && self.r_squared.is_finite()
    }
}

/// Aggregate statistics of one render-latency run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyMetrics {
    /// Toggles that entered the matcher
    pub toggles_gpu: usize,
    /// Toggles with a matched detection
    pub toggles_photodiode: usize,
    /// Toggles left without a detection
    pub unmatched_toggles: usize,
    /// Tolerance used by the matcher (seconds)
    pub max_latency: f64,
    /// Fit over matched pairs
    pub regression: RegressionResult,
    /// Mean of `gpu_time - detection_time`
    pub mean_toggle_diff: f64,
    /// Population std of `gpu_time - detection_time`
    pub std_toggle_diff: f64,
    /// Mean of `Δgpu - Δdetection` over consecutive matched pairs
    pub mean_toggle_diff_diff: f64,
    /// Population std of `Δgpu - Δdetection`
    pub std_toggle_diff_diff: f64,
    /// Number of consecutive matched pairs behind the successive-difference stats
    pub successive_samples: usize,
}

impl LatencyMetrics {
    /// Flatten into the string-keyed form consumed by report sinks
    pub fn to_metric_map(&self) -> Vec<(String, MetricValue)> {
        vec![
            ("toggles_gpu".into(), MetricValue::Count(self.toggles_gpu as u64)),
            (
                "toggles_photodiode".into(),
                MetricValue::Count(self.toggles_photodiode as u64),
            ),
            (
                "unmatched_toggles".into(),
                MetricValue::Count(self.unmatched_toggles as u64),
            ),
            ("max_latency".into(), MetricValue::Float(self.max_latency)),
            ("slope".into(), MetricValue::Float(self.regression.slope)),
            ("intercept".into(), MetricValue::Float(self.regression.intercept)),
            ("r_squared".into(), MetricValue::Float(self.regression.r_squared)),
            ("mean_toggle_diff".into(), MetricValue::Float(self.mean_toggle_diff)),
            ("std_toggle_diff".into(), MetricValue::Float(self.std_toggle_diff)),
            (
                "mean_toggle_diff_diff".into(),
                MetricValue::Float(self.mean_toggle_diff_diff),
            ),
            (
                "std_toggle_diff_diff".into(),
                MetricValue::Float(self.std_toggle_diff_diff),
            ),
            (
                "successive_samples".into(),
                MetricValue::Count(self.successive_samples as u64),
            ),
        ]
    }
}

/// Inter-frame interval statistics against the expected frame period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FpsMetrics {
    /// `1 / expected_fps` (seconds)
    pub expected_period: f64,
    pub interval_mean: f64,
    /// Sample std (n - 1)
    pub interval_std: f64,
    pub interval_p01: f64,
    pub interval_p99: f64,
    pub is_mean_ok: bool,
    pub is_p99_ok: bool,
}

impl FpsMetrics {
    pub fn is_ok(&self) -> bool {
        self.is_mean_ok && self.is_p99_ok
    }

    pub fn to_metric_map(&self) -> Vec<(String, MetricValue)> {
        vec![
            ("expected_period".into(), MetricValue::Float(self.expected_period)),
            ("fps_mean".into(), MetricValue::Float(self.interval_mean)),
            ("fps_std".into(), MetricValue::Float(self.interval_std)),
            ("fps_perc_0.01".into(), MetricValue::Float(self.interval_p01)),
            ("fps_perc_0.99".into(), MetricValue::Float(self.interval_p99)),
            ("is_fps_mean_ok".into(), MetricValue::Flag(self.is_mean_ok)),
            ("is_fps_max_percentile_ok".into(), MetricValue::Flag(self.is_p99_ok)),
        ]
    }
}
