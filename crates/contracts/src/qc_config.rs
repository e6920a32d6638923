//! Rendering check thresholds that can be shared across crates.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Multiplier applied to the frame period when no explicit latency tolerance is given
pub const DEFAULT_LATENCY_FRAMES: f64 = 5.0;

/// Thresholds for the rendering suite
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenderingQcConfig {
    /// Matcher tolerance (seconds); defaults to 5 frame periods
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0))]
    pub max_latency_s: Option<f64>,

    /// Verdict threshold on the std of successive differences (seconds)
    #[serde(default = "default_max_std_of_successive_diff")]
    #[validate(range(min = 0.0))]
    pub max_std_of_successive_diff_s: f64,

    /// Allowed absolute deviation of the mean frame interval (seconds)
    #[serde(default = "default_mean_interval_tolerance")]
    #[validate(range(min = 0.0))]
    pub mean_interval_tolerance_s: f64,

    /// Allowed excess of the 99th-percentile frame interval over the period (seconds)
    #[serde(default = "default_max_percentile_excess")]
    #[validate(range(min = 0.0))]
    pub max_percentile_excess_s: f64,
}

fn default_max_std_of_successive_diff() -> f64 {
    0.01
}

fn default_mean_interval_tolerance() -> f64 {
    1.0
}

fn default_max_percentile_excess() -> f64 {
    0.2
}

impl Default for RenderingQcConfig {
    fn default() -> Self {
        Self {
            max_latency_s: None,
            max_std_of_successive_diff_s: default_max_std_of_successive_diff(),
            mean_interval_tolerance_s: default_mean_interval_tolerance(),
            max_percentile_excess_s: default_max_percentile_excess(),
        }
    }
}

impl RenderingQcConfig {
    /// Effective matcher tolerance for a given frame rate
    pub fn effective_max_latency(&self, expected_fps: f64) -> f64 {
        self.max_latency_s
            .unwrap_or(DEFAULT_LATENCY_FRAMES / expected_fps)
    }

    /// Thresholds consumed by the latency verdict
    pub fn latency_thresholds(&self) -> LatencyThresholds {
        LatencyThresholds {
            max_std_of_successive_diff: self.max_std_of_successive_diff_s,
        }
    }

    /// Thresholds consumed by the FPS check
    pub fn fps_thresholds(&self) -> FpsThresholds {
        FpsThresholds {
            mean_interval_tolerance: self.mean_interval_tolerance_s,
            max_percentile_excess: self.max_percentile_excess_s,
        }
    }
}

/// Latency verdict thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyThresholds {
    pub max_std_of_successive_diff: f64,
}

impl Default for LatencyThresholds {
    fn default() -> Self {
        Self {
            max_std_of_successive_diff: default_max_std_of_successive_diff(),
        }
    }
}

/// Frame-rate check thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FpsThresholds {
    pub mean_interval_tolerance: f64,
    pub max_percentile_excess: f64,
}

impl Default for FpsThresholds {
    fn default() -> Self {
        Self {
            mean_interval_tolerance: default_mean_interval_tolerance(),
            max_percentile_excess: default_max_percentile_excess(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_latency_is_five_frames() {
        let config = RenderingQcConfig::default();
        assert!((config.effective_max_latency(60.0) - 5.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_latency_wins() {
        let config = RenderingQcConfig {
            max_latency_s: Some(0.015),
            ..Default::default()
        };
        assert_eq!(config.effective_max_latency(60.0), 0.015);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config = RenderingQcConfig {
            max_std_of_successive_diff_s: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
