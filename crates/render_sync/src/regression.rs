//! Regression and residual statistics over aligned pairs.

use contracts::{AlignedPair, LatencyMetrics, RegressionResult};
use tracing::{debug, instrument};

use crate::error::{RenderSyncError, Result};

/// Mean and population standard deviation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dispersion {
    pub mean: f64,
    pub std: f64,
}

impl Dispersion {
    /// `NaN` for both fields on an empty slice
    pub fn population(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: f64::NAN,
                std: f64::NAN,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean,
            std: variance.sqrt(),
        }
    }
}

/// Ordinary least squares fit `y ≈ slope · x + intercept`
///
/// Zero variance in `x` leaves the fit undefined (all fields `NaN`); zero
/// variance in `y` leaves only `r_squared` undefined.
pub fn linear_regression(x: &[f64], y: &[f64]) -> RegressionResult {
    let n = x.len().min(y.len());
    let undefined = RegressionResult {
        slope: f64::NAN,
        intercept: f64::NAN,
        r_squared: f64::NAN,
    };
    if n == 0 {
        return undefined;
    }
    let (x, y) = (&x[..n], &y[..n]);

    let mean = |v: &[f64]| v.iter().sum::<f64>() / n as f64;
    let mx = mean(x);
    let my = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        sxy += dx * (yi - my);
        sxx += dx * dx;
    }
    if sxx == 0.0 {
        return undefined;
    }

    let slope = sxy / sxx;
    let intercept = my - slope * mx;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        ss_res += (yi - (slope * xi + intercept)).powi(2);
        ss_tot += (yi - my).powi(2);
    }
    let r_squared = if ss_tot == 0.0 {
        f64::NAN
    } else {
        1.0 - ss_res / ss_tot
    };

    RegressionResult {
        slope,
        intercept,
        r_squared,
    }
}

/// `gpu_time - detection_time` for every matched pair
pub fn residuals(pairs: &[AlignedPair]) -> Vec<f64> {
    pairs.iter().filter_map(AlignedPair::residual).collect()
}

/// `Δgpu - Δdetection` for every pair of adjacent, both-matched toggles
pub fn successive_differences(pairs: &[AlignedPair]) -> Vec<f64> {
    pairs
        .windows(2)
        .filter_map(|w| {
            let (d0, d1) = (w[0].detection_time?, w[1].detection_time?);
            Some((w[1].gpu_time - w[0].gpu_time) - (d1 - d0))
        })
        .collect()
}

/// Fits the affine model and computes the dispersion statistics
#[derive(Debug, Default, Clone, Copy)]
pub struct RegressionValidator;

impl RegressionValidator {
    /// Regression over matched pairs only
    ///
    /// # Errors
    /// `InsufficientMatches` with fewer than two matched pairs.
    pub fn fit(&self, pairs: &[AlignedPair]) -> Result<RegressionResult> {
        let (x, y): (Vec<f64>, Vec<f64>) = pairs
            .iter()
            .filter_map(|p| p.detection_time.map(|d| (p.gpu_time, d)))
            .unzip();
        if x.len() < 2 {
            return Err(RenderSyncError::InsufficientMatches { matched: x.len() });
        }
        Ok(linear_regression(&x, &y))
    }

    /// Full metric record for one alignment
    #[instrument(name = "regression_evaluate", skip_all, fields(pairs = pairs.len()))]
    pub fn evaluate(&self, pairs: &[AlignedPair], max_latency: f64) -> Result<LatencyMetrics> {
        let regression = self.fit(pairs)?;

        let residuals = residuals(pairs);
        let successive = successive_differences(pairs);
        let toggle_diff = Dispersion::population(&residuals);
        let toggle_diff_diff = Dispersion::population(&successive);

        let metrics = LatencyMetrics {
            toggles_gpu: pairs.len(),
            toggles_photodiode: residuals.len(),
            unmatched_toggles: pairs.len() - residuals.len(),
            max_latency,
            regression,
            mean_toggle_diff: toggle_diff.mean,
            std_toggle_diff: toggle_diff.std,
            mean_toggle_diff_diff: toggle_diff_diff.mean,
            std_toggle_diff_diff: toggle_diff_diff.std,
            successive_samples: successive.len(),
        };

        debug!(
            slope = regression.slope,
            r_squared = regression.r_squared,
            std_toggle_diff_diff = metrics.std_toggle_diff_diff,
            "regression evaluated"
        );

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(toggle_index: usize, gpu_time: f64, detection_time: Option<f64>) -> AlignedPair {
        AlignedPair {
            toggle_index,
            gpu_time,
            detection_time,
        }
    }

    #[test]
    fn test_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let fit = linear_regression(&x, &y);
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_target_has_nan_r_squared() {
        let fit = linear_regression(&[0.0, 1.0, 2.0], &[4.0, 4.0, 4.0]);
        assert_eq!(fit.slope, 0.0);
        assert!(fit.r_squared.is_nan());
        assert!(!fit.is_well_defined());
    }

    #[test]
    fn test_constant_input_is_undefined() {
        let fit = linear_regression(&[1.0, 1.0], &[0.0, 2.0]);
        assert!(fit.slope.is_nan());
        assert!(fit.intercept.is_nan());
    }

    #[test]
    fn test_noisy_fit_r_squared_below_one() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.1, 0.9, 2.2, 2.8, 4.1];
        let fit = linear_regression(&x, &y);
        assert!(fit.r_squared > 0.95 && fit.r_squared < 1.0);
    }

    #[test]
    fn test_insufficient_matches() {
        let pairs = [pair(0, 0.0, Some(0.0)), pair(1, 1.0, None)];
        assert!(matches!(
            RegressionValidator.fit(&pairs),
            Err(RenderSyncError::InsufficientMatches { matched: 1 })
        ));
    }

    #[test]
    fn test_successive_differences_skip_gaps() {
        let pairs = [
            pair(0, 0.0, Some(0.0)),
            pair(1, 1.0, Some(1.5)),
            pair(2, 2.0, None),
            pair(3, 3.0, Some(3.0)),
            pair(4, 4.0, Some(4.25)),
        ];
        assert_eq!(successive_differences(&pairs), vec![-0.5, -0.25]);
        assert_eq!(residuals(&pairs), vec![0.0, -0.5, 0.0, -0.25]);
    }

    #[test]
    fn test_population_std() {
        let d = Dispersion::population(&[1.0, 3.0]);
        assert_eq!(d.mean, 2.0);
        assert_eq!(d.std, 1.0);
        assert!(Dispersion::population(&[]).mean.is_nan());
    }

    #[test]
    fn test_evaluate_counts() {
        let pairs = [
            pair(0, 0.0, Some(0.01)),
            pair(1, 1.0, Some(1.01)),
            pair(2, 2.0, None),
            pair(3, 3.0, Some(3.01)),
        ];
        let metrics = RegressionValidator.evaluate(&pairs, 0.015).unwrap();
        assert_eq!(metrics.toggles_gpu, 4);
        assert_eq!(metrics.toggles_photodiode, 3);
        assert_eq!(metrics.unmatched_toggles, 1);
        assert_eq!(metrics.successive_samples, 1);
        assert!((metrics.mean_toggle_diff + 0.01).abs() < 1e-12);
        assert!(metrics.std_toggle_diff < 1e-12);
        assert!((metrics.regression.slope - 1.0).abs() < 1e-12);
    }
}
