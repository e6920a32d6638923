//! Latency verdict.

use contracts::{Artifact, CheckOutcome, LatencyMetrics, LatencyThresholds, MetricValue};
use serde::Serialize;

/// Pass/fail verdict of the latency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

/// Metrics, threshold, verdict and rendered figures of one latency run
///
/// Every metric is retained whatever the verdict.
#[derive(Debug, Clone, Serialize)]
pub struct LatencyReport {
    metrics: LatencyMetrics,
    threshold: f64,
    verdict: Verdict,
    artifacts: Vec<Artifact>,
}

impl LatencyReport {
    /// Pass iff the successive-difference std is at most the threshold
    ///
    /// An undefined fit (`NaN` r²) or an undefined std fails.
    pub fn evaluate(metrics: LatencyMetrics, thresholds: &LatencyThresholds) -> Self {
        let std = metrics.std_toggle_diff_diff;
        let threshold = thresholds.max_std_of_successive_diff;
        let pass = !metrics.regression.r_squared.is_nan() && !std.is_nan() && std <= threshold;

        Self {
            metrics,
            threshold,
            verdict: if pass { Verdict::Pass } else { Verdict::Fail },
            artifacts: Vec::new(),
        }
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    pub fn metrics(&self) -> &LatencyMetrics {
        &self.metrics
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn is_pass(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Human-readable summary
    pub fn message(&self) -> String {
        let m = &self.metrics;
        if m.regression.r_squared.is_nan() {
            return format!(
                "Regression undefined over {} matched toggles (zero-variance detection times).",
                m.toggles_photodiode
            );
        }
        let relation = match self.verdict {
            Verdict::Pass => "within",
            Verdict::Fail => "exceeds",
        };
        format!(
            "Std of successive timing differences {:.6}s {} threshold {}s ({}/{} toggles matched, r²={:.6}).",
            m.std_toggle_diff_diff,
            relation,
            self.threshold,
            m.toggles_photodiode,
            m.toggles_gpu,
            m.regression.r_squared
        )
    }

    /// Convert into a check outcome
    pub fn into_outcome(self, check: &str) -> CheckOutcome {
        let message = self.message();
        let outcome = match self.verdict {
            Verdict::Pass => CheckOutcome::passed(check, message),
            Verdict::Fail => CheckOutcome::failed(check, message),
        };
        let threshold = (
            "max_std_of_successive_diff".to_string(),
            MetricValue::Float(self.threshold),
        );
        self.artifacts.into_iter().fold(
            outcome
                .with_metrics(self.metrics.to_metric_map())
                .with_metrics([threshold]),
            CheckOutcome::with_artifact,
        )
    }
}
