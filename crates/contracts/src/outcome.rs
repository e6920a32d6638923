//! Check outcomes and the session-level report handed to sinks.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scalar metric attached to an outcome
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Flag(bool),
    Count(u64),
    Float(f64),
}

impl MetricValue {
    /// Numeric view (flags map to 0/1)
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Flag(flag) => f64::from(u8::from(flag)),
            Self::Count(count) => count as f64,
            Self::Float(value) => value,
        }
    }
}

/// Result status of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed,
    Skipped,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Rendered diagnostic file attached to an outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Short identifier (e.g. `render_latency`)
    pub name: String,
    /// Location on disk
    pub path: PathBuf,
    /// MIME type of the file
    pub media_type: String,
}

impl Artifact {
    pub fn svg(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            media_type: "image/svg+xml".to_string(),
        }
    }
}

/// Outcome of one check: `(verdict, message, metrics, artifacts)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Suite (group) the check belongs to; filled in by the runner
    pub suite: String,
    /// Check name
    pub check: String,
    pub status: CheckStatus,
    pub message: String,
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricValue>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl CheckOutcome {
    fn new(check: impl Into<String>, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            suite: String::new(),
            check: check.into(),
            status,
            message: message.into(),
            metrics: BTreeMap::new(),
            artifacts: Vec::new(),
        }
    }

    pub fn passed(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(check, CheckStatus::Passed, message)
    }

    pub fn failed(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(check, CheckStatus::Failed, message)
    }

    pub fn skipped(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(check, CheckStatus::Skipped, message)
    }

    /// Attach metrics
    pub fn with_metrics(mut self, metrics: impl IntoIterator<Item = (String, MetricValue)>) -> Self {
        self.metrics.extend(metrics);
        self
    }

    /// Attach a diagnostic artifact
    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    /// Set the suite name
    pub fn in_suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = suite.into();
        self
    }

    pub fn metric(&self, key: &str) -> Option<MetricValue> {
        self.metrics.get(key).copied()
    }
}

/// Session-level aggregation of every check outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub generated_at: DateTime<Utc>,
    pub outcomes: Vec<CheckOutcome>,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SessionReport {
    /// Build a report, counting statuses
    pub fn from_outcomes(outcomes: Vec<CheckOutcome>) -> Self {
        let count = |status| outcomes.iter().filter(|o| o.status == status).count();
        Self {
            generated_at: Utc::now(),
            passed: count(CheckStatus::Passed),
            failed: count(CheckStatus::Failed),
            skipped: count(CheckStatus::Skipped),
            outcomes,
        }
    }

    /// A session passes when no check failed
    pub fn is_passing(&self) -> bool {
        self.failed == 0
    }

    /// Look up an outcome by suite and check name
    pub fn find(&self, suite: &str, check: &str) -> Option<&CheckOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.suite == suite && o.check == check)
    }
}
