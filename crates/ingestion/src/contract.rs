//! Data-contract suite: one outcome per session stream load.
//!
//! Load failures are recorded here instead of aborting the run, so the
//! report still carries every check that could execute.

use std::path::{Path, PathBuf};

use contracts::{CheckOutcome, MetricValue, QcSuite};
use tracing::warn;

use crate::error::Result;

pub const DATA_CONTRACT_SUITE: &str = "Data contract";
pub const RENDER_SYNC_STREAM: &str = "render_sync";
pub const DIGITAL_INPUT_STREAM: &str = "digital_input";

/// How a stream load ended
#[derive(Debug, Clone, PartialEq)]
enum LoadStatus {
    Loaded { records: usize },
    Failed(String),
    NotConfigured,
}

#[derive(Debug, Clone)]
struct StreamLoad {
    stream: String,
    path: Option<PathBuf>,
    status: LoadStatus,
}

/// Collects stream load results and reports them as checks
#[derive(Debug, Clone, Default)]
pub struct DataContractSuite {
    loads: Vec<StreamLoad>,
}

impl DataContractSuite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a load result and hand it back unchanged
    pub fn track<T>(&mut self, stream: &str, path: &Path, result: Result<Vec<T>>) -> Result<Vec<T>> {
        let status = match &result {
            Ok(records) => LoadStatus::Loaded {
                records: records.len(),
            },
            Err(e) => {
                warn!(stream, path = %path.display(), error = %e, "stream failed to load");
                LoadStatus::Failed(e.to_string())
            }
        };
        self.loads.push(StreamLoad {
            stream: stream.to_string(),
            path: Some(path.to_path_buf()),
            status,
        });
        result
    }

    /// Record a stream that has no configured source
    pub fn not_configured(&mut self, stream: &str) {
        self.loads.push(StreamLoad {
            stream: stream.to_string(),
            path: None,
            status: LoadStatus::NotConfigured,
        });
    }

    /// Whether any tracked stream failed
    pub fn has_failures(&self) -> bool {
        self.loads
            .iter()
            .any(|load| matches!(load.status, LoadStatus::Failed(_)))
    }
}

impl QcSuite for DataContractSuite {
    fn name(&self) -> &str {
        DATA_CONTRACT_SUITE
    }

    fn run(&self) -> Vec<CheckOutcome> {
        self.loads
            .iter()
            .map(|load| {
                let path = load
                    .path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                match &load.status {
                    LoadStatus::Loaded { records } => CheckOutcome::passed(
                        &load.stream,
                        format!("Loaded {records} record(s) from {path}."),
                    )
                    .with_metrics([(
                        "records".to_string(),
                        MetricValue::Count(*records as u64),
                    )]),
                    LoadStatus::Failed(error) => CheckOutcome::failed(
                        &load.stream,
                        format!("Failed to load {path}: {error}"),
                    ),
                    LoadStatus::NotConfigured => {
                        CheckOutcome::skipped(&load.stream, "No source configured.")
                    }
                }
            })
            .collect()
    }
}
