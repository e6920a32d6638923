//! Session-level checks on the acquisition logs.

use std::path::{Path, PathBuf};

use contracts::{CheckOutcome, MetricValue, QcSuite};
use tracing::debug;

use crate::error::{IngestionError, Result};
use crate::table::CsvTable;

pub const SESSION_SUITE: &str = "Session";
pub const END_SESSION_EXISTS: &str = "end_session_exists";

/// Checks that the acquisition closed the session properly
#[derive(Debug, Clone, Default)]
pub struct SessionSuite {
    end_session_path: Option<PathBuf>,
}

impl SessionSuite {
    /// Without an end-session log the check is skipped
    pub fn new(end_session_path: Option<PathBuf>) -> Self {
        Self { end_session_path }
    }

    /// The end-session log must exist and hold at least one record
    pub fn check_end_session_exists(&self) -> CheckOutcome {
        let Some(path) = &self.end_session_path else {
            return CheckOutcome::skipped(END_SESSION_EXISTS, "No end-session log configured.");
        };
        if !path.is_file() {
            return CheckOutcome::failed(
                END_SESSION_EXISTS,
                format!("End session log not found: {}", path.display()),
            );
        }
        match count_records(path) {
            Ok(0) | Err(IngestionError::Empty { .. }) => CheckOutcome::failed(
                END_SESSION_EXISTS,
                format!("End session log is empty: {}", path.display()),
            ),
            Ok(records) => {
                debug!(records, path = %path.display(), "end session log found");
                CheckOutcome::passed(END_SESSION_EXISTS, "End session log exists.").with_metrics([(
                    "records".to_string(),
                    MetricValue::Count(records as u64),
                )])
            }
            Err(e) => CheckOutcome::failed(END_SESSION_EXISTS, e.to_string()),
        }
    }
}

/// Data rows of a CSV table, non-blank lines of anything else
fn count_records(path: &Path) -> Result<usize> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        return CsvTable::from_path(path).map(|table| table.len());
    }
    let content = std::fs::read_to_string(path).map_err(|e| IngestionError::io(path, e))?;
    Ok(content.lines().filter(|line| !line.trim().is_empty()).count())
}

impl QcSuite for SessionSuite {
    fn name(&self) -> &str {
        SESSION_SUITE
    }

    fn run(&self) -> Vec<CheckOutcome> {
        vec![self.check_end_session_exists()]
    }
}
