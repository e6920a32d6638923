//! Harp digital-input table.
//!
//! Only `EVENT` messages carry port transitions. A row counts as a detection
//! when the photodiode port level differs from the previous event row; the
//! first event row always counts.

use std::path::Path;

use contracts::{DetectionEvent, QuadState};
use tracing::{debug, instrument};

use crate::error::{IngestionError, Result};
use crate::table::CsvTable;

pub const MESSAGE_TYPE_COLUMN: &str = "MessageType";
pub const EVENT_MESSAGE: &str = "EVENT";

/// Column selection for the digital-input table
#[derive(Debug, Clone)]
pub struct DigitalInputColumns {
    /// Timestamp column (Harp seconds)
    pub time: String,
    /// Photodiode port column
    pub port: String,
}

impl Default for DigitalInputColumns {
    fn default() -> Self {
        Self {
            time: "Seconds".to_string(),
            port: "DIPort0".to_string(),
        }
    }
}

/// Load photodiode detections from disk
#[instrument(name = "load_photodiode_events", skip_all, fields(path = %path.display(), port = %columns.port))]
pub fn load_photodiode_events(
    path: &Path,
    columns: &DigitalInputColumns,
) -> Result<Vec<DetectionEvent>> {
    let table = CsvTable::from_path(path)?;
    observability::record_rows_loaded("digital_input", table.len());
    let events = photodiode_events_from_table(&table, columns)?;
    debug!(
        rows = table.len(),
        detections = events.len(),
        "digital input table loaded"
    );
    Ok(events)
}

/// Extract detections from an already-read table
pub fn photodiode_events_from_table(
    table: &CsvTable,
    columns: &DigitalInputColumns,
) -> Result<Vec<DetectionEvent>> {
    let time = table.column(&columns.time)?;
    let port = table.column(&columns.port)?;
    let message_type = table.column(MESSAGE_TYPE_COLUMN)?;

    let mut events = Vec::new();
    let mut previous: Option<QuadState> = None;

    for row in table.rows() {
        if message_type.raw(row) != EVENT_MESSAGE {
            continue;
        }

        let level = parse_level(port.raw(row))
            .ok_or_else(|| IngestionError::parse(row.line, columns.port.as_str(), port.raw(row)))?;

        if previous != Some(level) {
            events.push(DetectionEvent {
                detection_timestamp: time.parse(row)?,
                polarity: level,
            });
        }
        previous = Some(level);
    }

    Ok(events)
}

/// Port level: `0`/`1` or `true`/`false` (case-insensitive)
fn parse_level(raw: &str) -> Option<QuadState> {
    let level = match raw.to_ascii_lowercase().as_str() {
        "1" | "true" => true,
        "0" | "false" => false,
        _ => return None,
    };
    Some(QuadState::from(level))
}
