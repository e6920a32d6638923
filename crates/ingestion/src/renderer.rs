//! Renderer sync-state table (`RendererSynchState.csv`).

use std::path::Path;

use contracts::RenderSyncSample;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::table::CsvTable;

pub const FRAME_INDEX_COLUMN: &str = "FrameIndex";
pub const FRAME_TIMESTAMP_COLUMN: &str = "FrameTimestamp";
pub const SYNC_QUAD_COLUMN: &str = "SyncQuadValue";

/// Load the render-sync table from disk
#[instrument(name = "load_render_sync", skip_all, fields(path = %path.display()))]
pub fn load_render_sync(path: &Path) -> Result<Vec<RenderSyncSample>> {
    let table = CsvTable::from_path(path)?;
    let samples = render_sync_from_table(&table)?;
    observability::record_rows_loaded("render_sync", samples.len());
    debug!(rows = samples.len(), "render sync table loaded");
    Ok(samples)
}

/// Convert an already-read table into samples
///
/// The quad value is kept raw; domain checks happen downstream.
pub fn render_sync_from_table(table: &CsvTable) -> Result<Vec<RenderSyncSample>> {
    let frame_index = table.column(FRAME_INDEX_COLUMN)?;
    let frame_timestamp = table.column(FRAME_TIMESTAMP_COLUMN)?;
    let quad_value = table.column(SYNC_QUAD_COLUMN)?;

    table
        .rows()
        .iter()
        .map(|row| -> Result<RenderSyncSample> {
            Ok(RenderSyncSample {
                frame_index: frame_index.parse(row)?,
                frame_timestamp: frame_timestamp.parse(row)?,
                quad_value: quad_value.parse(row)?,
            })
        })
        .collect()
}
