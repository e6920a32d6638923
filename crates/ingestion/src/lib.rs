//! # Ingestion
//!
//! Session table ingestion.
//!
//! Responsibilities:
//! - Read the renderer sync-state table into `RenderSyncSample` rows
//! - Read the Harp digital-input table into photodiode `DetectionEvent`s
//! - Report missing columns and unparsable cells with their line number
//! - Turn stream load results into the "Data contract" suite
//! - Check the end-of-session log ("Session" suite)
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{load_photodiode_events, load_render_sync, DigitalInputColumns};
//!
//! let samples = load_render_sync(Path::new("RendererSynchState.csv"))?;
//! let detections = load_photodiode_events(
//!     Path::new("Behavior_DigitalInputState.csv"),
//!     &DigitalInputColumns::default(),
//! )?;
//! ```

mod contract;
mod digital_input;
mod error;
mod renderer;
mod session;
mod table;

pub use contract::{
    DataContractSuite, DATA_CONTRACT_SUITE, DIGITAL_INPUT_STREAM, RENDER_SYNC_STREAM,
};
pub use digital_input::{
    load_photodiode_events, photodiode_events_from_table, DigitalInputColumns,
};
pub use error::{IngestionError, Result};
pub use renderer::{load_render_sync, render_sync_from_table};
pub use session::{SessionSuite, END_SESSION_EXISTS, SESSION_SUITE};
pub use table::{Column, CsvTable, Row};
