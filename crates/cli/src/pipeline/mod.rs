//! QC run orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{QcPipeline, QcPipelineConfig};
pub use stats::RunStats;
