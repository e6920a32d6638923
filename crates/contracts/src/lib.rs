//! # Contracts
//!
//! Frozen interface contracts shared by every render-QC crate.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - All timestamps are seconds (`f64`) in the clock domain of the device that produced them
//! - The renderer clock and the photodiode (Harp) clock are never assumed to agree;
//!   alignment works on zero-anchored copies of each stream

mod alignment;
mod blueprint;
mod error;
mod metrics;
mod outcome;
mod qc_config;
mod series;
mod signal;
mod sink;
mod suite;

pub use alignment::*;
pub use blueprint::*;
pub use error::*;
pub use metrics::*;
pub use outcome::*;
pub use qc_config::*;
pub use series::{Event, EventSeries};
pub use signal::*;
pub use sink::*;
pub use suite::QcSuite;
