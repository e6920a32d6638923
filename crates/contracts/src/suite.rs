//! QcSuite trait - a named group of checks.

use crate::CheckOutcome;

/// A group of quality-control checks run together
///
/// Implementations never panic on bad data: malformed input becomes a failed
/// outcome so the remaining checks still execute.
pub trait QcSuite {
    /// Suite name used as the report group
    fn name(&self) -> &str;

    /// Run every check of the suite
    fn run(&self) -> Vec<CheckOutcome>;
}
