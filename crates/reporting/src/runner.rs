//! QcRunner - runs every registered suite and builds the session report

use std::time::Instant;

use contracts::{CheckStatus, QcSuite, SessionReport};
use tracing::{info, instrument, warn};

/// A suite registered under a report group
struct RegisteredSuite {
    group: String,
    suite: Box<dyn QcSuite + Send>,
}

/// Runs QC suites in registration order
#[derive(Default)]
pub struct QcRunner {
    suites: Vec<RegisteredSuite>,
}

impl QcRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a suite under its own name
    pub fn add_suite(&mut self, suite: Box<dyn QcSuite + Send>) -> &mut Self {
        let group = suite.name().to_string();
        self.add_suite_in(group, suite)
    }

    /// Register a suite under an explicit group
    pub fn add_suite_in(
        &mut self,
        group: impl Into<String>,
        suite: Box<dyn QcSuite + Send>,
    ) -> &mut Self {
        self.suites.push(RegisteredSuite {
            group: group.into(),
            suite,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Run every suite and aggregate all outcomes
    #[instrument(name = "qc_runner_run_all", skip(self), fields(suites = self.suites.len()))]
    pub fn run_all(&self) -> SessionReport {
        let mut outcomes = Vec::new();

        for registered in &self.suites {
            let started = Instant::now();
            info!(group = %registered.group, "Running suite");

            for outcome in registered.suite.run() {
                let outcome = outcome.in_suite(&registered.group);
                observability::record_check_outcome(&outcome);
                match outcome.status {
                    CheckStatus::Failed => warn!(
                        group = %registered.group,
                        check = %outcome.check,
                        message = %outcome.message,
                        "Check failed"
                    ),
                    status => info!(
                        group = %registered.group,
                        check = %outcome.check,
                        status = status.as_str(),
                        "Check finished"
                    ),
                }
                outcomes.push(outcome);
            }

            info!(
                group = %registered.group,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Suite finished"
            );
        }

        let report = SessionReport::from_outcomes(outcomes);
        info!(
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            passing = report.is_passing(),
            "QC run complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::CheckOutcome;

    struct FixedSuite {
        name: &'static str,
        outcomes: Vec<CheckOutcome>,
    }

    impl QcSuite for FixedSuite {
        fn name(&self) -> &str {
            self.name
        }

        fn run(&self) -> Vec<CheckOutcome> {
            self.outcomes.clone()
        }
    }

    #[test]
    fn test_empty_runner_passes() {
        let runner = QcRunner::new();
        assert!(runner.is_empty());

        let report = runner.run_all();
        assert!(report.outcomes.is_empty());
        assert!(report.is_passing());
    }

    #[test]
    fn test_outcomes_are_grouped_and_counted() {
        let mut runner = QcRunner::new();
        runner
            .add_suite(Box::new(FixedSuite {
                name: "Rendering",
                outcomes: vec![
                    CheckOutcome::passed("binary_quad_state", "ok"),
                    CheckOutcome::skipped("render_latency", "no photodiode"),
                ],
            }))
            .add_suite_in(
                "Rendering/secondary",
                Box::new(FixedSuite {
                    name: "ignored",
                    outcomes: vec![CheckOutcome::failed("expected_fps", "too slow")],
                }),
            );
        assert_eq!(runner.len(), 2);

        let report = runner.run_all();
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!((report.passed, report.failed, report.skipped), (1, 1, 1));
        assert!(!report.is_passing());

        assert!(report.find("Rendering", "render_latency").is_some());
        let failed = report.find("Rendering/secondary", "expected_fps").unwrap();
        assert_eq!(failed.status, CheckStatus::Failed);
        assert!(report.find("ignored", "expected_fps").is_none());
    }
}
