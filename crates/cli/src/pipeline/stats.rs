//! Run statistics and console summary.

use std::sync::Arc;
use std::time::Duration;

use contracts::{CheckStatus, MetricValue, SessionReport};

/// Statistics from one QC run
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Aggregated check outcomes
    pub report: Arc<SessionReport>,

    /// Rows read from the render-sync table (None when it failed to load)
    pub render_sync_rows: Option<usize>,

    /// Photodiode detections (None when the digital-input table is absent or failed to load)
    pub photodiode_events: Option<usize>,

    /// Number of sinks that received the report
    pub active_sinks: usize,

    /// Total duration of the run
    pub duration: Duration,
}

impl RunStats {
    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Render QC Results                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        match self.render_sync_rows {
            Some(rows) => println!("   ├─ Render-sync rows: {}", rows),
            None => println!("   ├─ Render-sync rows: (not loaded)"),
        }
        match self.photodiode_events {
            Some(events) => println!("   ├─ Photodiode events: {}", events),
            None => println!("   ├─ Photodiode events: (not loaded)"),
        }
        println!("   └─ Active sinks: {}", self.active_sinks);

        println!("\n🔍 Checks");
        let count = self.report.outcomes.len();
        for (i, outcome) in self.report.outcomes.iter().enumerate() {
            let prefix = if i + 1 == count { "└─" } else { "├─" };
            let mark = match outcome.status {
                CheckStatus::Passed => "✓",
                CheckStatus::Failed => "✗",
                CheckStatus::Skipped => "-",
            };
            println!(
                "   {} {} {}/{}: {}",
                prefix, mark, outcome.suite, outcome.check, outcome.message
            );
            for artifact in &outcome.artifacts {
                println!("   │     📎 {}", artifact.path.display());
            }
        }

        if let Some(latency) = self
            .report
            .outcomes
            .iter()
            .find(|o| o.check == render_sync::RENDER_LATENCY && o.status != CheckStatus::Skipped)
        {
            println!("\n⏱  Render Latency");
            for key in ["toggles_gpu", "toggles_photodiode", "slope", "r_squared", "std_toggle_diff_diff"] {
                if let Some(value) = latency.metric(key) {
                    println!("   ├─ {}: {}", key, format_metric(value));
                }
            }
        }

        println!("\n📋 Verdict");
        println!(
            "   ├─ Checks: {} passed, {} failed, {} skipped",
            self.report.passed, self.report.failed, self.report.skipped
        );
        println!(
            "   └─ Session: {}",
            if self.report.is_passing() { "PASS" } else { "FAIL" }
        );
    }
}

fn format_metric(value: MetricValue) -> String {
    match value {
        MetricValue::Flag(flag) => flag.to_string(),
        MetricValue::Count(count) => count.to_string(),
        MetricValue::Float(v) => format!("{:.6}", v),
    }
}
