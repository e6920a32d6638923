//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{QcBlueprint, SinkType};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    expected_fps: f64,
    max_latency_s: f64,
    has_photodiode: bool,
    has_end_session: bool,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    expected_fps: blueprint.session.expected_fps,
                    max_latency_s: blueprint.effective_max_latency(),
                    has_photodiode: blueprint.session.digital_input_path.is_some(),
                    has_end_session: blueprint.session.end_session_path.is_some(),
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &QcBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - the report is only printed".to_string());
    } else if !blueprint
        .sinks
        .iter()
        .any(|s| s.sink_type == SinkType::File)
    {
        warnings.push("No file sink configured - the report is not persisted".to_string());
    }

    if blueprint.session.digital_input_path.is_none() {
        warnings.push(
            "session.digital_input_path is not set - render_latency will be skipped".to_string(),
        );
    }

    if blueprint.session.end_session_path.is_none() {
        warnings.push(
            "session.end_session_path is not set - end_session_exists will be skipped".to_string(),
        );
    }

    let frame_period = 1.0 / blueprint.session.expected_fps;
    if blueprint.effective_max_latency() < frame_period {
        warnings.push(format!(
            "max_latency_s ({:.4}s) is shorter than one frame period ({:.4}s)",
            blueprint.effective_max_latency(),
            frame_period
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Expected FPS: {}", summary.expected_fps);
            println!("  Max latency: {:.4}s", summary.max_latency_s);
            println!("  Photodiode: {}", summary.has_photodiode);
            println!("  End session log: {}", summary.has_end_session);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
