//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::QcBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

use super::load_blueprint;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    session: SessionInfo,
    rendering: RenderingInfo,
    artifacts: ArtifactInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct SessionInfo {
    render_sync_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    digital_input_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_session_path: Option<String>,
    photodiode_port: String,
    time_column: String,
    expected_fps: f64,
}

#[derive(Serialize)]
struct RenderingInfo {
    /// Matcher tolerance after defaults are applied
    max_latency_s: f64,
    max_std_of_successive_diff_s: f64,
    mean_interval_tolerance_s: f64,
    max_percentile_excess_s: f64,
}

#[derive(Serialize)]
struct ArtifactInfo {
    dir: String,
    render_plots: bool,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = load_blueprint(&args.config, args.data_root.as_ref())?;

    if args.json {
        let info = build_config_info(&blueprint);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &QcBlueprint) -> ConfigInfo {
    let session = &blueprint.session;
    let rendering = &blueprint.rendering;

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        session: SessionInfo {
            render_sync_path: session.render_sync_path.display().to_string(),
            digital_input_path: session
                .digital_input_path
                .as_ref()
                .map(|p| p.display().to_string()),
            end_session_path: session
                .end_session_path
                .as_ref()
                .map(|p| p.display().to_string()),
            photodiode_port: session.photodiode_port.clone(),
            time_column: session.time_column.clone(),
            expected_fps: session.expected_fps,
        },
        rendering: RenderingInfo {
            max_latency_s: blueprint.effective_max_latency(),
            max_std_of_successive_diff_s: rendering.max_std_of_successive_diff_s,
            mean_interval_tolerance_s: rendering.mean_interval_tolerance_s,
            max_percentile_excess_s: rendering.max_percentile_excess_s,
        },
        artifacts: ArtifactInfo {
            dir: blueprint.artifacts.dir.display().to_string(),
            render_plots: blueprint.artifacts.render_plots,
        },
        sinks: blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect(),
    }
}

fn print_config_info(blueprint: &QcBlueprint) {
    let session = &blueprint.session;
    let rendering = &blueprint.rendering;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Render QC Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📁 Session");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Render sync: {}", session.render_sync_path.display());
    match &session.digital_input_path {
        Some(path) => println!(
            "   ├─ Digital input: {} (port {}, time {})",
            path.display(),
            session.photodiode_port,
            session.time_column
        ),
        None => println!("   ├─ Digital input: (none, latency check skipped)"),
    }
    match &session.end_session_path {
        Some(path) => println!("   ├─ End session: {}", path.display()),
        None => println!("   ├─ End session: (none, session check skipped)"),
    }
    println!("   └─ Expected FPS: {}", session.expected_fps);

    println!("\n⚙️  Rendering Thresholds");
    match rendering.max_latency_s {
        Some(explicit) => println!("   ├─ Max latency: {:.4}s", explicit),
        None => println!(
            "   ├─ Max latency: {:.4}s (5 frame periods)",
            blueprint.effective_max_latency()
        ),
    }
    println!(
        "   ├─ Max std of successive diff: {}s",
        rendering.max_std_of_successive_diff_s
    );
    println!(
        "   ├─ Mean interval tolerance: {}s",
        rendering.mean_interval_tolerance_s
    );
    println!(
        "   └─ Max p99 excess: {}s",
        rendering.max_percentile_excess_s
    );

    println!("\n🖼  Artifacts");
    println!("   ├─ Dir: {}", blueprint.artifacts.dir.display());
    println!("   └─ Render plots: {}", blueprint.artifacts.render_plots);

    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);
        }
    }

    println!();
}
