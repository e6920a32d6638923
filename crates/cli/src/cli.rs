//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Render QC - timing alignment checks between renderer and photodiode
#[derive(Parser, Debug)]
#[command(
    name = "render-qc",
    author,
    version,
    about = "Render/photodiode timing quality control",
    long_about = "Validates that frames logged by the renderer were actually displayed.\n\n\
                  Loads a session's render-sync and digital-input tables, aligns renderer \n\
                  toggles with photodiode detections across independent clocks, and \n\
                  reports per-check verdicts to the configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RENDER_QC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "RENDER_QC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the QC checks for one session
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the resolved configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "render_qc.toml", env = "RENDER_QC_CONFIG")]
    pub config: PathBuf,

    /// Directory that relative session paths resolve against
    #[arg(long, env = "RENDER_QC_DATA_ROOT")]
    pub data_root: Option<PathBuf>,

    /// QC run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "RENDER_QC_TIMEOUT")]
    pub timeout: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "RENDER_QC_METRICS_PORT")]
    pub metrics_port: u16,

    /// Skip diagnostic figures
    #[arg(long, env = "RENDER_QC_NO_PLOTS")]
    pub no_plots: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "render_qc.toml", env = "RENDER_QC_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "render_qc.toml", env = "RENDER_QC_CONFIG")]
    pub config: PathBuf,

    /// Directory that relative session paths resolve against
    #[arg(long, env = "RENDER_QC_DATA_ROOT")]
    pub data_root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "render-qc",
            "-v",
            "run",
            "--config",
            "qc.toml",
            "--data-root",
            "/data/session_01",
            "--timeout",
            "30",
            "--no-plots",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("qc.toml"));
                assert_eq!(args.data_root, Some(PathBuf::from("/data/session_01")));
                assert_eq!(args.timeout, 30);
                assert!(args.no_plots);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
