//! QcBlueprint - Config Loader output
//!
//! Describes one QC run: where the session tables live, the check thresholds,
//! artifact output and report routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::RenderingQcConfig;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete QC run blueprint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QcBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Session inputs
    #[validate(nested)]
    pub session: SessionConfig,

    /// Rendering check thresholds
    #[serde(default)]
    #[validate(nested)]
    pub rendering: RenderingQcConfig,

    /// Diagnostic artifact output
    #[serde(default)]
    pub artifacts: ArtifactConfig,

    /// Report routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Session input locations and acquisition parameters
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionConfig {
    /// Render-sync table (`FrameIndex`, `FrameTimestamp`, `SyncQuadValue`)
    pub render_sync_path: PathBuf,

    /// Harp digital-input table; the latency check is skipped without it
    #[serde(default)]
    pub digital_input_path: Option<PathBuf>,

    /// End-of-session log; the session check is skipped without it
    #[serde(default)]
    pub end_session_path: Option<PathBuf>,

    /// Photodiode port column in the digital-input table
    #[serde(default = "default_photodiode_port")]
    #[validate(length(min = 1))]
    pub photodiode_port: String,

    /// Timestamp column in the digital-input table
    #[serde(default = "default_time_column")]
    #[validate(length(min = 1))]
    pub time_column: String,

    /// Target render frequency (Hz)
    #[validate(range(exclusive_min = 0.0))]
    pub expected_fps: f64,
}

fn default_photodiode_port() -> String {
    "DIPort0".to_string()
}

fn default_time_column() -> String {
    "Seconds".to_string()
}

/// Diagnostic artifact output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Output directory for figures
    #[serde(default = "default_artifact_dir")]
    pub dir: PathBuf,

    /// Render diagnostic plots
    #[serde(default = "default_render_plots")]
    pub render_plots: bool,
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("qc_artifacts")
}

fn default_render_plots() -> bool {
    true
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: default_artifact_dir(),
            render_plots: default_render_plots(),
        }
    }
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    8
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Structured log output
    Log,
    /// JSON report file
    File,
}

impl QcBlueprint {
    /// Resolve relative session paths against a data root
    pub fn resolve_paths(&mut self, data_root: &Path) {
        let resolve = |path: &PathBuf| {
            if path.is_relative() {
                data_root.join(path)
            } else {
                path.clone()
            }
        };
        self.session.render_sync_path = resolve(&self.session.render_sync_path);
        self.session.digital_input_path = self.session.digital_input_path.as_ref().map(resolve);
        self.session.end_session_path = self.session.end_session_path.as_ref().map(resolve);
    }

    /// Matcher tolerance after applying the frame-period default
    pub fn effective_max_latency(&self) -> f64 {
        self.rendering
            .effective_max_latency(self.session.expected_fps)
    }
}
