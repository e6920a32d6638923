//! FileSink - writes the session report as pretty JSON

use contracts::{ContractError, ReportSink, SessionReport};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Default report file name inside `base_path`
pub const DEFAULT_REPORT_FILE: &str = "qc_report.json";

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output directory
    pub base_path: PathBuf,
    /// Report file name
    pub file_name: String,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));
        let file_name = params
            .get("file_name")
            .cloned()
            .unwrap_or_else(|| DEFAULT_REPORT_FILE.to_string());

        Self {
            base_path,
            file_name,
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.base_path.join(&self.file_name)
    }
}

/// Sink that persists each published report to disk
///
/// Non-finite metrics are written as `null`.
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    written: u64,
}

impl FileSink {
    /// Create a new FileSink, creating the output directory
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            written: 0,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    pub fn report_path(&self) -> PathBuf {
        self.config.report_path()
    }
}

impl ReportSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_publish",
        skip(self, report),
        fields(sink = %self.name)
    )]
    async fn publish(&mut self, report: &SessionReport) -> Result<(), ContractError> {
        let body = serde_json::to_vec_pretty(report)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        let path = self.report_path();
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| ContractError::sink_write(&self.name, format!("{}: {e}", path.display())))?;

        self.written += 1;
        debug!(sink = %self.name, path = %path.display(), "Report written");
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            reports = self.written,
            path = %self.report_path().display(),
            "FileSink closed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CheckOutcome, MetricValue};

    fn params(dir: &std::path::Path) -> HashMap<String, String> {
        HashMap::from([(
            "base_path".to_string(),
            dir.to_string_lossy().into_owned(),
        )])
    }

    #[test]
    fn test_config_defaults() {
        let config = FileSinkConfig::from_params(&HashMap::new());
        assert_eq!(config.base_path, PathBuf::from("./output"));
        assert_eq!(config.file_name, DEFAULT_REPORT_FILE);
    }

    #[tokio::test]
    async fn test_file_sink_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::from_params("json", &params(dir.path())).unwrap();

        let report = SessionReport::from_outcomes(vec![CheckOutcome::failed(
            "render_latency",
            "regression undefined",
        )
        .in_suite("Rendering")
        .with_metrics([
            ("r_squared".to_string(), MetricValue::Float(f64::NAN)),
            ("toggles_gpu".to_string(), MetricValue::Count(12)),
        ])]);

        sink.publish(&report).await.unwrap();
        sink.close().await.unwrap();

        let text = std::fs::read_to_string(dir.path().join(DEFAULT_REPORT_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["failed"], 1);
        let outcome = &json["outcomes"][0];
        assert_eq!(outcome["suite"], "Rendering");
        assert_eq!(outcome["check"], "render_latency");
        assert!(outcome["metrics"]["r_squared"].is_null());
        assert_eq!(outcome["metrics"]["toggles_gpu"], 12);
    }

    #[tokio::test]
    async fn test_file_sink_custom_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = params(dir.path());
        p.insert("file_name".to_string(), "session_a.json".to_string());
        let mut sink = FileSink::from_params("json", &p).unwrap();

        sink.publish(&SessionReport::from_outcomes(Vec::new()))
            .await
            .unwrap();
        assert!(dir.path().join("session_a.json").exists());
    }
}
