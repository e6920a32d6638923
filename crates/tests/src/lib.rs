//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 磁盘 CSV -> ingestion -> suite -> runner -> sinks 全链路测试

#[cfg(test)]
mod contract_tests {
    use contracts::{CheckOutcome, MetricValue, SessionReport};

    #[test]
    fn test_report_json_shape() {
        let report = SessionReport::from_outcomes(vec![CheckOutcome::passed(
            "expected_fps",
            "ok",
        )
        .in_suite("Rendering")
        .with_metrics([("fps_mean".to_string(), MetricValue::Float(0.0166))])]);

        let json = serde_json::to_value(&report).unwrap();
        for key in ["generated_at", "outcomes", "passed", "failed", "skipped"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        let outcome = &json["outcomes"][0];
        assert_eq!(outcome["status"], "passed");
        assert_eq!(outcome["suite"], "Rendering");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fmt::Write as _;
    use std::path::Path;
    use std::sync::Arc;

    use contracts::{CheckStatus, QcBlueprint, SessionReport};
    use ingestion::{
        DataContractSuite, DigitalInputColumns, SessionSuite, DATA_CONTRACT_SUITE,
        DIGITAL_INPUT_STREAM, END_SESSION_EXISTS, RENDER_SYNC_STREAM, SESSION_SUITE,
    };
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use render_sync::{
        RenderingSuite, ALL_FRAMES_LOGGED, BINARY_QUAD_STATE, EXPECTED_FPS, RENDER_LATENCY,
        SUITE_NAME,
    };
    use reporting::{QcRunner, ReportDispatcher};

    const FPS: f64 = 60.0;
    const RENDER_ORIGIN: f64 = 3.0;
    const HARP_ORIGIN: f64 = 81_234.5;
    const LAG: f64 = 0.008;

    /// Render-sync table with one toggle per frame; `skip` leaves a frame out of the log
    fn write_render_sync(path: &Path, frames: usize, skip: Option<usize>) {
        let mut csv = String::from("FrameIndex,FrameTimestamp,SyncQuadValue\n");
        for i in (0..frames).filter(|i| Some(*i) != skip) {
            writeln!(
                csv,
                "{},{:.9},{}",
                500 + i,
                RENDER_ORIGIN + i as f64 / FPS,
                i % 2
            )
            .unwrap();
        }
        std::fs::write(path, csv).unwrap();
    }

    /// Harp digital-input table: the photodiode follows every frame after `LAG`,
    /// with small jitter and interleaved non-event rows
    fn write_digital_input(path: &Path, frames: usize, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut csv = String::from("Seconds,MessageType,DIPort0,DIPort1\n");
        for i in 0..frames {
            let t = HARP_ORIGIN + i as f64 / FPS + LAG + rng.random_range(-0.001..0.001);
            let level = if i % 2 == 1 { "True" } else { "False" };
            if i % 50 == 0 {
                writeln!(csv, "{:.9},WRITE,{},False", t - 0.002, level).unwrap();
            }
            writeln!(csv, "{:.9},EVENT,{},False", t, level).unwrap();
        }
        std::fs::write(path, csv).unwrap();
    }

    fn write_config(dir: &Path) {
        let toml = format!(
            r#"
version = "V1"

[session]
render_sync_path = "Renderer/RendererSynchState.csv"
digital_input_path = "Behavior.harp/Behavior_DigitalInputState.csv"
end_session_path = "Logs/EndSession.json"
expected_fps = 60.0

[rendering]
max_latency_s = 0.015

[artifacts]
dir = "{artifacts}"
render_plots = true

[[sinks]]
name = "console"
sink_type = "log"

[[sinks]]
name = "report"
sink_type = "file"
params = {{ base_path = "{out}" }}
"#,
            artifacts = dir.join("qc_artifacts").display(),
            out = dir.join("qc_output").display(),
        );
        std::fs::write(dir.join("render_qc.toml"), toml).unwrap();
    }

    fn prepare_session(dir: &Path, frames: usize, skip: Option<usize>) -> QcBlueprint {
        std::fs::create_dir_all(dir.join("Renderer")).unwrap();
        std::fs::create_dir_all(dir.join("Behavior.harp")).unwrap();
        std::fs::create_dir_all(dir.join("Logs")).unwrap();
        std::fs::write(
            dir.join("Logs/EndSession.json"),
            "{\"Seconds\": 12.5, \"Data\": \"EndSession\"}\n",
        )
        .unwrap();
        write_render_sync(&dir.join("Renderer/RendererSynchState.csv"), frames, skip);
        write_digital_input(
            &dir.join("Behavior.harp/Behavior_DigitalInputState.csv"),
            frames,
            17,
        );
        write_config(dir);
        config_loader::ConfigLoader::load_with_root(&dir.join("render_qc.toml"), dir).unwrap()
    }

    fn run_session(blueprint: &QcBlueprint) -> SessionReport {
        let session = &blueprint.session;
        let mut contract = DataContractSuite::new();
        let samples = contract
            .track(
                RENDER_SYNC_STREAM,
                &session.render_sync_path,
                ingestion::load_render_sync(&session.render_sync_path),
            )
            .unwrap();
        let di_path = session.digital_input_path.as_deref().unwrap();
        let detections = contract
            .track(
                DIGITAL_INPUT_STREAM,
                di_path,
                ingestion::load_photodiode_events(di_path, &DigitalInputColumns::default()),
            )
            .unwrap();

        let suite = RenderingSuite::new(samples, Some(detections), session.expected_fps)
            .with_config(blueprint.rendering.clone())
            .with_artifact_dir(&blueprint.artifacts.dir);

        let mut runner = QcRunner::new();
        runner
            .add_suite(Box::new(contract))
            .add_suite(Box::new(SessionSuite::new(session.end_session_path.clone())))
            .add_suite(Box::new(suite));
        runner.run_all()
    }

    /// End-to-end: CSV on disk -> ingestion -> suites -> QcRunner -> sinks
    #[tokio::test]
    async fn test_e2e_passing_session() {
        let dir = tempfile::tempdir().unwrap();
        let blueprint = prepare_session(dir.path(), 601, None);

        let report = run_session(&blueprint);
        assert!(report.is_passing(), "{report:#?}");
        assert_eq!(report.outcomes.len(), 7);
        for stream in [RENDER_SYNC_STREAM, DIGITAL_INPUT_STREAM] {
            let outcome = report.find(DATA_CONTRACT_SUITE, stream).unwrap();
            assert_eq!(outcome.status, CheckStatus::Passed, "{stream}");
        }
        assert_eq!(
            report.find(SESSION_SUITE, END_SESSION_EXISTS).unwrap().status,
            CheckStatus::Passed
        );
        for check in [BINARY_QUAD_STATE, ALL_FRAMES_LOGGED, EXPECTED_FPS, RENDER_LATENCY] {
            let outcome = report.find(SUITE_NAME, check).unwrap();
            assert_eq!(outcome.status, CheckStatus::Passed, "{check}");
        }

        let latency = report.find(SUITE_NAME, RENDER_LATENCY).unwrap();
        let value = |key: &str| latency.metric(key).unwrap().as_f64();
        // First toggle of each stream is dropped before matching
        assert_eq!(value("toggles_gpu"), 600.0);
        assert_eq!(value("toggles_photodiode"), 600.0);
        assert!((value("slope") - 1.0).abs() < 1e-3);
        assert!(value("r_squared") > 0.999);
        // gpu - detection in the recorded clocks
        let expected_mean = RENDER_ORIGIN - HARP_ORIGIN - LAG;
        assert!((value("mean_toggle_diff") - expected_mean).abs() < 1e-3);
        assert!(value("std_toggle_diff_diff") < 0.002);
        assert_eq!(latency.artifacts.len(), 1);
        assert!(latency.artifacts[0].path.exists());

        let dispatcher = ReportDispatcher::from_configs(&blueprint.sinks).unwrap();
        assert_eq!(dispatcher.sink_count(), 2);
        dispatcher.dispatch(Arc::new(report)).await;
        dispatcher.shutdown().await;

        let text =
            std::fs::read_to_string(dir.path().join("qc_output").join("qc_report.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["passed"], 7);
        assert_eq!(json["failed"], 0);
        let checks: Vec<&str> = json["outcomes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["check"].as_str().unwrap())
            .collect();
        assert_eq!(
            checks,
            vec![
                RENDER_SYNC_STREAM,
                DIGITAL_INPUT_STREAM,
                END_SESSION_EXISTS,
                BINARY_QUAD_STATE,
                ALL_FRAMES_LOGGED,
                EXPECTED_FPS,
                RENDER_LATENCY
            ]
        );
    }

    #[tokio::test]
    async fn test_e2e_dropped_frame_fails_session() {
        let dir = tempfile::tempdir().unwrap();
        let blueprint = prepare_session(dir.path(), 301, Some(150));

        let report = run_session(&blueprint);
        assert!(!report.is_passing());
        let logged = report.find(SUITE_NAME, ALL_FRAMES_LOGGED).unwrap();
        assert_eq!(logged.status, CheckStatus::Failed);
        assert_eq!(
            report.find(SUITE_NAME, BINARY_QUAD_STATE).unwrap().status,
            CheckStatus::Passed
        );

        let dispatcher = ReportDispatcher::from_configs(&blueprint.sinks).unwrap();
        dispatcher.dispatch(Arc::new(report)).await;
        dispatcher.shutdown().await;

        let text =
            std::fs::read_to_string(dir.path().join("qc_output").join("qc_report.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(json["failed"].as_u64().unwrap() >= 1);
    }

    #[test]
    fn test_e2e_without_photodiode_skips_latency() {
        let dir = tempfile::tempdir().unwrap();
        let blueprint = prepare_session(dir.path(), 121, None);
        let samples = ingestion::load_render_sync(&blueprint.session.render_sync_path).unwrap();

        let mut runner = QcRunner::new();
        runner.add_suite(Box::new(RenderingSuite::new(samples, None, FPS)));
        let report = runner.run_all();

        assert!(report.is_passing());
        assert_eq!(report.skipped, 1);
        assert_eq!(
            report.find(SUITE_NAME, RENDER_LATENCY).unwrap().status,
            CheckStatus::Skipped
        );
    }
}
