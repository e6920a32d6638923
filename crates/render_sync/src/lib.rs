//! # Render Sync
//!
//! 渲染同步质检：验证渲染器 toggle 与光电二极管检测在独立时钟下的一致性。
//!
//! 负责：
//! - 从逐帧 render-sync 日志中提取 toggle
//! - 带漂移校正的逐次锚定匹配
//! - 回归与 successive-difference 统计
//! - 延迟判定与诊断图
//! - 辅助检查 (二值状态、帧完整性、帧率)
//!
//! ## 使用示例
//!
//! ```ignore
//! use render_sync::RenderingSuite;
//! use contracts::QcSuite;
//!
//! let suite = RenderingSuite::new(samples, Some(detections), 60.0)
//!     .with_config(blueprint.rendering.clone())
//!     .with_artifact_dir("qc_artifacts");
//!
//! for outcome in suite.run() {
//!     println!("{}: {:?}", outcome.check, outcome.status);
//! }
//! ```

mod checks;
mod error;
mod matcher;
mod plots;
mod regression;
mod report;
mod suite;
mod toggle;

// Re-exports
pub use checks::{
    check_all_frames_logged, check_binary_quad_state, check_expected_fps, fps_metrics,
    ALL_FRAMES_LOGGED, BINARY_QUAD_STATE, EXPECTED_FPS, RENDER_LATENCY,
};
pub use error::{RenderSyncError, Result};
pub use matcher::DriftCorrectedMatcher;
pub use plots::render_latency_figure;
pub use regression::{
    linear_regression, residuals, successive_differences, Dispersion, RegressionValidator,
};
pub use report::{LatencyReport, Verdict};
pub use suite::{prepare_alignment, PreparedAlignment, RenderingSuite, SUITE_NAME};
pub use toggle::{
    decode_states, ensure_alternating, frame_gaps, signal_domain, FrameGap, ToggleExtraction,
    ToggleExtractor,
};
