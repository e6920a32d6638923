//! Render-sync 错误类型

use contracts::{ContractError, QuadState};
use thiserror::Error;

/// Render-sync 错误
///
/// 每个变体对应一个独立的失败结果，由 suite 转换为失败的 `CheckOutcome`。
#[derive(Debug, Error)]
pub enum RenderSyncError {
    /// quad 信号取值不在 {0, 1}
    #[error("render sync signal outside {{0, 1}}: found {values:?}")]
    InvalidSignalDomain {
        /// 越界的不同取值 (升序)
        values: Vec<f64>,
    },

    /// 帧索引跳变
    #[error("frame index jumps by {gap} after frame {after_frame}")]
    DroppedFrame { after_frame: i64, gap: i64 },

    /// toggle 序列出现连续相同状态
    #[error("toggle {index} repeats the previous quad state")]
    NonAlternating { index: usize },

    /// 匹配对不足，回归无定义
    #[error("insufficient matches for regression: {matched} matched pair(s), need at least 2")]
    InsufficientMatches { matched: usize },

    /// 空序列
    #[error("{series} series is empty")]
    EmptySeries { series: &'static str },

    /// 序列未以零为起点
    #[error("{series} series is not zero-anchored (first timestamp {first})")]
    NotZeroAnchored { series: &'static str, first: f64 },

    /// 序列非升序
    #[error("{series} series is not ascending at index {index}")]
    NonAscending { series: &'static str, index: usize },

    /// 首个 toggle 与首个检测极性不一致
    #[error("first toggle polarity {toggle:?} does not match first detection polarity {detection:?}")]
    PolarityMismatch {
        /// `None` 表示没有任何 toggle 具有该极性
        toggle: Option<QuadState>,
        detection: QuadState,
    },

    /// 诊断图绘制失败
    #[error("failed to render diagnostic plot: {message}")]
    Plot { message: String },

    /// 序列构造失败
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl RenderSyncError {
    pub fn plot(message: impl Into<String>) -> Self {
        Self::Plot {
            message: message.into(),
        }
    }
}

/// Render-sync Result 类型别名
pub type Result<T> = std::result::Result<T, RenderSyncError>;
