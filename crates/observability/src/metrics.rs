//! QC 指标收集模块
//!
//! 基于 CheckOutcome / LatencyMetrics 记录渲染质检的运行指标，并提供在线统计工具。

use contracts::{CheckOutcome, LatencyMetrics};
use metrics::{counter, gauge, histogram};

/// 记录单个检查结果
///
/// 每个 CheckOutcome 产生后调用。数值型指标同时以 gauge 形式导出。
pub fn record_check_outcome(outcome: &CheckOutcome) {
    counter!(
        "render_qc_checks_total",
        "suite" => outcome.suite.clone(),
        "check" => outcome.check.clone(),
        "status" => outcome.status.as_str()
    )
    .increment(1);

    for (key, value) in &outcome.metrics {
        gauge!(
            "render_qc_check_metric",
            "check" => outcome.check.clone(),
            "metric" => key.clone()
        )
        .set(value.as_f64());
    }
}

/// 记录渲染延迟统计
pub fn record_latency_metrics(metrics: &LatencyMetrics) {
    gauge!("render_qc_toggles_gpu").set(metrics.toggles_gpu as f64);
    gauge!("render_qc_toggles_matched").set(metrics.toggles_photodiode as f64);
    counter!("render_qc_unmatched_toggles_total").increment(metrics.unmatched_toggles as u64);

    // 秒 -> 毫秒
    histogram!("render_qc_toggle_diff_std_ms").record(metrics.std_toggle_diff * 1000.0);
    histogram!("render_qc_toggle_diff_diff_std_ms")
        .record(metrics.std_toggle_diff_diff * 1000.0);

    if metrics.regression.is_well_defined() {
        gauge!("render_qc_regression_slope").set(metrics.regression.slope);
        gauge!("render_qc_regression_r_squared").set(metrics.regression.r_squared);
    }
}

/// 记录输入表加载行数
pub fn record_rows_loaded(table: &str, rows: usize) {
    counter!(
        "render_qc_rows_loaded_total",
        "table" => table.to_string()
    )
    .increment(rows as u64);
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 从迭代器构建
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut stats = Self::default();
        for value in values {
            stats.push(value);
        }
        stats
    }

    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值 (空样本为 NaN)
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }

    /// 样本方差 (n - 1)
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            f64::NAN
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 总体方差 (n)
    pub fn population_variance(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.m2 / self.count as f64
        }
    }

    /// 样本标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 总体标准差
    pub fn population_std_dev(&self) -> f64 {
        self.population_variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
