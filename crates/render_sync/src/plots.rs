//! Diagnostic figure for the latency check.
//!
//! 2x2 SVG layout:
//! residual per toggle | detection vs gpu with fit
//! successive residual | residual histograms

use std::error::Error;
use std::ops::Range;
use std::path::Path;

use contracts::{AlignedPair, Artifact, LatencyMetrics};
use plotters::prelude::*;
use tracing::debug;

use crate::error::{RenderSyncError, Result};

const FIGURE_SIZE: (u32, u32) = (1200, 960);
const HISTOGRAM_BINS: usize = 30;

/// Render the latency figure to `path`
pub fn render_latency_figure(
    path: &Path,
    pairs: &[AlignedPair],
    metrics: &LatencyMetrics,
) -> Result<Artifact> {
    draw(path, pairs, metrics).map_err(|e| RenderSyncError::plot(e.to_string()))?;
    debug!(path = %path.display(), "latency figure written");
    Ok(Artifact::svg("render_latency", path))
}

fn draw(
    path: &Path,
    pairs: &[AlignedPair],
    metrics: &LatencyMetrics,
) -> std::result::Result<(), Box<dyn Error>> {
    let residual: Vec<(f64, f64)> = pairs
        .iter()
        .filter_map(|p| Some((p.toggle_index as f64, p.residual()?)))
        .collect();
    let successive: Vec<(f64, f64)> = pairs
        .windows(2)
        .filter_map(|w| {
            let (d0, d1) = (w[0].detection_time?, w[1].detection_time?);
            Some((
                w[1].toggle_index as f64,
                (w[1].gpu_time - w[0].gpu_time) - (d1 - d0),
            ))
        })
        .collect();
    let scatter: Vec<(f64, f64)> = pairs
        .iter()
        .filter_map(|p| Some((p.gpu_time, p.detection_time?)))
        .collect();

    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 2));

    let index_range = axis_range(pairs.iter().map(|p| p.toggle_index as f64));

    // Residual per toggle
    let mut chart = ChartBuilder::on(&panels[0])
        .caption(
            format!("GPU vs photodiode timing difference (max latency {}s)", metrics.max_latency),
            ("sans-serif", 16),
        )
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(index_range.clone(), axis_range(residual.iter().map(|p| p.1)))?;
    chart
        .configure_mesh()
        .x_desc("Toggle index")
        .y_desc("Timing difference (s)")
        .draw()?;
    chart.draw_series(LineSeries::new(residual.iter().copied(), &BLUE))?;

    // Scatter with fitted line
    let x_range = axis_range(scatter.iter().map(|p| p.0));
    let mut chart = ChartBuilder::on(&panels[1])
        .caption(
            format!(
                "Linear fit: slope={:.4}, r²={:.4}",
                metrics.regression.slope, metrics.regression.r_squared
            ),
            ("sans-serif", 16),
        )
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), axis_range(scatter.iter().map(|p| p.1)))?;
    chart
        .configure_mesh()
        .x_desc("GPU timestamp (s)")
        .y_desc("Photodiode timestamp (s)")
        .draw()?;
    chart.draw_series(
        scatter
            .iter()
            .map(|&point| Circle::new(point, 2, BLUE.mix(0.6).filled())),
    )?;
    if metrics.regression.slope.is_finite() && metrics.regression.intercept.is_finite() {
        let fit = |x: f64| metrics.regression.slope * x + metrics.regression.intercept;
        chart.draw_series(LineSeries::new(
            [x_range.start, x_range.end].map(|x| (x, fit(x))),
            RED.stroke_width(2),
        ))?;
    }

    // Successive residual per toggle
    let mut chart = ChartBuilder::on(&panels[2])
        .caption("dGPU vs dPhotodiode timing difference", ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(index_range, axis_range(successive.iter().map(|p| p.1)))?;
    chart
        .configure_mesh()
        .x_desc("Toggle index")
        .y_desc("Timing difference (s)")
        .draw()?;
    chart.draw_series(LineSeries::new(successive.iter().copied(), &GREEN))?;

    // Histograms over shared bins
    let values_range = axis_range(
        residual
            .iter()
            .chain(successive.iter())
            .map(|p| p.1),
    );
    let residual_counts = histogram(residual.iter().map(|p| p.1), &values_range);
    let successive_counts = histogram(successive.iter().map(|p| p.1), &values_range);
    let max_count = residual_counts
        .iter()
        .chain(successive_counts.iter())
        .copied()
        .max()
        .unwrap_or(0)
        .max(1);
    let bin_width = (values_range.end - values_range.start) / HISTOGRAM_BINS as f64;

    let mut chart = ChartBuilder::on(&panels[3])
        .caption("Histogram of timing differences", ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(values_range.clone(), 0.0..(max_count as f64 * 1.05))?;
    chart
        .configure_mesh()
        .x_desc("Difference (s)")
        .y_desc("Counts")
        .draw()?;
    for (counts, color) in [(&residual_counts, BLUE), (&successive_counts, RED)] {
        chart.draw_series(counts.iter().enumerate().map(|(bin, &count)| {
            let x0 = values_range.start + bin as f64 * bin_width;
            Rectangle::new(
                [(x0, 0.0), (x0 + bin_width, count as f64)],
                color.mix(0.5).filled(),
            )
        }))?;
    }

    root.present()?;
    Ok(())
}

/// Padded range over the finite values; `-1..1` when there are none
fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return -1.0..1.0;
    }
    let pad = if max > min { (max - min) * 0.05 } else { min.abs().max(1e-3) * 0.05 };
    (min - pad)..(max + pad)
}

fn histogram(values: impl Iterator<Item = f64>, range: &Range<f64>) -> Vec<usize> {
    let mut counts = vec![0; HISTOGRAM_BINS];
    let width = range.end - range.start;
    for value in values.filter(|v| v.is_finite()) {
        let bin = (((value - range.start) / width) * HISTOGRAM_BINS as f64) as usize;
        counts[bin.min(HISTOGRAM_BINS - 1)] += 1;
    }
    counts
}
