//! # 层间距图表生成
//!
//! 使用 `plotters` 库绘制 层间距-层号 散点图及线性趋势线。
//!
//! ## 功能
//! - 论文级别的图表质量（默认 6 × 10 英寸、300 DPI）
//! - 层号轴（纵轴）反向，上方为第一层
//! - 显式刻度：横轴隔一取 nice 刻度，纵轴取整数刻度
//! - 支持 PNG 和 SVG 输出
//!
//! ## 依赖关系
//! - 被 `commands/analyze/spacing.rs` 调用
//! - 使用 `profile/estimator.rs` 的 SpacingEstimate
//! - 使用 `profile/ticks.rs` 生成刻度
//! - 使用 `plotters` 渲染图表

use crate::error::{Result, StemlineError};
use crate::profile::estimator::SpacingEstimate;
use crate::profile::ticks;
use crate::profile::trend::Orientation;

use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

/// 趋势线采样点数（层号为自变量时）
const TREND_SAMPLES: usize = 100;

/// 轴两端留白比例
const AXIS_MARGIN: f64 = 0.05;

/// 图表参数
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    /// 图宽（英寸）
    pub width_in: f64,
    /// 图高（英寸）
    pub height_in: f64,
    /// 分辨率（PNG）
    pub dpi: u32,
    /// 字号（磅）
    pub font_size_pt: f64,
    /// 横轴刻度数（隔一取之前）
    pub x_tick_count: usize,
    /// 标题
    pub title: Option<String>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width_in: 6.0,
            height_in: 10.0,
            dpi: 300,
            font_size_pt: 26.0,
            x_tick_count: 8,
            title: None,
        }
    }
}

impl PlotConfig {
    /// 像素（PNG）或磅（SVG）为单位的画布尺寸
    pub fn canvas_size(&self, use_svg: bool) -> (u32, u32) {
        let unit = self.unit_scale(use_svg) * 72.0;
        (
            (self.width_in * unit).round() as u32,
            (self.height_in * unit).round() as u32,
        )
    }

    /// 1 磅对应的画布单位
    fn unit_scale(&self, use_svg: bool) -> f64 {
        if use_svg {
            1.0
        } else {
            self.dpi as f64 / 72.0
        }
    }
}

/// 刻度由调用方给定的连续坐标轴
///
/// 只提供粗网格点（即刻度），不产生细网格线。
struct TickedAxis {
    coord: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TickedAxis {
    fn new(range: Range<f64>, ticks: Vec<f64>) -> Self {
        Self {
            coord: range.into(),
            ticks,
        }
    }
}

impl Ranged for TickedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.coord.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.weight().allow_light_points() {
            Vec::new()
        } else {
            self.ticks.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.coord.range()
    }
}

/// 生成层间距图表
pub fn generate_spacing_plot(
    estimate: &SpacingEstimate,
    output_path: &Path,
    config: &PlotConfig,
    use_svg: bool,
) -> Result<()> {
    let size = config.canvas_size(use_svg);
    let scale = config.unit_scale(use_svg);

    if use_svg {
        let root = SVGBackend::new(output_path, size).into_drawing_area();
        draw_spacing_chart(&root, estimate, config, scale)?;
        root.present()
            .map_err(|e| StemlineError::PlotError(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, size).into_drawing_area();
        draw_spacing_chart(&root, estimate, config, scale)?;
        root.present()
            .map_err(|e| StemlineError::PlotError(e.to_string()))?;
    }
    Ok(())
}

/// 趋势线上的 (层间距, 层号) 点
///
/// - 层间距为自变量：在每个实测层间距处求值（按层间距排序）
/// - 层号为自变量：在首末层号之间均匀取 100 个点
pub fn trend_line(estimate: &SpacingEstimate) -> Vec<(f64, f64)> {
    let trend = &estimate.trend;
    match trend.orientation {
        Orientation::SpacingAsIndependent => {
            let mut xs = estimate.spacing.clone();
            xs.sort_by(|a, b| a.total_cmp(b));
            xs.into_iter()
                .filter_map(|x| trend.index_at(x).map(|layer| (x, layer)))
                .collect()
        }
        Orientation::IndexAsIndependent => {
            let layers = estimate.layer_numbers();
            let first = layers.first().copied().unwrap_or(1.0);
            let last = layers.last().copied().unwrap_or(first);
            linspace(first, last, TREND_SAMPLES)
                .into_iter()
                .filter_map(|layer| trend.spacing_at(layer).map(|x| (x, layer)))
                .collect()
        }
    }
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// 刻度标签所需小数位数
fn tick_precision(ticks: &[f64]) -> usize {
    let step = ticks
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(f64::INFINITY, f64::min);
    if !step.is_finite() || step <= 0.0 || step >= 1.0 {
        return 0;
    }
    (-step.log10() - 1e-6).ceil().max(0.0) as usize
}

/// 绘制图表的核心逻辑
fn draw_spacing_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    estimate: &SpacingEstimate,
    config: &PlotConfig,
    scale: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| StemlineError::PlotError(format!("{:?}", e)))?;

    let layers = estimate.layer_numbers();
    let points: Vec<(f64, f64)> = estimate
        .spacing
        .iter()
        .copied()
        .zip(layers.iter().copied())
        .collect();
    let trend = trend_line(estimate);

    // 横轴范围包含数据点与趋势线
    let (x_min, x_max) = points
        .iter()
        .chain(trend.iter())
        .map(|(x, _)| *x)
        .filter(|x| x.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
    if !x_min.is_finite() || !x_max.is_finite() {
        return Err(StemlineError::PlotError("no finite data to plot".to_string()));
    }
    let (x_lo, x_hi) = ticks::padded_range(x_min, x_max, AXIS_MARGIN);

    let first_layer = layers.first().copied().unwrap_or(0.0);
    let last_layer = layers.last().copied().unwrap_or(first_layer);
    let (y_lo, y_hi) = ticks::padded_range(first_layer, last_layer, AXIS_MARGIN);

    let all_x_ticks = ticks::nice_ticks(x_lo, x_hi, config.x_tick_count);
    let precision = tick_precision(&all_x_ticks);
    let x_ticks = ticks::every_other(&all_x_ticks);
    // 纵轴取负实现反向：第一层在上
    let y_ticks: Vec<f64> = ticks::integer_ticks(y_lo, y_hi, 10)
        .into_iter()
        .map(|v| -v)
        .collect();

    let font_px = config.font_size_pt * scale;
    let x_tick_len = x_ticks.len();
    let y_tick_len = y_ticks.len();

    let mut builder = ChartBuilder::on(root);
    builder
        .margin((12.0 * scale) as u32)
        .x_label_area_size((font_px * 2.6) as u32)
        .y_label_area_size((font_px * 2.4) as u32);
    if let Some(title) = &config.title {
        builder.caption(title, ("sans-serif", font_px).into_font());
    }

    let mut chart = builder
        .build_cartesian_2d(
            TickedAxis::new(x_lo..x_hi, x_ticks),
            TickedAxis::new(-y_hi..-y_lo, y_ticks),
        )
        .map_err(|e| StemlineError::PlotError(format!("{:?}", e)))?;

    let x_fmt = |v: &f64| format!("{:.*}", precision, v);
    let y_fmt = |v: &f64| format!("{:.0}", v.abs());

    chart
        .configure_mesh()
        .x_labels(x_tick_len)
        .y_labels(y_tick_len)
        .x_desc("Interlayer Distance (nm)")
        .y_desc("Layer Number")
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .label_style(("sans-serif", font_px).into_font())
        .axis_desc_style(("sans-serif", font_px).into_font())
        .bold_line_style(BLACK.mix(0.15).stroke_width(scale.max(1.0) as u32))
        .draw()
        .map_err(|e| StemlineError::PlotError(format!("{:?}", e)))?;

    let data_color = BLUE.mix(0.5);
    let line_width = (1.5 * scale).max(1.0) as u32;
    let marker_radius = (3.0 * scale).max(2.0) as u32;

    // 数据点连线
    chart
        .draw_series(LineSeries::new(
            points.iter().map(|(x, y)| (*x, -*y)),
            data_color.stroke_width(line_width),
        ))
        .map_err(|e| StemlineError::PlotError(format!("{:?}", e)))?;

    // 数据点
    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, -*y), marker_radius, data_color.filled())),
        )
        .map_err(|e| StemlineError::PlotError(format!("{:?}", e)))?;

    // 趋势线
    chart
        .draw_series(LineSeries::new(
            trend.iter().map(|(x, y)| (*x, -*y)),
            RED.stroke_width(line_width),
        ))
        .map_err(|e| StemlineError::PlotError(format!("{:?}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::peaks::{PeakCriteria, PeakSet};
    use crate::profile::trend::fit_trend;

    fn estimate_for(spacing: Vec<f64>, orientation: Orientation) -> SpacingEstimate {
        let trend = fit_trend(&spacing, orientation).unwrap();
        SpacingEstimate {
            smoothed: Vec::new(),
            peaks: PeakSet {
                peaks: Vec::new(),
                thresholds: PeakCriteria::default().thresholds(10.0),
            },
            spacing,
            trend,
        }
    }

    fn temp_output(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("stemline_{}_{}", std::process::id(), name))
    }

    /// 从 IHDR 块读取 PNG 宽高
    fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(&bytes[12..16], b"IHDR");
        let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        (width, height)
    }

    fn both_orientations() -> Vec<SpacingEstimate> {
        vec![
            estimate_for(vec![3.0, 3.1, 3.25, 3.3, 3.45], Orientation::IndexAsIndependent),
            estimate_for(vec![3.0, 3.1, 3.25, 3.3, 3.45], Orientation::SpacingAsIndependent),
        ]
    }

    #[test]
    fn test_render_png() {
        let config = PlotConfig::default();
        for (i, estimate) in both_orientations().iter().enumerate() {
            let path = temp_output(&format!("spacing_{}.png", i));
            generate_spacing_plot(estimate, &path, &config, false).unwrap();

            let bytes = std::fs::read(&path).unwrap();
            assert_eq!(png_dimensions(&bytes), (1800, 3000));
            std::fs::remove_file(&path).ok();
        }
    }

    #[test]
    fn test_render_svg() {
        let config = PlotConfig {
            title: Some("lp01".to_string()),
            ..PlotConfig::default()
        };
        for (i, estimate) in both_orientations().iter().enumerate() {
            let path = temp_output(&format!("spacing_{}.svg", i));
            generate_spacing_plot(estimate, &path, &config, true).unwrap();

            let content = std::fs::read_to_string(&path).unwrap();
            assert!(content.contains("<svg"));
            assert!(content.contains("Layer Number"));
            assert!(content.contains("Interlayer Distance (nm)"));
            std::fs::remove_file(&path).ok();
        }
    }

    #[test]
    fn test_ticked_axis_key_points() {
        use plotters::coord::ranged1d::BoldPoints;

        let axis = TickedAxis::new(-5.5..-0.5, vec![-5.0, -3.0, -1.0]);
        assert_eq!(axis.key_points(BoldPoints(10)), vec![-5.0, -3.0, -1.0]);
        assert_eq!(axis.range(), -5.5..-0.5);
        assert!(axis.map(&-5.0, (0, 100)) < axis.map(&-1.0, (0, 100)));
    }

    #[test]
    fn test_canvas_size() {
        let config = PlotConfig::default();
        assert_eq!(config.canvas_size(false), (1800, 3000));
        assert_eq!(config.canvas_size(true), (432, 720));
    }

    #[test]
    fn test_trend_line_index_orientation() {
        let estimate = estimate_for(vec![3.0, 3.1, 3.2, 3.3], Orientation::IndexAsIndependent);
        let line = trend_line(&estimate);
        assert_eq!(line.len(), TREND_SAMPLES);
        assert!((line[0].1 - 1.0).abs() < 1e-12);
        assert!((line[TREND_SAMPLES - 1].1 - 4.0).abs() < 1e-12);
        assert!((line[0].0 - 3.0).abs() < 1e-9);
        assert!((line[TREND_SAMPLES - 1].0 - 3.3).abs() < 1e-9);
    }

    #[test]
    fn test_trend_line_spacing_orientation() {
        let estimate = estimate_for(vec![3.2, 3.0, 3.4], Orientation::SpacingAsIndependent);
        let line = trend_line(&estimate);
        assert_eq!(line.len(), 3);
        assert!(line.windows(2).all(|w| w[0].0 <= w[1].0));
        for (x, y) in line {
            assert!((estimate.trend.evaluate(x) - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_tick_precision() {
        assert_eq!(tick_precision(&[0.0, 2.0, 4.0]), 0);
        assert_eq!(tick_precision(&[2.9, 3.0, 3.1]), 1);
        assert_eq!(tick_precision(&[0.05, 0.1]), 2);
        assert_eq!(tick_precision(&[1.0]), 0);
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(1.0, 3.0, 3), vec![1.0, 2.0, 3.0]);
        assert_eq!(linspace(1.0, 3.0, 1), vec![1.0]);
        assert!(linspace(1.0, 3.0, 0).is_empty());
    }
}
