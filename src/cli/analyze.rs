//! # analyze 子命令 CLI 定义
//!
//! 分析功能统一入口，包含多个子命令：
//! - `spacing`: 层间距分析（峰检测 + 趋势拟合 + 作图/导出）
//! - `peaks`: 仅做峰检测并列出峰位
//!
//! 所有阈值参数均可通过 `STEMLINE_*` 环境变量覆盖默认值。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/analyze/` 相应模块

use crate::error::{Result, StemlineError};
use crate::parsers::profile_csv::{CsvOptions, DEFAULT_POSITION_SCALE, DEFAULT_SKIP_ROWS};
use crate::profile::smoothing::{DEFAULT_POLY_ORDER, DEFAULT_WINDOW_LENGTH};
use crate::profile::{EstimatorConfig, Orientation, PeakCriteria, PlotConfig};

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// Analyze 主命令
// ─────────────────────────────────────────────────────────────

/// analyze 主命令参数
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(subcommand)]
    pub command: AnalyzeCommands,
}

/// analyze 子命令
#[derive(Subcommand, Debug)]
pub enum AnalyzeCommands {
    /// Measure interlayer spacing and its linear trend from HAADF line profiles
    Spacing(SpacingArgs),

    /// Detect atomic-layer peaks in a HAADF line profile
    Peaks(PeaksArgs),
}

// ─────────────────────────────────────────────────────────────
// 共用估计器参数
// ─────────────────────────────────────────────────────────────

/// 读取与峰检测参数
#[derive(Args, Debug, Clone)]
pub struct EstimatorArgs {
    /// Number of descriptive lines to skip at the top of the CSV
    #[arg(long, env = "STEMLINE_SKIP_ROWS", default_value_t = DEFAULT_SKIP_ROWS)]
    pub skip_rows: usize,

    /// Factor converting the position column to nanometers (1e9 for meters)
    #[arg(long, env = "STEMLINE_POSITION_SCALE", default_value_t = DEFAULT_POSITION_SCALE)]
    pub position_scale: f64,

    /// Savitzky-Golay window length (odd number of samples)
    #[arg(long, env = "STEMLINE_WINDOW_LENGTH", default_value_t = DEFAULT_WINDOW_LENGTH)]
    pub window_length: usize,

    /// Savitzky-Golay polynomial order
    #[arg(long, env = "STEMLINE_POLYORDER", default_value_t = DEFAULT_POLY_ORDER)]
    pub polyorder: usize,

    /// Minimum peak prominence (intensity units)
    #[arg(long, env = "STEMLINE_PROMINENCE", default_value_t = 500.0)]
    pub prominence: f64,

    /// Minimum peak distance in nm (multiplied by samples per nm)
    #[arg(long, env = "STEMLINE_DISTANCE_FACTOR", default_value_t = 1.5)]
    pub distance_factor: f64,

    /// Minimum peak width in nm at half prominence
    #[arg(long, env = "STEMLINE_MIN_WIDTH_FACTOR", default_value_t = 1.0)]
    pub min_width_factor: f64,

    /// Maximum peak width in nm at half prominence
    #[arg(long, env = "STEMLINE_MAX_WIDTH_FACTOR", default_value_t = 4.0)]
    pub max_width_factor: f64,

    /// Relative height (of prominence) at which peak width is measured
    #[arg(long, env = "STEMLINE_REL_HEIGHT", default_value_t = 0.5)]
    pub rel_height: f64,
}

impl EstimatorArgs {
    /// CSV 读取选项
    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            skip_rows: self.skip_rows,
            position_scale: self.position_scale,
        }
    }

    /// 校验并生成估计器参数
    pub fn to_config(&self) -> Result<EstimatorConfig> {
        if !self.prominence.is_finite() || self.prominence < 0.0 {
            return Err(StemlineError::InvalidArgument(format!(
                "prominence must be non-negative, got {}",
                self.prominence
            )));
        }
        for (name, value) in [
            ("distance factor", self.distance_factor),
            ("min width factor", self.min_width_factor),
            ("max width factor", self.max_width_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(StemlineError::InvalidArgument(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.max_width_factor < self.min_width_factor {
            return Err(StemlineError::InvalidArgument(format!(
                "max width factor ({}) is smaller than min width factor ({})",
                self.max_width_factor, self.min_width_factor
            )));
        }
        if !(self.rel_height > 0.0 && self.rel_height <= 1.0) {
            return Err(StemlineError::InvalidArgument(format!(
                "relative height must be in (0, 1], got {}",
                self.rel_height
            )));
        }

        Ok(EstimatorConfig {
            window_length: self.window_length,
            poly_order: self.polyorder,
            criteria: PeakCriteria {
                min_prominence: self.prominence,
                distance_factor: self.distance_factor,
                min_width_factor: self.min_width_factor,
                max_width_factor: self.max_width_factor,
                rel_height: self.rel_height,
            },
        })
    }
}

// ─────────────────────────────────────────────────────────────
// 层间距分析子命令
// ─────────────────────────────────────────────────────────────

/// 层号取向
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum LayerOrientation {
    /// Layers counted from 0; fit layer index as a function of spacing
    Top,
    /// Layers counted from 1; fit spacing as a function of layer index
    #[default]
    Bottom,
}

impl From<LayerOrientation> for Orientation {
    fn from(value: LayerOrientation) -> Self {
        match value {
            LayerOrientation::Top => Orientation::SpacingAsIndependent,
            LayerOrientation::Bottom => Orientation::IndexAsIndependent,
        }
    }
}

impl std::fmt::Display for LayerOrientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerOrientation::Top => write!(f, "top"),
            LayerOrientation::Bottom => write!(f, "bottom"),
        }
    }
}

/// 层间距输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SpacingOutputFormat {
    /// PNG image (publication quality)
    Png,
    /// SVG vector image
    Svg,
    /// CSV data file (layer, spacing, trend)
    Csv,
}

impl SpacingOutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SpacingOutputFormat::Png => "png",
            SpacingOutputFormat::Svg => "svg",
            SpacingOutputFormat::Csv => "csv",
        }
    }
}

/// spacing 子命令参数
#[derive(Args, Debug)]
pub struct SpacingArgs {
    /// Input: line-profile CSV file or directory containing CSV files
    pub input: PathBuf,

    /// Output: file path (single mode) or directory (batch mode)
    #[arg(short, long, default_value = "interlayer_spacing.png")]
    pub output: PathBuf,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<SpacingOutputFormat>,

    /// Layer numbering and trend orientation
    #[arg(long, value_enum, default_value_t = LayerOrientation::Bottom)]
    pub orientation: LayerOrientation,

    /// Title for the plot
    #[arg(long)]
    pub title: Option<String>,

    /// Resolution for PNG output (dots per inch)
    #[arg(long, default_value_t = 300)]
    pub dpi: u32,

    /// Figure width in inches
    #[arg(long, default_value_t = 6.0)]
    pub fig_width: f64,

    /// Figure height in inches
    #[arg(long, default_value_t = 10.0)]
    pub fig_height: f64,

    /// Font size in points for tick labels and axis titles
    #[arg(long, default_value_t = 26.0)]
    pub font_size: f64,

    /// Approximate number of x-axis ticks before keeping every other one
    #[arg(long, default_value_t = 8)]
    pub x_ticks: usize,

    #[command(flatten)]
    pub estimator: EstimatorArgs,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for input files (batch mode, comma separated)
    #[arg(long, default_value = "*.csv")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Overwrite existing output files (batch mode)
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

impl SpacingArgs {
    /// 校验并生成图表参数
    pub fn plot_config(&self) -> Result<PlotConfig> {
        if self.dpi == 0 {
            return Err(StemlineError::InvalidArgument("dpi must be positive".to_string()));
        }
        for (name, value) in [
            ("figure width", self.fig_width),
            ("figure height", self.fig_height),
            ("font size", self.font_size),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(StemlineError::InvalidArgument(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        Ok(PlotConfig {
            width_in: self.fig_width,
            height_in: self.fig_height,
            dpi: self.dpi,
            font_size_pt: self.font_size,
            x_tick_count: self.x_ticks,
            title: self.title.clone(),
        })
    }
}

// ─────────────────────────────────────────────────────────────
// 峰检测子命令
// ─────────────────────────────────────────────────────────────

/// peaks 子命令参数
#[derive(Args, Debug)]
pub struct PeaksArgs {
    /// Input line-profile CSV file
    pub input: PathBuf,

    /// Optional CSV file for the detected peaks
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub estimator: EstimatorArgs,
}
