//! # analyze 命令实现
//!
//! 分析功能统一入口，包含多个子命令：
//! - `spacing`: 层间距与趋势分析
//! - `peaks`: 原子层峰检测
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的参数
//! - 子模块: spacing, peaks

pub mod peaks;
pub mod spacing;

use crate::cli::analyze::{AnalyzeArgs, AnalyzeCommands, EstimatorArgs};
use crate::error::Result;
use crate::models::LineProfile;
use crate::parsers;
use crate::profile::peaks::PeakThresholds;
use crate::utils::output;

use std::path::Path;

/// 执行 analyze 命令
pub fn execute(args: AnalyzeArgs) -> Result<()> {
    match args.command {
        AnalyzeCommands::Spacing(spacing_args) => spacing::execute(spacing_args),
        AnalyzeCommands::Peaks(peaks_args) => peaks::execute(peaks_args),
    }
}

/// 读取线扫描谱并打印概况
fn load_profile(input: &Path, estimator: &EstimatorArgs) -> Result<LineProfile> {
    let profile = parsers::parse_profile_file(input, &estimator.csv_options())?;
    output::print_success(&format!(
        "Loaded line profile: {} ({} samples, {:.3} nm)",
        profile.name,
        profile.len(),
        profile.span()
    ));
    Ok(profile)
}

/// 打印由采样密度推导出的峰检测阈值
fn print_thresholds(thresholds: &PeakThresholds) {
    output::print_info("Peak detection thresholds:");
    output::print_field(
        "sampling density",
        &format!("{:.4} samples/nm", thresholds.density),
    );
    output::print_field(
        "min distance",
        &format!("{} samples", thresholds.min_distance),
    );
    output::print_field("min prominence", &format!("{:.1}", thresholds.min_prominence));
    output::print_field(
        "width range",
        &format!(
            "{:.0} - {:.0} samples at {:.0}% prominence",
            thresholds.min_width,
            thresholds.max_width,
            thresholds.rel_height * 100.0
        ),
    );
}
