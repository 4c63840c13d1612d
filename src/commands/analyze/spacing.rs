//! # 层间距分析子命令实现
//!
//! 从 HAADF-STEM 线扫描谱计算原子层间距及其线性趋势。
//!
//! ## 功能
//! - 支持单文件和批量目录处理
//! - 并行处理（rayon），单个文件失败不影响其他文件
//! - 输出图像 (PNG/SVG) 或数据文件 (CSV)
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的 SpacingArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `profile/` 模块进行计算、作图和导出
//! - 使用 `parsers/` 读取线扫描谱

use super::{load_profile, print_thresholds};
use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::analyze::{SpacingArgs, SpacingOutputFormat};
use crate::error::{Result, StemlineError};
use crate::parsers::{self, CsvOptions};
use crate::profile::{
    export, plot, EstimatorConfig, Orientation, PlotConfig, SpacingEstimate, SpacingEstimator,
};
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{Table, Tabled};

/// 单文件模式的默认输出文件名
const DEFAULT_OUTPUT: &str = "interlayer_spacing.png";

/// 执行层间距分析
pub fn execute(args: SpacingArgs) -> Result<()> {
    output::print_header("HAADF Interlayer Spacing Analysis");

    if args.input.is_file() {
        execute_single_file(&args)
    } else if args.input.is_dir() {
        execute_batch(&args)
    } else {
        Err(StemlineError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────
// 单文件模式
// ─────────────────────────────────────────────────────────────

fn execute_single_file(args: &SpacingArgs) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let config = args.estimator.to_config()?;
    let plot_config = args.plot_config()?;
    let orientation = Orientation::from(args.orientation);

    let profile = load_profile(&args.input, &args.estimator)?;
    let estimate = SpacingEstimator::new(config).estimate(&profile, orientation)?;

    print_thresholds(&estimate.peaks.thresholds);
    output::print_success(&format!(
        "Detected {} layers, {} spacings",
        estimate.peaks.len(),
        estimate.spacing.len()
    ));
    print_spacing_table(&estimate);
    print_trend(&estimate);

    let format = args
        .format
        .unwrap_or_else(|| guess_format_from_extension(&args.output));
    write_output(&estimate, &args.output, format, &plot_config)?;

    output::print_success(&format!("Result saved to '{}'", args.output.display()));
    Ok(())
}

// ─────────────────────────────────────────────────────────────
// 批量模式
// ─────────────────────────────────────────────────────────────

/// 批量处理配置
struct BatchSpacingConfig {
    output_dir: PathBuf,
    csv_options: CsvOptions,
    estimator: EstimatorConfig,
    orientation: Orientation,
    plot: PlotConfig,
    format: SpacingOutputFormat,
    overwrite: bool,
}

/// 批量模式中单个文件的结果摘要
struct SpacingSummary {
    name: String,
    layers: usize,
    mean_spacing: f64,
    slope: f64,
    intercept: f64,
    r_squared: f64,
}

fn execute_batch(args: &SpacingArgs) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }
    output::print_info(&format!("Found {} line profiles", files.len()));

    let output_dir = batch_output_dir(&args.input, &args.output);
    fs::create_dir_all(&output_dir).map_err(|e| StemlineError::FileWriteError {
        path: output_dir.display().to_string(),
        source: e,
    })?;

    let format = args.format.unwrap_or(SpacingOutputFormat::Png);
    output::print_info(&format!("Output format: {:?}", format));
    output::print_info(&format!("Output directory: '{}'", output_dir.display()));

    let config = Arc::new(BatchSpacingConfig {
        output_dir,
        csv_options: args.estimator.csv_options(),
        estimator: args.estimator.to_config()?,
        orientation: Orientation::from(args.orientation),
        plot: args.plot_config()?,
        format,
        overwrite: args.overwrite,
    });

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Running with {} parallel jobs", runner.jobs()));
    let result = runner.run(files, |file| process_batch_file(file, &config))?;

    if !result.successes.is_empty() {
        print_summary_table(&result.successes);
    }

    output::print_separator();
    output::print_success(&format!(
        "Batch complete ({} files): {} success, {} skipped, {} failed",
        result.total(),
        result.successes.len(),
        result.skipped.len(),
        result.failures.len()
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    Ok(())
}

/// 批量模式输出目录：未指定 `-o` 时写回输入目录
fn batch_output_dir(input: &Path, output: &Path) -> PathBuf {
    if output == Path::new(DEFAULT_OUTPUT) {
        input.to_path_buf()
    } else {
        output.to_path_buf()
    }
}

/// 批量模式中某个输入对应的输出路径
fn batch_output_path(input: &Path, output_dir: &Path, format: SpacingOutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("profile");
    output_dir.join(format!("{}_spacing.{}", stem, format.extension()))
}

/// 处理批量模式中的单个文件
fn process_batch_file(input: &PathBuf, config: &Arc<BatchSpacingConfig>) -> ProcessResult<SpacingSummary> {
    let output_file = batch_output_path(input, &config.output_dir, config.format);

    if output_file.exists() && !config.overwrite {
        return ProcessResult::Skipped(format!(
            "Output exists, skipping: {}",
            output_file.display()
        ));
    }

    match process_with_config(input, &output_file, config) {
        Ok(summary) => ProcessResult::Success(summary),
        Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
    }
}

fn process_with_config(
    input: &Path,
    output: &Path,
    config: &BatchSpacingConfig,
) -> Result<SpacingSummary> {
    let profile = parsers::parse_profile_file(input, &config.csv_options)?;
    let estimate = SpacingEstimator::new(config.estimator).estimate(&profile, config.orientation)?;

    // 批量模式下未指定标题时以文件名为标题
    let plot_config = PlotConfig {
        title: config.plot.title.clone().or_else(|| Some(profile.name.clone())),
        ..config.plot.clone()
    };
    write_output(&estimate, output, config.format, &plot_config)?;

    Ok(SpacingSummary {
        name: profile.name,
        layers: estimate.peaks.len(),
        mean_spacing: estimate.mean_spacing(),
        slope: estimate.trend.slope,
        intercept: estimate.trend.intercept,
        r_squared: estimate.trend.r_squared,
    })
}

// ─────────────────────────────────────────────────────────────
// 输出
// ─────────────────────────────────────────────────────────────

fn write_output(
    estimate: &SpacingEstimate,
    output: &Path,
    format: SpacingOutputFormat,
    plot_config: &PlotConfig,
) -> Result<()> {
    match format {
        SpacingOutputFormat::Png | SpacingOutputFormat::Svg => plot::generate_spacing_plot(
            estimate,
            output,
            plot_config,
            format == SpacingOutputFormat::Svg,
        ),
        SpacingOutputFormat::Csv => export::spacing_to_csv(estimate, output),
    }
}

/// 从文件扩展名推断输出格式
fn guess_format_from_extension(path: &Path) -> SpacingOutputFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("svg") => SpacingOutputFormat::Svg,
        Some("csv") => SpacingOutputFormat::Csv,
        _ => SpacingOutputFormat::Png,
    }
}

/// 打印层间距表格
fn print_spacing_table(estimate: &SpacingEstimate) {
    #[derive(Tabled)]
    struct SpacingRow {
        #[tabled(rename = "Layer")]
        layer: String,
        #[tabled(rename = "Spacing (nm)")]
        spacing: String,
        #[tabled(rename = "Trend (nm)")]
        trend: String,
    }

    let rows: Vec<SpacingRow> = estimate
        .spacing
        .iter()
        .zip(estimate.layer_numbers())
        .map(|(spacing, layer)| SpacingRow {
            layer: format!("{:.0}", layer),
            spacing: format!("{:.4}", spacing),
            trend: estimate
                .trend
                .spacing_at(layer)
                .map(|t| format!("{:.4}", t))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    if !rows.is_empty() {
        println!("{}", Table::new(&rows));
    }
}

/// 打印趋势拟合结果
fn print_trend(estimate: &SpacingEstimate) {
    let trend = &estimate.trend;
    let equation = match trend.orientation {
        Orientation::SpacingAsIndependent => {
            format!("layer = {:.4} * d + {:.4}", trend.slope, trend.intercept)
        }
        Orientation::IndexAsIndependent => {
            format!("d = {:.5} * layer + {:.4}", trend.slope, trend.intercept)
        }
    };

    output::print_info(&format!("Linear trend ({})", trend.orientation));
    output::print_field("fit", &equation);
    output::print_field("r squared", &format!("{:.4}", trend.r_squared));
    output::print_field(
        "mean spacing",
        &format!("{:.4} nm", estimate.mean_spacing()),
    );
}

/// 打印批量结果汇总表
fn print_summary_table(summaries: &[SpacingSummary]) {
    #[derive(Tabled)]
    struct SummaryRow {
        #[tabled(rename = "Profile")]
        name: String,
        #[tabled(rename = "Layers")]
        layers: usize,
        #[tabled(rename = "Mean d (nm)")]
        mean_spacing: String,
        #[tabled(rename = "Slope")]
        slope: String,
        #[tabled(rename = "Intercept")]
        intercept: String,
        #[tabled(rename = "R²")]
        r_squared: String,
    }

    let rows: Vec<SummaryRow> = summaries
        .iter()
        .map(|s| SummaryRow {
            name: s.name.clone(),
            layers: s.layers,
            mean_spacing: format!("{:.4}", s.mean_spacing),
            slope: format!("{:.5}", s.slope),
            intercept: format!("{:.4}", s.intercept),
            r_squared: format!("{:.4}", s.r_squared),
        })
        .collect();

    output::print_header("Batch Summary");
    println!("{}", Table::new(&rows));
}
