//! # 峰检测子命令实现
//!
//! 平滑线扫描谱并列出检测到的原子层峰，可选导出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的 PeaksArgs
//! - 使用 `profile/estimator.rs` 和 `profile/export.rs`

use super::{load_profile, print_thresholds};
use crate::cli::analyze::PeaksArgs;
use crate::error::Result;
use crate::profile::peaks::Peak;
use crate::profile::{export, SpacingEstimator};
use crate::utils::output;

use tabled::{Table, Tabled};

/// 执行峰检测
pub fn execute(args: PeaksArgs) -> Result<()> {
    output::print_header("HAADF Line Profile Peak Detection");

    let config = args.estimator.to_config()?;
    let profile = load_profile(&args.input, &args.estimator)?;

    let estimator = SpacingEstimator::new(config);
    let detection = estimator.detect(&profile)?;

    print_thresholds(&detection.peaks.thresholds);
    output::print_success(&format!("Detected {} peaks", detection.peaks.len()));
    print_peak_table(&detection.peaks.peaks);

    if let Some(path) = &args.output {
        export::peaks_to_csv(&detection.peaks, path)?;
        output::print_success(&format!("Peaks saved to '{}'", path.display()));
    }

    Ok(())
}

/// 打印峰位表格
fn print_peak_table(peaks: &[Peak]) {
    #[derive(Tabled)]
    struct PeakRow {
        #[tabled(rename = "#")]
        number: usize,
        #[tabled(rename = "Index")]
        index: usize,
        #[tabled(rename = "Position (nm)")]
        position: String,
        #[tabled(rename = "Height")]
        height: String,
        #[tabled(rename = "Prominence")]
        prominence: String,
        #[tabled(rename = "Width")]
        width: String,
    }

    let rows: Vec<PeakRow> = peaks
        .iter()
        .enumerate()
        .map(|(i, p)| PeakRow {
            number: i + 1,
            index: p.index,
            position: format!("{:.4}", p.position),
            height: format!("{:.1}", p.height),
            prominence: format!("{:.1}", p.prominence),
            width: format!("{:.2}", p.width),
        })
        .collect();

    if !rows.is_empty() {
        println!("{}", Table::new(&rows));
    }
}
