//! # 数据导出
//!
//! 导出层间距和峰位到 CSV 格式。
//!
//! ## 支持格式
//! - 层间距 CSV: layer, spacing_nm, trend_nm
//! - 峰位 CSV: index, position_nm, height, prominence, width_samples, left_ip, right_ip
//!
//! ## 依赖关系
//! - 被 `commands/analyze/` 调用
//! - 使用 `profile/estimator.rs` 和 `profile/peaks.rs` 的结果结构
//! - 使用 `csv` + `serde` 写入 CSV 文件

use crate::error::{Result, StemlineError};
use crate::profile::estimator::SpacingEstimate;
use crate::profile::peaks::PeakSet;

use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// 层间距导出行
#[derive(Debug, Serialize)]
struct SpacingRow {
    layer: usize,
    spacing_nm: String,
    trend_nm: String,
}

/// 峰位导出行
#[derive(Debug, Serialize)]
struct PeakRow {
    index: usize,
    position_nm: String,
    height: String,
    prominence: String,
    width_samples: String,
    left_ip: String,
    right_ip: String,
}

/// 层间距导出行（含趋势线在该层的取值）
fn spacing_rows(estimate: &SpacingEstimate) -> Vec<SpacingRow> {
    estimate
        .spacing
        .iter()
        .zip(estimate.layer_numbers())
        .map(|(spacing, layer)| SpacingRow {
            layer: layer as usize,
            spacing_nm: format!("{:.6}", spacing),
            trend_nm: estimate
                .trend
                .spacing_at(layer)
                .map(|t| format!("{:.6}", t))
                .unwrap_or_default(),
        })
        .collect()
}

fn peak_rows(peaks: &PeakSet) -> Vec<PeakRow> {
    peaks
        .peaks
        .iter()
        .map(|p| PeakRow {
            index: p.index,
            position_nm: format!("{:.6}", p.position),
            height: format!("{:.3}", p.height),
            prominence: format!("{:.3}", p.prominence),
            width_samples: format!("{:.3}", p.width),
            left_ip: format!("{:.3}", p.left_ip),
            right_ip: format!("{:.3}", p.right_ip),
        })
        .collect()
}

/// 导出层间距为 CSV
pub fn spacing_to_csv(estimate: &SpacingEstimate, output_path: &Path) -> Result<()> {
    let file = create_file(output_path)?;
    write_rows(file, &spacing_rows(estimate), output_path)
}

/// 导出峰位为 CSV
pub fn peaks_to_csv(peaks: &PeakSet, output_path: &Path) -> Result<()> {
    let file = create_file(output_path)?;
    write_rows(file, &peak_rows(peaks), output_path)
}

fn create_file(output_path: &Path) -> Result<std::fs::File> {
    std::fs::File::create(output_path).map_err(|e| StemlineError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}

fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| StemlineError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::peaks::{Peak, PeakCriteria};
    use crate::profile::trend::{fit_trend, Orientation};

    fn sample_peaks() -> PeakSet {
        let peaks = [2usize, 5, 8]
            .iter()
            .map(|&i| Peak {
                index: i,
                position: i as f64,
                height: 1000.0,
                prominence: 1000.0,
                width: 1.0,
                left_ip: i as f64 - 0.5,
                right_ip: i as f64 + 0.5,
            })
            .collect();
        PeakSet {
            peaks,
            thresholds: PeakCriteria::default().thresholds(1.0),
        }
    }

    fn to_string<T: Serialize>(rows: &[T]) -> String {
        let mut buf = Vec::new();
        write_rows(&mut buf, rows, Path::new("memory")).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_spacing_rows() {
        let spacing = vec![3.0, 3.0];
        let estimate = SpacingEstimate {
            smoothed: Vec::new(),
            peaks: sample_peaks(),
            trend: fit_trend(&spacing, Orientation::IndexAsIndependent).unwrap(),
            spacing,
        };

        let csv = to_string(&spacing_rows(&estimate));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "layer,spacing_nm,trend_nm");
        assert_eq!(lines[1], "1,3.000000,3.000000");
        assert_eq!(lines[2], "2,3.000000,3.000000");
    }

    #[test]
    fn test_peak_rows() {
        let csv = to_string(&peak_rows(&sample_peaks()));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "index,position_nm,height,prominence,width_samples,left_ip,right_ip"
        );
        assert_eq!(lines[1], "2,2.000000,1000.000,1000.000,1.000,1.500,2.500");
    }
}
