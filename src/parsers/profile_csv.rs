//! # 线扫描谱 CSV 解析器
//!
//! 解析显微镜软件导出的强度线扫描 CSV 文件。
//!
//! ## 格式说明
//! ```text
//! <描述行 1>
//! <描述行 2>
//! Position (m),Intensity        <- 可选表头（非数值行）
//! 0.0000e+00,1523.0
//! 1.0417e-10,1531.5
//! ...
//! ```
//!
//! - 前 `skip_rows` 行直接跳过
//! - 跳过后的第一行若不是两个数值，视为表头
//! - 第一列为位置（米），第二列为强度，其余列忽略
//! - 位置乘以 `position_scale` 换算为 nm
//! - 分隔符自动识别：逗号、制表符或分号
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/profile.rs`
//! - 使用 `csv` 库读取记录

use crate::error::{Result, StemlineError};
use crate::models::{LineProfile, Sample};

use std::fs;
use std::path::Path;

/// 默认跳过的描述行数
pub const DEFAULT_SKIP_ROWS: usize = 2;

/// 默认位置换算因子（m -> nm）
pub const DEFAULT_POSITION_SCALE: f64 = 1e9;

/// CSV 读取选项
#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    /// 跳过的描述行数
    pub skip_rows: usize,
    /// 位置换算因子
    pub position_scale: f64,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            skip_rows: DEFAULT_SKIP_ROWS,
            position_scale: DEFAULT_POSITION_SCALE,
        }
    }
}

/// 解析线扫描 CSV 文件
pub fn parse_profile_csv_file(path: &Path, options: &CsvOptions) -> Result<LineProfile> {
    let content = fs::read_to_string(path).map_err(|e| StemlineError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("profile");

    parse_profile_csv_content(&content, name, options).map_err(|e| match e {
        StemlineError::ParseError { format, reason, .. } => StemlineError::ParseError {
            format,
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// 从字符串内容解析线扫描 CSV
pub fn parse_profile_csv_content(
    content: &str,
    name: &str,
    options: &CsvOptions,
) -> Result<LineProfile> {
    if !options.position_scale.is_finite() || options.position_scale <= 0.0 {
        return Err(StemlineError::InvalidArgument(format!(
            "position scale must be positive, got {}",
            options.position_scale
        )));
    }

    let body = skip_lines(content, options.skip_rows);
    let delimiter = detect_delimiter(body);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_reader(body.as_bytes());

    let mut samples = Vec::new();
    let mut first_row = true;

    for record in reader.records() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize + options.skip_rows)
            .unwrap_or(0);

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let parsed = parse_pair(&record);

        if first_row {
            first_row = false;
            // 表头行
            if parsed.is_none() {
                continue;
            }
        }

        let (position, intensity) = parsed.ok_or_else(|| StemlineError::ParseError {
            format: "CSV".to_string(),
            path: name.to_string(),
            reason: format!(
                "line {}: expected two numeric columns, got '{}'",
                line,
                record.iter().collect::<Vec<_>>().join(",")
            ),
        })?;

        samples.push(Sample::new(position * options.position_scale, intensity));
    }

    if samples.is_empty() {
        return Err(StemlineError::ParseError {
            format: "CSV".to_string(),
            path: name.to_string(),
            reason: "no data rows found".to_string(),
        });
    }

    LineProfile::new(name, samples)
}

/// 读取记录的前两列数值
fn parse_pair(record: &csv::StringRecord) -> Option<(f64, f64)> {
    let position = record.get(0)?.parse::<f64>().ok()?;
    let intensity = record.get(1)?.parse::<f64>().ok()?;
    Some((position, intensity))
}

/// 跳过前 n 行，返回剩余内容
fn skip_lines(content: &str, n: usize) -> &str {
    let mut offset = 0;
    for (i, line) in content.split_inclusive('\n').enumerate() {
        if i == n {
            break;
        }
        offset += line.len();
    }
    &content[offset..]
}

/// 依据首个非空行识别分隔符
fn detect_delimiter(body: &str) -> u8 {
    let first = body.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if first.contains(',') {
        b','
    } else if first.contains('\t') {
        b'\t'
    } else if first.contains(';') {
        b';'
    } else {
        b','
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VELOX_EXPORT: &str = "Line profile lp01\n\
HAADF 710 kx\n\
Position (m),Intensity\n\
0,1000\n\
1e-10,1200\n\
2e-10,1500\n\
3e-10,1100\n";

    #[test]
    fn test_parse_with_header() {
        let profile =
            parse_profile_csv_content(VELOX_EXPORT, "lp01", &CsvOptions::default()).unwrap();
        assert_eq!(profile.len(), 4);
        assert_eq!(profile.name, "lp01");

        let positions = profile.positions();
        assert!((positions[1] - 0.1).abs() < 1e-9);
        assert!((positions[3] - 0.3).abs() < 1e-9);
        assert_eq!(profile.intensities(), vec![1000.0, 1200.0, 1500.0, 1100.0]);
    }

    #[test]
    fn test_parse_without_header() {
        let content = "a\nb\n0,1\n1e-9,2\n2e-9,3\n";
        let profile = parse_profile_csv_content(content, "x", &CsvOptions::default()).unwrap();
        assert_eq!(profile.len(), 3);
        assert!((profile.span() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_tab_delimited_extra_columns() {
        let content = "a\nb\nx\ty\tz\n0\t5\t9\n1\t6\t9\n";
        let options = CsvOptions {
            skip_rows: 2,
            position_scale: 1.0,
        };
        let profile = parse_profile_csv_content(content, "x", &options).unwrap();
        assert_eq!(profile.positions(), vec![0.0, 1.0]);
        assert_eq!(profile.intensities(), vec![5.0, 6.0]);
    }

    #[test]
    fn test_parse_bad_row_reports_line() {
        let content = "a\nb\nPosition,Intensity\n0,1\noops,2\n";
        let err = parse_profile_csv_content(content, "x", &CsvOptions::default()).unwrap_err();
        match err {
            StemlineError::ParseError { reason, .. } => assert!(reason.contains("line 5")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_body() {
        let content = "a\nb\nPosition,Intensity\n";
        let result = parse_profile_csv_content(content, "x", &CsvOptions::default());
        assert!(matches!(result, Err(StemlineError::ParseError { .. })));
    }

    #[test]
    fn test_skip_lines() {
        assert_eq!(skip_lines("a\nb\nc\n", 2), "c\n");
        assert_eq!(skip_lines("a\nb", 5), "");
        assert_eq!(skip_lines("a\nb", 0), "a\nb");
    }
}
