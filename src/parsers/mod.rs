//! # 解析器模块
//!
//! 提供线扫描谱文件的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: profile_csv

pub mod profile_csv;

pub use profile_csv::CsvOptions;

use crate::error::{Result, StemlineError};
use crate::models::LineProfile;
use std::path::Path;

/// 从文件路径推断格式并解析
pub fn parse_profile_file(path: &Path, options: &CsvOptions) -> Result<LineProfile> {
    if !path.is_file() {
        return Err(StemlineError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "txt" | "tsv" => profile_csv::parse_profile_csv_file(path, options),
        _ => Err(StemlineError::ParseError {
            format: ext,
            path: path.display().to_string(),
            reason: "unsupported line-profile format (expected .csv, .txt or .tsv)".to_string(),
        }),
    }
}
