//! # 文件收集器
//!
//! 在输入目录中收集待分析的线扫描谱文件。
//!
//! ## 功能
//! - 逗号分隔的多模式匹配（`*` 与 `?`，不区分大小写）
//! - 可选递归搜索
//! - 排除本工具自身的输出文件
//! - 按路径排序，保证批处理顺序稳定
//!
//! ## 依赖关系
//! - 被 `commands/analyze/spacing.rs` 调用
//! - 使用 `walkdir` 遍历目录

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 输出文件名后缀，收集时跳过
const OUTPUT_SUFFIXES: &[&str] = &["_spacing.csv", "_peaks.csv"];

/// 文件收集器
pub struct FileCollector {
    /// 输入目录
    root: PathBuf,
    /// 匹配模式列表（已转小写）
    patterns: Vec<String>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器，默认匹配所有 CSV
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            patterns: vec!["*.csv".to_string()],
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        let patterns: Vec<String> = pattern
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !patterns.is_empty() {
            self.patterns = patterns;
        }
        self
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（按路径排序）
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.root.is_file() {
            return vec![self.root.clone()];
        }
        if !self.root.is_dir() {
            return Vec::new();
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| self.accepts(path))
            .collect();

        files.sort();
        files
    }

    /// 文件名匹配任一模式且不是输出文件
    fn accepts(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_lowercase(),
            None => return false,
        };

        if OUTPUT_SUFFIXES.iter().any(|s| filename.ends_with(s)) {
            return false;
        }

        self.patterns
            .iter()
            .any(|pattern| glob_match(pattern, &filename))
    }
}

/// 简单 glob 匹配（支持 * 和 ? 通配符）
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let mut p = 0;
    let mut t = 0;
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                // 回溯：让 * 多吞一个字符
                Some((sp, st)) => {
                    p = sp + 1;
                    t = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*.csv", "20250215 1719 haadf stem-lp01.csv"));
        assert!(!glob_match("*.csv", "lp01.png"));
        assert!(glob_match("lp??.csv", "lp01.csv"));
        assert!(!glob_match("lp?.csv", "lp01.csv"));
        assert!(glob_match("*lp*", "haadf-lp01.csv"));
        assert!(glob_match("*", ""));
    }

    #[test]
    fn test_accepts_case_insensitive_and_skips_outputs() {
        let collector = FileCollector::new(PathBuf::from(".")).with_pattern("*.csv, *.txt");
        assert!(collector.accepts(Path::new("data/LP01.CSV")));
        assert!(collector.accepts(Path::new("data/lp02.txt")));
        assert!(!collector.accepts(Path::new("data/lp01_spacing.csv")));
        assert!(!collector.accepts(Path::new("data/lp01_peaks.csv")));
        assert!(!collector.accepts(Path::new("data/lp01.png")));
    }

    #[test]
    fn test_empty_pattern_keeps_default() {
        let collector = FileCollector::new(PathBuf::from(".")).with_pattern(" , ");
        assert!(collector.accepts(Path::new("lp01.csv")));
    }
}
