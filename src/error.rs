//! # 统一错误处理模块
//!
//! 定义 stemline 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// stemline 统一错误类型
#[derive(Error, Debug)]
pub enum StemlineError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Invalid line profile: {0}")]
    InvalidFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 分析错误（单个谱线的终止性错误）
    // ─────────────────────────────────────────────────────────────
    #[error("Insufficient data: smoothing needs at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("No peaks satisfy the detection thresholds")]
    NoPeaksFound,

    #[error("Insufficient peaks: at least 2 peaks are needed for spacing, found {found}")]
    InsufficientPeaks { found: usize },

    #[error("Degenerate trend fit: {0}")]
    DegenerateFit(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV / 绘图错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Plot rendering failed: {0}")]
    PlotError(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, StemlineError>;
