//! # 批量处理模块
//!
//! 对目录中的多条线扫描谱并行执行分析。
//!
//! ## 功能
//! - 按模式收集线扫描谱文件（大小写不敏感，结果有序）
//! - 基于 rayon 的并行处理
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/analyze/spacing.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchRunner, ProcessResult};
