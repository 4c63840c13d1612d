//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `analyze`: 分析功能（嵌套子命令）
//!   - `spacing`: 层间距分析与作图
//!   - `peaks`: 原子层峰检测
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: analyze

pub mod analyze;

use clap::{Parser, Subcommand};

/// stemline - HAADF-STEM 线扫描谱分析工具
#[derive(Parser)]
#[command(name = "stemline")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "HAADF-STEM line-profile analysis: atomic-layer peaks and interlayer spacing", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Analyze HAADF-STEM intensity line profiles
    Analyze(analyze::AnalyzeArgs),
}
