//! # stemline - HAADF-STEM 线扫描层间距分析工具
//!
//! 从 HAADF-STEM 强度线扫描谱中检测原子层、计算层间距并拟合其线性趋势，
//! 统一成单一可执行文件。
//!
//! ## 子命令
//! - `analyze` - 分析功能
//!   - `spacing` - 层间距与趋势分析（作图 / 导出）
//!   - `peaks`   - 原子层峰检测
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (线扫描谱解析)
//!   │     ├── profile/   (平滑、峰检测、趋势拟合、作图)
//!   │     ├── batch/     (批量并行处理)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod profile;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
