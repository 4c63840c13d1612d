//! # 数据模型模块
//!
//! 定义 HAADF-STEM 线扫描谱的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`profile/` 和 `commands/` 使用
//! - 子模块: profile

pub mod profile;

pub use profile::{LineProfile, Sample};
