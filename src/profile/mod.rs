//! # 线扫描谱分析模块
//!
//! 从 HAADF-STEM 强度线扫描中提取原子层位置、层间距及其线性趋势。
//!
//! ## 子模块
//! - `smoothing`: Savitzky–Golay 平滑
//! - `peaks`: 原子层峰检测
//! - `spacing`: 层间距计算
//! - `trend`: 线性趋势拟合
//! - `estimator`: 完整流程
//! - `ticks`: 坐标轴刻度
//! - `plot`: 图表生成
//! - `export`: 数据导出
//!
//! ## 依赖关系
//! - 被 `commands/analyze/` 使用
//! - 使用 `models/profile.rs`

pub mod estimator;
pub mod export;
pub mod peaks;
pub mod plot;
pub mod smoothing;
pub mod spacing;
pub mod ticks;
pub mod trend;

pub use estimator::{EstimatorConfig, SpacingEstimate, SpacingEstimator};
pub use peaks::PeakCriteria;
pub use plot::PlotConfig;
pub use trend::Orientation;
