//! # 层间距估计器
//!
//! 串联 平滑 → 峰检测 → 层间距 → 趋势拟合 四个步骤。
//! 任一步骤失败即返回错误，不产生部分结果。
//!
//! ## 依赖关系
//! - 被 `commands/analyze/` 调用
//! - 使用 `profile/smoothing.rs`, `profile/peaks.rs`,
//!   `profile/spacing.rs`, `profile/trend.rs`

use crate::error::Result;
use crate::models::LineProfile;
use crate::profile::peaks::{self, PeakCriteria, PeakSet};
use crate::profile::smoothing;
use crate::profile::spacing;
use crate::profile::trend::{self, Orientation, TrendFit};

/// 估计器参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    /// Savitzky–Golay 窗口长度（奇数）
    pub window_length: usize,
    /// Savitzky–Golay 多项式阶数
    pub poly_order: usize,
    /// 峰检测判据
    pub criteria: PeakCriteria,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            window_length: smoothing::DEFAULT_WINDOW_LENGTH,
            poly_order: smoothing::DEFAULT_POLY_ORDER,
            criteria: PeakCriteria::default(),
        }
    }
}

/// 峰检测阶段的结果
#[derive(Debug, Clone)]
pub struct PeakDetection {
    pub smoothed: Vec<f64>,
    pub peaks: PeakSet,
}

/// 完整估计结果
#[derive(Debug, Clone)]
pub struct SpacingEstimate {
    pub smoothed: Vec<f64>,
    pub peaks: PeakSet,
    /// 层间距（nm），长度为峰数减一
    pub spacing: Vec<f64>,
    pub trend: TrendFit,
}

impl SpacingEstimate {
    /// 与层间距对应的层号
    pub fn layer_numbers(&self) -> Vec<f64> {
        self.trend.orientation.layer_numbers(self.spacing.len())
    }

    /// 平均层间距（nm）
    pub fn mean_spacing(&self) -> f64 {
        self.spacing.iter().sum::<f64>() / self.spacing.len() as f64
    }
}

/// 层间距估计器
pub struct SpacingEstimator {
    config: EstimatorConfig,
}

impl SpacingEstimator {
    /// 创建新的估计器
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// 平滑并检测峰
    pub fn detect(&self, profile: &LineProfile) -> Result<PeakDetection> {
        let smoothed = smoothing::smooth(
            &profile.intensities(),
            self.config.window_length,
            self.config.poly_order,
        )?;
        let peaks = peaks::detect_peaks(&smoothed, &profile.positions(), &self.config.criteria)?;
        Ok(PeakDetection { smoothed, peaks })
    }

    /// 完整流程
    pub fn estimate(
        &self,
        profile: &LineProfile,
        orientation: Orientation,
    ) -> Result<SpacingEstimate> {
        let PeakDetection { smoothed, peaks } = self.detect(profile)?;
        let spacing = spacing::spacing_from_peaks(&peaks, &profile.positions())?;
        let trend = trend::fit_trend(&spacing, orientation)?;

        Ok(SpacingEstimate {
            smoothed,
            peaks,
            spacing,
            trend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StemlineError;

    fn estimate(profile: &LineProfile, orientation: Orientation) -> Result<SpacingEstimate> {
        SpacingEstimator::new(EstimatorConfig::default()).estimate(profile, orientation)
    }

    /// 0.1 nm 步长、σ = 6 个采样点的高斯峰序列
    fn gaussian_profile(len: usize, centers: &[usize]) -> LineProfile {
        let positions: Vec<f64> = (0..len).map(|i| i as f64 * 0.1).collect();
        let intensities: Vec<f64> = (0..len)
            .map(|i| {
                let peaks: f64 = centers
                    .iter()
                    .map(|&c| {
                        let z = (i as f64 - c as f64) / 6.0;
                        2000.0 * (-0.5 * z * z).exp()
                    })
                    .sum();
                100.0 + peaks
            })
            .collect();
        LineProfile::from_columns("synthetic", &positions, &intensities).unwrap()
    }

    #[test]
    fn test_uniform_layers() {
        let centers: Vec<usize> = (0..10).map(|k| 15 + 30 * k).collect();
        let profile = gaussian_profile(301, &centers);

        let result = estimate(&profile, Orientation::IndexAsIndependent).unwrap();
        assert_eq!(result.peaks.indices(), centers);
        assert_eq!(result.spacing.len(), centers.len() - 1);
        for s in &result.spacing {
            assert!((s - 3.0).abs() < 1e-9, "spacing {}", s);
        }
        assert!(result.trend.slope.abs() < 1e-9);
        assert!((result.trend.intercept - 3.0).abs() < 1e-9);
        assert_eq!(result.layer_numbers()[0], 1.0);
        assert!((result.mean_spacing() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_uniform_layers_spacing_orientation_degenerate() {
        let centers: Vec<usize> = (0..10).map(|k| 15 + 30 * k).collect();
        let profile = gaussian_profile(301, &centers);

        let result = estimate(&profile, Orientation::SpacingAsIndependent);
        assert!(matches!(result, Err(StemlineError::DegenerateFit(_))));
    }

    #[test]
    fn test_expanding_layers() {
        let centers = [15, 45, 77, 111, 147, 185, 225];
        let profile = gaussian_profile(245, &centers);

        let result = estimate(&profile, Orientation::SpacingAsIndependent).unwrap();
        assert_eq!(result.peaks.indices(), centers.to_vec());

        // spacing = 3.0 + 0.2·i  =>  i = 5·spacing - 15
        assert!((result.trend.slope - 5.0).abs() < 1e-6);
        assert!((result.trend.intercept + 15.0).abs() < 1e-6);
        assert_eq!(result.layer_numbers()[0], 0.0);
    }

    #[test]
    fn test_too_few_samples() {
        let profile =
            LineProfile::from_columns("short", &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], &[0.0; 6])
                .unwrap();
        let result = estimate(&profile, Orientation::IndexAsIndependent);
        assert!(matches!(
            result,
            Err(StemlineError::InsufficientData {
                required: 7,
                actual: 6
            })
        ));
    }

    #[test]
    fn test_flat_profile_has_no_peaks() {
        let positions: Vec<f64> = (0..50).map(|i| i as f64 * 0.1).collect();
        let profile = LineProfile::from_columns("flat", &positions, &[1000.0; 50]).unwrap();
        let result = estimate(&profile, Orientation::IndexAsIndependent);
        assert!(matches!(result, Err(StemlineError::NoPeaksFound)));
    }

    #[test]
    fn test_single_layer_insufficient_peaks() {
        let profile = gaussian_profile(101, &[50]);
        let result = estimate(&profile, Orientation::IndexAsIndependent);
        assert!(matches!(
            result,
            Err(StemlineError::InsufficientPeaks { found: 1 })
        ));
    }

    #[test]
    fn test_custom_prominence_threshold() {
        let centers: Vec<usize> = (0..5).map(|k| 15 + 30 * k).collect();
        let profile = gaussian_profile(151, &centers);

        let mut config = EstimatorConfig::default();
        config.criteria.min_prominence = 5000.0;
        let result = SpacingEstimator::new(config).detect(&profile);
        assert!(matches!(result, Err(StemlineError::NoPeaksFound)));
    }
}
