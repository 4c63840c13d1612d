//! # 层间距线性趋势拟合
//!
//! 对 (层号, 层间距) 做一次多项式普通最小二乘拟合。
//!
//! ## 两种取向
//! - `SpacingAsIndependent`: 层号从 0 开始，拟合 `index = slope·spacing + intercept`
//! - `IndexAsIndependent`: 层号从 1 开始，拟合 `spacing = slope·index + intercept`
//!
//! 两种取向互为近似反函数：在层号 k 处，正反两次求值得到的层号偏差为
//! `(1 − r²)·|k − k̄|`，其中 r 为相关系数、k̄ 为层号均值。
//!
//! ## 依赖关系
//! - 被 `profile/estimator.rs` 和 `profile/plot.rs` 使用

use crate::error::{Result, StemlineError};

/// 拟合取向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// 层间距为自变量，层号从 0 开始
    SpacingAsIndependent,
    /// 层号为自变量，层号从 1 开始
    IndexAsIndependent,
}

impl Orientation {
    /// 第一层的层号
    pub fn first_layer(&self) -> usize {
        match self {
            Orientation::SpacingAsIndependent => 0,
            Orientation::IndexAsIndependent => 1,
        }
    }

    /// 长度为 n 的层号序列
    pub fn layer_numbers(&self, n: usize) -> Vec<f64> {
        let first = self.first_layer();
        (first..first + n).map(|i| i as f64).collect()
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::SpacingAsIndependent => write!(f, "spacing-as-independent"),
            Orientation::IndexAsIndependent => write!(f, "index-as-independent"),
        }
    }
}

/// 一次多项式拟合结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
    pub orientation: Orientation,
    /// 决定系数
    pub r_squared: f64,
}

impl TrendFit {
    /// 在自变量 x 处求值
    pub fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// 给定层号时的层间距
    pub fn spacing_at(&self, layer: f64) -> Option<f64> {
        match self.orientation {
            Orientation::IndexAsIndependent => Some(self.evaluate(layer)),
            Orientation::SpacingAsIndependent => self.invert(layer),
        }
    }

    /// 给定层间距时的层号
    pub fn index_at(&self, spacing: f64) -> Option<f64> {
        match self.orientation {
            Orientation::SpacingAsIndependent => Some(self.evaluate(spacing)),
            Orientation::IndexAsIndependent => self.invert(spacing),
        }
    }

    fn invert(&self, y: f64) -> Option<f64> {
        if self.slope == 0.0 {
            None
        } else {
            Some((y - self.intercept) / self.slope)
        }
    }
}

/// 拟合层间距趋势
pub fn fit_trend(spacing: &[f64], orientation: Orientation) -> Result<TrendFit> {
    if spacing.len() < 2 {
        return Err(StemlineError::DegenerateFit(format!(
            "a line needs at least 2 spacing values, got {}",
            spacing.len()
        )));
    }

    let layers = orientation.layer_numbers(spacing.len());
    let (x, y) = match orientation {
        Orientation::SpacingAsIndependent => {
            if is_constant(spacing) {
                return Err(StemlineError::DegenerateFit(
                    "all spacing values are identical; index cannot be regressed on spacing"
                        .to_string(),
                ));
            }
            (spacing, layers.as_slice())
        }
        Orientation::IndexAsIndependent => (layers.as_slice(), spacing),
    };

    let (slope, intercept, r_squared) = least_squares(x, y).ok_or_else(|| {
        StemlineError::DegenerateFit("singular design matrix".to_string())
    })?;

    Ok(TrendFit {
        slope,
        intercept,
        orientation,
        r_squared,
    })
}

/// 相对容差内视为常数
fn is_constant(values: &[f64]) -> bool {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let scale = min.abs().max(max.abs()).max(1.0);
    max - min <= 1e-12 * scale
}

/// 普通最小二乘，返回 (slope, intercept, r²)
fn least_squares(x: &[f64], y: &[f64]) -> Option<(f64, f64, f64)> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }

    // 因变量为常数时拟合残差为零
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        sxy * sxy / (sxx * syy)
    };

    Some((slope, intercept, r_squared))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drifting_series(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 2.0 + 0.05 * i as f64 + 0.02 * (1.7 * i as f64).sin())
            .collect()
    }

    #[test]
    fn test_constant_spacing_index_orientation() {
        let fit = fit_trend(&[3.0; 5], Orientation::IndexAsIndependent).unwrap();
        assert!(fit.slope.abs() < 1e-12);
        assert!((fit.intercept - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_spacing_spacing_orientation_degenerate() {
        let result = fit_trend(&[3.0; 5], Orientation::SpacingAsIndependent);
        assert!(matches!(result, Err(StemlineError::DegenerateFit(_))));
    }

    #[test]
    fn test_too_few_values() {
        for orientation in [
            Orientation::SpacingAsIndependent,
            Orientation::IndexAsIndependent,
        ] {
            assert!(matches!(
                fit_trend(&[2.5], orientation),
                Err(StemlineError::DegenerateFit(_))
            ));
            assert!(matches!(
                fit_trend(&[], orientation),
                Err(StemlineError::DegenerateFit(_))
            ));
        }
    }

    #[test]
    fn test_exact_line_index_orientation() {
        // spacing = 0.1·k + 2.0, k = 1..=6
        let spacing: Vec<f64> = (1..=6).map(|k| 0.1 * k as f64 + 2.0).collect();
        let fit = fit_trend(&spacing, Orientation::IndexAsIndependent).unwrap();
        assert!((fit.slope - 0.1).abs() < 1e-12);
        assert!((fit.intercept - 2.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_line_spacing_orientation() {
        // index = 4·spacing - 8, i = 0..5
        let spacing: Vec<f64> = (0..6).map(|i| (i as f64 + 8.0) / 4.0).collect();
        let fit = fit_trend(&spacing, Orientation::SpacingAsIndependent).unwrap();
        assert!((fit.slope - 4.0).abs() < 1e-9);
        assert!((fit.intercept + 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_is_idempotent() {
        let spacing = drifting_series(12);
        for orientation in [
            Orientation::SpacingAsIndependent,
            Orientation::IndexAsIndependent,
        ] {
            let a = fit_trend(&spacing, orientation).unwrap();
            let b = fit_trend(&spacing, orientation).unwrap();
            assert_eq!(a.slope.to_bits(), b.slope.to_bits());
            assert_eq!(a.intercept.to_bits(), b.intercept.to_bits());
        }
    }

    #[test]
    fn test_orientation_symmetry_bound() {
        let spacing = drifting_series(12);
        let by_index = fit_trend(&spacing, Orientation::IndexAsIndependent).unwrap();
        let by_spacing = fit_trend(&spacing, Orientation::SpacingAsIndependent).unwrap();

        assert!((by_index.r_squared - by_spacing.r_squared).abs() < 1e-12);
        let r2 = by_index.r_squared;
        assert!(r2 > 0.9);

        let layers = Orientation::IndexAsIndependent.layer_numbers(spacing.len());
        let mean_layer = layers.iter().sum::<f64>() / layers.len() as f64;

        for &k in &layers {
            let s = by_index.spacing_at(k).unwrap();
            // 0 起层号 = 1 起层号 - 1
            let predicted = by_spacing.index_at(s).unwrap() + 1.0;
            let discrepancy = (predicted - k).abs();
            let bound = (1.0 - r2) * (k - mean_layer).abs();
            assert!(
                (discrepancy - bound).abs() < 1e-9,
                "layer {}: discrepancy {} vs bound {}",
                k,
                discrepancy,
                bound
            );
        }
    }

    #[test]
    fn test_inverse_lookups() {
        let spacing: Vec<f64> = (1..=4).map(|k| 0.5 * k as f64 + 1.0).collect();
        let fit = fit_trend(&spacing, Orientation::IndexAsIndependent).unwrap();
        assert!((fit.index_at(2.0).unwrap() - 2.0).abs() < 1e-12);

        let flat = fit_trend(&[3.0; 4], Orientation::IndexAsIndependent).unwrap();
        assert!(flat.index_at(3.0).is_none());
    }

    #[test]
    fn test_layer_numbers() {
        assert_eq!(
            Orientation::SpacingAsIndependent.layer_numbers(3),
            vec![0.0, 1.0, 2.0]
        );
        assert_eq!(
            Orientation::IndexAsIndependent.layer_numbers(3),
            vec![1.0, 2.0, 3.0]
        );
    }
}
