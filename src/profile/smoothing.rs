//! # Savitzky–Golay 平滑
//!
//! 局部多项式最小二乘平滑，用于峰检测前的去噪。
//!
//! ## 算法概述
//! 1. 构造窗口内的 Vandermonde 矩阵 J（x = -h..h）
//! 2. 求解正规方程得到投影矩阵 H = J (JᵀJ)⁻¹ Jᵀ
//! 3. 内部点使用 H 的中心行做卷积
//! 4. 边界点：对首/末窗口拟合多项式，并在边界位置求值（插值边界）
//!
//! ## 依赖关系
//! - 被 `profile/estimator.rs` 调用
//! - 无外部 crate 依赖

use crate::error::{Result, StemlineError};

/// 默认窗口长度
pub const DEFAULT_WINDOW_LENGTH: usize = 7;

/// 默认多项式阶数
pub const DEFAULT_POLY_ORDER: usize = 3;

/// Savitzky–Golay 滤波器
#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    window_length: usize,
    /// 投影矩阵 (window × window)，第 r 行给出窗口内第 r 个位置的拟合值
    projection: Vec<Vec<f64>>,
}

impl SavitzkyGolay {
    /// 创建滤波器，窗口长度须为奇数且大于多项式阶数
    pub fn new(window_length: usize, poly_order: usize) -> Result<Self> {
        if window_length == 0 || window_length % 2 == 0 {
            return Err(StemlineError::InvalidArgument(format!(
                "window length must be a positive odd number, got {}",
                window_length
            )));
        }
        if poly_order >= window_length {
            return Err(StemlineError::InvalidArgument(format!(
                "polynomial order ({}) must be less than window length ({})",
                poly_order, window_length
            )));
        }

        let projection = projection_matrix(window_length, poly_order).ok_or_else(|| {
            StemlineError::InvalidArgument(format!(
                "singular Savitzky-Golay system for window {} / order {}",
                window_length, poly_order
            ))
        })?;

        Ok(Self {
            window_length,
            projection,
        })
    }

    /// 对信号做平滑，输出与输入等长
    pub fn apply(&self, data: &[f64]) -> Result<Vec<f64>> {
        let n = data.len();
        let w = self.window_length;
        if n < w {
            return Err(StemlineError::InsufficientData {
                required: w,
                actual: n,
            });
        }

        let half = w / 2;
        let mut smoothed = vec![0.0; n];

        // 内部点
        let center = &self.projection[half];
        for i in half..n - half {
            let window = &data[i - half..=i + half];
            smoothed[i] = dot(center, window);
        }

        // 左边界：首窗口拟合多项式在前 half 个位置的值
        let head = &data[..w];
        for (i, value) in smoothed.iter_mut().enumerate().take(half) {
            *value = dot(&self.projection[i], head);
        }

        // 右边界
        let tail_start = n - w;
        let tail = &data[tail_start..];
        for i in n - half..n {
            smoothed[i] = dot(&self.projection[i - tail_start], tail);
        }

        Ok(smoothed)
    }
}

/// 使用给定窗口和阶数平滑信号
pub fn smooth(data: &[f64], window_length: usize, poly_order: usize) -> Result<Vec<f64>> {
    SavitzkyGolay::new(window_length, poly_order)?.apply(data)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// 计算投影矩阵 H = J (JᵀJ)⁻¹ Jᵀ
fn projection_matrix(window_length: usize, poly_order: usize) -> Option<Vec<Vec<f64>>> {
    let half = (window_length / 2) as f64;
    let terms = poly_order + 1;

    // Vandermonde 矩阵 J (window × terms)
    let j: Vec<Vec<f64>> = (0..window_length)
        .map(|i| {
            let x = i as f64 - half;
            (0..terms).map(|k| x.powi(k as i32)).collect()
        })
        .collect();

    // 正规矩阵 JᵀJ (terms × terms)
    let normal: Vec<Vec<f64>> = (0..terms)
        .map(|a| {
            (0..terms)
                .map(|b| j.iter().map(|row| row[a] * row[b]).sum())
                .collect()
        })
        .collect();

    // 右端 Jᵀ (terms × window)
    let jt: Vec<Vec<f64>> = (0..terms)
        .map(|k| j.iter().map(|row| row[k]).collect())
        .collect();

    let solved = solve_linear_system(normal, jt)?;

    Some(
        j.iter()
            .map(|row| {
                (0..window_length)
                    .map(|col| (0..terms).map(|k| row[k] * solved[k][col]).sum())
                    .collect()
            })
            .collect(),
    )
}

/// 部分主元 Gauss-Jordan 消元，求解 A X = B（B 为多列右端）
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<Vec<f64>>) -> Option<Vec<Vec<f64>>> {
    let n = a.len();

    for col in 0..n {
        let pivot = (col..n).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        let p = a[col][col];
        for v in a[col].iter_mut() {
            *v /= p;
        }
        for v in b[col].iter_mut() {
            *v /= p;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                a[row][k] -= factor * a[col][k];
            }
            for k in 0..b[row].len() {
                b[row][k] -= factor * b[col][k];
            }
        }
    }

    Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_coefficients_7_3() {
        let filter = SavitzkyGolay::new(7, 3).unwrap();
        let expected = [-2.0, 3.0, 6.0, 7.0, 6.0, 3.0, -2.0].map(|c| c / 21.0);
        for (c, e) in filter.projection[3].iter().zip(expected.iter()) {
            assert!((c - e).abs() < 1e-12, "{} vs {}", c, e);
        }
    }

    #[test]
    fn test_preserves_cubic_including_edges() {
        let data: Vec<f64> = (0..15)
            .map(|i| {
                let x = i as f64;
                0.5 * x * x * x - 2.0 * x * x + x - 7.0
            })
            .collect();
        let smoothed = smooth(&data, 7, 3).unwrap();
        assert_eq!(smoothed.len(), data.len());
        for (s, d) in smoothed.iter().zip(&data) {
            assert!((s - d).abs() < 1e-8, "{} vs {}", s, d);
        }
    }

    #[test]
    fn test_constant_signal_unchanged() {
        let data = vec![42.0; 9];
        let smoothed = smooth(&data, 7, 3).unwrap();
        for s in smoothed {
            assert!((s - 42.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_reduces_noise() {
        let data: Vec<f64> = (0..50)
            .map(|i| if i % 2 == 0 { 10.0 } else { -10.0 })
            .collect();
        let smoothed = smooth(&data, 7, 3).unwrap();
        let raw_energy: f64 = data[5..45].iter().map(|v| v * v).sum();
        let smooth_energy: f64 = smoothed[5..45].iter().map(|v| v * v).sum();
        assert!(smooth_energy < raw_energy * 0.1);
    }

    #[test]
    fn test_exact_window_length_input() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let smoothed = smooth(&data, 7, 3).unwrap();
        for (s, d) in smoothed.iter().zip(&data) {
            assert!((s - d).abs() < 1e-10);
        }
    }

    #[test]
    fn test_six_samples_insufficient() {
        let data = vec![1.0; 6];
        match smooth(&data, 7, 3) {
            Err(StemlineError::InsufficientData { required, actual }) => {
                assert_eq!(required, 7);
                assert_eq!(actual, 6);
            }
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            SavitzkyGolay::new(6, 3),
            Err(StemlineError::InvalidArgument(_))
        ));
        assert!(matches!(
            SavitzkyGolay::new(5, 5),
            Err(StemlineError::InvalidArgument(_))
        ));
    }
}
