//! # 线扫描谱数据模型
//!
//! HAADF-STEM 强度线扫描（位置-强度序列）的统一表示。
//!
//! ## 不变量
//! - 位置严格递增
//! - 所有数值有限
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `profile/` 使用
//! - 无外部模块依赖

use crate::error::{Result, StemlineError};

/// 单个采样点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// 位置（nm）
    pub position_nm: f64,
    /// 强度（任意单位）
    pub intensity: f64,
}

impl Sample {
    pub fn new(position_nm: f64, intensity: f64) -> Self {
        Self {
            position_nm,
            intensity,
        }
    }
}

/// 强度线扫描谱，加载后不可变
#[derive(Debug, Clone)]
pub struct LineProfile {
    /// 谱线名称（通常为文件名）
    pub name: String,
    samples: Vec<Sample>,
}

impl LineProfile {
    /// 创建线扫描谱，校验位置严格递增
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Result<Self> {
        for (i, s) in samples.iter().enumerate() {
            if !s.position_nm.is_finite() || !s.intensity.is_finite() {
                return Err(StemlineError::InvalidFormat(format!(
                    "non-finite value at sample {}",
                    i
                )));
            }
        }

        if let Some(i) = samples
            .windows(2)
            .position(|w| w[1].position_nm <= w[0].position_nm)
        {
            return Err(StemlineError::InvalidFormat(format!(
                "positions must be strictly increasing (sample {} at {} nm follows {} nm)",
                i + 1,
                samples[i + 1].position_nm,
                samples[i].position_nm
            )));
        }

        Ok(Self {
            name: name.into(),
            samples,
        })
    }

    /// 从位置与强度数组创建
    pub fn from_columns(
        name: impl Into<String>,
        positions: &[f64],
        intensities: &[f64],
    ) -> Result<Self> {
        if positions.len() != intensities.len() {
            return Err(StemlineError::InvalidFormat(format!(
                "{} positions but {} intensities",
                positions.len(),
                intensities.len()
            )));
        }

        let samples = positions
            .iter()
            .zip(intensities)
            .map(|(&p, &i)| Sample::new(p, i))
            .collect();
        Self::new(name, samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// 位置列（nm）
    pub fn positions(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.position_nm).collect()
    }

    /// 强度列
    pub fn intensities(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.intensity).collect()
    }

    /// 扫描范围 (max - min)，单位 nm
    pub fn span(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.position_nm - first.position_nm,
            _ => 0.0,
        }
    }
}

/// 由位置序列计算采样密度 `n / (max - min)`
///
/// 范围为零或序列为空时返回 `None`。
pub fn sampling_density(positions: &[f64]) -> Option<f64> {
    let min = positions.iter().copied().fold(f64::INFINITY, f64::min);
    let max = positions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if positions.is_empty() || !span.is_finite() || span <= 0.0 {
        return None;
    }
    Some(positions.len() as f64 / span)
}
