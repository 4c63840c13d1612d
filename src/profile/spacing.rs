//! # 层间距计算
//!
//! 相邻峰位置之差即为层间距。
//!
//! ## 依赖关系
//! - 被 `profile/estimator.rs` 调用
//! - 使用 `profile/peaks.rs` 的 PeakSet

use crate::error::{Result, StemlineError};
use crate::profile::peaks::PeakSet;

/// 由峰索引计算层间距序列，长度为峰数减一
pub fn compute_spacing(peak_indices: &[usize], positions: &[f64]) -> Result<Vec<f64>> {
    if peak_indices.len() < 2 {
        return Err(StemlineError::InsufficientPeaks {
            found: peak_indices.len(),
        });
    }

    peak_indices
        .windows(2)
        .map(|w| match (positions.get(w[0]), positions.get(w[1])) {
            (Some(a), Some(b)) => Ok(b - a),
            _ => Err(StemlineError::InvalidArgument(format!(
                "peak index {} out of range for {} positions",
                w[0].max(w[1]),
                positions.len()
            ))),
        })
        .collect()
}

/// 由峰集合计算层间距
pub fn spacing_from_peaks(peaks: &PeakSet, positions: &[f64]) -> Result<Vec<f64>> {
    compute_spacing(&peaks.indices(), positions)
}
