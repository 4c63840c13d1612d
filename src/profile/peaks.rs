//! # 原子层峰检测
//!
//! 在平滑后的强度谱上寻找对应原子层的强度峰。
//!
//! ## 算法概述
//! 1. 由采样密度 d（每 nm 点数）导出阈值：
//!    - 最小峰间距 `floor(1.5·d)` 个采样点（至少为 1）
//!    - 最小突出度 500
//!    - 半突出度处峰宽范围 `[floor(d), floor(4·d)]` 个采样点
//! 2. 寻找局部极大值（首末点除外，平台取中点）
//! 3. 计算每个候选峰的突出度及左右基点
//! 4. 按突出度降序（同值时索引小者优先）做最小间距筛选
//! 5. 依次应用突出度阈值和峰宽范围
//!
//! ## 依赖关系
//! - 被 `profile/estimator.rs` 调用
//! - 使用 `models/profile.rs` 计算采样密度

use crate::error::{Result, StemlineError};
use crate::models::profile::sampling_density;

/// 峰检测判据（与采样密度无关的因子）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakCriteria {
    /// 最小突出度（强度单位）
    pub min_prominence: f64,
    /// 最小峰间距 = floor(distance_factor · d)
    pub distance_factor: f64,
    /// 最小峰宽 = floor(min_width_factor · d)
    pub min_width_factor: f64,
    /// 最大峰宽 = floor(max_width_factor · d)
    pub max_width_factor: f64,
    /// 测量峰宽的相对高度（相对突出度）
    pub rel_height: f64,
}

impl Default for PeakCriteria {
    fn default() -> Self {
        Self {
            min_prominence: 500.0,
            distance_factor: 1.5,
            min_width_factor: 1.0,
            max_width_factor: 4.0,
            rel_height: 0.5,
        }
    }
}

impl PeakCriteria {
    /// 由采样密度导出具体阈值
    pub fn thresholds(&self, density: f64) -> PeakThresholds {
        PeakThresholds {
            density,
            min_distance: ((self.distance_factor * density).floor() as usize).max(1),
            min_prominence: self.min_prominence,
            min_width: (self.min_width_factor * density).floor(),
            max_width: (self.max_width_factor * density).floor(),
            rel_height: self.rel_height,
        }
    }
}

/// 检测时实际使用的阈值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakThresholds {
    /// 采样密度（每 nm 点数）
    pub density: f64,
    /// 最小峰间距（采样点）
    pub min_distance: usize,
    /// 最小突出度
    pub min_prominence: f64,
    /// 最小峰宽（采样点）
    pub min_width: f64,
    /// 最大峰宽（采样点）
    pub max_width: f64,
    /// 测量峰宽的相对高度
    pub rel_height: f64,
}

/// 检测到的峰
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// 采样点索引
    pub index: usize,
    /// 位置（nm）
    pub position: f64,
    /// 平滑后强度
    pub height: f64,
    /// 突出度
    pub prominence: f64,
    /// 半突出度处峰宽（采样点）
    pub width: f64,
    /// 峰宽左交点（插值索引）
    pub left_ip: f64,
    /// 峰宽右交点（插值索引）
    pub right_ip: f64,
}

/// 峰集合，索引严格递增
#[derive(Debug, Clone)]
pub struct PeakSet {
    pub peaks: Vec<Peak>,
    pub thresholds: PeakThresholds,
}

impl PeakSet {
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.peaks.iter().map(|p| p.index).collect()
    }
}

/// 在平滑信号上检测峰
pub fn detect_peaks(smoothed: &[f64], positions: &[f64], criteria: &PeakCriteria) -> Result<PeakSet> {
    if smoothed.len() != positions.len() {
        return Err(StemlineError::InvalidFormat(format!(
            "{} intensities but {} positions",
            smoothed.len(),
            positions.len()
        )));
    }

    let density = sampling_density(positions).ok_or_else(|| {
        StemlineError::InvalidFormat("position range must be non-zero".to_string())
    })?;
    let thresholds = criteria.thresholds(density);

    let candidates = local_maxima(smoothed);
    let bases: Vec<Prominence> = candidates
        .iter()
        .map(|&p| prominence(smoothed, p))
        .collect();

    let keep = select_by_distance(&candidates, &bases, thresholds.min_distance);

    let mut peaks = Vec::new();
    for ((&index, base), kept) in candidates.iter().zip(&bases).zip(keep) {
        if !kept || base.value < thresholds.min_prominence {
            continue;
        }

        let (left_ip, right_ip) = half_width(smoothed, index, base, thresholds.rel_height);
        let width = right_ip - left_ip;
        if width < thresholds.min_width || width > thresholds.max_width {
            continue;
        }

        peaks.push(Peak {
            index,
            position: positions[index],
            height: smoothed[index],
            prominence: base.value,
            width,
            left_ip,
            right_ip,
        });
    }

    if peaks.is_empty() {
        return Err(StemlineError::NoPeaksFound);
    }

    Ok(PeakSet { peaks, thresholds })
}

/// 突出度及其左右基点
#[derive(Debug, Clone, Copy)]
struct Prominence {
    value: f64,
    left_base: usize,
    right_base: usize,
}

/// 局部极大值；平台取中点（偶数长度取左中点），首末点不计
fn local_maxima(x: &[f64]) -> Vec<usize> {
    let n = x.len();
    let mut maxima = Vec::new();
    if n < 3 {
        return maxima;
    }

    let i_max = n - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < i_max && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }

    maxima
}

/// 向两侧搜索直至遇到更高点或边界
fn prominence(x: &[f64], peak: usize) -> Prominence {
    let height = x[peak];

    let mut left_min = height;
    let mut left_base = peak;
    let mut i = peak;
    loop {
        if x[i] > height {
            break;
        }
        if x[i] < left_min {
            left_min = x[i];
            left_base = i;
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let mut right_min = height;
    let mut right_base = peak;
    for (j, &v) in x.iter().enumerate().skip(peak) {
        if v > height {
            break;
        }
        if v < right_min {
            right_min = v;
            right_base = j;
        }
    }

    Prominence {
        value: height - left_min.max(right_min),
        left_base,
        right_base,
    }
}

/// 最小间距筛选，返回保留标记
fn select_by_distance(peaks: &[usize], bases: &[Prominence], distance: usize) -> Vec<bool> {
    let m = peaks.len();
    let mut keep = vec![true; m];
    if distance <= 1 {
        return keep;
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| {
        bases[b]
            .value
            .total_cmp(&bases[a].value)
            .then_with(|| peaks[a].cmp(&peaks[b]))
    });

    for &j in &order {
        if !keep[j] {
            continue;
        }

        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }

        let mut k = j + 1;
        while k < m && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    keep
}

/// 在 rel_height 处的左右交点（线性插值）
fn half_width(x: &[f64], peak: usize, base: &Prominence, rel_height: f64) -> (f64, f64) {
    let height = x[peak] - base.value * rel_height;

    let mut i = peak;
    while base.left_base < i && height < x[i] {
        i -= 1;
    }
    let mut left_ip = i as f64;
    if x[i] < height {
        left_ip += (height - x[i]) / (x[i + 1] - x[i]);
    }

    let mut i = peak;
    while i < base.right_base && height < x[i] {
        i += 1;
    }
    let mut right_ip = i as f64;
    if x[i] < height {
        right_ip -= (height - x[i]) / (x[i - 1] - x[i]);
    }

    (left_ip, right_ip)
}
