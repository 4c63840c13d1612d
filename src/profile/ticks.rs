//! # 坐标轴刻度生成
//!
//! 显式的 "nice number" 刻度算法（步长取 1、2、5 × 10ᵏ），
//! 不依赖绘图库的自动刻度。
//!
//! ## 依赖关系
//! - 被 `profile/plot.rs` 调用
//! - 无外部模块依赖

/// 在 `[min, max]` 内生成约 `count` 个整齐刻度
///
/// 返回的刻度都落在区间内；`min == max` 时只返回一个刻度。
pub fn nice_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    let span = max - min;
    if span <= f64::EPSILON * min.abs().max(max.abs()).max(1.0) {
        return vec![min];
    }

    let count = count.max(2);
    let range = nice_number(span, false);
    let step = nice_number(range / (count - 1) as f64, true);

    let first = (min / step - 1e-9).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;

    (first..=last)
        .map(|k| {
            let v = k as f64 * step;
            // 避免 -0
            if v == 0.0 {
                0.0
            } else {
                v
            }
        })
        .collect()
}

/// 仅保留整数刻度（用于层号轴）
pub fn integer_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    let ticks: Vec<f64> = nice_ticks(min, max, count)
        .into_iter()
        .filter(|v| v.fract().abs() < 1e-9)
        .map(f64::round)
        .collect();

    if ticks.is_empty() && min.is_finite() && max.is_finite() {
        let lo = min.min(max).ceil();
        let hi = min.max(max).floor();
        if lo <= hi {
            return vec![lo];
        }
    }
    ticks
}

/// 每隔一个取刻度（第 0、2、4 … 个）
pub fn every_other(ticks: &[f64]) -> Vec<f64> {
    ticks.iter().step_by(2).copied().collect()
}

/// 两端各留 `margin` 比例的轴范围
pub fn padded_range(min: f64, max: f64, margin: f64) -> (f64, f64) {
    let span = max - min;
    if span > 0.0 {
        (min - span * margin, max + span * margin)
    } else {
        let pad = min.abs().max(1.0) * margin.max(0.01);
        (min - pad, max + pad)
    }
}

/// Heckbert nice number：不小于（或四舍五入到）x 的 1、2、5 × 10ᵏ
fn nice_number(x: f64, round: bool) -> f64 {
    let exponent = x.log10().floor();
    let magnitude = 10f64.powf(exponent);
    let fraction = x / magnitude;

    let nice = if round {
        if fraction < 1.5 {
            1.0
        } else if fraction < 3.0 {
            2.0
        } else if fraction < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice * magnitude
}
