//! # Curve 模块
//!
//! 归一化时间动画曲线与值重映射。
//!
//! ## 核心概念
//!
//! - [`Keyframe`]：`(time, value)` 关键帧，附带通往下一个关键帧的缓动
//! - [`Curve`]：已校验的关键帧序列，定义 `f: [0, 1] -> f64`
//! - [`remap`]：线性重映射
//!
//! 曲线在创建时校验（包括反序列化），求值本身是全函数，没有错误路径。

use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;
use crate::error::CurveError;

/// 曲线关键帧
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// 归一化时间 (0.0 - 1.0)
    pub time: f64,
    /// 该时间点的值
    pub value: f64,
    /// 从本关键帧到下一个关键帧的缓动
    #[serde(default, skip_serializing_if = "is_linear")]
    pub easing: EasingFunction,
}

fn is_linear(easing: &EasingFunction) -> bool {
    *easing == EasingFunction::Linear
}

impl Keyframe {
    /// 创建线性关键帧
    pub const fn new(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            easing: EasingFunction::Linear,
        }
    }

    /// 设置缓动函数
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }
}

impl From<(f64, f64)> for Keyframe {
    fn from((time, value): (f64, f64)) -> Self {
        Self::new(time, value)
    }
}

/// 动画曲线
///
/// 不变量：至少一个关键帧；时间落在 [0, 1] 且非递减；所有值有限。
/// 只能通过 [`Curve::new`] 或反序列化得到，两者走同一套校验。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    /// 从关键帧创建曲线
    pub fn new(keys: impl IntoIterator<Item = Keyframe>) -> Result<Self, CurveError> {
        let keys: Vec<Keyframe> = keys.into_iter().collect();
        if keys.is_empty() {
            return Err(CurveError::Empty);
        }

        let mut previous = 0.0;
        for (index, key) in keys.iter().enumerate() {
            if !key.time.is_finite() || !key.value.is_finite() {
                return Err(CurveError::NonFinite { index });
            }
            if !(0.0..=1.0).contains(&key.time) {
                return Err(CurveError::TimeOutOfRange {
                    index,
                    time: key.time,
                });
            }
            if key.time < previous {
                return Err(CurveError::TimeOutOfOrder {
                    index,
                    previous,
                    time: key.time,
                });
            }
            previous = key.time;
        }

        Ok(Self { keys })
    }

    /// 从 `(time, value)` 对创建线性曲线
    pub fn from_points(points: &[(f64, f64)]) -> Result<Self, CurveError> {
        Self::new(points.iter().copied().map(Keyframe::from))
    }

    /// 内置预设曲线（关键帧由代码写死，调用方保证合法）
    pub(crate) fn preset(points: &[(f64, f64)]) -> Self {
        let keys: Vec<Keyframe> = points.iter().copied().map(Keyframe::from).collect();
        debug_assert!(Self::new(keys.clone()).is_ok(), "invalid preset curve");
        Self { keys }
    }

    /// 常量曲线
    pub fn constant(value: f64) -> Self {
        Self {
            keys: vec![Keyframe::new(0.0, value)],
        }
    }

    /// 0 → 1 线性曲线
    pub fn linear() -> Self {
        Self {
            keys: vec![Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 1.0)],
        }
    }

    /// 0 → 1 → 0 钟形曲线（峰值在 0.5）
    pub fn bell() -> Self {
        Self {
            keys: vec![
                Keyframe::new(0.0, 0.0),
                Keyframe::new(0.5, 1.0),
                Keyframe::new(1.0, 0.0),
            ],
        }
    }

    /// 关键帧
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// 所有关键帧中的最小值与最大值
    pub fn value_range(&self) -> (f64, f64) {
        self.keys
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), k| {
                (lo.min(k.value), hi.max(k.value))
            })
    }

    /// 在归一化时间 `t` 处求值
    ///
    /// `t` 超出首尾关键帧时取端点值；`t` 为 NaN 时取首个关键帧的值。
    pub fn evaluate(&self, t: f64) -> f64 {
        let first = &self.keys[0];
        let last = &self.keys[self.keys.len() - 1];
        if t.is_nan() || t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // first.time < t < last.time，因此 1 <= next < len
        let next = self.keys.partition_point(|k| k.time <= t);
        let a = &self.keys[next - 1];
        let b = &self.keys[next];
        let local = (t - a.time) / (b.time - a.time);
        a.value + (b.value - a.value) * a.easing.apply(local)
    }
}

impl TryFrom<Vec<Keyframe>> for Curve {
    type Error = CurveError;

    fn try_from(keys: Vec<Keyframe>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<Curve> for Vec<Keyframe> {
    fn from(curve: Curve) -> Self {
        curve.keys
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::bell()
    }
}

/// 线性重映射
///
/// 把 `raw` 从 `[raw_low, raw_high]` 映射到 `[out_low, out_high]`。
/// 输入区间退化（`raw_low == raw_high`）时返回 `out_low`。
pub fn remap(raw: f64, raw_low: f64, raw_high: f64, out_low: f64, out_high: f64) -> f64 {
    let span = raw_high - raw_low;
    if span == 0.0 {
        return out_low;
    }
    out_low + (raw - raw_low) * (out_high - out_low) / span
}
