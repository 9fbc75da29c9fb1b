//! # Easing 模块
//!
//! 曲线分段插值使用的缓动函数。
//!
//! 所有缓动都把 [0, 1] 映射到 [0, 1] 且不越界，
//! 保证单调曲线的求值结果落在相邻关键帧的值之间。

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    #[default]
    Linear,
    /// 阶跃：保持前一个关键帧的值，直到下一个关键帧
    Step,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
    /// 三次缓入
    EaseInCubic,
    /// 三次缓出
    EaseOutCubic,
    /// 三次缓入缓出
    EaseInOutCubic,
    /// 正弦缓入缓出
    EaseInOutSine,
}

impl EasingFunction {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 段内进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值 (0.0 - 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::Step => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseInCubic => t * t * t,
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingFunction; 9] = [
        EasingFunction::Linear,
        EasingFunction::Step,
        EasingFunction::EaseInQuad,
        EasingFunction::EaseOutQuad,
        EasingFunction::EaseInOutQuad,
        EasingFunction::EaseInCubic,
        EasingFunction::EaseOutCubic,
        EasingFunction::EaseInOutCubic,
        EasingFunction::EaseInOutSine,
    ];

    #[test]
    fn test_linear() {
        let easing = EasingFunction::Linear;
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(0.5), 0.5);
        assert_eq!(easing.apply(1.0), 1.0);
    }

    #[test]
    fn test_step_holds_until_end() {
        let easing = EasingFunction::Step;
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(0.99), 0.0);
        assert_eq!(easing.apply(1.0), 1.0);
    }

    #[test]
    fn test_endpoints_and_bounds() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-9, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{easing:?} at 1");
            for i in 0..=100 {
                let v = easing.apply(i as f64 / 100.0);
                assert!((0.0..=1.0).contains(&v), "{easing:?} out of range: {v}");
            }
        }
    }

    #[test]
    fn test_clamp() {
        let easing = EasingFunction::Linear;
        // 超出范围应该被限制
        assert_eq!(easing.apply(-0.5), 0.0);
        assert_eq!(easing.apply(1.5), 1.0);
    }

    #[test]
    fn test_serde_name() {
        let json = serde_json::to_string(&EasingFunction::EaseInOutSine).unwrap();
        assert_eq!(json, "\"ease_in_out_sine\"");
    }
}
