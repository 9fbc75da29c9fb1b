//! # Effect Registry
//!
//! 效果类型定义与设计期默认参数。
//! 这是所有效果名称、默认值的**唯一来源**。

use serde::{Deserialize, Serialize};

use crate::command::ShakeParams;
use crate::feedback::FeedbackSettings;
use crate::shaker::ShakerSettings;

/// 参数震动效果类型
///
/// 每种效果一条总线。效果之间的区别只在默认参数和目标属性上，
/// 震动逻辑完全相同。
///
/// - `AudioLowPass`：音频低通滤波截止频率
/// - `BloomIntensity` / `BloomThreshold`：泛光强度/阈值（泛光反馈一次驱动两者）
/// - `LensDistortion`：镜头畸变强度
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// 音频低通滤波
    AudioLowPass,
    /// 泛光强度
    BloomIntensity,
    /// 泛光阈值
    BloomThreshold,
    /// 镜头畸变
    LensDistortion,
}

impl EffectKind {
    /// 所有效果类型
    pub const ALL: [EffectKind; 4] = [
        EffectKind::AudioLowPass,
        EffectKind::BloomIntensity,
        EffectKind::BloomThreshold,
        EffectKind::LensDistortion,
    ];

    /// 效果名称
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::AudioLowPass => "audio_low_pass",
            EffectKind::BloomIntensity => "bloom_intensity",
            EffectKind::BloomThreshold => "bloom_threshold",
            EffectKind::LensDistortion => "lens_distortion",
        }
    }

    /// 该效果默认驱动的参数名
    pub fn default_property(&self) -> &'static str {
        match self {
            EffectKind::AudioLowPass => "audio.low_pass.cutoff",
            EffectKind::BloomIntensity => "bloom.intensity",
            EffectKind::BloomThreshold => "bloom.threshold",
            EffectKind::LensDistortion => "lens_distortion.intensity",
        }
    }

    /// 该效果的默认震动参数
    pub fn default_params(&self) -> ShakeParams {
        use defaults::*;

        let (curve, duration, (low, high), relative) = match self {
            EffectKind::AudioLowPass => {
                (low_pass_curve(), LOW_PASS_DURATION, LOW_PASS_REMAP, false)
            }
            EffectKind::BloomIntensity => {
                (bloom_curve(), BLOOM_DURATION, BLOOM_INTENSITY_REMAP, true)
            }
            EffectKind::BloomThreshold => {
                (bloom_curve(), BLOOM_DURATION, BLOOM_THRESHOLD_REMAP, true)
            }
            EffectKind::LensDistortion => (
                lens_distortion_curve(),
                LENS_DISTORTION_DURATION,
                LENS_DISTORTION_REMAP,
                false,
            ),
        };
        ShakeParams::new(curve, duration)
            .with_remap(low, high)
            .with_relative(relative)
    }

    /// 该效果的默认反馈配置
    pub fn default_feedback(&self) -> FeedbackSettings {
        FeedbackSettings::new(self.default_params())
    }

    /// 该效果的默认震动器配置
    pub fn default_shaker(&self) -> ShakerSettings {
        ShakerSettings::new(self.default_params())
    }
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 各效果的默认参数
pub mod defaults {
    use crate::curve::Curve;

    /// 低通滤波默认时长
    pub const LOW_PASS_DURATION: f64 = 2.0;
    /// 低通滤波默认 remap（截止频率 Hz）
    pub const LOW_PASS_REMAP: (f64, f64) = (0.0, 10_000.0);

    /// 泛光默认时长
    pub const BLOOM_DURATION: f64 = 0.2;
    /// 泛光强度默认 remap
    pub const BLOOM_INTENSITY_REMAP: (f64, f64) = (0.0, 1.0);
    /// 泛光阈值默认 remap
    pub const BLOOM_THRESHOLD_REMAP: (f64, f64) = (0.0, 0.0);

    /// 镜头畸变默认时长
    pub const LENS_DISTORTION_DURATION: f64 = 0.8;
    /// 镜头畸变默认 remap
    pub const LENS_DISTORTION_REMAP: (f64, f64) = (0.0, 0.5);

    /// 冻结帧默认时长
    pub const FREEZE_FRAME_DURATION: f64 = 0.02;

    /// 自动对焦光圈范围
    pub const APERTURE_RANGE: (f64, f64) = (0.1, 20.0);

    /// 低通滤波曲线：1 → 0 → 1（中段压低截止频率）
    pub fn low_pass_curve() -> Curve {
        Curve::preset(&[(0.0, 1.0), (0.5, 0.0), (1.0, 1.0)])
    }

    /// 泛光曲线：0 → 1 → 0
    pub fn bloom_curve() -> Curve {
        Curve::bell()
    }

    /// 镜头畸变曲线：逐渐衰减的来回摆动
    pub fn lens_distortion_curve() -> Curve {
        Curve::preset(&[
            (0.0, 0.0),
            (0.2, 1.0),
            (0.25, -1.0),
            (0.35, 0.7),
            (0.4, -0.7),
            (0.6, 0.3),
            (0.65, -0.3),
            (0.8, 0.1),
            (0.85, -0.1),
            (1.0, 0.0),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        for kind in EffectKind::ALL {
            let params = kind.default_params();
            assert!(params.validate().is_ok(), "{kind}");
            assert!(crate::curve::Curve::new(params.curve.keys().to_vec()).is_ok());
        }
    }

    #[test]
    fn test_low_pass_defaults() {
        let params = EffectKind::AudioLowPass.default_params();
        assert_eq!(params.duration, 2.0);
        assert!(!params.relative);
        // 中点截止频率被压到 remap 下限
        assert_eq!(params.sample(1.0, 22_000.0), 0.0);
        assert_eq!(params.sample(2.0, 22_000.0), 10_000.0);
    }

    #[test]
    fn test_bloom_defaults_are_relative() {
        assert!(EffectKind::BloomIntensity.default_params().relative);
        assert!(EffectKind::BloomThreshold.default_params().relative);
        assert_eq!(EffectKind::BloomThreshold.default_params().remap_high, 0.0);
    }

    #[test]
    fn test_lens_distortion_wobble() {
        let curve = defaults::lens_distortion_curve();
        assert_eq!(curve.evaluate(0.2), 1.0);
        assert_eq!(curve.evaluate(0.25), -1.0);
        assert_eq!(curve.evaluate(1.0), 0.0);
        assert_eq!(curve.value_range(), (-1.0, 1.0));
    }

    #[test]
    fn test_names_and_serde() {
        for kind in EffectKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
        assert_eq!(
            EffectKind::LensDistortion.default_property(),
            "lens_distortion.intensity"
        );
    }

    #[test]
    fn test_default_feedback_and_shaker() {
        let feedback = EffectKind::LensDistortion.default_feedback();
        assert!(feedback.active);
        assert!(feedback.reset_shaker_after && feedback.reset_target_after);
        assert_eq!(feedback.params.duration, 0.8);

        let shaker = EffectKind::LensDistortion.default_shaker();
        assert_eq!(shaker.params, feedback.params);
    }
}
