//! # Command 模块
//!
//! 定义反馈通过总线发给订阅者的命令。
//!
//! ## 设计原则
//!
//! - **声明式**：命令描述"怎么震"，不描述"震谁"
//! - **不可变**：发布后不再修改，总线把同一份 `&ShakeCommand` 交给所有订阅者，
//!   订阅者需要保留的部分自行 clone
//! - **结构统一**：所有参数震动效果共用同一种命令，效果之间只靠总线区分

use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::curve::{Curve, remap};
use crate::error::{ConfigError, validate_duration};

/// 震动参数
///
/// 一次震动的动画部分：曲线、时长、重映射区间、是否相对。
/// 既是命令的载荷，也是震动器的实时配置和快照。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShakeParams {
    /// 归一化时间曲线
    #[serde(default)]
    pub curve: Curve,
    /// 时长（秒）
    pub duration: f64,
    /// 曲线 0 对应的值
    #[serde(default)]
    pub remap_low: f64,
    /// 曲线 1 对应的值
    #[serde(default = "default_remap_high")]
    pub remap_high: f64,
    /// 是否叠加到震动开始时的目标值上
    #[serde(default)]
    pub relative: bool,
}

fn default_remap_high() -> f64 {
    1.0
}

impl Default for ShakeParams {
    /// 钟形曲线，1 秒，remap [0, 1]，绝对值
    fn default() -> Self {
        Self::new(Curve::default(), 1.0)
    }
}

impl ShakeParams {
    /// 创建震动参数（remap 默认为 [0, 1]，绝对值）
    pub fn new(curve: Curve, duration: f64) -> Self {
        Self {
            curve,
            duration,
            remap_low: 0.0,
            remap_high: 1.0,
            relative: false,
        }
    }

    /// 设置重映射区间
    pub fn with_remap(mut self, low: f64, high: f64) -> Self {
        self.remap_low = low;
        self.remap_high = high;
        self
    }

    /// 设置是否相对
    pub fn with_relative(mut self, relative: bool) -> Self {
        self.relative = relative;
        self
    }

    /// 校验时长
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_duration(self.duration).map(|_| ())
    }

    /// 重映射区间乘以衰减系数
    pub fn attenuated(&self, attenuation: f64) -> Self {
        Self {
            remap_low: self.remap_low * attenuation,
            remap_high: self.remap_high * attenuation,
            ..self.clone()
        }
    }

    /// 归一化进度 (0.0 - 1.0)
    ///
    /// 时长为 0 时直接视为结束。
    pub fn progress(&self, elapsed: f64) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// 在 `elapsed` 时刻应写入目标的值
    pub fn sample(&self, elapsed: f64, initial_value: f64) -> f64 {
        let raw = self.curve.evaluate(self.progress(elapsed));
        let scaled = remap(raw, 0.0, 1.0, self.remap_low, self.remap_high);
        if self.relative {
            initial_value + scaled
        } else {
            scaled
        }
    }
}

/// 参数震动命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShakeCommand {
    /// 动画参数（remap 区间已乘过衰减）
    pub params: ShakeParams,
    /// 发布时使用的衰减系数
    pub attenuation: f64,
    /// 目标通道
    pub channel: Channel,
    /// 结束后是否恢复震动器配置
    pub reset_shaker_after: bool,
    /// 结束后是否恢复目标值
    pub reset_target_after: bool,
}

impl ShakeCommand {
    /// 创建命令（衰减 1.0，通道 0，结束后两项都恢复）
    pub fn new(params: ShakeParams) -> Self {
        Self {
            params,
            attenuation: 1.0,
            channel: Channel::DEFAULT,
            reset_shaker_after: true,
            reset_target_after: true,
        }
    }

    /// 设置通道
    pub fn on_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// 设置恢复选项
    pub fn with_resets(mut self, reset_shaker_after: bool, reset_target_after: bool) -> Self {
        self.reset_shaker_after = reset_shaker_after;
        self.reset_target_after = reset_target_after;
        self
    }
}

/// 冻结帧命令
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreezeFrameCommand {
    /// 冻结时长（秒，真实时间）
    pub duration: f64,
}
