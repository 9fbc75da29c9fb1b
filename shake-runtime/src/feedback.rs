//! # Feedback 模块
//!
//! 反馈 = 震动的触发端。
//!
//! 反馈是设计期配置好的描述符，自身没有状态机。`play(attenuation)` 时
//! 按配置组装一条命令发到对应效果的总线上，由订阅的震动器去执行。
//! 唯一的门控是外部设置的 `active` 标志。
//!
//! `duration()` 返回配置的时长，供外部编排器决定何时播放下一步。

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bus::EventBus;
use crate::channel::Channel;
use crate::command::{ShakeCommand, ShakeParams};
use crate::error::ShakeResult;

/// 反馈接口
pub trait Feedback {
    /// 名称（日志用）
    fn label(&self) -> &str;

    /// 是否处于激活状态
    fn is_active(&self) -> bool;

    /// 设置激活状态
    fn set_active(&mut self, active: bool);

    /// 反馈时长（秒）
    fn duration(&self) -> f64;

    /// 播放反馈
    ///
    /// 未激活时什么也不做。
    fn play(&self, attenuation: f64);

    /// 以满强度播放
    fn play_full(&self) {
        self.play(1.0);
    }
}

fn default_true() -> bool {
    true
}

/// 参数震动反馈的设计期配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSettings {
    /// 是否激活
    #[serde(default = "default_true")]
    pub active: bool,
    /// 发布通道
    #[serde(default)]
    pub channel: Channel,
    /// 震动参数
    pub params: ShakeParams,
    /// 结束后是否恢复震动器配置
    #[serde(default = "default_true")]
    pub reset_shaker_after: bool,
    /// 结束后是否恢复目标值
    #[serde(default = "default_true")]
    pub reset_target_after: bool,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self::new(ShakeParams::default())
    }
}

impl FeedbackSettings {
    /// 创建配置（激活、通道 0、结束后两项都恢复）
    pub fn new(params: ShakeParams) -> Self {
        Self {
            active: true,
            channel: Channel::DEFAULT,
            params,
            reset_shaker_after: true,
            reset_target_after: true,
        }
    }

    /// 设置发布通道
    pub fn on_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// 组装命令：remap 区间乘以衰减
    pub fn command(&self, attenuation: f64) -> ShakeCommand {
        ShakeCommand {
            params: self.params.attenuated(attenuation),
            attenuation,
            channel: self.channel,
            reset_shaker_after: self.reset_shaker_after,
            reset_target_after: self.reset_target_after,
        }
    }
}

/// 单参数震动反馈
pub struct ShakeFeedback {
    label: String,
    settings: FeedbackSettings,
    bus: Rc<EventBus<ShakeCommand>>,
}

impl std::fmt::Debug for ShakeFeedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShakeFeedback")
            .field("label", &self.label)
            .field("settings", &self.settings)
            .finish()
    }
}

impl ShakeFeedback {
    /// 创建反馈
    pub fn new(
        label: impl Into<String>,
        bus: Rc<EventBus<ShakeCommand>>,
        settings: FeedbackSettings,
    ) -> ShakeResult<Self> {
        settings.params.validate()?;
        Ok(Self {
            label: label.into(),
            settings,
            bus,
        })
    }

    /// 设计期配置
    pub fn settings(&self) -> &FeedbackSettings {
        &self.settings
    }
}

impl Feedback for ShakeFeedback {
    fn label(&self) -> &str {
        &self.label
    }

    fn is_active(&self) -> bool {
        self.settings.active
    }

    fn set_active(&mut self, active: bool) {
        self.settings.active = active;
    }

    fn duration(&self) -> f64 {
        self.settings.params.duration
    }

    fn play(&self, attenuation: f64) {
        if !self.settings.active {
            return;
        }
        let command = self.settings.command(attenuation);
        let delivered = self.bus.trigger(&command);
        debug!(
            feedback = %self.label,
            channel = %command.channel,
            attenuation,
            delivered,
            "发布震动命令"
        );
    }
}
