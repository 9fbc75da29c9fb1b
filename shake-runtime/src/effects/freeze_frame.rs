//! # Freeze Frame
//!
//! 冻结帧：反馈只携带一个时长，控制器收到后让模拟时间停止这么久。
//!
//! 控制器用真实时间倒计时，`on_tick(real_dt)` 返回本步应推进的模拟时间：
//! 冻结恰好吃掉 `duration` 的真实时间，跨步的余量照常推进。

use std::cell::Cell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::registry::defaults;
use crate::bus::{EventBus, ListenerId};
use crate::command::FreezeFrameCommand;
use crate::error::{ShakeResult, validate_duration};
use crate::feedback::Feedback;

fn default_true() -> bool {
    true
}

fn default_duration() -> f64 {
    defaults::FREEZE_FRAME_DURATION
}

/// 冻结帧反馈配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreezeFrameSettings {
    #[serde(default = "default_true")]
    pub active: bool,
    /// 冻结时长（秒）
    #[serde(default = "default_duration")]
    pub duration: f64,
}

impl Default for FreezeFrameSettings {
    fn default() -> Self {
        Self {
            active: true,
            duration: defaults::FREEZE_FRAME_DURATION,
        }
    }
}

/// 冻结帧反馈
///
/// 冻结帧不区分通道，衰减也不影响时长。
#[derive(Debug)]
pub struct FreezeFrameFeedback {
    label: String,
    settings: FreezeFrameSettings,
    bus: Rc<EventBus<FreezeFrameCommand>>,
}

impl FreezeFrameFeedback {
    /// 创建冻结帧反馈
    pub fn new(
        label: impl Into<String>,
        bus: Rc<EventBus<FreezeFrameCommand>>,
        settings: FreezeFrameSettings,
    ) -> ShakeResult<Self> {
        validate_duration(settings.duration)?;
        Ok(Self {
            label: label.into(),
            settings,
            bus,
        })
    }
}

impl Feedback for FreezeFrameFeedback {
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
        self.settings.duration
    }

    fn play(&self, _attenuation: f64) {
        if !self.settings.active {
            return;
        }
        let command = FreezeFrameCommand {
            duration: self.settings.duration,
        };
        let delivered = self.bus.trigger(&command);
        debug!(feedback = %self.label, duration = command.duration, delivered, "发布冻结帧命令");
    }
}

/// 冻结帧控制器
///
/// 订阅冻结帧总线，维护剩余冻结时间。冻结中再收到命令时取较长的剩余时间。
pub struct FreezeFrameController {
    remaining: Rc<Cell<f64>>,
    bus: Rc<EventBus<FreezeFrameCommand>>,
    subscription: Option<ListenerId>,
}

impl std::fmt::Debug for FreezeFrameController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreezeFrameController")
            .field("remaining", &self.remaining.get())
            .field("enabled", &self.subscription.is_some())
            .finish()
    }
}

impl FreezeFrameController {
    /// 创建控制器（未启用）
    pub fn new(bus: Rc<EventBus<FreezeFrameCommand>>) -> Self {
        Self {
            remaining: Rc::new(Cell::new(0.0)),
            bus,
            subscription: None,
        }
    }

    /// 注册到总线
    pub fn on_enable(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        let remaining: Weak<Cell<f64>> = Rc::downgrade(&self.remaining);
        let id = self.bus.register(move |command: &FreezeFrameCommand| {
            if let Some(remaining) = remaining.upgrade() {
                remaining.set(remaining.get().max(command.duration));
            }
        });
        self.subscription = Some(id);
    }

    /// 从总线注销
    pub fn on_disable(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.bus.unregister(id);
        }
    }

    /// 是否处于冻结中
    pub fn is_frozen(&self) -> bool {
        self.remaining.get() > 0.0
    }

    /// 当前时间缩放：冻结中为 0，否则为 1
    pub fn time_scale(&self) -> f64 {
        if self.is_frozen() { 0.0 } else { 1.0 }
    }

    /// 剩余冻结时间
    pub fn remaining(&self) -> f64 {
        self.remaining.get()
    }

    /// 推进一个真实时间步
    ///
    /// # 返回
    /// 本步应推进的模拟时间
    pub fn on_tick(&mut self, real_dt: f64) -> f64 {
        let remaining = self.remaining.get();
        let frozen = remaining.min(real_dt).max(0.0);
        self.remaining.set(remaining - frozen);
        real_dt - frozen
    }
}

impl Drop for FreezeFrameController {
    fn drop(&mut self) {
        self.on_disable();
    }
}
