//! # Shaker 模块
//!
//! 通用震动器：订阅一条总线，按曲线驱动一个目标参数。
//!
//! ## 状态机
//!
//! ```text
//!            接受的命令 / play()
//!   Idle ─────────────────────────► Shaking
//!    ▲                                 │ on_tick(dt): elapsed += dt，写入目标
//!    └──────── elapsed >= duration ────┘ 结束时按标志恢复目标值/震动器配置
//! ```
//!
//! - Shaking 期间收到的任何命令都被丢弃（不排队、不打断）
//! - 每次开始震动都从目标重新读取初始值
//! - 震动器本身不计时，完全由宿主调用 `on_tick` 推进
//!
//! 具体效果（低通滤波、泛光、镜头畸变……）不是子类，
//! 而是同一个 `Shaker<T>` 配上不同的 [`ShakerSettings`] 和目标访问器。

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bus::{EventBus, ListenerId};
use crate::channel::ChannelFilter;
use crate::command::{ShakeCommand, ShakeParams};
use crate::error::ShakeResult;
use crate::target::{ParameterHost, PropertyTarget, TargetAccessor};

/// 震动状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShakePhase {
    /// 空闲，可以接受新命令
    #[default]
    Idle,
    /// 正在震动
    Shaking,
}

/// 震动器的设计期配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShakerSettings {
    /// 监听的通道
    #[serde(default)]
    pub channel: ChannelFilter,
    /// 默认震动参数（直接 `play()` 时使用，命令结束后恢复到这里）
    pub params: ShakeParams,
    /// 直接 `play()` 时结束后是否恢复目标值
    #[serde(default = "default_true")]
    pub reset_target_after: bool,
}

fn default_true() -> bool {
    true
}

impl ShakerSettings {
    /// 创建配置（通道 0，结束后恢复目标值）
    pub fn new(params: ShakeParams) -> Self {
        Self {
            channel: ChannelFilter::default(),
            params,
            reset_target_after: true,
        }
    }

    /// 设置监听通道
    pub fn listening(mut self, channel: impl Into<ChannelFilter>) -> Self {
        self.channel = channel.into();
        self
    }
}

/// 震动器状态快照（调试/测试用）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShakerSnapshot {
    pub name: String,
    pub phase: ShakePhase,
    pub elapsed: f64,
    pub initial_value: f64,
    pub duration: f64,
    pub remap_low: f64,
    pub remap_high: f64,
    pub relative: bool,
    pub has_saved_params: bool,
}

/// 震动器内部状态
///
/// 由 `Rc<RefCell<_>>` 持有，总线回调只保留 `Weak` 引用。
struct ShakerCore<T> {
    name: String,
    target: T,
    filter: ChannelFilter,
    /// 实时配置：设计期默认值或最近一次接受的命令
    params: ShakeParams,
    designer_reset_target: bool,
    phase: ShakePhase,
    elapsed: f64,
    initial_value: f64,
    reset_shaker_after: bool,
    reset_target_after: bool,
    saved_params: Option<ShakeParams>,
}

impl<T: TargetAccessor> ShakerCore<T> {
    /// 处理总线命令
    ///
    /// # 返回
    /// - `true`: 命令被接受并开始震动
    /// - `false`: 通道不匹配或正在震动
    fn handle_command(&mut self, command: &ShakeCommand) -> bool {
        if !self.filter.accepts(command.channel) {
            return false;
        }
        if self.phase == ShakePhase::Shaking {
            trace!(shaker = %self.name, channel = %command.channel, "正在震动，丢弃命令");
            return false;
        }
        if let Err(e) = command.params.validate() {
            trace!(shaker = %self.name, channel = %command.channel, error = %e, "命令参数无效，丢弃命令");
            return false;
        }

        self.initial_value = self.target.get_initial();
        self.reset_shaker_after = command.reset_shaker_after;
        self.reset_target_after = command.reset_target_after;
        if command.reset_shaker_after {
            self.saved_params = Some(self.params.clone());
        }
        self.params = command.params.clone();
        self.begin();
        true
    }

    /// 按设计期配置开始震动
    fn play(&mut self) -> bool {
        if self.phase == ShakePhase::Shaking {
            return false;
        }
        self.initial_value = self.target.get_initial();
        self.reset_shaker_after = false;
        self.reset_target_after = self.designer_reset_target;
        self.begin();
        true
    }

    fn begin(&mut self) {
        self.elapsed = 0.0;
        self.phase = ShakePhase::Shaking;
        debug!(
            shaker = %self.name,
            duration = self.params.duration,
            initial = self.initial_value,
            "开始震动"
        );
    }

    fn tick(&mut self, dt: f64) {
        if self.phase != ShakePhase::Shaking {
            return;
        }

        self.elapsed += dt;
        let value = self.params.sample(self.elapsed, self.initial_value);
        self.target.set_value(value);

        if self.elapsed >= self.params.duration {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.phase = ShakePhase::Idle;
        if self.reset_target_after {
            self.target.set_value(self.initial_value);
        }
        if self.reset_shaker_after
            && let Some(saved) = self.saved_params.take()
        {
            self.params = saved;
        }
        debug!(shaker = %self.name, elapsed = self.elapsed, "震动结束");
    }
}

impl<T> ShakerCore<T> {
    fn snapshot(&self) -> ShakerSnapshot {
        ShakerSnapshot {
            name: self.name.clone(),
            phase: self.phase,
            elapsed: self.elapsed,
            initial_value: self.initial_value,
            duration: self.params.duration,
            remap_low: self.params.remap_low,
            remap_high: self.params.remap_high,
            relative: self.params.relative,
            has_saved_params: self.saved_params.is_some(),
        }
    }
}

/// 震动器
///
/// 绑定一个目标访问器和一条总线。宿主负责：
/// - `on_enable()` / `on_disable()`：在总线上注册/注销
/// - `on_tick(dt)`：每个模拟步调用一次
///
/// 被 drop 时自动从总线注销。
pub struct Shaker<T> {
    core: Rc<RefCell<ShakerCore<T>>>,
    bus: Rc<EventBus<ShakeCommand>>,
    subscription: Option<ListenerId>,
}

impl<T> std::fmt::Debug for Shaker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("Shaker")
            .field("name", &core.name)
            .field("phase", &core.phase)
            .field("enabled", &self.subscription.is_some())
            .finish()
    }
}

impl<T: TargetAccessor + 'static> Shaker<T> {
    /// 创建震动器（未启用）
    ///
    /// 设计期配置不合法时返回配置错误，震动器不会被创建。
    pub fn new(
        name: impl Into<String>,
        bus: Rc<EventBus<ShakeCommand>>,
        target: T,
        settings: ShakerSettings,
    ) -> ShakeResult<Self> {
        settings.params.validate()?;

        let core = ShakerCore {
            name: name.into(),
            target,
            filter: settings.channel,
            params: settings.params,
            designer_reset_target: settings.reset_target_after,
            phase: ShakePhase::Idle,
            elapsed: 0.0,
            initial_value: 0.0,
            reset_shaker_after: false,
            reset_target_after: false,
            saved_params: None,
        };

        Ok(Self {
            core: Rc::new(RefCell::new(core)),
            bus,
            subscription: None,
        })
    }

    /// 注册到总线，开始接收命令
    pub fn on_enable(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        let core: Weak<RefCell<ShakerCore<T>>> = Rc::downgrade(&self.core);
        let id = self.bus.register(move |command: &ShakeCommand| {
            if let Some(core) = core.upgrade() {
                core.borrow_mut().handle_command(command);
            }
        });
        self.subscription = Some(id);
    }

    /// 推进一个模拟步
    pub fn on_tick(&mut self, dt: f64) {
        self.core.borrow_mut().tick(dt);
    }

    /// 直接处理一条命令（不经过总线）
    pub fn handle_command(&mut self, command: &ShakeCommand) -> bool {
        self.core.borrow_mut().handle_command(command)
    }

    /// 按设计期配置开始震动
    ///
    /// # 返回
    /// - `true`: 开始震动
    /// - `false`: 已在震动中
    pub fn play(&mut self) -> bool {
        self.core.borrow_mut().play()
    }
}

impl<T> Shaker<T> {
    /// 从总线注销，不再接收命令
    ///
    /// 进行中的震动不受影响，仍由 `on_tick` 推进到结束。
    pub fn on_disable(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.bus.unregister(id);
        }
    }

    /// 是否已注册到总线
    pub fn is_enabled(&self) -> bool {
        self.subscription.is_some()
    }

    /// 名称
    pub fn name(&self) -> String {
        self.core.borrow().name.clone()
    }

    /// 当前状态
    pub fn phase(&self) -> ShakePhase {
        self.core.borrow().phase
    }

    /// 是否正在震动
    pub fn is_shaking(&self) -> bool {
        self.phase() == ShakePhase::Shaking
    }

    /// 当前实时配置
    pub fn params(&self) -> ShakeParams {
        self.core.borrow().params.clone()
    }

    /// 本次震动开始时的目标值
    pub fn initial_value(&self) -> f64 {
        self.core.borrow().initial_value
    }

    /// 监听的通道
    pub fn channel(&self) -> ChannelFilter {
        self.core.borrow().filter
    }

    /// 状态快照
    pub fn snapshot(&self) -> ShakerSnapshot {
        self.core.borrow().snapshot()
    }
}

impl Shaker<PropertyTarget> {
    /// 创建绑定到宿主属性的震动器
    ///
    /// 属性不存在时返回 `ConfigError::PropertyNotFound`。
    pub fn bind(
        name: impl Into<String>,
        bus: Rc<EventBus<ShakeCommand>>,
        host: Rc<dyn ParameterHost>,
        property: &str,
        settings: ShakerSettings,
    ) -> ShakeResult<Self> {
        let target = PropertyTarget::bind(host, property)?;
        Self::new(name, bus, target, settings)
    }
}

impl<T> Drop for Shaker<T> {
    fn drop(&mut self) {
        self.on_disable();
    }
}
