//! # Shake Runtime
//!
//! 事件驱动的参数震动核心库。
//!
//! ## 架构概述
//!
//! `shake-runtime` 不依赖任何音频/渲染引擎，也不自己计时。
//! 它通过 **总线 + 命令** 把"触发效果"和"执行效果"解耦：
//!
//! ```text
//! Feedback (触发端)              Shaker (执行端)
//!   │                               │
//!   │── play(attenuation) ──►EventBus──► handle_command()
//!   │                               │
//!   │                  Host ───────►│ on_tick(dt)
//!   │                               │── set_value() ──► Target
//! ```
//!
//! - 反馈是无状态的描述符，只负责组装 [`ShakeCommand`] 并发布
//! - 震动器是 `Idle ⇄ Shaking` 状态机，按曲线驱动一个 f64 参数
//! - 宿主负责创建总线、调用 `on_tick`、以及提供目标参数
//!
//! ## 核心类型
//!
//! - [`Curve`]：归一化时间动画曲线
//! - [`EventBus`]：类型化的发布/订阅总线
//! - [`ShakeCommand`]：反馈发给震动器的命令
//! - [`Shaker`]：通用震动器
//! - [`Feedback`]：反馈接口
//! - [`FeedbackContext`]：按效果持有所有总线
//!
//! ## 使用示例
//!
//! ```ignore
//! use shake_runtime::{EffectKind, Feedback, FeedbackContext, ParameterTable};
//!
//! let ctx = FeedbackContext::new();
//! let table = Rc::new(ParameterTable::from_iter([("lens_distortion.intensity", 0.0)]));
//!
//! let kind = EffectKind::LensDistortion;
//! let mut shaker = ctx.bind_shaker("lens", kind, table.clone(), kind.default_property(), kind.default_shaker())?;
//! shaker.on_enable();
//!
//! let feedback = ctx.shake_feedback("hit", kind, kind.default_feedback())?;
//! feedback.play(0.5);
//!
//! // 主循环
//! loop {
//!     shaker.on_tick(dt);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`curve`]：曲线与重映射
//! - [`easing`]：关键帧缓动函数
//! - [`channel`]：通道与通道过滤
//! - [`bus`]：事件总线
//! - [`command`]：命令定义
//! - [`target`]：目标参数抽象
//! - [`shaker`]：震动器状态机
//! - [`feedback`]：反馈接口与单参数反馈
//! - [`effects`]：具体效果（默认参数、泛光、冻结帧、自动对焦）
//! - [`context`]：反馈上下文
//! - [`error`]：错误类型定义

pub mod bus;
pub mod channel;
pub mod command;
pub mod context;
pub mod curve;
pub mod easing;
pub mod effects;
pub mod error;
pub mod feedback;
pub mod shaker;
pub mod target;

// 重导出核心类型
pub use bus::{EventBus, ListenerId};
pub use channel::{Channel, ChannelFilter};
pub use command::{FreezeFrameCommand, ShakeCommand, ShakeParams};
pub use context::FeedbackContext;
pub use curve::{Curve, Keyframe, remap};
pub use easing::EasingFunction;
pub use effects::{
    AutoFocus, AutoFocusSettings, BloomFeedback, BloomSettings, BloomTrack, EffectKind,
    FreezeFrameController, FreezeFrameFeedback, FreezeFrameSettings, Vec2,
};
pub use error::{ConfigError, CurveError, ShakeError, ShakeResult};
pub use feedback::{Feedback, FeedbackSettings, ShakeFeedback};
pub use shaker::{ShakePhase, Shaker, ShakerSettings, ShakerSnapshot};
pub use target::{ParameterHost, ParameterTable, PropertyTarget, SharedValue, TargetAccessor};
