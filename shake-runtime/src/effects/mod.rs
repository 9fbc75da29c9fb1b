//! # Effects 模块（具体反馈效果）
//!
//! 在通用的震动反馈之上，定义各类具体效果的默认参数，以及
//! 不走"曲线驱动参数"模型的几种特殊反馈。
//!
//! ## 核心组件
//!
//! - [`EffectKind`]：参数震动效果类型（每种一条总线）
//! - [`BloomFeedback`]：一次驱动泛光强度与阈值两条轨道
//! - [`FreezeFrameFeedback`] / [`FreezeFrameController`]：冻结帧（模拟时间暂停）
//! - [`AutoFocus`]：按目标距离逐帧写入景深参数
//!
//! ## 设计原则
//!
//! - **唯一来源**：效果名、默认时长、默认曲线、默认 remap 只在 `defaults` 中定义
//! - **同一命令形状**：参数类效果全部发布 [`ShakeCommand`](crate::command::ShakeCommand)，
//!   区别只在总线与默认值

mod auto_focus;
mod bloom;
mod freeze_frame;
mod registry;

pub use auto_focus::{AutoFocus, AutoFocusSettings, Vec2};
pub use bloom::{BloomFeedback, BloomSettings, BloomTrack};
pub use freeze_frame::{FreezeFrameController, FreezeFrameFeedback, FreezeFrameSettings};
pub use registry::{EffectKind, defaults};
