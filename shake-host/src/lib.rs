//! # Shake Host
//!
//! 无界面的固定步长宿主：加载 JSON 场景，把反馈、震动器和参数表接在一起，
//! 按时间线驱动并记录参数变化。
//!
//! - [`config`]：宿主配置与场景描述
//! - [`scene`]：场景装配与运行
//! - [`report`]：运行记录输出

pub mod config;
pub mod report;
pub mod scene;

pub use config::{ConfigOverrides, HostConfig, HostConfigError, SceneConfig};
pub use scene::{Frame, Scene, Trace, run};
