//! # Error 模块
//!
//! 定义 shake-runtime 中使用的错误类型。
//!
//! 两类错误都只会在"编辑期/构造期"出现：
//! - [`CurveError`]：曲线关键帧不合法，在创建曲线时拒绝
//! - [`ConfigError`]：震动器/驱动器绑定或配置不合法，在构造时拒绝
//!
//! 震动进行中的命令冲突（Shaking 时收到新命令）不是错误，直接丢弃。

use thiserror::Error;

/// 曲线错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// 没有任何关键帧
    #[error("曲线至少需要一个关键帧")]
    Empty,

    /// 关键帧时间超出 [0, 1]
    #[error("第 {index} 个关键帧的时间 {time} 超出 [0, 1] 范围")]
    TimeOutOfRange { index: usize, time: f64 },

    /// 关键帧时间倒序
    #[error("第 {index} 个关键帧的时间 {time} 小于前一个关键帧的时间 {previous}")]
    TimeOutOfOrder {
        index: usize,
        previous: f64,
        time: f64,
    },

    /// 关键帧包含 NaN 或无穷大
    #[error("第 {index} 个关键帧包含非有限值")]
    NonFinite { index: usize },
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 目标对象上不存在该属性
    #[error("目标属性 '{property}' 不存在")]
    PropertyNotFound { property: String },

    /// 时长为负数或非有限值
    #[error("无效的时长 {duration}，必须是非负有限值")]
    InvalidDuration { duration: f64 },

    /// 自动对焦没有任何对焦目标
    #[error("自动对焦至少需要一个对焦目标")]
    NoFocusTargets,
}

/// shake-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShakeError {
    /// 曲线错误
    #[error("曲线错误: {0}")]
    Curve(#[from] CurveError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type ShakeResult<T> = Result<T, ShakeError>;

/// 校验时长：非负且有限
pub(crate) fn validate_duration(duration: f64) -> Result<f64, ConfigError> {
    if duration.is_finite() && duration >= 0.0 {
        Ok(duration)
    } else {
        Err(ConfigError::InvalidDuration { duration })
    }
}
