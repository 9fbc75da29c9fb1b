//! # Channel 模块
//!
//! 通道是纯路由键：反馈在某个通道上发布命令，震动器只响应自己关心的通道。
//!
//! 匹配规则是严格相等。通道 0 只是默认值，不是通配符；
//! 需要接收所有通道的监听者显式使用 [`ChannelFilter::Any`]。

use serde::{Deserialize, Serialize};

/// 通道号
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Channel(pub u32);

impl Channel {
    /// 默认通道
    pub const DEFAULT: Channel = Channel(0);

    /// 创建通道
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// 获取通道号
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for Channel {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// 监听者的通道过滤器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelFilter {
    /// 只接收指定通道
    Only(Channel),
    /// 接收所有通道
    Any,
}

impl ChannelFilter {
    /// 命令的通道是否被接受
    pub fn accepts(&self, channel: Channel) -> bool {
        match self {
            ChannelFilter::Only(own) => *own == channel,
            ChannelFilter::Any => true,
        }
    }
}

impl Default for ChannelFilter {
    fn default() -> Self {
        Self::Only(Channel::DEFAULT)
    }
}

impl From<Channel> for ChannelFilter {
    fn from(channel: Channel) -> Self {
        Self::Only(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let filter = ChannelFilter::Only(Channel(1));
        assert!(filter.accepts(Channel(1)));
        assert!(!filter.accepts(Channel(0)));
        assert!(!filter.accepts(Channel(2)));
    }

    #[test]
    fn test_channel_zero_is_not_wildcard() {
        let filter = ChannelFilter::default();
        assert!(filter.accepts(Channel::DEFAULT));
        assert!(!filter.accepts(Channel(3)));

        let filter = ChannelFilter::Only(Channel(3));
        assert!(!filter.accepts(Channel::DEFAULT));
    }

    #[test]
    fn test_any() {
        let filter = ChannelFilter::Any;
        assert!(filter.accepts(Channel(0)));
        assert!(filter.accepts(Channel(42)));
    }

    #[test]
    fn test_serialization() {
        assert_eq!(serde_json::to_string(&Channel(2)).unwrap(), "2");
        let filter: ChannelFilter = serde_json::from_str(r#"{"only":2}"#).unwrap();
        assert_eq!(filter, ChannelFilter::Only(Channel(2)));
        let filter: ChannelFilter = serde_json::from_str(r#""any""#).unwrap();
        assert_eq!(filter, ChannelFilter::Any);
    }
}
