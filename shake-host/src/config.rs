//! # Config 模块
//!
//! 宿主配置管理：运行参数 + 场景描述。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (JSON)
//! 3. 默认值（最低）

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shake_runtime::{
    AutoFocusSettings, BloomSettings, EffectKind, FeedbackSettings, FreezeFrameSettings,
    ShakerSettings,
};
use thiserror::Error;
use tracing::{info, warn};

/// 宿主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// 固定步长频率（Hz）
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: f64,

    /// 模拟总时长（秒）
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: f64,

    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 每隔多少步采样一次参数表
    #[serde(default = "default_sample_every")]
    pub sample_every: u32,

    /// 场景
    #[serde(default)]
    pub scene: SceneConfig,
}

/// 场景描述
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// 参数表初始值
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,

    /// 震动器
    #[serde(default)]
    pub shakers: Vec<ShakerConfig>,

    /// 反馈
    #[serde(default)]
    pub feedbacks: Vec<FeedbackConfig>,

    /// 时间线：按时间播放反馈
    #[serde(default)]
    pub timeline: Vec<Cue>,

    /// 自动对焦
    #[serde(default)]
    pub auto_focus: Option<AutoFocusConfig>,
}

/// 震动器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShakerConfig {
    pub name: String,

    /// 订阅哪种效果的总线
    pub effect: EffectKind,

    /// 驱动的参数名，缺省为效果的默认参数
    #[serde(default)]
    pub property: Option<String>,

    /// 设计期配置，缺省为效果的默认配置
    #[serde(default)]
    pub settings: Option<ShakerSettings>,

    /// 是否在启动时注册到总线
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ShakerConfig {
    /// 实际驱动的参数名
    pub fn property(&self) -> &str {
        self.property
            .as_deref()
            .unwrap_or_else(|| self.effect.default_property())
    }

    /// 实际使用的设计期配置
    pub fn settings(&self) -> ShakerSettings {
        self.settings
            .clone()
            .unwrap_or_else(|| self.effect.default_shaker())
    }
}

/// 反馈配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedbackConfig {
    /// 单参数震动反馈
    Shake {
        label: String,
        effect: EffectKind,
        #[serde(default)]
        settings: Option<FeedbackSettings>,
    },
    /// 泛光反馈
    Bloom {
        label: String,
        #[serde(default)]
        settings: BloomSettings,
    },
    /// 冻结帧
    FreezeFrame {
        label: String,
        #[serde(default)]
        settings: FreezeFrameSettings,
    },
}

impl FeedbackConfig {
    /// 反馈名称
    pub fn label(&self) -> &str {
        match self {
            FeedbackConfig::Shake { label, .. }
            | FeedbackConfig::Bloom { label, .. }
            | FeedbackConfig::FreezeFrame { label, .. } => label,
        }
    }
}

/// 时间线条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// 触发时间（秒，真实时间）
    pub at: f64,
    /// 反馈名称
    pub feedback: String,
    /// 衰减
    #[serde(default = "default_attenuation")]
    pub attenuation: f64,
}

/// 自动对焦配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFocusConfig {
    pub settings: AutoFocusSettings,
    #[serde(default = "default_focus_distance_property")]
    pub distance_property: String,
    #[serde(default = "default_aperture_property")]
    pub aperture_property: String,
}

// 默认值函数
fn default_tick_rate_hz() -> f64 {
    60.0
}

fn default_duration_seconds() -> f64 {
    3.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sample_every() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_attenuation() -> f64 {
    1.0
}

fn default_focus_distance_property() -> String {
    "depth_of_field.focus_distance".to_string()
}

fn default_aperture_property() -> String {
    "depth_of_field.aperture".to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
            duration_seconds: default_duration_seconds(),
            log_level: default_log_level(),
            sample_every: default_sample_every(),
            scene: SceneConfig::default(),
        }
    }
}

/// 命令行覆盖项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub tick_rate_hz: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub log_level: Option<String>,
    pub sample_every: Option<u32>,
}

impl HostConfig {
    /// 从 JSON 文件加载配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HostConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| HostConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| HostConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "配置文件加载成功");
        Ok(config)
    }

    /// 加载配置文件；文件不存在时使用默认配置
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, HostConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HostConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| HostConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| HostConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 叠加命令行参数
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(hz) = overrides.tick_rate_hz {
            self.tick_rate_hz = hz;
        }
        if let Some(seconds) = overrides.duration_seconds {
            self.duration_seconds = seconds;
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.clone();
        }
        if let Some(every) = overrides.sample_every {
            self.sample_every = every;
        }
        self
    }

    /// 固定步长（秒）
    pub fn step_seconds(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }

    /// 总步数
    pub fn step_count(&self) -> usize {
        (self.duration_seconds * self.tick_rate_hz).round() as usize
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), HostConfigError> {
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return Err(HostConfigError::Validation(format!(
                "tick_rate_hz 必须是正数，当前为 {}",
                self.tick_rate_hz
            )));
        }
        if !self.duration_seconds.is_finite() || self.duration_seconds < 0.0 {
            return Err(HostConfigError::Validation(format!(
                "duration_seconds 必须是非负数，当前为 {}",
                self.duration_seconds
            )));
        }
        if self.sample_every == 0 {
            return Err(HostConfigError::Validation(
                "sample_every 至少为 1".to_string(),
            ));
        }
        self.scene.validate()
    }
}

impl SceneConfig {
    /// 验证场景引用关系
    ///
    /// 只检查名称层面的问题；曲线、时长和属性绑定在构建场景时由运行时校验。
    pub fn validate(&self) -> Result<(), HostConfigError> {
        let mut shaker_names = BTreeSet::new();
        for shaker in &self.shakers {
            if !shaker_names.insert(shaker.name.as_str()) {
                return Err(HostConfigError::Validation(format!(
                    "震动器名称重复: {}",
                    shaker.name
                )));
            }
        }

        let mut labels = BTreeSet::new();
        for feedback in &self.feedbacks {
            if !labels.insert(feedback.label()) {
                return Err(HostConfigError::Validation(format!(
                    "反馈名称重复: {}",
                    feedback.label()
                )));
            }
        }

        for cue in &self.timeline {
            if !cue.at.is_finite() || cue.at < 0.0 {
                return Err(HostConfigError::Validation(format!(
                    "时间线条目 '{}' 的时间 {} 无效",
                    cue.feedback, cue.at
                )));
            }
            if !labels.contains(cue.feedback.as_str()) {
                return Err(HostConfigError::Validation(format!(
                    "时间线引用了未定义的反馈: {}",
                    cue.feedback
                )));
            }
        }

        Ok(())
    }
}

/// 配置错误
#[derive(Error, Debug)]
pub enum HostConfigError {
    /// IO 错误
    #[error("配置 IO 错误 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析/序列化失败
    #[error("配置解析失败 {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}
