//! # Bloom 反馈
//!
//! 一次播放同时驱动泛光强度和泛光阈值两条轨道。
//! 两条轨道共享时长、通道、相对标志和恢复标志，分别发到各自的总线。

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::registry::{EffectKind, defaults};
use crate::bus::EventBus;
use crate::channel::Channel;
use crate::command::{ShakeCommand, ShakeParams};
use crate::curve::Curve;
use crate::error::ShakeResult;
use crate::feedback::{Feedback, FeedbackSettings};

fn default_true() -> bool {
    true
}

/// 单条轨道：曲线与 remap 区间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomTrack {
    #[serde(default)]
    pub curve: Curve,
    #[serde(default)]
    pub remap_low: f64,
    #[serde(default)]
    pub remap_high: f64,
}

/// 泛光反馈配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomSettings {
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub channel: Channel,
    pub duration: f64,
    #[serde(default = "default_true")]
    pub relative: bool,
    #[serde(default = "default_true")]
    pub reset_shaker_after: bool,
    #[serde(default = "default_true")]
    pub reset_target_after: bool,
    pub intensity: BloomTrack,
    pub threshold: BloomTrack,
}

impl Default for BloomSettings {
    fn default() -> Self {
        let (i_low, i_high) = defaults::BLOOM_INTENSITY_REMAP;
        let (t_low, t_high) = defaults::BLOOM_THRESHOLD_REMAP;
        Self {
            active: true,
            channel: Channel::DEFAULT,
            duration: defaults::BLOOM_DURATION,
            relative: true,
            reset_shaker_after: true,
            reset_target_after: true,
            intensity: BloomTrack {
                curve: defaults::bloom_curve(),
                remap_low: i_low,
                remap_high: i_high,
            },
            threshold: BloomTrack {
                curve: defaults::bloom_curve(),
                remap_low: t_low,
                remap_high: t_high,
            },
        }
    }
}

impl BloomSettings {
    /// 把某条轨道展开成普通的反馈配置
    pub fn track_settings(&self, track: &BloomTrack) -> FeedbackSettings {
        FeedbackSettings {
            active: self.active,
            channel: self.channel,
            params: ShakeParams::new(track.curve.clone(), self.duration)
                .with_remap(track.remap_low, track.remap_high)
                .with_relative(self.relative),
            reset_shaker_after: self.reset_shaker_after,
            reset_target_after: self.reset_target_after,
        }
    }
}

/// 泛光反馈
pub struct BloomFeedback {
    label: String,
    settings: BloomSettings,
    intensity_bus: Rc<EventBus<ShakeCommand>>,
    threshold_bus: Rc<EventBus<ShakeCommand>>,
}

impl std::fmt::Debug for BloomFeedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BloomFeedback")
            .field("label", &self.label)
            .field("settings", &self.settings)
            .finish()
    }
}

impl BloomFeedback {
    /// 创建泛光反馈
    pub fn new(
        label: impl Into<String>,
        intensity_bus: Rc<EventBus<ShakeCommand>>,
        threshold_bus: Rc<EventBus<ShakeCommand>>,
        settings: BloomSettings,
    ) -> ShakeResult<Self> {
        crate::error::validate_duration(settings.duration)?;
        Ok(Self {
            label: label.into(),
            settings,
            intensity_bus,
            threshold_bus,
        })
    }

    /// 设计期配置
    pub fn settings(&self) -> &BloomSettings {
        &self.settings
    }
}

impl Feedback for BloomFeedback {
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

    fn play(&self, attenuation: f64) {
        if !self.settings.active {
            return;
        }
        let tracks = [
            (EffectKind::BloomIntensity, &self.settings.intensity, &self.intensity_bus),
            (EffectKind::BloomThreshold, &self.settings.threshold, &self.threshold_bus),
        ];
        for (kind, track, bus) in tracks {
            let command = self.settings.track_settings(track).command(attenuation);
            let delivered = bus.trigger(&command);
            debug!(feedback = %self.label, effect = %kind, attenuation, delivered, "发布泛光命令");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaker::{Shaker, ShakerSettings};
    use crate::target::SharedValue;

    #[test]
    fn test_play_drives_both_tracks() {
        let intensity_bus = Rc::new(EventBus::new());
        let threshold_bus = Rc::new(EventBus::new());

        let intensity = SharedValue::new(1.0);
        let threshold = SharedValue::new(0.5);
        let mut intensity_shaker = Shaker::new(
            "bloom.intensity",
            intensity_bus.clone(),
            intensity.clone(),
            EffectKind::BloomIntensity.default_shaker(),
        )
        .unwrap();
        let mut threshold_shaker = Shaker::new(
            "bloom.threshold",
            threshold_bus.clone(),
            threshold.clone(),
            EffectKind::BloomThreshold.default_shaker(),
        )
        .unwrap();
        intensity_shaker.on_enable();
        threshold_shaker.on_enable();

        let mut settings = BloomSettings::default();
        settings.duration = 1.0;
        settings.intensity.remap_high = 4.0;
        settings.threshold.remap_high = 2.0;
        let feedback =
            BloomFeedback::new("bloom", intensity_bus, threshold_bus, settings).unwrap();
        assert_eq!(feedback.duration(), 1.0);

        feedback.play(0.5);
        assert!(intensity_shaker.is_shaking());
        assert!(threshold_shaker.is_shaking());

        intensity_shaker.on_tick(0.5);
        threshold_shaker.on_tick(0.5);
        // 相对震动：初始值 + 峰值 * 衰减
        assert_eq!(intensity.get(), 3.0);
        assert_eq!(threshold.get(), 1.5);

        intensity_shaker.on_tick(0.5);
        threshold_shaker.on_tick(0.5);
        assert_eq!(intensity.get(), 1.0);
        assert_eq!(threshold.get(), 0.5);
    }

    #[test]
    fn test_inactive_bloom_is_noop() {
        let intensity_bus: Rc<EventBus<ShakeCommand>> = Rc::new(EventBus::new());
        let threshold_bus: Rc<EventBus<ShakeCommand>> = Rc::new(EventBus::new());
        let hits = Rc::new(std::cell::Cell::new(0));
        for bus in [&intensity_bus, &threshold_bus] {
            let hits = Rc::clone(&hits);
            bus.register(move |_| hits.set(hits.get() + 1));
        }

        let mut feedback = BloomFeedback::new(
            "bloom",
            intensity_bus,
            threshold_bus,
            BloomSettings::default(),
        )
        .unwrap();
        feedback.set_active(false);
        feedback.play(1.0);
        assert_eq!(hits.get(), 0);

        feedback.set_active(true);
        feedback.play(1.0);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_track_settings() {
        let settings = BloomSettings::default();
        let track = settings.track_settings(&settings.threshold);
        assert_eq!(track.params.duration, defaults::BLOOM_DURATION);
        assert!(track.params.relative);
        assert_eq!(track.params.remap_high, 0.0);
        assert_eq!(
            ShakerSettings::new(track.params.clone()).params,
            EffectKind::BloomThreshold.default_params()
        );
    }
}
