//! # Context 模块
//!
//! 反馈上下文：持有每种效果的总线。
//!
//! 总线是场景级的对象，由宿主创建一次，再把 `Rc` 分给反馈和震动器。
//! 同一效果的反馈与震动器必须拿到同一条总线才能互相看见。

use std::rc::Rc;

use crate::bus::EventBus;
use crate::command::{FreezeFrameCommand, ShakeCommand};
use crate::effects::{
    BloomFeedback, BloomSettings, EffectKind, FreezeFrameController, FreezeFrameFeedback,
    FreezeFrameSettings,
};
use crate::error::ShakeResult;
use crate::feedback::{FeedbackSettings, ShakeFeedback};
use crate::shaker::{Shaker, ShakerSettings};
use crate::target::{ParameterHost, PropertyTarget};

type ShakeBus = Rc<EventBus<ShakeCommand>>;

/// 反馈上下文
#[derive(Debug, Default)]
pub struct FeedbackContext {
    audio_low_pass: ShakeBus,
    bloom_intensity: ShakeBus,
    bloom_threshold: ShakeBus,
    lens_distortion: ShakeBus,
    freeze_frame: Rc<EventBus<FreezeFrameCommand>>,
}

impl FeedbackContext {
    /// 为每种效果创建一条空总线
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定效果的总线
    pub fn shake_bus(&self, kind: EffectKind) -> ShakeBus {
        let bus = match kind {
            EffectKind::AudioLowPass => &self.audio_low_pass,
            EffectKind::BloomIntensity => &self.bloom_intensity,
            EffectKind::BloomThreshold => &self.bloom_threshold,
            EffectKind::LensDistortion => &self.lens_distortion,
        };
        Rc::clone(bus)
    }

    /// 冻结帧总线
    pub fn freeze_frame_bus(&self) -> Rc<EventBus<FreezeFrameCommand>> {
        Rc::clone(&self.freeze_frame)
    }

    /// 创建发布到指定效果总线的反馈
    pub fn shake_feedback(
        &self,
        label: impl Into<String>,
        kind: EffectKind,
        settings: FeedbackSettings,
    ) -> ShakeResult<ShakeFeedback> {
        ShakeFeedback::new(label, self.shake_bus(kind), settings)
    }

    /// 创建泛光反馈（强度、阈值两条总线）
    pub fn bloom_feedback(
        &self,
        label: impl Into<String>,
        settings: BloomSettings,
    ) -> ShakeResult<BloomFeedback> {
        BloomFeedback::new(
            label,
            self.shake_bus(EffectKind::BloomIntensity),
            self.shake_bus(EffectKind::BloomThreshold),
            settings,
        )
    }

    /// 创建冻结帧反馈
    pub fn freeze_frame_feedback(
        &self,
        label: impl Into<String>,
        settings: FreezeFrameSettings,
    ) -> ShakeResult<FreezeFrameFeedback> {
        FreezeFrameFeedback::new(label, self.freeze_frame_bus(), settings)
    }

    /// 创建冻结帧控制器（已启用）
    pub fn freeze_frame_controller(&self) -> FreezeFrameController {
        let mut controller = FreezeFrameController::new(self.freeze_frame_bus());
        controller.on_enable();
        controller
    }

    /// 创建绑定到宿主属性、订阅指定效果总线的震动器（未启用）
    pub fn bind_shaker(
        &self,
        name: impl Into<String>,
        kind: EffectKind,
        host: Rc<dyn ParameterHost>,
        property: &str,
        settings: ShakerSettings,
    ) -> ShakeResult<Shaker<PropertyTarget>> {
        Shaker::bind(name, self.shake_bus(kind), host, property, settings)
    }

    /// 所有效果总线上的监听者总数
    pub fn listener_count(&self) -> usize {
        EffectKind::ALL
            .iter()
            .map(|kind| self.shake_bus(*kind).listener_count())
            .sum::<usize>()
            + self.freeze_frame.listener_count()
    }
}
