//! # Scene 模块
//!
//! 把场景配置装配成可运行的对象图，并以固定步长驱动。
//!
//! ## 每一步的顺序
//!
//! ```text
//! 1. 播放到期的时间线条目（feedback.play）
//! 2. 冻结帧控制器消耗真实时间 → 得到模拟时间步长
//! 3. 所有震动器、自动对焦按模拟时间步长推进
//! 4. 按 sample_every 采样参数表
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::Context;
use serde::Serialize;
use shake_runtime::{
    AutoFocus, Feedback, FeedbackContext, FreezeFrameController, ParameterHost, ParameterTable,
    PropertyTarget, Shaker,
};
use tracing::{debug, info};

use crate::config::{Cue, FeedbackConfig, HostConfig, SceneConfig};

/// 一次采样
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// 步序号（0 为初始状态）
    pub step: usize,
    /// 真实时间
    pub time: f64,
    /// 模拟时间
    pub sim_time: f64,
    /// 是否处于冻结帧中
    pub frozen: bool,
    /// 参数表
    pub values: BTreeMap<String, f64>,
}

/// 完整运行记录
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trace {
    pub tick_rate_hz: f64,
    pub frames: Vec<Frame>,
}

/// 装配好的场景
pub struct Scene {
    table: Rc<ParameterTable>,
    // 持有所有总线；反馈和震动器各自也持有 Rc
    context: FeedbackContext,
    shakers: Vec<Shaker<PropertyTarget>>,
    feedbacks: Vec<Box<dyn Feedback>>,
    freeze: FreezeFrameController,
    auto_focus: Option<AutoFocus<PropertyTarget>>,
    timeline: Vec<Cue>,
    next_cue: usize,
    step: usize,
    time: f64,
    sim_time: f64,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("shakers", &self.shakers)
            .field("feedbacks", &self.feedbacks.len())
            .field("step", &self.step)
            .field("time", &self.time)
            .finish()
    }
}

impl Scene {
    /// 根据场景配置装配
    pub fn build(config: &SceneConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let table: Rc<ParameterTable> = Rc::new(
            config
                .parameters
                .iter()
                .map(|(name, value)| (name.as_str(), *value))
                .collect(),
        );
        let host: Rc<dyn ParameterHost> = table.clone();
        let context = FeedbackContext::new();

        let mut shakers = Vec::with_capacity(config.shakers.len());
        for shaker_config in &config.shakers {
            let mut shaker = context
                .bind_shaker(
                    &shaker_config.name,
                    shaker_config.effect,
                    Rc::clone(&host),
                    shaker_config.property(),
                    shaker_config.settings(),
                )
                .with_context(|| format!("震动器 '{}' 创建失败", shaker_config.name))?;
            if shaker_config.enabled {
                shaker.on_enable();
            }
            shakers.push(shaker);
        }

        let mut feedbacks: Vec<Box<dyn Feedback>> = Vec::with_capacity(config.feedbacks.len());
        for feedback_config in &config.feedbacks {
            let label = feedback_config.label();
            let feedback: Box<dyn Feedback> = match feedback_config {
                FeedbackConfig::Shake {
                    effect, settings, ..
                } => {
                    let settings = settings
                        .clone()
                        .unwrap_or_else(|| effect.default_feedback());
                    Box::new(context.shake_feedback(label, *effect, settings)?)
                }
                FeedbackConfig::Bloom { settings, .. } => {
                    Box::new(context.bloom_feedback(label, settings.clone())?)
                }
                FeedbackConfig::FreezeFrame { settings, .. } => {
                    Box::new(context.freeze_frame_feedback(label, settings.clone())?)
                }
            };
            feedbacks.push(feedback);
        }

        let auto_focus = match &config.auto_focus {
            Some(focus) => {
                let distance = PropertyTarget::bind(Rc::clone(&host), &focus.distance_property)
                    .context("自动对焦创建失败")?;
                let aperture = PropertyTarget::bind(Rc::clone(&host), &focus.aperture_property)
                    .context("自动对焦创建失败")?;
                let auto_focus = AutoFocus::new(focus.settings.clone(), distance, aperture)
                    .context("自动对焦创建失败")?;
                Some(auto_focus)
            }
            None => None,
        };

        let mut timeline = config.timeline.clone();
        timeline.sort_by(|a, b| a.at.total_cmp(&b.at));

        let freeze = context.freeze_frame_controller();
        info!(
            parameters = table.len(),
            shakers = shakers.len(),
            feedbacks = feedbacks.len(),
            cues = timeline.len(),
            "场景装配完成"
        );

        Ok(Self {
            table,
            context,
            shakers,
            feedbacks,
            freeze,
            auto_focus,
            timeline,
            next_cue: 0,
            step: 0,
            time: 0.0,
            sim_time: 0.0,
        })
    }

    /// 参数表
    pub fn table(&self) -> &ParameterTable {
        &self.table
    }

    /// 反馈上下文
    pub fn context(&self) -> &FeedbackContext {
        &self.context
    }

    /// 震动器
    pub fn shakers(&self) -> &[Shaker<PropertyTarget>] {
        &self.shakers
    }

    /// 按名称查找反馈
    pub fn feedback(&self, label: &str) -> Option<&dyn Feedback> {
        self.feedbacks
            .iter()
            .find(|f| f.label() == label)
            .map(|f| f.as_ref())
    }

    /// 按名称查找反馈（可变）
    pub fn feedback_mut(&mut self, label: &str) -> Option<&mut Box<dyn Feedback>> {
        self.feedbacks.iter_mut().find(|f| f.label() == label)
    }

    /// 是否处于冻结帧中
    pub fn is_frozen(&self) -> bool {
        self.freeze.is_frozen()
    }

    /// 推进一个真实时间步
    pub fn step(&mut self, real_dt: f64) {
        self.fire_due_cues();

        let sim_dt = self.freeze.on_tick(real_dt);
        for shaker in &mut self.shakers {
            shaker.on_tick(sim_dt);
        }
        if let Some(focus) = &mut self.auto_focus {
            focus.on_tick(sim_dt);
        }

        self.step += 1;
        self.time += real_dt;
        self.sim_time += sim_dt;
    }

    fn fire_due_cues(&mut self) {
        while let Some(cue) = self.timeline.get(self.next_cue) {
            if cue.at > self.time {
                break;
            }
            // 名称已在 validate 中检查
            if let Some(feedback) = self.feedbacks.iter().find(|f| f.label() == cue.feedback) {
                debug!(feedback = %cue.feedback, at = cue.at, time = self.time, "时间线触发");
                feedback.play(cue.attenuation);
            }
            self.next_cue += 1;
        }
    }

    /// 采样当前状态
    pub fn frame(&self) -> Frame {
        Frame {
            step: self.step,
            time: self.time,
            sim_time: self.sim_time,
            frozen: self.freeze.is_frozen(),
            values: self.table.snapshot().into_iter().collect(),
        }
    }
}

/// 按宿主配置完整运行一次
pub fn run(config: &HostConfig) -> anyhow::Result<Trace> {
    config.validate()?;
    let mut scene = Scene::build(&config.scene)?;

    let dt = config.step_seconds();
    let steps = config.step_count();
    let every = config.sample_every as usize;

    let mut trace = Trace {
        tick_rate_hz: config.tick_rate_hz,
        frames: vec![scene.frame()],
    };
    for step in 1..=steps {
        scene.step(dt);
        if step % every == 0 {
            trace.frames.push(scene.frame());
        }
    }

    info!(steps, frames = trace.frames.len(), "运行结束");
    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AutoFocusConfig, ShakerConfig};
    use shake_runtime::{
        AutoFocusSettings, Curve, EffectKind, FeedbackSettings, FreezeFrameSettings, ShakeParams,
        ShakerSettings, Vec2,
    };

    fn linear_feedback(label: &str, effect: EffectKind) -> FeedbackConfig {
        FeedbackConfig::Shake {
            label: label.to_string(),
            effect,
            settings: Some(FeedbackSettings::new(
                ShakeParams::new(Curve::linear(), 1.0).with_remap(0.0, 10.0),
            )),
        }
    }

    fn lens_scene() -> SceneConfig {
        SceneConfig {
            parameters: [("lens".to_string(), 0.0)].into_iter().collect(),
            shakers: vec![ShakerConfig {
                name: "lens".to_string(),
                effect: EffectKind::LensDistortion,
                property: Some("lens".to_string()),
                settings: None,
                enabled: true,
            }],
            feedbacks: vec![linear_feedback("hit", EffectKind::LensDistortion)],
            timeline: vec![Cue {
                at: 0.0,
                feedback: "hit".to_string(),
                attenuation: 1.0,
            }],
            auto_focus: None,
        }
    }

    fn config(scene: SceneConfig) -> HostConfig {
        HostConfig {
            tick_rate_hz: 4.0,
            duration_seconds: 2.0,
            scene,
            ..HostConfig::default()
        }
    }

    fn values(trace: &Trace, name: &str) -> Vec<f64> {
        trace.frames.iter().map(|f| f.values[name]).collect()
    }

    #[test]
    fn test_cue_drives_shaker() {
        let trace = run(&config(lens_scene())).unwrap();
        assert_eq!(trace.frames.len(), 9);
        assert_eq!(
            values(&trace, "lens"),
            vec![0.0, 2.5, 5.0, 7.5, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_attenuation_and_late_cue() {
        let mut scene = lens_scene();
        scene.timeline[0].at = 1.0;
        scene.timeline[0].attenuation = 0.5;
        let trace = run(&config(scene)).unwrap();
        assert_eq!(
            values(&trace, "lens"),
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.25, 2.5, 3.75, 0.0]
        );
    }

    #[test]
    fn test_cue_while_shaking_is_dropped() {
        let mut scene = lens_scene();
        scene.timeline.push(Cue {
            at: 0.5,
            feedback: "hit".to_string(),
            attenuation: 2.0,
        });
        let trace = run(&config(scene)).unwrap();
        assert_eq!(
            values(&trace, "lens"),
            vec![0.0, 2.5, 5.0, 7.5, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_freeze_frame_pauses_shakers() {
        let mut scene = lens_scene();
        scene.feedbacks.push(FeedbackConfig::FreezeFrame {
            label: "stop".to_string(),
            settings: FreezeFrameSettings {
                active: true,
                duration: 0.5,
            },
        });
        scene.timeline.push(Cue {
            at: 0.0,
            feedback: "stop".to_string(),
            attenuation: 1.0,
        });

        let trace = run(&config(scene)).unwrap();
        assert_eq!(
            values(&trace, "lens"),
            vec![0.0, 0.0, 0.0, 2.5, 5.0, 7.5, 0.0, 0.0, 0.0]
        );
        let frozen: Vec<bool> = trace.frames.iter().map(|f| f.frozen).collect();
        assert_eq!(
            frozen,
            vec![false, true, false, false, false, false, false, false, false]
        );
        assert_eq!(trace.frames[8].sim_time, 1.5);
        assert_eq!(trace.frames[8].time, 2.0);
    }

    #[test]
    fn test_disabled_shaker_ignores_feedback() {
        let mut scene = lens_scene();
        scene.shakers[0].enabled = false;
        let trace = run(&config(scene)).unwrap();
        assert!(values(&trace, "lens").iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_sample_every() {
        let mut host = config(lens_scene());
        host.sample_every = 2;
        let trace = run(&host).unwrap();
        let steps: Vec<usize> = trace.frames.iter().map(|f| f.step).collect();
        assert_eq!(steps, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_auto_focus_writes_parameters() {
        let mut scene = lens_scene();
        scene
            .parameters
            .insert("depth_of_field.focus_distance".to_string(), 0.0);
        scene
            .parameters
            .insert("depth_of_field.aperture".to_string(), 0.0);
        scene.auto_focus = Some(AutoFocusConfig {
            settings: AutoFocusSettings {
                camera: Vec2::new(0.0, 0.0),
                focus_targets: vec![Vec2::new(3.0, 4.0)],
                focus_target_id: 0.0,
                aperture: 5.6,
            },
            distance_property: "depth_of_field.focus_distance".to_string(),
            aperture_property: "depth_of_field.aperture".to_string(),
        });

        let mut scene = Scene::build(&scene).unwrap();
        scene.step(0.25);
        assert_eq!(scene.table().get("depth_of_field.focus_distance"), Some(5.0));
        assert_eq!(scene.table().get("depth_of_field.aperture"), Some(5.6));
    }

    #[test]
    fn test_missing_property_fails_build() {
        let mut scene = lens_scene();
        scene.shakers[0].property = Some("nope".to_string());
        let err = Scene::build(&scene).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("lens"), "{message}");
        assert!(message.contains("nope"), "{message}");
    }

    #[test]
    fn test_missing_auto_focus_property_fails_build() {
        let mut scene = lens_scene();
        scene.auto_focus = Some(AutoFocusConfig {
            settings: AutoFocusSettings {
                camera: Vec2::new(0.0, 0.0),
                focus_targets: vec![Vec2::new(1.0, 0.0)],
                focus_target_id: 0.0,
                aperture: 2.8,
            },
            distance_property: "dof.distance".to_string(),
            aperture_property: "dof.aperture".to_string(),
        });
        let err = Scene::build(&scene).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("自动对焦创建失败"), "{message}");
        assert!(message.contains("dof.distance"), "{message}");
    }

    #[test]
    fn test_invalid_shaker_settings_fail_build() {
        let mut scene = lens_scene();
        scene.shakers[0].settings = Some(ShakerSettings::new(ShakeParams::new(Curve::bell(), -1.0)));
        assert!(Scene::build(&scene).is_err());
    }

    #[test]
    fn test_feedback_lookup_and_toggle() {
        let mut scene = Scene::build(&lens_scene()).unwrap();
        assert_eq!(scene.feedback("hit").map(|f| f.duration()), Some(1.0));
        assert!(scene.feedback("missing").is_none());

        if let Some(feedback) = scene.feedback_mut("hit") {
            feedback.set_active(false);
        }
        scene.step(0.25);
        assert!(!scene.shakers()[0].is_shaking());
        assert_eq!(scene.context().listener_count(), 2);
    }

    #[test]
    fn test_demo_scene_runs() {
        let config: HostConfig =
            serde_json::from_str(include_str!("../../scenes/demo.json")).unwrap();
        let trace = run(&config).unwrap();
        assert_eq!(trace.frames.len(), 26);

        let peak = trace
            .frames
            .iter()
            .map(|f| f.values["bloom.intensity"])
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(peak > 1.0, "{peak}");

        let last = &trace.frames[25];
        assert_eq!(last.step, 75);
        assert_eq!(last.values["bloom.intensity"], 1.0);
        assert_eq!(last.values["bloom.threshold"], 0.9);
        assert_eq!(last.values["lens_distortion.intensity"], 0.0);
        assert_eq!(last.values["depth_of_field.focus_distance"], 10.0);
        assert_eq!(last.values["depth_of_field.aperture"], 2.8);
        assert!(last.values["audio.low_pass.cutoff"] < 22_000.0);
    }

    #[test]
    fn test_trace_json() {
        let mut host = config(lens_scene());
        host.duration_seconds = 0.5;
        let trace = run(&host).unwrap();
        insta::assert_debug_snapshot!(serde_json::to_value(&trace).unwrap()["frames"][1], @r###"
        Object {
            "frozen": Bool(false),
            "sim_time": Number(0.25),
            "step": Number(1),
            "time": Number(0.25),
            "values": Object {
                "lens": Number(2.5),
            },
        }
        "###);
    }
}
