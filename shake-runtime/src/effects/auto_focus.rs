//! # Auto Focus
//!
//! 自动对焦：每个模拟步计算相机到当前对焦目标的距离，
//! 写入景深的对焦距离和光圈两个目标参数。
//!
//! 当前目标由 `focus_target_id` 的整数部分选出，因此这个值本身
//! 也可以被震动器驱动，在多个目标之间切换。

use serde::{Deserialize, Serialize};

use super::registry::defaults;
use crate::error::{ConfigError, ShakeResult};
use crate::target::TargetAccessor;

/// 二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    /// 创建新的向量
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 到另一点的距离
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

fn default_aperture() -> f64 {
    defaults::APERTURE_RANGE.0
}

/// 自动对焦配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFocusSettings {
    /// 相机位置
    #[serde(default)]
    pub camera: Vec2,
    /// 所有可能的对焦目标
    pub focus_targets: Vec<Vec2>,
    /// 当前对焦目标（取整数部分）
    #[serde(default)]
    pub focus_target_id: f64,
    /// 光圈
    #[serde(default = "default_aperture")]
    pub aperture: f64,
}

/// 自动对焦驱动器
#[derive(Debug)]
pub struct AutoFocus<T> {
    settings: AutoFocusSettings,
    focus_distance: T,
    aperture: T,
}

impl<T: TargetAccessor> AutoFocus<T> {
    /// 创建自动对焦
    ///
    /// 没有任何对焦目标时返回配置错误；光圈被限制在有效范围内。
    pub fn new(mut settings: AutoFocusSettings, focus_distance: T, aperture: T) -> ShakeResult<Self> {
        if settings.focus_targets.is_empty() {
            return Err(ConfigError::NoFocusTargets.into());
        }
        let (min, max) = defaults::APERTURE_RANGE;
        settings.aperture = settings.aperture.clamp(min, max);
        Ok(Self {
            settings,
            focus_distance,
            aperture,
        })
    }

    /// 设置相机位置
    pub fn set_camera(&mut self, camera: Vec2) {
        self.settings.camera = camera;
    }

    /// 设置当前对焦目标
    pub fn set_focus_target_id(&mut self, id: f64) {
        self.settings.focus_target_id = id;
    }

    /// 当前对焦目标下标（越界时取最近的有效下标）
    pub fn current_target(&self) -> usize {
        let last = self.settings.focus_targets.len() - 1;
        let id = self.settings.focus_target_id.floor();
        if id.is_nan() || id <= 0.0 {
            0
        } else {
            (id as usize).min(last)
        }
    }

    /// 当前对焦距离
    pub fn focus_distance(&self) -> f64 {
        let target = self.settings.focus_targets[self.current_target()];
        self.settings.camera.distance(target)
    }

    /// 每个模拟步写入对焦距离与光圈
    pub fn on_tick(&mut self, _dt: f64) {
        let distance = self.focus_distance();
        self.focus_distance.set_value(distance);
        self.aperture.set_value(self.settings.aperture);
    }

    /// 当前配置
    pub fn settings(&self) -> &AutoFocusSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShakeError;
    use crate::target::SharedValue;

    fn settings() -> AutoFocusSettings {
        AutoFocusSettings {
            camera: Vec2::new(0.0, 0.0),
            focus_targets: vec![Vec2::new(3.0, 4.0), Vec2::new(6.0, 8.0)],
            focus_target_id: 0.0,
            aperture: 2.8,
        }
    }

    #[test]
    fn test_focus_on_floor_indexed_target() {
        let distance = SharedValue::new(0.0);
        let aperture = SharedValue::new(0.0);
        let mut focus = AutoFocus::new(settings(), distance.clone(), aperture.clone()).unwrap();

        focus.on_tick(0.016);
        assert_eq!(distance.get(), 5.0);
        assert_eq!(aperture.get(), 2.8);

        focus.set_focus_target_id(1.7);
        focus.on_tick(0.016);
        assert_eq!(focus.current_target(), 1);
        assert_eq!(distance.get(), 10.0);

        focus.set_camera(Vec2::new(6.0, 4.0));
        focus.on_tick(0.016);
        assert_eq!(distance.get(), 4.0);
    }

    #[test]
    fn test_out_of_range_id_is_clamped() {
        let mut focus =
            AutoFocus::new(settings(), SharedValue::new(0.0), SharedValue::new(0.0)).unwrap();
        focus.set_focus_target_id(9.0);
        assert_eq!(focus.current_target(), 1);
        focus.set_focus_target_id(-3.0);
        assert_eq!(focus.current_target(), 0);
        focus.set_focus_target_id(f64::NAN);
        assert_eq!(focus.current_target(), 0);
    }

    #[test]
    fn test_aperture_clamped() {
        let mut s = settings();
        s.aperture = 50.0;
        let focus = AutoFocus::new(s, SharedValue::new(0.0), SharedValue::new(0.0)).unwrap();
        assert_eq!(focus.settings().aperture, 20.0);
    }

    #[test]
    fn test_requires_targets() {
        let mut s = settings();
        s.focus_targets.clear();
        let err = AutoFocus::new(s, SharedValue::new(0.0), SharedValue::new(0.0)).unwrap_err();
        assert_eq!(err, ShakeError::Config(ConfigError::NoFocusTargets));
    }
}
