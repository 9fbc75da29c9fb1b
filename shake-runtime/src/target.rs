//! # Target 模块
//!
//! 震动器写入的目标参数抽象。
//!
//! ## 核心概念
//!
//! - [`TargetAccessor`]：单个 f64 参数的读/写能力，震动器只依赖它
//! - [`ParameterHost`]：持有若干命名参数的宿主对象（音频滤波器、后处理体积等）
//! - [`PropertyTarget`]：绑定到宿主某个属性的访问器，绑定时校验属性存在
//! - [`SharedValue`] / [`ParameterTable`]：简单实现，供宿主和测试使用
//!
//! 同一个目标属性在一次震动期间只应有一个写入者，这一点靠约定保证，不加锁。

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::ConfigError;

/// 目标访问器接口
///
/// 震动器对目标只做两件事：开始时读取初始值，之后逐帧写入。
pub trait TargetAccessor {
    /// 读取当前值（作为本次震动的初始值）
    fn get_initial(&self) -> f64;

    /// 写入新值
    fn set_value(&mut self, value: f64);
}

/// 参数宿主接口
///
/// 对象通过实现此 trait 声明自己有哪些参数可以被震动。
pub trait ParameterHost {
    /// 获取参数的当前值
    ///
    /// # 返回
    /// - `Some(value)`: 参数存在
    /// - `None`: 参数不存在
    fn get_parameter(&self, name: &str) -> Option<f64>;

    /// 设置参数的新值
    ///
    /// # 返回
    /// - `true`: 设置成功
    /// - `false`: 参数不存在
    fn set_parameter(&self, name: &str, value: f64) -> bool;
}

/// 共享的单值访问器
///
/// 使用 `Rc<Cell<f64>>` 包装单个值，clone 出的副本指向同一个值。
#[derive(Debug, Clone, Default)]
pub struct SharedValue {
    value: Rc<Cell<f64>>,
}

impl SharedValue {
    /// 创建新的共享值
    pub fn new(initial_value: f64) -> Self {
        Self {
            value: Rc::new(Cell::new(initial_value)),
        }
    }

    /// 读取当前值
    pub fn get(&self) -> f64 {
        self.value.get()
    }

    /// 写入值
    pub fn set(&self, value: f64) {
        self.value.set(value);
    }
}

impl TargetAccessor for SharedValue {
    fn get_initial(&self) -> f64 {
        self.value.get()
    }

    fn set_value(&mut self, value: f64) {
        self.value.set(value);
    }
}

/// 命名参数表
///
/// 最简单的 [`ParameterHost`]：参数名到值的有序映射，用 `RefCell` 实现内部可变性。
#[derive(Debug, Default)]
pub struct ParameterTable {
    values: RefCell<BTreeMap<String, f64>>,
}

impl ParameterTable {
    /// 创建空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明参数（已存在则覆盖）
    pub fn insert(&self, name: impl Into<String>, value: f64) {
        self.values.borrow_mut().insert(name.into(), value);
    }

    /// 读取参数
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.borrow().get(name).copied()
    }

    /// 按名称排序的快照
    pub fn snapshot(&self) -> Vec<(String, f64)> {
        self.values
            .borrow()
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect()
    }

    /// 参数数量
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ParameterTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(entries: I) -> Self {
        let table = Self::new();
        for (name, value) in entries {
            table.insert(name, value);
        }
        table
    }
}

impl ParameterHost for ParameterTable {
    fn get_parameter(&self, name: &str) -> Option<f64> {
        self.get(name)
    }

    fn set_parameter(&self, name: &str, value: f64) -> bool {
        match self.values.borrow_mut().get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

/// 绑定到宿主属性的访问器
#[derive(Clone)]
pub struct PropertyTarget {
    host: Rc<dyn ParameterHost>,
    property: String,
}

impl std::fmt::Debug for PropertyTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyTarget")
            .field("property", &self.property)
            .finish()
    }
}

impl PropertyTarget {
    /// 绑定到宿主的指定属性
    ///
    /// 属性不存在属于配置错误，在绑定时立即返回，而不是在震动中静默失败。
    pub fn bind(
        host: Rc<dyn ParameterHost>,
        property: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let property = property.into();
        if host.get_parameter(&property).is_none() {
            return Err(ConfigError::PropertyNotFound { property });
        }
        Ok(Self { host, property })
    }

    /// 绑定的属性名
    pub fn property(&self) -> &str {
        &self.property
    }
}

impl TargetAccessor for PropertyTarget {
    fn get_initial(&self) -> f64 {
        // 绑定时已校验存在；宿主之后移除属性时退化为 0
        self.host.get_parameter(&self.property).unwrap_or_default()
    }

    fn set_value(&mut self, value: f64) {
        self.host.set_parameter(&self.property, value);
    }
}
