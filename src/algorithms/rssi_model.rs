//! RSSI 到距离转换模型
//!
//! 对数距离路径损耗模型: RSSI(d) = P_ref - 10 * n * log10(d)

use serde::{Deserialize, Serialize};
use std::fmt;

/// 无效距离标记（RSSI 恰好为 0 时返回）
pub const INVALID_DISTANCE: f64 = -1.0;

/// 默认环境衰减因子（室内）
pub const DEFAULT_ENVIRONMENT_FACTOR: f64 = 2.5;

/// 根据 RSSI 估算距离（米）
///
/// 反解对数距离模型: d = 10^((P_ref - RSSI) / (10 * n))
///
/// RSSI 为 0 表示无效读数，返回 [`INVALID_DISTANCE`]。结果不做任何截断，
/// 接近参考功率的读数可能略大于或小于 1 米。
pub fn estimate_distance(
    signal_strength: i16,
    reference_power: i16,
    environment_factor: f64,
) -> f64 {
    if signal_strength == 0 {
        return INVALID_DISTANCE;
    }

    let ratio = (reference_power as f64 - signal_strength as f64) / (10.0 * environment_factor);
    10_f64.powf(ratio)
}

/// 绑定环境衰减因子的路径损耗模型
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathLossModel {
    /// 路径损耗指数 n（通常 2.0 ~ 3.5）
    pub environment_factor: f64,
}

impl PathLossModel {
    pub fn new(environment_factor: f64) -> Self {
        PathLossModel { environment_factor }
    }

    /// 根据 RSSI 计算距离
    pub fn rssi_to_distance(&self, rssi: i16, reference_power: i16) -> f64 {
        estimate_distance(rssi, reference_power, self.environment_factor)
    }

    /// 根据距离计算 RSSI（正向模型）
    pub fn distance_to_rssi(&self, distance: f64, reference_power: i16) -> f64 {
        if distance <= 0.0 {
            return f64::NEG_INFINITY;
        }
        reference_power as f64 - 10.0 * self.environment_factor * distance.log10()
    }

    /// 获取模型描述
    pub fn description(&self) -> String {
        format!("对数距离路径损耗模型 - n={:.2}", self.environment_factor)
    }
}

impl Default for PathLossModel {
    fn default() -> Self {
        PathLossModel::new(DEFAULT_ENVIRONMENT_FACTOR)
    }
}

impl fmt::Display for PathLossModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}
