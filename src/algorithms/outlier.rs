//! 距离测量与异常值过滤

use crate::algorithms::{BeaconId, Vec3};

/// 默认最大合理距离（米）
pub const DEFAULT_MAX_DISTANCE: f64 = 50.0;

/// 单个测距结果：信标位置 + 估算距离
#[derive(Clone, Debug, PartialEq)]
pub struct RangeMeasurement {
    /// 信标 3D 坐标（米）
    pub position: Vec3,
    /// 估算距离（米），负数表示无效
    pub distance: f64,
    /// 来源信标（可选，仅用于结果展示）
    pub source: Option<BeaconId>,
}

impl RangeMeasurement {
    pub fn new(position: Vec3, distance: f64) -> Self {
        RangeMeasurement {
            position,
            distance,
            source: None,
        }
    }

    pub fn with_source(mut self, source: BeaconId) -> Self {
        self.source = Some(source);
        self
    }

    /// 距离是否在 (0, max_distance) 开区间内
    pub fn is_plausible(&self, max_distance: f64) -> bool {
        self.distance > 0.0 && self.distance < max_distance
    }
}

/// 过滤异常距离值
///
/// 仅保留 `0 < distance < max_distance` 的测量，保持原有顺序。
pub fn filter_outliers(
    measurements: &[RangeMeasurement],
    max_distance: f64,
) -> Vec<RangeMeasurement> {
    measurements
        .iter()
        .filter(|m| m.is_plausible(max_distance))
        .cloned()
        .collect()
}
