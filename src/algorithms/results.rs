//! 定位结果数据结构
//!
//! 包含每个扫描周期的输出和元数据

use crate::algorithms::{BeaconId, Vec3};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// 单周期定位结果
#[derive(Clone, Debug, PartialEq)]
pub struct LocationResult {
    /// 平滑后的位置（米）
    pub position: Vec3,
    /// 定位器原始输出（未平滑）
    pub raw_position: Vec3,
    /// 参与定位的各信标距离（米）
    pub beacon_distances: BTreeMap<BeaconId, f64>,
    /// 参与定位的测量数量
    pub beacon_count: usize,
    /// 原始位置的距离残差均方根（米）
    pub residual: f64,
    /// 时间戳
    pub timestamp: DateTime<Utc>,
}

impl LocationResult {
    /// 创建新的定位结果
    pub fn new(
        position: Vec3,
        raw_position: Vec3,
        beacon_distances: BTreeMap<BeaconId, f64>,
        beacon_count: usize,
        residual: f64,
    ) -> Self {
        LocationResult {
            position,
            raw_position,
            beacon_distances,
            beacon_count,
            residual,
            timestamp: Utc::now(),
        }
    }

    /// 获取 3D 坐标
    pub fn xyz(&self) -> (f64, f64, f64) {
        (self.position.x, self.position.y, self.position.z)
    }

    /// 与某一点的欧几里得距离
    pub fn distance_to(&self, point: &Vec3) -> f64 {
        (self.position - point).norm()
    }
}

impl fmt::Display for LocationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X={:.2}m, Y={:.2}m, Z={:.2}m [{} 个信标, 残差 {:.2}m]",
            self.position.x,
            self.position.y,
            self.position.z,
            self.beacon_count,
            self.residual
        )
    }
}

/// 单个扫描周期的输出
#[derive(Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    /// 定位成功
    Emitted(LocationResult),
    /// 可用信标不足，本周期无定位结果（滤波器状态未改变）
    InsufficientBeacons { count: usize, required: usize },
}

impl CycleOutcome {
    /// 成功时返回定位结果
    pub fn location(&self) -> Option<&LocationResult> {
        match self {
            CycleOutcome::Emitted(result) => Some(result),
            CycleOutcome::InsufficientBeacons { .. } => None,
        }
    }

    pub fn is_emitted(&self) -> bool {
        matches!(self, CycleOutcome::Emitted(_))
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Emitted(result) => write!(f, "{}", result),
            CycleOutcome::InsufficientBeacons { count, required } => {
                write!(f, "信标数量不足 ({}/{})，无法定位", count, required)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> LocationResult {
        let mut distances = BTreeMap::new();
        distances.insert(BeaconId::new("U", 1, 1), 2.0);
        distances.insert(BeaconId::new("U", 1, 2), 3.0);
        distances.insert(BeaconId::new("U", 1, 3), 4.0);
        LocationResult::new(
            Vec3::new(1.0, 2.0, 1.5),
            Vec3::new(1.1, 2.1, 1.4),
            distances,
            3,
            0.05,
        )
    }

    #[test]
    fn test_location_result() {
        let r = result();
        assert_eq!(r.beacon_count, 3);
        assert_eq!(r.xyz(), (1.0, 2.0, 1.5));
        assert_eq!(r.distance_to(&Vec3::new(4.0, 6.0, 1.5)), 5.0);
        assert_eq!(r.to_string(), "X=1.00m, Y=2.00m, Z=1.50m [3 个信标, 残差 0.05m]");
    }

    #[test]
    fn test_cycle_outcome() {
        let emitted = CycleOutcome::Emitted(result());
        assert!(emitted.is_emitted());
        assert!(emitted.location().is_some());

        let insufficient = CycleOutcome::InsufficientBeacons {
            count: 2,
            required: 3,
        };
        assert!(!insufficient.is_emitted());
        assert!(insufficient.location().is_none());
        assert_eq!(insufficient.to_string(), "信标数量不足 (2/3)，无法定位");
    }
}
