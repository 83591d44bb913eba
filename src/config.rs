//! 定位系统配置
//!
//! JSON 格式与部署使用的信标配置表一致:
//!
//! ```json
//! {
//!   "environment_factor": 2.5,
//!   "beacons": [
//!     { "uuid": "FDA50693-A4E2-4FB1-AFCF-C6EB07647825", "major": 1, "minor": 1,
//!       "name": "Beacon-1", "position": [0.0, 0.0, 2.5] }
//!   ]
//! }
//! ```

use crate::algorithms::{
    BeaconId, BeaconReference, BeaconSet, DEFAULT_ENVIRONMENT_FACTOR, DEFAULT_MAX_DISTANCE,
    DEFAULT_MEASUREMENT_VARIANCE, DEFAULT_PROCESS_VARIANCE, MIN_MEASUREMENTS, Vec3,
};
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// iBeacon 默认 1 米参考功率 (dBm)
pub const DEFAULT_REFERENCE_POWER: i16 = -59;

/// 配置表中的单个信标
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeaconConfig {
    pub uuid: String,
    pub major: u16,
    pub minor: u16,
    #[serde(default)]
    pub name: String,
    /// [x, y, z]（米）
    pub position: [f64; 3],
    #[serde(default = "default_reference_power")]
    pub reference_power: i16,
}

impl BeaconConfig {
    pub fn id(&self) -> BeaconId {
        BeaconId::new(self.uuid.clone(), self.major, self.minor)
    }

    pub fn to_reference(&self) -> BeaconReference {
        let [x, y, z] = self.position;
        BeaconReference::new(self.id(), self.name.clone(), Vec3::new(x, y, z), self.reference_power)
    }
}

/// 定位流水线参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositioningConfig {
    /// 环境衰减因子 n
    pub environment_factor: f64,
    /// 异常距离上限（米）
    pub max_outlier_distance: f64,
    /// 定位所需最少信标数（不小于 3）
    pub min_beacons_required: usize,
    /// 卡尔曼过程噪声方差
    pub process_variance: f64,
    /// 卡尔曼测量噪声方差
    pub measurement_variance: f64,
    /// 扫描周期（秒）
    pub scan_interval_secs: f64,
    /// 信标配置表
    pub beacons: Vec<BeaconConfig>,
}

impl Default for PositioningConfig {
    fn default() -> Self {
        PositioningConfig {
            environment_factor: DEFAULT_ENVIRONMENT_FACTOR,
            max_outlier_distance: DEFAULT_MAX_DISTANCE,
            min_beacons_required: MIN_MEASUREMENTS,
            process_variance: DEFAULT_PROCESS_VARIANCE,
            measurement_variance: DEFAULT_MEASUREMENT_VARIANCE,
            scan_interval_secs: 1.0,
            beacons: Vec::new(),
        }
    }
}

impl PositioningConfig {
    /// 从 JSON 文本解析并校验
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: PositioningConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验参数
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_beacons_required < MIN_MEASUREMENTS {
            return Err(ConfigError::TooFewBeaconsRequired {
                required: self.min_beacons_required,
            });
        }

        let positive = [
            ("environment_factor", self.environment_factor),
            ("max_outlier_distance", self.max_outlier_distance),
            ("process_variance", self.process_variance),
            ("measurement_variance", self.measurement_variance),
            ("scan_interval_secs", self.scan_interval_secs),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let mut seen = BTreeSet::new();
        for beacon in &self.beacons {
            let id = beacon.id();
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateBeacon(id));
            }
        }

        Ok(())
    }

    /// 生成参考信标集合
    pub fn beacon_set(&self) -> BeaconSet {
        self.beacons.iter().map(BeaconConfig::to_reference).collect()
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs_f64(self.scan_interval_secs)
    }
}

fn default_reference_power() -> i16 {
    DEFAULT_REFERENCE_POWER
}
