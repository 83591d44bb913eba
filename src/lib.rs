//! 蓝牙信标室内 3D 定位
//!
//! 由扫描层提供每个周期的 RSSI 观测，经过 RSSI 转距离、异常值过滤、
//! 加权多边定位和卡尔曼平滑，输出平滑后的 3D 坐标。

pub mod algorithms;
pub mod config;
pub mod error;
pub mod positioning;
pub mod simulation;
pub mod tracker;

pub use algorithms::{
    BeaconId, BeaconReference, BeaconSet, CycleOutcome, LocationResult, Observation,
    RangeMeasurement, ScanBatch, TemporalSmoother, Vec3, WeightedLocator,
};
pub use config::PositioningConfig;
pub use error::ConfigError;
pub use positioning::PositioningPipeline;
pub use tracker::{PositionTracker, ScanSource};
