//! 定位算法模块
//!
//! 该模块提供室内 3D 定位的各个环节：
//! - RSSI 转距离（对数距离路径损耗模型）
//! - 异常距离过滤
//! - 加权非线性最小二乘定位
//! - 卡尔曼滤波平滑

pub mod beacon;
pub mod kalman;
pub mod location_algorithms;
pub mod observation;
pub mod outlier;
pub mod results;
pub mod rssi_model;
pub mod simplex;

pub use beacon::*;
pub use kalman::*;
pub use location_algorithms::*;
pub use observation::*;
pub use outlier::*;
pub use results::*;
pub use rssi_model::*;

/// 3D 坐标向量（米）
pub type Vec3 = nalgebra::Vector3<f64>;
