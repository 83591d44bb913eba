//! 配置错误类型

use crate::algorithms::BeaconId;
use thiserror::Error;

/// 配置解析与校验错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("min_beacons_required 至少为 3，当前为 {required}")]
    TooFewBeaconsRequired { required: usize },

    #[error("参数 {field} 必须为正的有限值，当前为 {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("信标 {0} 重复配置")]
    DuplicateBeacon(BeaconId),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
