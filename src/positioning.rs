//! 蓝牙室内定位流水线
//!
//! 每个扫描周期依次执行：
//! 收集观测 → RSSI 转距离 → 异常值过滤 → 信标数量检查 → 加权定位 → 卡尔曼平滑 → 输出
//!
//! 信标数量不足或定位失败时返回 [`CycleOutcome::InsufficientBeacons`]，
//! 滤波器状态保持不变，调用方可以继续显示上一次的结果。

use crate::algorithms::{
    BeaconSet, CycleOutcome, DEFAULT_MAX_DISTANCE, LocationResult, MIN_MEASUREMENTS,
    PathLossModel, RangeMeasurement, ScanBatch, TemporalSmoother, WeightedLocator,
    filter_outliers, rms_residual,
};
use crate::config::PositioningConfig;
use crate::error::ConfigResult;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// 定位流水线（单个跟踪目标）
///
/// 参考信标集合通过 `Arc` 共享，多个流水线实例可以并发读取同一集合；
/// 滤波器状态归本实例独占。
#[derive(Clone, Debug)]
pub struct PositioningPipeline {
    beacons: Arc<BeaconSet>,
    model: PathLossModel,
    max_outlier_distance: f64,
    min_beacons_required: usize,
    locator: WeightedLocator,
    smoother: TemporalSmoother,
}

impl PositioningPipeline {
    /// 使用默认参数创建流水线
    pub fn new(beacons: impl Into<Arc<BeaconSet>>) -> Self {
        PositioningPipeline {
            beacons: beacons.into(),
            model: PathLossModel::default(),
            max_outlier_distance: DEFAULT_MAX_DISTANCE,
            min_beacons_required: MIN_MEASUREMENTS,
            locator: WeightedLocator::default(),
            smoother: TemporalSmoother::default(),
        }
    }

    /// 从配置创建（先校验配置）
    pub fn from_config(config: &PositioningConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(PositioningPipeline::new(config.beacon_set())
            .with_environment_factor(config.environment_factor)
            .with_max_outlier_distance(config.max_outlier_distance)
            .with_min_beacons_required(config.min_beacons_required)
            .with_smoother(TemporalSmoother::new(
                config.process_variance,
                config.measurement_variance,
            )))
    }

    pub fn with_environment_factor(mut self, environment_factor: f64) -> Self {
        self.model = PathLossModel::new(environment_factor);
        self
    }

    pub fn with_max_outlier_distance(mut self, max_distance: f64) -> Self {
        self.max_outlier_distance = max_distance;
        self
    }

    /// 设置最少信标数，小于 3 时按 3 处理
    pub fn with_min_beacons_required(mut self, required: usize) -> Self {
        self.min_beacons_required = required.max(MIN_MEASUREMENTS);
        self
    }

    pub fn with_locator(mut self, locator: WeightedLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_smoother(mut self, smoother: TemporalSmoother) -> Self {
        self.smoother = smoother;
        self
    }

    /// 处理一个扫描周期的观测
    pub fn process(&mut self, batch: &ScanBatch) -> CycleOutcome {
        let measurements = self.convert(batch);
        trace!(
            observed = batch.len(),
            matched = measurements.len(),
            "RSSI 转距离完成"
        );
        self.process_measurements(&measurements)
    }

    /// 将观测转换为测距结果
    ///
    /// 未在参考集合中的信标被忽略。观测携带的参考功率优先于配置值。
    pub fn convert(&self, batch: &ScanBatch) -> Vec<RangeMeasurement> {
        batch
            .iter()
            .filter_map(|observation| {
                let beacon = self.beacons.get(&observation.beacon)?;
                let reference_power = observation.tx_power.unwrap_or(beacon.reference_power);
                let distance = self.model.rssi_to_distance(observation.rssi, reference_power);
                Some(
                    RangeMeasurement::new(beacon.position, distance)
                        .with_source(beacon.id.clone()),
                )
            })
            .collect()
    }

    /// 从异常值过滤开始处理已有的测距结果
    pub fn process_measurements(&mut self, measurements: &[RangeMeasurement]) -> CycleOutcome {
        let filtered = filter_outliers(measurements, self.max_outlier_distance);
        trace!(
            before = measurements.len(),
            after = filtered.len(),
            max_distance = self.max_outlier_distance,
            "异常值过滤完成"
        );

        let insufficient = CycleOutcome::InsufficientBeacons {
            count: filtered.len(),
            required: self.min_beacons_required,
        };

        if filtered.len() < self.min_beacons_required {
            debug!(
                count = filtered.len(),
                required = self.min_beacons_required,
                "信标数量不足，跳过本周期"
            );
            return insufficient;
        }

        let Some(raw_position) = self.locator.locate(&filtered, None) else {
            debug!(count = filtered.len(), "定位器无结果");
            return insufficient;
        };

        let position = self.smoother.update(raw_position);
        let residual = rms_residual(&filtered, &raw_position);

        let beacon_distances: BTreeMap<_, _> = filtered
            .iter()
            .filter_map(|m| m.source.clone().map(|id| (id, m.distance)))
            .collect();

        debug!(
            x = position.x,
            y = position.y,
            z = position.z,
            beacons = filtered.len(),
            residual,
            "估算位置"
        );

        CycleOutcome::Emitted(LocationResult::new(
            position,
            raw_position,
            beacon_distances,
            filtered.len(),
            residual,
        ))
    }

    /// 清空滤波器状态
    pub fn reset(&mut self) {
        self.smoother.reset();
    }

    /// 替换参考信标集合，同时清空滤波器状态
    pub fn reconfigure(&mut self, beacons: impl Into<Arc<BeaconSet>>) {
        self.beacons = beacons.into();
        self.smoother.reset();
    }

    pub fn beacons(&self) -> &Arc<BeaconSet> {
        &self.beacons
    }

    pub fn smoother(&self) -> &TemporalSmoother {
        &self.smoother
    }

    pub fn min_beacons_required(&self) -> usize {
        self.min_beacons_required
    }

    pub fn max_outlier_distance(&self) -> f64 {
        self.max_outlier_distance
    }

    pub fn environment_factor(&self) -> f64 {
        self.model.environment_factor
    }
}
