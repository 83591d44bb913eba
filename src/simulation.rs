//! 模拟信标扫描（用于测试）
//!
//! 在没有真实信标的情况下，根据已知的真实位置生成带噪声的 RSSI 观测。

use crate::algorithms::{
    BeaconId, BeaconReference, BeaconSet, Observation, PathLossModel, ScanBatch, Vec3,
};
use crate::config::DEFAULT_REFERENCE_POWER;
use crate::tracker::ScanSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// 距离噪声标准差（米）
pub const DISTANCE_NOISE_STD: f64 = 0.2;

/// RSSI 噪声标准差 (dBm)
pub const RSSI_NOISE_STD: f64 = 2.0;

/// 模拟时的最小距离，避免 log10(0)
const MIN_DISTANCE: f64 = 0.1;

/// 模拟信标使用的 UUID
pub const SIMULATED_UUID: &str = "FDA50693-A4E2-4FB1-AFCF-C6EB07647825";

/// 噪声参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseModel {
    pub distance_std: f64,
    pub rssi_std: f64,
}

impl Default for NoiseModel {
    fn default() -> Self {
        NoiseModel {
            distance_std: DISTANCE_NOISE_STD,
            rssi_std: RSSI_NOISE_STD,
        }
    }
}

/// 圆形轨迹
#[derive(Clone, Debug, PartialEq)]
pub struct CircularPath {
    pub center: Vec3,
    pub radius: f64,
    /// 每个周期的相位增量（弧度）
    pub step: f64,
    phase: f64,
}

impl CircularPath {
    pub fn new(center: Vec3, radius: f64, step: f64) -> Self {
        CircularPath {
            center,
            radius,
            step,
            phase: 0.0,
        }
    }

    /// 当前相位的位置，随后前进一步
    pub fn next_position(&mut self) -> Vec3 {
        let position = self.center
            + Vec3::new(self.radius * self.phase.cos(), self.radius * self.phase.sin(), 0.0);
        self.phase += self.step;
        position
    }
}

impl Default for CircularPath {
    fn default() -> Self {
        CircularPath::new(Vec3::new(2.5, 2.5, 1.5), 1.5, 0.1)
    }
}

/// 模拟扫描器
pub struct SimulatedScanner {
    beacons: Vec<BeaconReference>,
    model: PathLossModel,
    noise: Option<NoiseModel>,
    path: CircularPath,
    rng: StdRng,
    remaining: usize,
    last_truth: Option<Vec3>,
}

impl SimulatedScanner {
    pub fn new(beacons: Vec<BeaconReference>, model: PathLossModel, seed: u64) -> Self {
        SimulatedScanner {
            beacons,
            model,
            noise: Some(NoiseModel::default()),
            path: CircularPath::default(),
            rng: StdRng::seed_from_u64(seed),
            remaining: usize::MAX,
            last_truth: None,
        }
    }

    /// 5m x 5m 房间，四个角各一个信标，高度 2.5m
    pub fn square_room(seed: u64) -> Self {
        let corners = [
            Vec3::new(0.0, 0.0, 2.5),
            Vec3::new(5.0, 0.0, 2.5),
            Vec3::new(5.0, 5.0, 2.5),
            Vec3::new(0.0, 5.0, 2.5),
        ];
        let beacons = corners
            .into_iter()
            .zip(1u16..)
            .map(|(position, minor)| {
                BeaconReference::new(
                    BeaconId::new(SIMULATED_UUID, 1, minor),
                    format!("Beacon-{}", minor),
                    position,
                    DEFAULT_REFERENCE_POWER,
                )
            })
            .collect();
        SimulatedScanner::new(beacons, PathLossModel::default(), seed)
    }

    pub fn with_noise(mut self, noise: Option<NoiseModel>) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_path(mut self, path: CircularPath) -> Self {
        self.path = path;
        self
    }

    /// 限制周期数
    pub fn with_cycles(mut self, cycles: usize) -> Self {
        self.remaining = cycles;
        self
    }

    /// 模拟信标对应的参考集合
    pub fn beacon_set(&self) -> BeaconSet {
        self.beacons.iter().cloned().collect()
    }

    /// 最近一次生成的真实位置
    pub fn last_truth(&self) -> Option<Vec3> {
        self.last_truth
    }

    /// 计算某一位置处的 RSSI
    pub fn rssi_at(&mut self, beacon: &BeaconReference, truth: &Vec3) -> i16 {
        let mut distance = beacon.distance_to(truth);
        if let Some(noise) = self.noise {
            distance += noise.distance_std * self.rng.sample::<f64, _>(StandardNormal);
        }
        let distance = distance.max(MIN_DISTANCE);

        let mut rssi = self.model.distance_to_rssi(distance, beacon.reference_power);
        if let Some(noise) = self.noise {
            rssi += noise.rssi_std * self.rng.sample::<f64, _>(StandardNormal);
        }
        rssi as i16
    }

    /// 在给定位置扫描所有信标
    pub fn scan_at(&mut self, truth: &Vec3) -> ScanBatch {
        let beacons = self.beacons.clone();
        beacons
            .iter()
            .map(|beacon| {
                let rssi = self.rssi_at(beacon, truth);
                Observation::with_tx_power(beacon.id.clone(), rssi, beacon.reference_power)
            })
            .collect()
    }

    /// 沿轨迹前进一步并扫描，周期用尽时返回 None
    pub fn next_cycle(&mut self) -> Option<(Vec3, ScanBatch)> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let truth = self.path.next_position();
        self.last_truth = Some(truth);
        Some((truth, self.scan_at(&truth)))
    }
}

impl ScanSource for SimulatedScanner {
    async fn next_batch(&mut self) -> Option<ScanBatch> {
        self.next_cycle().map(|(_, batch)| batch)
    }
}
