//! 单次扫描周期内的信号观测

use crate::algorithms::BeaconId;
use serde::{Deserialize, Serialize};

/// 单个信标的信号观测
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// 信标身份
    pub beacon: BeaconId,
    /// RSSI 值 (dBm)
    pub rssi: i16,
    /// 广播中携带的 1 米参考功率；缺省时使用信标配置值
    #[serde(default)]
    pub tx_power: Option<i16>,
}

impl Observation {
    pub fn new(beacon: BeaconId, rssi: i16) -> Self {
        Observation {
            beacon,
            rssi,
            tx_power: None,
        }
    }

    pub fn with_tx_power(beacon: BeaconId, rssi: i16, tx_power: i16) -> Self {
        Observation {
            beacon,
            rssi,
            tx_power: Some(tx_power),
        }
    }
}

/// 一个扫描周期的观测集合
///
/// 每个信标只保留一条：重复出现时以最后一条为准，位置保持首次出现的顺序。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanBatch {
    observations: Vec<Observation>,
}

impl ScanBatch {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 从观测向量创建
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut batch = ScanBatch::new();
        for observation in observations {
            batch.add(observation);
        }
        batch
    }

    /// 添加观测
    pub fn add(&mut self, observation: Observation) {
        match self
            .observations
            .iter_mut()
            .find(|o| o.beacon == observation.beacon)
        {
            Some(existing) => *existing = observation,
            None => self.observations.push(observation),
        }
    }

    /// 获取某信标的观测
    pub fn get(&self, beacon: &BeaconId) -> Option<&Observation> {
        self.observations.iter().find(|o| &o.beacon == beacon)
    }

    /// 观测数量
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }
}

impl From<Vec<Observation>> for ScanBatch {
    fn from(observations: Vec<Observation>) -> Self {
        ScanBatch::from_observations(observations)
    }
}

impl FromIterator<Observation> for ScanBatch {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        let mut batch = ScanBatch::new();
        for observation in iter {
            batch.add(observation);
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(minor: u16) -> BeaconId {
        BeaconId::new("UUID", 1, minor)
    }

    #[test]
    fn test_last_observation_wins() {
        let batch = ScanBatch::from_observations(vec![
            Observation::new(id(1), -60),
            Observation::new(id(2), -70),
            Observation::new(id(1), -65),
        ]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.get(&id(1)).map(|o| o.rssi), Some(-65));

        // 首次出现的顺序不变
        let order: Vec<u16> = batch.iter().map(|o| o.beacon.minor).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn test_observation_json() {
        let json = r#"{"beacon":{"uuid":"UUID","major":1,"minor":3},"rssi":-72}"#;
        let observation: Observation = serde_json::from_str(json).unwrap();
        assert_eq!(observation, Observation::new(id(3), -72));
    }
}
