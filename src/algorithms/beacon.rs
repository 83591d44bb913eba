//! 蓝牙信标定义和相关数据结构

use crate::algorithms::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// iBeacon 身份标识：(UUID, Major, Minor)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BeaconId {
    pub uuid: String,
    pub major: u16,
    pub minor: u16,
}

impl BeaconId {
    pub fn new(uuid: impl Into<String>, major: u16, minor: u16) -> Self {
        BeaconId {
            uuid: uuid.into(),
            major,
            minor,
        }
    }
}

impl fmt::Display for BeaconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.uuid, self.major, self.minor)
    }
}

/// 单个参考信标（部署期间不可变）
#[derive(Clone, Debug, PartialEq)]
pub struct BeaconReference {
    /// 信标身份
    pub id: BeaconId,
    /// 信标友好名称
    pub name: String,
    /// 3D 坐标（米）
    pub position: Vec3,
    /// 1 米处的参考功率 (dBm)
    pub reference_power: i16,
}

impl BeaconReference {
    /// 创建新的信标
    pub fn new(
        id: BeaconId,
        name: impl Into<String>,
        position: Vec3,
        reference_power: i16,
    ) -> Self {
        BeaconReference {
            id,
            name: name.into(),
            position,
            reference_power,
        }
    }

    /// 计算与某一点的欧几里得距离
    pub fn distance_to(&self, point: &Vec3) -> f64 {
        (self.position - point).norm()
    }
}

/// 信标集合 - 按身份查找参考信标
#[derive(Clone, Debug, Default)]
pub struct BeaconSet {
    beacons: BTreeMap<BeaconId, BeaconReference>,
}

impl BeaconSet {
    /// 创建空的信标集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 从信标向量创建集合（同一身份以最后一个为准）
    pub fn from_vec(beacons: Vec<BeaconReference>) -> Self {
        let mut set = BeaconSet::new();
        for beacon in beacons {
            set.add_beacon(beacon);
        }
        set
    }

    /// 添加信标，返回被替换的旧信标
    pub fn add_beacon(&mut self, beacon: BeaconReference) -> Option<BeaconReference> {
        self.beacons.insert(beacon.id.clone(), beacon)
    }

    /// 获取信标
    pub fn get(&self, id: &BeaconId) -> Option<&BeaconReference> {
        self.beacons.get(id)
    }

    pub fn contains(&self, id: &BeaconId) -> bool {
        self.beacons.contains_key(id)
    }

    /// 获取信标数量
    pub fn len(&self) -> usize {
        self.beacons.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.beacons.is_empty()
    }

    /// 按身份顺序迭代信标
    pub fn iter(&self) -> impl Iterator<Item = &BeaconReference> {
        self.beacons.values()
    }
}

impl FromIterator<BeaconReference> for BeaconSet {
    fn from_iter<I: IntoIterator<Item = BeaconReference>>(iter: I) -> Self {
        BeaconSet::from_vec(iter.into_iter().collect())
    }
}
