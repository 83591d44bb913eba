//! 加权多边定位
//!
//! 初始值使用距离倒数加权的信标坐标平均，随后用 Nelder-Mead 单纯形法
//! 最小化加权距离残差平方和:
//!
//! E(p) = Σ w_i * (‖p - b_i‖ - d_i)²,  w_i = 1 / (d_i + 0.5)
//!
//! 共面或共线的信标布局下目标函数非凸，不同最小化方法可能收敛到不同的局部极小值。

use crate::algorithms::simplex::{self, SimplexOptions};
use crate::algorithms::{RangeMeasurement, Vec3};
use tracing::trace;

/// 3D 定位所需的最少测量数
pub const MIN_MEASUREMENTS: usize = 3;

/// 初始估计权重的防除零常数: w = 1 / (d + 0.1)
pub const CENTROID_STABILIZER: f64 = 0.1;

/// 目标函数权重的防除零常数: w = 1 / (d + 0.5)
pub const OBJECTIVE_STABILIZER: f64 = 0.5;

/// 定位器的详细输出
#[derive(Clone, Debug, PartialEq)]
pub struct LocatorFix {
    /// 最优位置
    pub position: Vec3,
    /// 最优位置处的加权残差平方和
    pub objective: f64,
    /// 单纯形迭代次数
    pub iterations: usize,
    /// 是否在迭代上限前收敛
    pub converged: bool,
}

/// 加权非线性最小二乘定位器
#[derive(Clone, Debug, Default)]
pub struct WeightedLocator {
    pub options: SimplexOptions,
}

impl WeightedLocator {
    pub fn new(options: SimplexOptions) -> Self {
        WeightedLocator { options }
    }

    /// 计算位置，测量不足 3 个时返回 None
    ///
    /// 未提供 `initial_guess` 时使用 [`weighted_centroid`] 作为起点。
    pub fn locate(
        &self,
        measurements: &[RangeMeasurement],
        initial_guess: Option<Vec3>,
    ) -> Option<Vec3> {
        self.locate_detailed(measurements, initial_guess)
            .map(|fix| fix.position)
    }

    /// 与 [`locate`](Self::locate) 相同，但附带迭代信息
    pub fn locate_detailed(
        &self,
        measurements: &[RangeMeasurement],
        initial_guess: Option<Vec3>,
    ) -> Option<LocatorFix> {
        if measurements.len() < MIN_MEASUREMENTS {
            return None;
        }

        let start = initial_guess.or_else(|| weighted_centroid(measurements))?;
        let result = simplex::minimize(
            |p| weighted_objective(measurements, p),
            start,
            &self.options,
        );

        trace!(
            iterations = result.iterations,
            converged = result.converged,
            objective = result.value,
            "单纯形迭代结束"
        );

        Some(LocatorFix {
            position: result.point,
            objective: result.value,
            iterations: result.iterations,
            converged: result.converged,
        })
    }
}

/// 距离倒数加权的信标坐标平均（距离越近权重越大）
///
/// 权重和不可用时退化为普通平均；空输入返回 None。
pub fn weighted_centroid(measurements: &[RangeMeasurement]) -> Option<Vec3> {
    if measurements.is_empty() {
        return None;
    }

    let weights: Vec<f64> = measurements
        .iter()
        .map(|m| 1.0 / (m.distance + CENTROID_STABILIZER))
        .collect();
    let total: f64 = weights.iter().sum();

    if !total.is_finite() || total == 0.0 {
        let sum = measurements
            .iter()
            .fold(Vec3::zeros(), |acc, m| acc + m.position);
        return Some(sum / measurements.len() as f64);
    }

    Some(
        measurements
            .iter()
            .zip(&weights)
            .fold(Vec3::zeros(), |acc, (m, w)| acc + m.position * (w / total)),
    )
}

/// 加权距离残差平方和
pub fn weighted_objective(measurements: &[RangeMeasurement], point: &Vec3) -> f64 {
    measurements
        .iter()
        .map(|m| {
            let weight = 1.0 / (m.distance + OBJECTIVE_STABILIZER);
            let residual = (point - m.position).norm() - m.distance;
            weight * residual * residual
        })
        .sum()
}

/// 距离残差的均方根（未加权）
pub fn rms_residual(measurements: &[RangeMeasurement], point: &Vec3) -> f64 {
    if measurements.is_empty() {
        return 0.0;
    }

    let sum: f64 = measurements
        .iter()
        .map(|m| {
            let residual = (point - m.position).norm() - m.distance;
            residual * residual
        })
        .sum();
    (sum / measurements.len() as f64).sqrt()
}
