//! 3D 卡尔曼滤波器 - 用于平滑定位结果的时间序列
//!
//! 三个坐标轴相互独立，共用同一标量过程/测量噪声，无速度状态。

use crate::algorithms::Vec3;
use nalgebra::Matrix3;

/// 默认过程噪声方差
pub const DEFAULT_PROCESS_VARIANCE: f64 = 1e-3;

/// 默认测量噪声方差
pub const DEFAULT_MEASUREMENT_VARIANCE: f64 = 1.5;

/// 位置平滑滤波器
#[derive(Clone, Debug)]
pub struct TemporalSmoother {
    process_variance: f64,
    measurement_variance: f64,
    estimated_position: Option<Vec3>,
    estimation_error: Matrix3<f64>,
}

impl TemporalSmoother {
    /// 创建新的滤波器
    pub fn new(process_variance: f64, measurement_variance: f64) -> Self {
        TemporalSmoother {
            process_variance,
            measurement_variance,
            estimated_position: None,
            estimation_error: Matrix3::identity(),
        }
    }

    /// 更新滤波器并返回平滑后的位置
    ///
    /// 第一次调用直接采用测量值，协方差保持初始值。
    pub fn update(&mut self, measured_position: Vec3) -> Vec3 {
        let Some(estimate) = self.estimated_position else {
            self.estimated_position = Some(measured_position);
            return measured_position;
        };

        // 预测
        let predicted_error =
            self.estimation_error + Matrix3::identity() * self.process_variance;

        // 卡尔曼增益
        let innovation_cov = predicted_error + Matrix3::identity() * self.measurement_variance;
        let gain = match innovation_cov.try_inverse() {
            Some(inverse) => predicted_error * inverse,
            // 奇异时完全采用测量值
            None => Matrix3::identity(),
        };

        // 更新
        let updated = estimate + gain * (measured_position - estimate);
        self.estimation_error = (Matrix3::identity() - gain) * predicted_error;
        self.estimated_position = Some(updated);

        updated
    }

    /// 当前估计位置（尚未收到测量时为 None）
    pub fn estimate(&self) -> Option<Vec3> {
        self.estimated_position
    }

    /// 当前估计误差协方差
    pub fn estimation_error(&self) -> &Matrix3<f64> {
        &self.estimation_error
    }

    pub fn process_variance(&self) -> f64 {
        self.process_variance
    }

    pub fn measurement_variance(&self) -> f64 {
        self.measurement_variance
    }

    /// 清空状态，回到未初始化
    pub fn reset(&mut self) {
        self.estimated_position = None;
        self.estimation_error = Matrix3::identity();
    }
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        TemporalSmoother::new(DEFAULT_PROCESS_VARIANCE, DEFAULT_MEASUREMENT_VARIANCE)
    }
}
