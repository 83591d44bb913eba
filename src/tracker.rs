//! 实时定位循环
//!
//! 扫描层通过 [`ScanSource`] 按周期提供观测，[`PositionTracker`] 把每批观测交给
//! 定位流水线，并通过 mpsc 通道输出每个周期的结果。流水线放在一个
//! `tokio::sync::Mutex` 后面，多个生产者时由它保证同一时刻只有一个周期在处理。

use crate::algorithms::{BeaconSet, CycleOutcome, ScanBatch};
use crate::config::PositioningConfig;
use crate::error::ConfigResult;
use crate::positioning::PositioningPipeline;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};

/// 两个周期之间的默认间隔
pub const DEFAULT_CYCLE_PAUSE: Duration = Duration::from_millis(100);

/// 观测来源（扫描层）
pub trait ScanSource {
    /// 下一批观测；返回 None 表示扫描结束
    fn next_batch(&mut self) -> impl Future<Output = Option<ScanBatch>> + Send;
}

/// 实时定位器
#[derive(Clone)]
pub struct PositionTracker {
    pipeline: Arc<Mutex<PositioningPipeline>>,
    cycle_pause: Duration,
}

impl PositionTracker {
    pub fn new(pipeline: PositioningPipeline) -> Self {
        PositionTracker {
            pipeline: Arc::new(Mutex::new(pipeline)),
            cycle_pause: DEFAULT_CYCLE_PAUSE,
        }
    }

    pub fn from_config(config: &PositioningConfig) -> ConfigResult<Self> {
        Ok(PositionTracker::new(PositioningPipeline::from_config(config)?))
    }

    pub fn with_cycle_pause(mut self, pause: Duration) -> Self {
        self.cycle_pause = pause;
        self
    }

    /// 共享的流水线句柄
    pub fn pipeline(&self) -> Arc<Mutex<PositioningPipeline>> {
        Arc::clone(&self.pipeline)
    }

    /// 处理单个周期
    pub async fn process_batch(&self, batch: &ScanBatch) -> CycleOutcome {
        let mut pipeline = self.pipeline.lock().await;
        pipeline.process(batch)
    }

    /// 清空滤波器状态
    pub async fn reset(&self) {
        self.pipeline.lock().await.reset();
    }

    /// 替换参考信标集合（同时清空滤波器状态）
    pub async fn reconfigure(&self, beacons: BeaconSet) {
        self.pipeline.lock().await.reconfigure(beacons);
    }

    /// 持续处理扫描结果，直到扫描源结束或接收端关闭
    ///
    /// 返回处理的周期数。
    pub async fn run<S>(&self, mut source: S, tx: mpsc::Sender<CycleOutcome>) -> usize
    where
        S: ScanSource,
    {
        debug!("定位循环启动");
        let mut cycles = 0;

        loop {
            let Some(batch) = source.next_batch().await else {
                debug!(cycles, "扫描源已结束");
                break;
            };

            let outcome = self.process_batch(&batch).await;
            cycles += 1;

            if tx.send(outcome).await.is_err() {
                warn!(cycles, "结果接收端已关闭，停止定位循环");
                break;
            }

            if !self.cycle_pause.is_zero() {
                sleep(self.cycle_pause).await;
            }
        }

        cycles
    }
}

/// 固定批次序列，按顺序逐批返回
#[derive(Clone, Debug, Default)]
pub struct ReplaySource {
    batches: VecDeque<ScanBatch>,
}

impl ReplaySource {
    pub fn new(batches: Vec<ScanBatch>) -> Self {
        ReplaySource {
            batches: batches.into(),
        }
    }
}

impl ScanSource for ReplaySource {
    async fn next_batch(&mut self) -> Option<ScanBatch> {
        self.batches.pop_front()
    }
}
