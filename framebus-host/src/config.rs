//! 宿主配置
//!
use bon::Builder;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// 帧循环落后时的追帧策略（对应 tokio 的 `MissedTickBehavior`）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissedFrames {
    /// 跳过错过的帧，按原节奏对齐
    #[default]
    Skip,
    /// 尽快补齐错过的帧
    Burst,
    /// 从当前时刻重新计时
    Delay,
}

impl From<MissedFrames> for MissedTickBehavior {
    fn from(value: MissedFrames) -> Self {
        match value {
            MissedFrames::Skip => MissedTickBehavior::Skip,
            MissedFrames::Burst => MissedTickBehavior::Burst,
            MissedFrames::Delay => MissedTickBehavior::Delay,
        }
    }
}

/// 宿主配置
#[derive(Clone, Debug, Builder)]
pub struct HostConfig {
    /// 帧间隔，默认约 60 帧/秒
    #[builder(default = Duration::from_millis(16))]
    pub frame_interval: Duration,
    #[builder(default)]
    pub missed_frames: MissedFrames,
    /// 总线名称（日志字段）
    #[builder(into, default = String::from("framebus"))]
    pub bus_name: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
