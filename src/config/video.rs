use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 畫面更新時機
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentPolicy {
    /// 每次繪圖呼叫後立即更新
    EveryCall,
    /// 距離上次更新超過間隔才更新
    Throttled { interval_ms: u64 },
    /// 只在明確呼叫 present() 時更新
    Manual,
}

impl PresentPolicy {
    pub fn interval(&self) -> Option<Duration> {
        match self {
            PresentPolicy::Throttled { interval_ms } => Some(Duration::from_millis(*interval_ms)),
            _ => None,
        }
    }
}

/// 顯示相關配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    pub title: String,
    pub scale: u32,
    pub background: usize,
    pub present: PresentPolicy,
}

impl VideoConfig {
    pub const SUPPORTED_SCALES: [u32; 4] = [1, 2, 4, 8];
}

impl Default for VideoConfig {
    fn default() -> Self {
        VideoConfig {
            title: "VGA 320x200".to_string(),
            scale: 2,
            background: 0,
            // 約 60 Hz
            present: PresentPolicy::Throttled { interval_ms: 16 },
        }
    }
}
