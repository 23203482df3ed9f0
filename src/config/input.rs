use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 滑鼠游標外觀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorKind {
    None,
    Cross,
    Pointer,
}

/// 輸入相關配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub cursor: CursorKind,
    /// 阻塞式滑鼠更新的等待上限，None 表示無限等待
    pub mouse_wait_timeout_ms: Option<u64>,
}

impl InputConfig {
    pub fn mouse_wait_timeout(&self) -> Option<Duration> {
        self.mouse_wait_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            cursor: CursorKind::None,
            mouse_wait_timeout_ms: None,
        }
    }
}
