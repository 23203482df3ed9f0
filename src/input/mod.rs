/*
================================================================================
VGA - 輸入輪詢模組
================================================================================
鍵盤與滑鼠都只保留最新值，沒有事件佇列

功能：
- 鍵盤：取出自上次輪詢以來最新的按鍵，讀取後即清除
- 滑鼠：Uninitialized → Ready 狀態機，mouse_init 之前一律拒絕
- 按鈕按下/放開次數統計
================================================================================
*/

pub mod key;

pub use key::{Key, MouseButton, MouseRecord};

use crate::error::{Error, Result};
use crate::interface::Backend;
use log::{debug, trace};
use std::time::Duration;

#[derive(Debug, Default)]
struct MouseTracker {
    last: Option<MouseRecord>,
    pressed: [u32; 3],
    released: [u32; 3],
}

impl MouseTracker {
    fn apply(&mut self, sample: MouseRecord) {
        let previous = self.last.unwrap_or_default();
        for button in MouseButton::ALL {
            match (previous.is_down(button), sample.is_down(button)) {
                (false, true) => self.pressed[button.slot()] += 1,
                (true, false) => self.released[button.slot()] += 1,
                _ => {}
            }
        }
        self.last = Some(sample);
    }
}

#[derive(Debug)]
enum MouseState {
    Uninitialized,
    Ready(MouseTracker),
}

#[derive(Debug)]
pub struct InputPoller {
    mouse: MouseState,
}

impl InputPoller {
    pub fn new() -> Self {
        Self {
            mouse: MouseState::Uninitialized,
        }
    }

    /// 取出最新的按鍵；沒有新輸入時回傳 None
    pub fn keyboard_poll(&mut self, backend: &mut dyn Backend) -> Option<Key> {
        let mut latest = None;
        let mut dropped = 0usize;
        while let Some(key) = backend.next_key() {
            if latest.is_some() {
                dropped += 1;
            }
            latest = Some(key);
        }
        if dropped > 0 {
            trace!("鍵盤輪詢略過 {} 個較舊的按鍵", dropped);
        }
        latest
    }

    /// 啟用滑鼠追蹤，重複呼叫會重設狀態與計數
    ///
    /// 之前累積的取樣一律丟棄，不計入按鍵次數；位置仍由後端記住。
    pub fn mouse_init(&mut self, backend: &mut dyn Backend) {
        let mut discarded = 0usize;
        while backend.next_mouse_sample().is_some() {
            discarded += 1;
        }
        debug!("滑鼠追蹤已啟用，捨棄 {} 筆舊取樣", discarded);
        self.mouse = MouseState::Ready(MouseTracker::default());
    }

    pub fn mouse_ready(&self) -> bool {
        matches!(self.mouse, MouseState::Ready(_))
    }

    /// 更新滑鼠狀態，回傳是否取得新的取樣
    ///
    /// `blocking` 為 true 且沒有待處理的取樣時，會等待後端送來至少一筆
    /// （或等到 `timeout` 到期）。第一次更新一定會留下目前位置。
    pub fn mouse_update(
        &mut self,
        backend: &mut dyn Backend,
        blocking: bool,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        let tracker = match &mut self.mouse {
            MouseState::Uninitialized => return Err(Error::NotInitialized("滑鼠")),
            MouseState::Ready(tracker) => tracker,
        };

        let mut fresh = false;
        while let Some(sample) = backend.next_mouse_sample() {
            tracker.apply(sample);
            fresh = true;
        }

        if !fresh && blocking {
            match backend.wait_mouse_sample(timeout) {
                Some(sample) => {
                    tracker.apply(sample);
                    fresh = true;
                    while let Some(sample) = backend.next_mouse_sample() {
                        tracker.apply(sample);
                    }
                }
                None => debug!("等待滑鼠取樣逾時或來源已關閉"),
            }
        }

        if tracker.last.is_none() {
            tracker.last = Some(backend.current_mouse());
        }
        Ok(fresh)
    }

    pub fn mouse_record(&self) -> Result<MouseRecord> {
        match &self.mouse {
            MouseState::Uninitialized => Err(Error::NotInitialized("滑鼠")),
            MouseState::Ready(tracker) => tracker.last.ok_or(Error::NotInitialized("滑鼠位置")),
        }
    }

    pub fn mouse_x(&self) -> Result<i32> {
        self.mouse_record().map(|m| m.x)
    }

    pub fn mouse_y(&self) -> Result<i32> {
        self.mouse_record().map(|m| m.y)
    }

    /// 自上次查詢以來的按下次數，讀取後歸零
    pub fn mouse_pressed(&mut self, button: MouseButton) -> Result<u32> {
        match &mut self.mouse {
            MouseState::Uninitialized => Err(Error::NotInitialized("滑鼠")),
            MouseState::Ready(tracker) => Ok(std::mem::take(&mut tracker.pressed[button.slot()])),
        }
    }

    pub fn mouse_released(&mut self, button: MouseButton) -> Result<u32> {
        match &mut self.mouse {
            MouseState::Uninitialized => Err(Error::NotInitialized("滑鼠")),
            MouseState::Ready(tracker) => Ok(std::mem::take(&mut tracker.released[button.slot()])),
        }
    }
}

impl Default for InputPoller {
    fn default() -> Self {
        InputPoller::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::headless::HeadlessBackend;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_keyboard_poll_and_clear() {
        let (mut backend, remote) = HeadlessBackend::new();
        let mut input = InputPoller::new();

        assert_eq!(input.keyboard_poll(&mut backend), None);
        remote.press(Key::Char('a'));
        remote.press(Key::Escape);
        assert_eq!(input.keyboard_poll(&mut backend), Some(Key::Escape));
        assert_eq!(input.keyboard_poll(&mut backend), None);
    }

    #[test]
    fn test_mouse_requires_init() {
        let (mut backend, _remote) = HeadlessBackend::new();
        let mut input = InputPoller::new();

        assert!(matches!(input.mouse_x(), Err(Error::NotInitialized(_))));
        assert!(matches!(input.mouse_y(), Err(Error::NotInitialized(_))));
        assert!(matches!(
            input.mouse_update(&mut backend, false, None),
            Err(Error::NotInitialized(_))
        ));
        input.mouse_init(&mut backend);
        // 尚未更新，仍然沒有位置
        assert!(matches!(input.mouse_x(), Err(Error::NotInitialized(_))));
    }

    #[test]
    fn test_samples_before_init_are_not_counted() {
        let (mut backend, remote) = HeadlessBackend::new();
        let mut input = InputPoller::new();

        let at = MouseRecord::new(5, 6);
        remote.move_mouse(at.with_button(MouseButton::Left, true));
        remote.move_mouse(at);
        remote.move_mouse(MouseRecord::new(9, 10).with_button(MouseButton::Left, true));
        input.mouse_init(&mut backend);

        assert!(!input.mouse_update(&mut backend, false, None).unwrap());
        assert_eq!(input.mouse_pressed(MouseButton::Left).unwrap(), 0);
        assert_eq!(input.mouse_released(MouseButton::Left).unwrap(), 0);
        // 位置取自最後一筆舊取樣
        assert_eq!((input.mouse_x().unwrap(), input.mouse_y().unwrap()), (9, 10));

        remote.move_mouse(MouseRecord::new(9, 10));
        assert!(input.mouse_update(&mut backend, false, None).unwrap());
        assert_eq!(input.mouse_released(MouseButton::Left).unwrap(), 1);
    }

    #[test]
    fn test_mouse_values_stable_between_updates() {
        let (mut backend, remote) = HeadlessBackend::new();
        let mut input = InputPoller::new();
        input.mouse_init(&mut backend);

        remote.move_mouse(MouseRecord::new(12, 34));
        assert!(input.mouse_update(&mut backend, false, None).unwrap());
        assert_eq!((input.mouse_x().unwrap(), input.mouse_y().unwrap()), (12, 34));

        // 新取樣在下一次 update 之前不會生效
        remote.move_mouse(MouseRecord::new(50, 60));
        assert_eq!((input.mouse_x().unwrap(), input.mouse_y().unwrap()), (12, 34));

        assert!(input.mouse_update(&mut backend, false, None).unwrap());
        assert_eq!(input.mouse_x().unwrap(), 50);

        // 沒有新輸入：非阻塞更新保留舊值
        assert!(!input.mouse_update(&mut backend, false, None).unwrap());
        assert_eq!(input.mouse_record().unwrap(), MouseRecord::new(50, 60));
    }

    #[test]
    fn test_first_update_without_samples_uses_current_position() {
        let (mut backend, _remote) = HeadlessBackend::new();
        let mut input = InputPoller::new();
        input.mouse_init(&mut backend);
        assert!(!input.mouse_update(&mut backend, false, None).unwrap());
        assert_eq!(input.mouse_record().unwrap(), MouseRecord::default());
    }

    #[test]
    fn test_button_edge_counts() {
        let (mut backend, remote) = HeadlessBackend::new();
        let mut input = InputPoller::new();
        input.mouse_init(&mut backend);

        let at = MouseRecord::new(1, 1);
        remote.move_mouse(at.with_button(MouseButton::Left, true));
        remote.move_mouse(at);
        remote.move_mouse(at.with_button(MouseButton::Left, true));
        remote.move_mouse(at.with_button(MouseButton::Right, true));
        input.mouse_update(&mut backend, false, None).unwrap();

        assert_eq!(input.mouse_pressed(MouseButton::Left).unwrap(), 2);
        assert_eq!(input.mouse_released(MouseButton::Left).unwrap(), 2);
        assert_eq!(input.mouse_pressed(MouseButton::Right).unwrap(), 1);
        assert_eq!(input.mouse_pressed(MouseButton::Middle).unwrap(), 0);
        // 讀取後歸零
        assert_eq!(input.mouse_pressed(MouseButton::Left).unwrap(), 0);
        assert!(input.mouse_record().unwrap().right);
    }

    #[test]
    fn test_blocking_update_waits_for_sample() {
        let (mut backend, remote) = HeadlessBackend::new();
        let mut input = InputPoller::new();
        input.mouse_init(&mut backend);

        let sender = remote.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            sender.move_mouse(MouseRecord::new(7, 8));
        });

        let start = Instant::now();
        assert!(input.mouse_update(&mut backend, true, Some(Duration::from_secs(5))).unwrap());
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(input.mouse_x().unwrap(), 7);
        handle.join().unwrap();
    }

    #[test]
    fn test_blocking_update_times_out() {
        let (mut backend, _remote) = HeadlessBackend::new();
        let mut input = InputPoller::new();
        input.mouse_init(&mut backend);

        let start = Instant::now();
        let fresh = input
            .mouse_update(&mut backend, true, Some(Duration::from_millis(20)))
            .unwrap();
        assert!(!fresh);
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(input.mouse_record().unwrap(), MouseRecord::default());
    }
}
