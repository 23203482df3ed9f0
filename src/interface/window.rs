use super::{push_bounded, Backend};
use crate::config::VideoConfig;
use crate::error::{Error, Result};
use crate::input::{Key, MouseRecord};
use log::{info, warn};
use minifb::{KeyRepeat, MouseMode, Scale, Window, WindowOptions};
use std::collections::VecDeque;
use std::fmt::{self, Debug};
use std::thread;
use std::time::{Duration, Instant};

/// 阻塞等待滑鼠時，每次檢查之間休息一個畫面週期
const WAIT_SLICE: Duration = Duration::from_millis(16);

/// minifb 視窗後端
pub struct MinifbBackend {
    window: Option<Window>,
    keys: VecDeque<Key>,
    mice: VecDeque<MouseRecord>,
    mouse: MouseRecord,
    closed_reported: bool,
}

impl MinifbBackend {
    pub fn new() -> Self {
        Self {
            window: None,
            keys: VecDeque::new(),
            mice: VecDeque::new(),
            mouse: MouseRecord::default(),
            closed_reported: false,
        }
    }

    fn scale(scale: u32) -> Result<Scale> {
        match scale {
            1 => Ok(Scale::X1),
            2 => Ok(Scale::X2),
            4 => Ok(Scale::X4),
            8 => Ok(Scale::X8),
            other => Err(Error::invalid_argument(format!("不支援的縮放倍率: {}", other))),
        }
    }

    /// 視窗更新之後收集鍵盤與滑鼠狀態
    fn collect_input(&mut self) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        for key in window.get_keys_pressed(KeyRepeat::No) {
            push_bounded(&mut self.keys, map_key(key));
        }

        let (x, y) = window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| (x as i32, y as i32))
            .unwrap_or((self.mouse.x, self.mouse.y));
        let sample = MouseRecord {
            x,
            y,
            left: window.get_mouse_down(minifb::MouseButton::Left),
            right: window.get_mouse_down(minifb::MouseButton::Right),
            middle: window.get_mouse_down(minifb::MouseButton::Middle),
        };
        let newest = self.mice.back().copied().unwrap_or(self.mouse);
        if sample != newest {
            push_bounded(&mut self.mice, sample);
        }
    }

    fn take_mouse(&mut self) -> Option<MouseRecord> {
        let sample = self.mice.pop_front()?;
        self.mouse = sample;
        Some(sample)
    }
}

impl Default for MinifbBackend {
    fn default() -> Self {
        MinifbBackend::new()
    }
}

impl Debug for MinifbBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinifbBackend")
            .field("window", &self.window.as_ref().map(|_| "Window { ... }"))
            .field("pending_keys", &self.keys.len())
            .field("pending_mouse", &self.mice.len())
            .field("mouse", &self.mouse)
            .finish()
    }
}

impl Backend for MinifbBackend {
    fn open(&mut self, width: usize, height: usize, video: &VideoConfig) -> Result<()> {
        let options = WindowOptions {
            scale: Self::scale(video.scale)?,
            ..WindowOptions::default()
        };
        let mut window = Window::new(&video.title, width, height, options)?;
        // 更新頻率由裝置自行控制
        window.limit_update_rate(None);
        info!("視窗已建立: {} ({}x{} x{})", video.title, width, height, video.scale);

        self.window = Some(window);
        self.keys.clear();
        self.mice.clear();
        self.closed_reported = false;
        Ok(())
    }

    fn close(&mut self) {
        if self.window.take().is_some() {
            info!("視窗已關閉");
        }
    }

    fn is_open(&self) -> bool {
        self.window.as_ref().map_or(false, |w| w.is_open())
    }

    fn present(&mut self, frame: &[u32], width: usize, height: usize) -> Result<()> {
        let window = self
            .window
            .as_mut()
            .ok_or_else(|| Error::Display("視窗尚未建立".to_string()))?;
        if !window.is_open() {
            if !self.closed_reported {
                warn!("視窗已被使用者關閉，畫面不再更新");
                self.closed_reported = true;
            }
            return Ok(());
        }
        window.update_with_buffer(frame, width, height)?;
        self.collect_input();
        Ok(())
    }

    fn next_key(&mut self) -> Option<Key> {
        self.keys.pop_front()
    }

    fn next_mouse_sample(&mut self) -> Option<MouseRecord> {
        self.take_mouse()
    }

    fn wait_mouse_sample(&mut self, timeout: Option<Duration>) -> Option<MouseRecord> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if let Some(sample) = self.take_mouse() {
                return Some(sample);
            }
            if !self.is_open() {
                return None;
            }
            if deadline.map_or(false, |d| Instant::now() >= d) {
                return None;
            }
            thread::sleep(WAIT_SLICE);
            if let Some(window) = self.window.as_mut() {
                window.update();
            }
            self.collect_input();
        }
    }

    fn current_mouse(&self) -> MouseRecord {
        self.mouse
    }
}

fn map_key(key: minifb::Key) -> Key {
    use minifb::Key as K;
    let c = match key {
        K::A => 'a',
        K::B => 'b',
        K::C => 'c',
        K::D => 'd',
        K::E => 'e',
        K::F => 'f',
        K::G => 'g',
        K::H => 'h',
        K::I => 'i',
        K::J => 'j',
        K::K => 'k',
        K::L => 'l',
        K::M => 'm',
        K::N => 'n',
        K::O => 'o',
        K::P => 'p',
        K::Q => 'q',
        K::R => 'r',
        K::S => 's',
        K::T => 't',
        K::U => 'u',
        K::V => 'v',
        K::W => 'w',
        K::X => 'x',
        K::Y => 'y',
        K::Z => 'z',
        K::Key0 | K::NumPad0 => '0',
        K::Key1 | K::NumPad1 => '1',
        K::Key2 | K::NumPad2 => '2',
        K::Key3 | K::NumPad3 => '3',
        K::Key4 | K::NumPad4 => '4',
        K::Key5 | K::NumPad5 => '5',
        K::Key6 | K::NumPad6 => '6',
        K::Key7 | K::NumPad7 => '7',
        K::Key8 | K::NumPad8 => '8',
        K::Key9 | K::NumPad9 => '9',
        K::Space => ' ',
        K::Comma => ',',
        K::Period | K::NumPadDot => '.',
        K::Minus | K::NumPadMinus => '-',
        K::Equal => '=',
        K::Slash | K::NumPadSlash => '/',
        K::Semicolon => ';',
        K::Apostrophe => '\'',
        K::Backquote => '`',
        K::Backslash => '\\',
        K::LeftBracket => '[',
        K::RightBracket => ']',
        K::NumPadPlus => '+',
        K::NumPadAsterisk => '*',
        K::Enter | K::NumPadEnter => return Key::Enter,
        K::Escape => return Key::Escape,
        K::Backspace => return Key::Backspace,
        K::Tab => return Key::Tab,
        K::Up => return Key::Up,
        K::Down => return Key::Down,
        K::Left => return Key::Left,
        K::Right => return Key::Right,
        K::F1 => return Key::Function(1),
        K::F2 => return Key::Function(2),
        K::F3 => return Key::Function(3),
        K::F4 => return Key::Function(4),
        K::F5 => return Key::Function(5),
        K::F6 => return Key::Function(6),
        K::F7 => return Key::Function(7),
        K::F8 => return Key::Function(8),
        K::F9 => return Key::Function(9),
        K::F10 => return Key::Function(10),
        K::F11 => return Key::Function(11),
        K::F12 => return Key::Function(12),
        other => return Key::Other(other as u32),
    };
    Key::Char(c)
}
