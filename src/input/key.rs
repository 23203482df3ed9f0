/// 鍵盤按鍵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// 可列印字元（字母一律小寫）
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Function(u8),
    /// 其他未對應的按鍵，保留後端的原始代碼
    Other(u32),
}

impl Key {
    /// 按鍵對應的文字字元，方向鍵等控制鍵回傳 None
    pub fn as_char(&self) -> Option<char> {
        match self {
            Key::Char(c) => Some(*c),
            Key::Enter => Some('\n'),
            Key::Tab => Some('\t'),
            _ => None,
        }
    }
}

/// 滑鼠按鈕
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    pub(crate) fn slot(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
        }
    }
}

/// 一次滑鼠取樣
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseRecord {
    pub x: i32,
    pub y: i32,
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

impl MouseRecord {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn with_button(mut self, button: MouseButton, down: bool) -> Self {
        match button {
            MouseButton::Left => self.left = down,
            MouseButton::Right => self.right = down,
            MouseButton::Middle => self.middle = down,
        }
        self
    }

    pub fn is_down(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
        }
    }

    /// 是否有任何按鈕按下
    pub fn any_down(&self) -> bool {
        self.left || self.right || self.middle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_as_char() {
        assert_eq!(Key::Char('q').as_char(), Some('q'));
        assert_eq!(Key::Enter.as_char(), Some('\n'));
        assert_eq!(Key::Tab.as_char(), Some('\t'));
        assert_eq!(Key::Escape.as_char(), None);
        assert_eq!(Key::Function(1).as_char(), None);
        assert_eq!(Key::Other(0x1234).as_char(), None);
    }

    #[test]
    fn test_any_down() {
        let at = MouseRecord::new(3, 4);
        assert!(!at.any_down());
        for button in MouseButton::ALL {
            let held = at.with_button(button, true);
            assert!(held.any_down());
            assert!(held.is_down(button));
            assert!(!held.with_button(button, false).any_down());
        }
    }
}
