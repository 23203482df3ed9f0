//! Palette module, maps color indices to RGB triples

use crate::error::{Error, Result};
use crate::PALETTE_SIZE;

/// 調色盤項目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// 轉為 minifb 使用的 0x00RRGGBB 格式
    pub const fn to_argb(self) -> u32 {
        ((self.red as u32) << 16) | ((self.green as u32) << 8) | (self.blue as u32)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Rgb::new(red, green, blue)
    }
}

/// 驗證色彩索引，回傳可直接存入畫面的值
pub fn check_index(index: usize) -> Result<u8> {
    if index < PALETTE_SIZE {
        Ok(index as u8)
    } else {
        Err(Error::InvalidIndex {
            index,
            limit: PALETTE_SIZE,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Palette {
    entries: [Rgb; PALETTE_SIZE],
}

impl Palette {
    /// 所有項目預設為黑色
    pub fn new() -> Self {
        Self {
            entries: [Rgb::BLACK; PALETTE_SIZE],
        }
    }

    pub fn set(&mut self, index: usize, color: Rgb) -> Result<()> {
        let index = check_index(index)?;
        self.entries[index as usize] = color;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<Rgb> {
        let index = check_index(index)?;
        Ok(self.entries[index as usize])
    }

    /// 從索引 0 開始整批寫入
    pub fn load(&mut self, colors: &[Rgb]) -> Result<()> {
        if colors.len() > PALETTE_SIZE {
            return Err(Error::InvalidIndex {
                index: colors.len() - 1,
                limit: PALETTE_SIZE,
            });
        }
        self.entries[..colors.len()].copy_from_slice(colors);
        Ok(())
    }

    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }

    /// 四段漸層：
    /// 000..063 灰階, 064..127 紅, 128..191 綠, 192..255 藍
    pub fn grayscale() -> Self {
        let mut palette = Self::new();
        let ramp = PALETTE_SIZE / 4;
        for i in 0..ramp {
            // 6 位元 DAC 值擴展為 8 位元
            let level = (i * 4) as u8;
            palette.entries[i] = Rgb::new(level, level, level);
            palette.entries[ramp + i] = Rgb::new(level, 0, 0);
            palette.entries[2 * ramp + i] = Rgb::new(0, level, 0);
            palette.entries[3 * ramp + i] = Rgb::new(0, 0, level);
        }
        palette
    }

    /// 查表，索引由 u8 保證在範圍內
    #[inline]
    pub fn argb(&self, index: u8) -> u32 {
        self.entries[index as usize].to_argb()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_round_trip() {
        let mut palette = Palette::new();
        palette.set(1, Rgb::new(255, 187, 204)).unwrap();
        assert_eq!(palette.get(1).unwrap(), Rgb::new(255, 187, 204));
        // 未設定的項目維持預設值
        assert_eq!(palette.get(2).unwrap(), Rgb::BLACK);
        palette.set(255, Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(palette.get(255).unwrap(), Rgb::new(1, 2, 3));
    }

    #[test]
    fn test_out_of_range_index() {
        let mut palette = Palette::new();
        assert!(matches!(
            palette.set(256, Rgb::BLACK),
            Err(Error::InvalidIndex { index: 256, .. })
        ));
        assert!(matches!(palette.get(1000), Err(Error::InvalidIndex { .. })));
    }

    #[test]
    fn test_load_too_many_entries() {
        let mut palette = Palette::new();
        let colors = vec![Rgb::new(9, 9, 9); PALETTE_SIZE + 1];
        assert!(palette.load(&colors).is_err());
        assert_eq!(palette.get(0).unwrap(), Rgb::BLACK);

        palette.load(&colors[..3]).unwrap();
        assert_eq!(palette.get(2).unwrap(), Rgb::new(9, 9, 9));
        assert_eq!(palette.get(3).unwrap(), Rgb::BLACK);
    }

    #[test]
    fn test_grayscale_ramps() {
        let palette = Palette::grayscale();
        assert_eq!(palette.get(0).unwrap(), Rgb::BLACK);
        assert_eq!(palette.get(63).unwrap(), Rgb::new(252, 252, 252));
        assert_eq!(palette.get(64 + 10).unwrap(), Rgb::new(40, 0, 0));
        assert_eq!(palette.get(128 + 10).unwrap(), Rgb::new(0, 40, 0));
        assert_eq!(palette.get(192 + 10).unwrap(), Rgb::new(0, 0, 40));
    }

    #[test]
    fn test_argb_layout() {
        assert_eq!(Rgb::new(0x12, 0x34, 0x56).to_argb(), 0x0012_3456);
    }
}
