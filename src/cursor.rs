//! Mouse cursor sprites, drawn over the presented frame only.

use crate::config::CursorKind;
use crate::palette::Palette;

pub const CURSOR_WIDTH: usize = 12;
pub const CURSOR_HEIGHT: usize = 12;

/// 12x12 游標圖，0 為透明，其餘為調色盤索引
#[derive(Debug, Clone)]
pub struct Cursor {
    pub hotspot_x: i32,
    pub hotspot_y: i32,
    pub image: [[u8; CURSOR_WIDTH]; CURSOR_HEIGHT],
}

pub const CROSS: Cursor = Cursor {
    hotspot_x: 6,
    hotspot_y: 6,
    image: [
        [0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0],
        [1, 1, 1, 1, 1, 0, 0, 1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1, 0, 0, 1, 1, 1, 1, 1],
        [0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0],
    ],
};

pub const POINTER: Cursor = Cursor {
    hotspot_x: 1,
    hotspot_y: 1,
    image: [
        [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0],
        [0, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0],
        [0, 0, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 1, 1, 0, 1, 0, 0, 0, 0, 0, 0],
        [0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    ],
};

impl Cursor {
    pub fn for_kind(kind: CursorKind) -> Option<&'static Cursor> {
        match kind {
            CursorKind::None => None,
            CursorKind::Cross => Some(&CROSS),
            CursorKind::Pointer => Some(&POINTER),
        }
    }

    /// 以 (x, y) 為熱點疊加到已轉換的畫面上
    pub fn composite(
        &self,
        frame: &mut [u32],
        width: usize,
        height: usize,
        x: i32,
        y: i32,
        palette: &Palette,
    ) {
        let left = x - self.hotspot_x;
        let top = y - self.hotspot_y;
        for (row, line) in self.image.iter().enumerate() {
            let sy = top + row as i32;
            if sy < 0 || sy as usize >= height {
                continue;
            }
            for (col, &index) in line.iter().enumerate() {
                let sx = left + col as i32;
                if index == 0 || sx < 0 || sx as usize >= width {
                    continue;
                }
                frame[sy as usize * width + sx as usize] = palette.argb(index);
            }
        }
    }
}
