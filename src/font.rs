//! Text rendering with a bitmap font: one BMP holding the 95 printable ASCII
//! glyphs side by side, each `width / 95` pixels wide.

use crate::bitmap::Bitmap;
use crate::framebuffer::Framebuffer;
use crate::raster::Point;

/// 畫一個字元，字型圖中非 0 的像素以 `color` 寫入，0 保持透明
///
/// 回傳字元寬度；字型沒有這個字元時什麼都不畫並回傳 0。
pub(crate) fn render_char(
    fb: &mut Framebuffer,
    font: &Bitmap,
    at: Point,
    ch: char,
    color: u8,
) -> usize {
    let Some(column) = font.glyph_column(ch) else {
        return 0;
    };
    let width = font.char_width();
    for gy in 0..font.height() {
        let glyph = &font.row(gy)[column..column + width];
        let y = at.y.saturating_add(gy as i32);
        for (gx, &index) in glyph.iter().enumerate() {
            if index != 0 {
                fb.plot(at.x.saturating_add(gx as i32), y, color);
            }
        }
    }
    width
}

/// 畫一段文字，`'\n'` 換到下一行（行高為字型圖高度），`'\r'` 忽略
///
/// 回傳最後一行的寬度。
pub(crate) fn render_string(
    fb: &mut Framebuffer,
    font: &Bitmap,
    at: Point,
    text: &str,
    color: u8,
) -> usize {
    let line_height = i32::try_from(font.height()).unwrap_or(i32::MAX);
    let mut cursor = at;
    let mut line_width = 0usize;
    for ch in text.chars() {
        match ch {
            '\n' => {
                cursor = Point::new(at.x, cursor.y.saturating_add(line_height));
                line_width = 0;
            }
            '\r' => {}
            _ => {
                let advance = render_char(fb, font, cursor, ch, color);
                cursor.x = cursor.x.saturating_add(advance as i32);
                line_width += advance;
            }
        }
    }
    line_width
}
