//! Framebuffer module, one color index per screen pixel

use crate::error::{Error, Result};
use crate::palette::{check_index, Palette};

#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize, background: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![background; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        y as usize * self.width + x as usize
    }

    /// 寫入像素，畫面外的座標直接忽略
    pub fn set_pixel(&mut self, x: i32, y: i32, color: usize) -> Result<()> {
        let color = check_index(color)?;
        self.plot(x, y, color);
        Ok(())
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Result<u8> {
        if !self.contains(x, y) {
            return Err(Error::OutOfBounds { x, y });
        }
        Ok(self.cells[self.offset(x, y)])
    }

    /// 已驗證色彩的裁切寫入，供光柵化使用
    #[inline]
    pub(crate) fn plot(&mut self, x: i32, y: i32, color: u8) {
        if self.contains(x, y) {
            let offset = self.offset(x, y);
            self.cells[offset] = color;
        }
    }

    /// 填滿一段水平區間 [x0, x1]，先裁切再整段寫入
    pub(crate) fn span(&mut self, x0: i32, x1: i32, y: i32, color: u8) {
        if y < 0 || y as usize >= self.height {
            return;
        }
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let left = x0.max(0);
        let right = x1.min(self.width as i32 - 1);
        if left > right {
            return;
        }
        let row = y as usize * self.width;
        self.cells[row + left as usize..=row + right as usize].fill(color);
    }

    pub fn clear(&mut self, color: usize) -> Result<()> {
        let color = check_index(color)?;
        self.cells.fill(color);
        Ok(())
    }

    /// 第 `y` 列的色彩索引，超出畫面時回傳 None
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        self.cells.get(y * self.width..(y + 1) * self.width)
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// 透過調色盤轉換成 0x00RRGGBB 畫面
    pub fn render_into(&self, palette: &Palette, out: &mut Vec<u32>) {
        out.clear();
        out.extend(self.cells.iter().map(|&index| palette.argb(index)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Rgb;

    #[test]
    fn test_set_get_pixel() {
        let mut fb = Framebuffer::new(320, 200, 0);
        fb.set_pixel(160, 100, 1).unwrap();
        assert_eq!(fb.get_pixel(160, 100).unwrap(), 1);
        assert_eq!(fb.get_pixel(161, 100).unwrap(), 0);
        fb.set_pixel(319, 199, 255).unwrap();
        assert_eq!(fb.get_pixel(319, 199).unwrap(), 255);
    }

    #[test]
    fn test_clipped_write_is_noop() {
        let mut fb = Framebuffer::new(320, 200, 7);
        fb.set_pixel(-1, 0, 3).unwrap();
        fb.set_pixel(320, 0, 3).unwrap();
        fb.set_pixel(0, 200, 3).unwrap();
        fb.set_pixel(10, -5, 3).unwrap();
        assert!(fb.cells().iter().all(|&c| c == 7));
    }

    #[test]
    fn test_strict_read() {
        let fb = Framebuffer::new(320, 200, 0);
        assert!(matches!(
            fb.get_pixel(320, 0),
            Err(Error::OutOfBounds { x: 320, y: 0 })
        ));
        assert!(matches!(fb.get_pixel(0, -1), Err(Error::OutOfBounds { .. })));
        assert_eq!(fb.row(199).map(<[u8]>::len), Some(320));
        assert!(fb.row(200).is_none());
        assert!(fb.row(usize::MAX).is_none());
    }

    #[test]
    fn test_invalid_color_leaves_buffer() {
        let mut fb = Framebuffer::new(4, 4, 0);
        assert!(matches!(
            fb.set_pixel(1, 1, 256),
            Err(Error::InvalidIndex { .. })
        ));
        assert_eq!(fb.get_pixel(1, 1).unwrap(), 0);
    }

    #[test]
    fn test_span_clipping() {
        let mut fb = Framebuffer::new(8, 2, 0);
        fb.span(-5, 2, 0, 4);
        assert_eq!(fb.row(0).unwrap(), &[4, 4, 4, 0, 0, 0, 0, 0]);
        fb.span(9, 6, 1, 5);
        assert_eq!(fb.row(1).unwrap(), &[0, 0, 0, 0, 0, 0, 5, 5]);
        fb.span(20, 30, 1, 6);
        fb.span(0, 7, 2, 6);
        assert_eq!(fb.row(1).unwrap(), &[0, 0, 0, 0, 0, 0, 5, 5]);
    }

    #[test]
    fn test_render_through_palette() {
        let mut fb = Framebuffer::new(2, 1, 0);
        let mut palette = Palette::new();
        palette.set(1, Rgb::new(255, 0, 0)).unwrap();
        fb.set_pixel(1, 0, 1).unwrap();
        let mut out = Vec::new();
        fb.render_into(&palette, &mut out);
        assert_eq!(out, vec![0x0000_0000, 0x00FF_0000]);
    }
}
