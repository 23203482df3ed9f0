/*
================================================================================
VGA - 點陣圖模組
================================================================================
未壓縮 8 位元 BMP 的讀寫，也用作點陣字型

格式：
- 14 位元組檔頭 + 40 位元組資訊頭
- 調色盤每項 4 位元組，順序為 B G R 保留
- 掃描線由下而上存放，每列補齊到 4 的倍數
- 字型圖把空白到 `~` 共 95 個字元橫向排成一列
================================================================================
*/

use crate::error::{Error, Result};
use crate::palette::Rgb;
use crate::PALETTE_SIZE;
use log::debug;
use std::fs;
use std::path::Path;

const FILE_HEADER_SIZE: usize = 14;
const INFO_HEADER_SIZE: usize = 40;
const BITS_PER_PIXEL: u16 = 8;
const COMPRESSION_NONE: u32 = 0;
/// 72 dpi
const PIXELS_PER_METER: u32 = 0xB12;

/// 字型點陣圖包含的字元數（空白到 `~`）
pub const FONT_CHARS: usize = 95;
const FIRST_FONT_CHAR: u32 = ' ' as u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    palette: Option<Vec<Rgb>>,
    data: Vec<u8>,
}

fn row_stride(width: usize) -> usize {
    (width + 3) & !3
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::Bitmap(msg.into())
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            palette: None,
            data: vec![0; width * height],
        }
    }

    pub fn from_parts(
        width: usize,
        height: usize,
        palette: Option<Vec<Rgb>>,
        data: Vec<u8>,
    ) -> Result<Self> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(Error::invalid_argument(format!(
                "點陣資料長度 {} 與尺寸 {}x{} 不符",
                data.len(),
                width,
                height
            )));
        }
        if let Some(colors) = &palette {
            if colors.len() > PALETTE_SIZE {
                return Err(Error::InvalidIndex {
                    index: colors.len() - 1,
                    limit: PALETTE_SIZE,
                });
            }
        }
        Ok(Self {
            width,
            height,
            palette,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn palette(&self) -> Option<&[Rgb]> {
        self.palette.as_deref()
    }

    pub fn set_palette(&mut self, palette: Option<Vec<Rgb>>) {
        self.palette = palette;
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// 作為字型時每個字元的寬度，圖寬不足 95 個字元時為 0
    pub fn char_width(&self) -> usize {
        self.width / FONT_CHARS
    }

    /// 字元在字型圖中的起始欄，字型沒有這個字元時回傳 None
    pub fn glyph_column(&self, ch: char) -> Option<usize> {
        let index = (ch as u32).checked_sub(FIRST_FONT_CHAR)? as usize;
        if index < FONT_CHARS && self.char_width() > 0 {
            Some(index * self.char_width())
        } else {
            None
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, index: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = index;
        }
    }

    /// 解析 BMP 內容；`with_palette` 為 false 時略過調色盤
    pub fn decode(bytes: &[u8], with_palette: bool) -> Result<Self> {
        if bytes.len() < FILE_HEADER_SIZE + INFO_HEADER_SIZE {
            return Err(malformed("檔案過短"));
        }
        if &bytes[0..2] != b"BM" {
            return Err(malformed("缺少 BM 標記"));
        }
        let data_offset = read_u32(bytes, 10) as usize;
        let info_size = read_u32(bytes, 14) as usize;
        let raw_width = read_u32(bytes, 18) as i32;
        let raw_height = read_u32(bytes, 22) as i32;
        let planes = read_u16(bytes, 26);
        let bpp = read_u16(bytes, 28);
        let compression = read_u32(bytes, 30);
        let num_colors = read_u32(bytes, 46) as usize;

        if info_size != INFO_HEADER_SIZE
            || planes != 1
            || bpp != BITS_PER_PIXEL
            || compression != COMPRESSION_NONE
        {
            return Err(malformed(format!(
                "只支援未壓縮 8 位元 BMP (header={}, planes={}, bpp={}, compression={})",
                info_size, planes, bpp, compression
            )));
        }
        if raw_width <= 0 || raw_height == 0 {
            return Err(malformed(format!("無效的尺寸 {}x{}", raw_width, raw_height)));
        }

        // 高度為負數代表由上而下存放
        let top_down = raw_height < 0;
        let width = raw_width as usize;
        let height = raw_height.unsigned_abs() as usize;
        let num_colors = if num_colors == 0 { PALETTE_SIZE } else { num_colors };
        if num_colors > PALETTE_SIZE {
            return Err(malformed(format!("調色盤項目過多: {}", num_colors)));
        }

        let palette_start = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
        let palette = if with_palette {
            let end = palette_start + num_colors * 4;
            let table = bytes
                .get(palette_start..end)
                .ok_or_else(|| malformed("調色盤資料不完整"))?;
            Some(
                table
                    .chunks_exact(4)
                    .map(|bgrx| Rgb::new(bgrx[2], bgrx[1], bgrx[0]))
                    .collect(),
            )
        } else {
            None
        };

        let stride = row_stride(width);
        let pixels = bytes
            .get(data_offset..)
            .filter(|p| p.len() >= stride * (height - 1) + width)
            .ok_or_else(|| malformed("像素資料不完整"))?;

        let mut data = vec![0u8; width * height];
        for (i, row) in data.chunks_exact_mut(width).enumerate() {
            let source_row = if top_down { i } else { height - 1 - i };
            let start = source_row * stride;
            row.copy_from_slice(&pixels[start..start + width]);
        }

        debug!("BMP 已解析: {}x{}, {} 色", width, height, num_colors);
        Ok(Self {
            width,
            height,
            palette,
            data,
        })
    }

    /// 輸出 BMP，調色盤一律寫滿 256 項（不足的補黑色）
    pub fn encode(&self) -> Result<Vec<u8>> {
        let palette = self
            .palette
            .as_ref()
            .ok_or_else(|| Error::invalid_argument("輸出 BMP 需要調色盤"))?;

        let stride = row_stride(self.width);
        let image_size = stride * self.height;
        let data_offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE + PALETTE_SIZE * 4;
        let file_size = data_offset + image_size;

        let mut out = Vec::with_capacity(file_size);
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&(file_size as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(data_offset as u32).to_le_bytes());

        out.extend_from_slice(&(INFO_HEADER_SIZE as u32).to_le_bytes());
        out.extend_from_slice(&(self.width as u32).to_le_bytes());
        out.extend_from_slice(&(self.height as u32).to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&BITS_PER_PIXEL.to_le_bytes());
        out.extend_from_slice(&COMPRESSION_NONE.to_le_bytes());
        out.extend_from_slice(&(image_size as u32).to_le_bytes());
        out.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
        out.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
        out.extend_from_slice(&(PALETTE_SIZE as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());

        for i in 0..PALETTE_SIZE {
            let color = palette.get(i).copied().unwrap_or(Rgb::BLACK);
            out.extend_from_slice(&[color.blue, color.green, color.red, 0]);
        }

        let padding = [0u8; 3];
        for y in (0..self.height).rev() {
            out.extend_from_slice(self.row(y));
            out.extend_from_slice(&padding[..stride - self.width]);
        }
        Ok(out)
    }

    pub fn load(path: impl AsRef<Path>, with_palette: bool) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        Self::decode(&bytes, with_palette)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.encode()?;
        let path = path.as_ref();
        if let Err(err) = fs::write(path, &bytes) {
            // 不留下寫了一半的檔案
            let _ = fs::remove_file(path);
            return Err(err.into());
        }
        debug!("BMP 已儲存: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bitmap {
        let mut bm = Bitmap::new(5, 3);
        for y in 0..3 {
            for x in 0..5 {
                bm.set_pixel(x, y, (y * 5 + x) as u8);
            }
        }
        bm.set_palette(Some(vec![Rgb::new(10, 20, 30), Rgb::new(255, 0, 128)]));
        bm
    }

    #[test]
    fn test_font_geometry() {
        let font = Bitmap::new(FONT_CHARS * 6, 8);
        assert_eq!(font.char_width(), 6);
        assert_eq!(font.glyph_column(' '), Some(0));
        assert_eq!(font.glyph_column('A'), Some(33 * 6));
        assert_eq!(font.glyph_column('~'), Some(94 * 6));
        assert_eq!(font.glyph_column('\u{7f}'), None);
        assert_eq!(font.glyph_column('\n'), None);
        assert_eq!(font.glyph_column('é'), None);

        // 太窄的圖不能當字型
        assert_eq!(sample().char_width(), 0);
        assert_eq!(sample().glyph_column('A'), None);
    }

    #[test]
    fn test_from_parts_rejects_overflowing_size() {
        assert!(Bitmap::from_parts(usize::MAX, 2, None, vec![0; 4]).is_err());
    }

    #[test]
    fn test_encoded_layout() {
        let bytes = sample().encode().unwrap();
        let stride = 8;
        assert_eq!(bytes.len(), 14 + 40 + 1024 + stride * 3);
        assert_eq!(&bytes[0..2], b"BM");
        assert_eq!(read_u32(&bytes, 2) as usize, bytes.len());
        assert_eq!(read_u32(&bytes, 10), 14 + 40 + 1024);
        // 調色盤為 BGRX
        assert_eq!(&bytes[54..58], &[30, 20, 10, 0]);
        // 第一個儲存的掃描線是最下面一列
        let data = 14 + 40 + 1024;
        assert_eq!(&bytes[data..data + 5], &[10, 11, 12, 13, 14]);
        assert_eq!(&bytes[data + 5..data + 8], &[0, 0, 0]);
    }

    #[test]
    fn test_decode_restores_pixels_and_palette() {
        let original = sample();
        let decoded = Bitmap::decode(&original.encode().unwrap(), true).unwrap();
        assert_eq!(decoded.width(), 5);
        assert_eq!(decoded.height(), 3);
        assert_eq!(decoded.data(), original.data());
        let palette = decoded.palette().unwrap();
        assert_eq!(palette.len(), PALETTE_SIZE);
        assert_eq!(palette[1], Rgb::new(255, 0, 128));
        assert_eq!(palette[2], Rgb::BLACK);

        let bare = Bitmap::decode(&original.encode().unwrap(), false).unwrap();
        assert!(bare.palette().is_none());
    }

    #[test]
    fn test_decode_top_down() {
        let mut bytes = sample().encode().unwrap();
        // 改成負高度後，第一條儲存的掃描線變成最上面一列
        bytes[22..26].copy_from_slice(&(-3i32).to_le_bytes());
        let decoded = Bitmap::decode(&bytes, false).unwrap();
        assert_eq!(decoded.row(0), &[10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(Bitmap::decode(b"BM", true), Err(Error::Bitmap(_))));

        let mut bytes = sample().encode().unwrap();
        bytes[0] = b'X';
        assert!(Bitmap::decode(&bytes, true).is_err());

        let mut bytes = sample().encode().unwrap();
        bytes[28..30].copy_from_slice(&24u16.to_le_bytes());
        assert!(Bitmap::decode(&bytes, true).is_err());

        let bytes = sample().encode().unwrap();
        assert!(Bitmap::decode(&bytes[..bytes.len() - 4], true).is_err());
    }

    #[test]
    fn test_encode_requires_palette() {
        assert!(Bitmap::new(2, 2).encode().is_err());
    }

    #[test]
    fn test_from_parts_checks_length() {
        assert!(Bitmap::from_parts(2, 2, None, vec![0; 3]).is_err());
        assert!(Bitmap::from_parts(2, 2, None, vec![0; 4]).is_ok());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("retro_vga_bitmap_{}.bmp", std::process::id()));
        sample().save(&path).unwrap();
        let loaded = Bitmap::load(&path, true).unwrap();
        assert_eq!(loaded.data(), sample().data());
        let _ = fs::remove_file(&path);
    }
}
