// VGA 320x200 256 色顯示庫
pub mod bitmap;
pub mod config;
pub mod cursor;
pub mod device;
pub mod error;
pub mod font;
pub mod framebuffer;
pub mod input;
pub mod interface;
pub mod palette;
pub mod raster;
pub mod utils;

/// 畫面寬度（像素）
pub const SCREEN_WIDTH: usize = 320;
/// 畫面高度（像素）
pub const SCREEN_HEIGHT: usize = 200;
/// 調色盤大小
pub const PALETTE_SIZE: usize = 256;

pub use crate::bitmap::Bitmap;
pub use crate::config::{Config, ConfigBuilder, CursorKind, PresentPolicy};
pub use crate::device::{DeviceState, Vga};
pub use crate::error::{Error, Result};
pub use crate::input::{Key, MouseButton, MouseRecord};
pub use crate::interface::{Backend, HeadlessBackend, HeadlessRemote, MinifbBackend};
pub use crate::palette::Rgb;
pub use crate::raster::Point;
