use log::{debug, info, trace, warn};
use std::time::{Duration, Instant};

use crate::bitmap::Bitmap;
use crate::config::{Config, PresentPolicy};
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::font;
use crate::framebuffer::Framebuffer;
use crate::input::{InputPoller, Key, MouseButton, MouseRecord};
use crate::interface::{Backend, HeadlessBackend, HeadlessRemote, MinifbBackend};
use crate::palette::{check_index, Palette, Rgb};
use crate::raster::{self, Point};
use crate::{PALETTE_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};

/// 裝置狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Closed,
    Open,
}

/// 開啟期間才存在的資源
#[derive(Debug)]
struct Session {
    framebuffer: Framebuffer,
    palette: Palette,
    input: InputPoller,
    frame: Vec<u32>,
    last_present: Option<Instant>,
}

#[derive(Debug)]
enum Lifecycle {
    Closed,
    Open(Box<Session>),
}

/// 索引色 VGA 顯示裝置
///
/// `init()` 之後才能繪圖、設定調色盤或讀取輸入；`exit()` 釋放畫面與調色盤，
/// 之後的呼叫一律回傳 [`Error::NotOpen`]。
#[derive(Debug)]
pub struct Vga {
    config: Config,
    backend: Box<dyn Backend>,
    lifecycle: Lifecycle,
    presents: u64,
}

impl Vga {
    pub const WIDTH: usize = SCREEN_WIDTH;
    pub const HEIGHT: usize = SCREEN_HEIGHT;

    pub fn new(config: Config, backend: Box<dyn Backend>) -> Self {
        Self {
            config,
            backend,
            lifecycle: Lifecycle::Closed,
            presents: 0,
        }
    }

    /// 以 minifb 視窗顯示
    pub fn window(config: Config) -> Self {
        Self::new(config, Box::new(MinifbBackend::new()))
    }

    /// 不開視窗，畫面與輸入透過 [`HeadlessRemote`] 存取
    pub fn headless(config: Config) -> (Self, HeadlessRemote) {
        let (backend, remote) = HeadlessBackend::new();
        (Self::new(config, Box::new(backend)), remote)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> DeviceState {
        match self.lifecycle {
            Lifecycle::Closed => DeviceState::Closed,
            Lifecycle::Open(_) => DeviceState::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == DeviceState::Open
    }

    /// 後端是否仍可顯示（例如視窗沒有被使用者關閉）
    pub fn window_open(&self) -> bool {
        self.is_open() && self.backend.is_open()
    }

    pub fn present_count(&self) -> u64 {
        self.presents
    }

    // ------------------------------------------------------------------
    // 生命週期
    // ------------------------------------------------------------------

    pub fn init(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(Error::AlreadyOpen);
        }
        self.config.validate()?;
        let background = check_index(self.config.video.background)?;

        self.backend
            .open(SCREEN_WIDTH, SCREEN_HEIGHT, &self.config.video)?;

        let mut session = Box::new(Session {
            framebuffer: Framebuffer::new(SCREEN_WIDTH, SCREEN_HEIGHT, background),
            palette: Palette::new(),
            input: InputPoller::new(),
            frame: Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT),
            last_present: None,
        });

        // 第一個畫面顯示成功才算開啟
        let cursor = Cursor::for_kind(self.config.input.cursor);
        if let Err(err) = Self::show(self.backend.as_mut(), &mut session, cursor) {
            self.backend.close();
            return Err(err);
        }
        self.presents += 1;
        self.lifecycle = Lifecycle::Open(session);
        info!(
            "VGA 已開啟: {}x{}, {} 色",
            SCREEN_WIDTH, SCREEN_HEIGHT, PALETTE_SIZE
        );
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Closed) {
            Lifecycle::Closed => Err(Error::NotOpen),
            Lifecycle::Open(_) => {
                self.backend.close();
                info!("VGA 已關閉，共更新 {} 個畫面", self.presents);
                Ok(())
            }
        }
    }

    fn session(&self) -> Result<&Session> {
        match &self.lifecycle {
            Lifecycle::Open(session) => Ok(session),
            Lifecycle::Closed => Err(Error::NotOpen),
        }
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        match &mut self.lifecycle {
            Lifecycle::Open(session) => Ok(session),
            Lifecycle::Closed => Err(Error::NotOpen),
        }
    }

    /// 執行會改變畫面或調色盤的操作，成功後依更新策略顯示
    fn mutate<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let value = op(self.session_mut()?)?;

        let due = match self.config.video.present {
            PresentPolicy::EveryCall => true,
            PresentPolicy::Manual => false,
            PresentPolicy::Throttled { interval_ms } => {
                let interval = Duration::from_millis(interval_ms);
                self.session()?
                    .last_present
                    .map_or(true, |at| at.elapsed() >= interval)
            }
        };
        if due {
            self.present()?;
        }
        Ok(value)
    }

    /// 立即把畫面經調色盤轉換後交給後端
    pub fn present(&mut self) -> Result<()> {
        let cursor = Cursor::for_kind(self.config.input.cursor);
        let session = match &mut self.lifecycle {
            Lifecycle::Open(session) => session,
            Lifecycle::Closed => return Err(Error::NotOpen),
        };
        Self::show(self.backend.as_mut(), session, cursor)?;
        self.presents += 1;
        trace!("畫面更新 #{}", self.presents);
        Ok(())
    }

    fn show(
        backend: &mut dyn Backend,
        session: &mut Session,
        cursor: Option<&Cursor>,
    ) -> Result<()> {
        let Session {
            framebuffer,
            palette,
            input,
            frame,
            last_present,
        } = session;

        framebuffer.render_into(palette, frame);
        if let (Some(cursor), Ok(mouse)) = (cursor, input.mouse_record()) {
            cursor.composite(frame, SCREEN_WIDTH, SCREEN_HEIGHT, mouse.x, mouse.y, palette);
        }
        backend.present(frame, SCREEN_WIDTH, SCREEN_HEIGHT)?;
        *last_present = Some(Instant::now());
        Ok(())
    }

    /// 休息一段時間，期間持續更新畫面讓視窗保持回應
    pub fn idle(&mut self, duration: Duration) -> Result<()> {
        let slice = self
            .config
            .video
            .present
            .interval()
            .unwrap_or(Duration::from_millis(16));
        let deadline = Instant::now() + duration;
        loop {
            self.present()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep(slice.min(deadline - now));
        }
    }

    // ------------------------------------------------------------------
    // 調色盤
    // ------------------------------------------------------------------

    pub fn set_color(&mut self, index: usize, red: u8, green: u8, blue: u8) -> Result<()> {
        self.mutate(|s| s.palette.set(index, Rgb::new(red, green, blue)))
    }

    pub fn get_color(&self, index: usize) -> Result<Rgb> {
        self.session()?.palette.get(index)
    }

    /// 從索引 0 開始整批設定
    pub fn set_palette(&mut self, colors: &[Rgb]) -> Result<()> {
        self.mutate(|s| s.palette.load(colors))?;
        debug!("調色盤已載入 {} 色", colors.len());
        Ok(())
    }

    pub fn palette(&self) -> Result<Vec<Rgb>> {
        Ok(self.session()?.palette.entries().to_vec())
    }

    pub fn grayscale_palette(&mut self) -> Result<()> {
        self.mutate(|s| {
            s.palette = Palette::grayscale();
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // 像素與圖形
    // ------------------------------------------------------------------

    pub fn set_pixel(&mut self, x: i32, y: i32, color: usize) -> Result<()> {
        self.mutate(|s| s.framebuffer.set_pixel(x, y, color))
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Result<u8> {
        self.session()?.framebuffer.get_pixel(x, y)
    }

    pub fn clear(&mut self, color: usize) -> Result<()> {
        self.mutate(|s| s.framebuffer.clear(color))
    }

    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: usize) -> Result<()> {
        self.mutate(|s| {
            raster::line(&mut s.framebuffer, Point::new(x0, y0), Point::new(x1, y1), color)
        })
    }

    pub fn rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: usize) -> Result<()> {
        self.mutate(|s| {
            raster::rect(&mut s.framebuffer, Point::new(x0, y0), Point::new(x1, y1), color)
        })
    }

    pub fn filled_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: usize) -> Result<()> {
        self.mutate(|s| {
            raster::filled_rect(&mut s.framebuffer, Point::new(x0, y0), Point::new(x1, y1), color)
        })
    }

    pub fn circle(&mut self, cx: i32, cy: i32, radius: i32, color: usize) -> Result<()> {
        self.mutate(|s| raster::circle(&mut s.framebuffer, Point::new(cx, cy), radius, color))
    }

    pub fn filled_circle(&mut self, cx: i32, cy: i32, radius: i32, color: usize) -> Result<()> {
        self.mutate(|s| {
            raster::filled_circle(&mut s.framebuffer, Point::new(cx, cy), radius, color)
        })
    }

    pub fn polygon(&mut self, vertices: &[Point], color: usize) -> Result<()> {
        self.mutate(|s| raster::polygon(&mut s.framebuffer, vertices, color))
    }

    // ------------------------------------------------------------------
    // 點陣圖
    // ------------------------------------------------------------------

    /// 複製畫面上的一塊區域，附帶目前的調色盤
    pub fn capture(&self, x: i32, y: i32, width: usize, height: usize) -> Result<Bitmap> {
        let session = self.session()?;
        if width == 0 || height == 0 {
            return Err(Error::invalid_argument(format!(
                "擷取區域不可為空: {}x{}",
                width, height
            )));
        }
        let fb = &session.framebuffer;
        if !fb.contains(x, y) {
            return Err(Error::OutOfBounds { x, y });
        }

        let (left, top) = (x as usize, y as usize);
        if width > SCREEN_WIDTH - left || height > SCREEN_HEIGHT - top {
            let far = |start: usize, len: usize| {
                i32::try_from(start.saturating_add(len - 1)).unwrap_or(i32::MAX)
            };
            return Err(Error::OutOfBounds {
                x: far(left, width),
                y: far(top, height),
            });
        }

        let mut data = Vec::with_capacity(width * height);
        for row in top..top + height {
            if let Some(line) = fb.row(row) {
                data.extend_from_slice(&line[left..left + width]);
            }
        }
        Bitmap::from_parts(width, height, Some(session.palette.entries().to_vec()), data)
    }

    /// 把點陣圖貼到 (x, y)，超出畫面的部分裁切
    pub fn draw_bitmap(
        &mut self,
        bitmap: &Bitmap,
        x: i32,
        y: i32,
        apply_palette: bool,
    ) -> Result<()> {
        self.mutate(|s| {
            if apply_palette {
                if let Some(colors) = bitmap.palette() {
                    s.palette.load(colors)?;
                }
            }
            for by in 0..bitmap.height() {
                for (bx, &index) in bitmap.row(by).iter().enumerate() {
                    s.framebuffer
                        .plot(x.saturating_add(bx as i32), y.saturating_add(by as i32), index);
                }
            }
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // 文字
    // ------------------------------------------------------------------

    /// 以點陣字型畫一個字元，回傳字元寬度；字型沒有的字元回傳 0
    pub fn render_char(
        &mut self,
        font: &Bitmap,
        x: i32,
        y: i32,
        ch: char,
        color: usize,
    ) -> Result<usize> {
        self.mutate(|s| {
            let color = check_index(color)?;
            Ok(font::render_char(&mut s.framebuffer, font, Point::new(x, y), ch, color))
        })
    }

    /// 畫多行文字，回傳最後一行的寬度
    pub fn render_string(
        &mut self,
        font: &Bitmap,
        x: i32,
        y: i32,
        text: &str,
        color: usize,
    ) -> Result<usize> {
        self.mutate(|s| {
            let color = check_index(color)?;
            Ok(font::render_string(&mut s.framebuffer, font, Point::new(x, y), text, color))
        })
    }

    // ------------------------------------------------------------------
    // 輸入
    // ------------------------------------------------------------------

    /// 取出最新的按鍵，讀取後清除
    pub fn keyboard_poll(&mut self) -> Result<Option<Key>> {
        self.present()?;
        let session = match &mut self.lifecycle {
            Lifecycle::Open(session) => session,
            Lifecycle::Closed => return Err(Error::NotOpen),
        };
        Ok(session.input.keyboard_poll(self.backend.as_mut()))
    }

    /// 啟用滑鼠追蹤，丟棄啟用前累積的取樣
    pub fn mouse_init(&mut self) -> Result<()> {
        let session = match &mut self.lifecycle {
            Lifecycle::Open(session) => session,
            Lifecycle::Closed => return Err(Error::NotOpen),
        };
        session.input.mouse_init(self.backend.as_mut());
        Ok(())
    }

    /// 更新滑鼠狀態，回傳是否收到新的取樣
    pub fn mouse_update(&mut self, blocking: bool) -> Result<bool> {
        if !self.session()?.input.mouse_ready() {
            return Err(Error::NotInitialized("滑鼠"));
        }
        self.present()?;
        if !self.backend.is_open() {
            warn!("後端已關閉，滑鼠狀態不再更新");
        }

        let timeout = self.config.input.mouse_wait_timeout();
        let session = match &mut self.lifecycle {
            Lifecycle::Open(session) => session,
            Lifecycle::Closed => return Err(Error::NotOpen),
        };
        let fresh = session
            .input
            .mouse_update(self.backend.as_mut(), blocking, timeout)?;

        // 游標跟著移動
        if fresh && self.config.input.cursor != crate::config::CursorKind::None {
            self.present()?;
        }
        Ok(fresh)
    }

    pub fn mouse_x(&self) -> Result<i32> {
        self.session()?.input.mouse_x()
    }

    pub fn mouse_y(&self) -> Result<i32> {
        self.session()?.input.mouse_y()
    }

    pub fn mouse_buttons(&self) -> Result<MouseRecord> {
        self.session()?.input.mouse_record()
    }

    pub fn mouse_pressed(&mut self, button: MouseButton) -> Result<u32> {
        self.session_mut()?.input.mouse_pressed(button)
    }

    pub fn mouse_released(&mut self, button: MouseButton) -> Result<u32> {
        self.session_mut()?.input.mouse_released(button)
    }
}

impl Drop for Vga {
    fn drop(&mut self) {
        if self.is_open() {
            debug!("VGA 在開啟狀態下被釋放，自動關閉");
            self.backend.close();
        }
    }
}
