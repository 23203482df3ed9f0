pub mod input;
pub mod video;

pub use input::{CursorKind, InputConfig};
pub use video::{PresentPolicy, VideoConfig};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 全局配置結構
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub video: VideoConfig,
    pub input: InputConfig,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// 以預設值為基礎，套用 RETRO_VGA_* 環境變數
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(scale) = lookup("RETRO_VGA_SCALE") {
            config.video.scale = scale
                .trim()
                .parse()
                .map_err(|_| Error::invalid_argument(format!("RETRO_VGA_SCALE: {}", scale)))?;
        }
        if let Some(title) = lookup("RETRO_VGA_TITLE") {
            config.video.title = title;
        }
        if let Some(cursor) = lookup("RETRO_VGA_CURSOR") {
            config.input.cursor = match cursor.trim().to_ascii_lowercase().as_str() {
                "none" => CursorKind::None,
                "cross" => CursorKind::Cross,
                "pointer" => CursorKind::Pointer,
                other => {
                    return Err(Error::invalid_argument(format!(
                        "RETRO_VGA_CURSOR: {}",
                        other
                    )))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !VideoConfig::SUPPORTED_SCALES.contains(&self.video.scale) {
            return Err(Error::invalid_argument(format!(
                "不支援的縮放倍率: {}",
                self.video.scale
            )));
        }
        crate::palette::check_index(self.video.background)?;
        if let PresentPolicy::Throttled { interval_ms: 0 } = self.video.present {
            return Err(Error::invalid_argument("更新間隔不可為 0"));
        }
        Ok(())
    }
}

/// 配置構建器
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::new(),
        }
    }

    pub fn video_config(mut self, config: VideoConfig) -> Self {
        self.config.video = config;
        self
    }

    pub fn input_config(mut self, config: InputConfig) -> Self {
        self.config.input = config;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.video.title = title.into();
        self
    }

    pub fn scale(mut self, scale: u32) -> Self {
        self.config.video.scale = scale;
        self
    }

    pub fn background(mut self, index: usize) -> Self {
        self.config.video.background = index;
        self
    }

    pub fn present(mut self, policy: PresentPolicy) -> Self {
        self.config.video.present = policy;
        self
    }

    pub fn cursor(mut self, cursor: CursorKind) -> Self {
        self.config.input.cursor = cursor;
        self
    }

    pub fn mouse_wait_timeout_ms(mut self, timeout: Option<u64>) -> Self {
        self.config.input.mouse_wait_timeout_ms = timeout;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        ConfigBuilder::new()
    }
}
