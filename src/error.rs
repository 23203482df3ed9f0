use std::io;
use thiserror::Error;

/// VGA 顯示子系統的錯誤類型
#[derive(Error, Debug)]
pub enum Error {
    /// 裝置已開啟
    #[error("裝置已開啟")]
    AlreadyOpen,

    /// 裝置尚未開啟
    #[error("裝置尚未開啟")]
    NotOpen,

    /// 色彩索引超出範圍
    #[error("無效的色彩索引: {index} (上限 {limit})")]
    InvalidIndex { index: usize, limit: usize },

    /// 讀取座標超出畫面
    #[error("座標超出範圍: ({x}, {y})")]
    OutOfBounds { x: i32, y: i32 },

    /// 無效的參數
    #[error("無效的參數: {0}")]
    InvalidArgument(String),

    /// 尚未初始化
    #[error("{0} 尚未初始化")]
    NotInitialized(&'static str),

    /// IO 錯誤
    #[error("IO 錯誤: {0}")]
    IO(#[from] io::Error),

    /// 視窗後端錯誤
    #[error("顯示錯誤: {0}")]
    Display(String),

    /// BMP 格式錯誤
    #[error("BMP 錯誤: {0}")]
    Bitmap(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// 呼叫端誤用（而非環境問題）造成的錯誤
    pub fn is_usage_error(&self) -> bool {
        !matches!(self, Error::IO(_) | Error::Display(_) | Error::Bitmap(_))
    }
}

impl From<minifb::Error> for Error {
    fn from(err: minifb::Error) -> Self {
        Error::Display(err.to_string())
    }
}

/// 結果類型
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors() {
        assert!(Error::NotOpen.is_usage_error());
        assert!(Error::InvalidIndex { index: 300, limit: 256 }.is_usage_error());
        assert!(!Error::Display("gone".to_string()).is_usage_error());
    }

    #[test]
    fn test_messages_carry_context() {
        let msg = Error::OutOfBounds { x: -1, y: 200 }.to_string();
        assert!(msg.contains("-1"));
        assert!(msg.contains("200"));
    }
}
