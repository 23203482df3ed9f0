use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// 把 `log` 巨集的輸出寫到 stderr，並可選擇同時寫入檔案
#[derive(Debug)]
pub struct Logger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
    path: Option<PathBuf>,
}

impl Logger {
    pub fn new(level: LevelFilter) -> Self {
        Logger {
            level,
            file: None,
            path: None,
        }
    }

    /// 在 `log_dir` 下建立 `retro_vga_<時間>.log`
    pub fn with_log_dir(mut self, log_dir: &Path) -> Result<Self> {
        fs::create_dir_all(log_dir)?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = log_dir.join(format!("retro_vga_{}.log", timestamp));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.file = Some(Mutex::new(file));
        self.path = Some(path);
        Ok(self)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn format(record: &Record) -> String {
        format!(
            "[{}] [{:<5}] [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::format(record);
        let _ = writeln!(io::stderr(), "{}", line);
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{}", line);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

/// 安裝全域 logger，整個程式只能呼叫一次
pub fn init(level: LevelFilter, log_dir: Option<&Path>) -> Result<()> {
    let mut logger = Logger::new(level);
    if let Some(dir) = log_dir {
        logger = logger.with_log_dir(dir)?;
    }
    let path = logger.path().map(Path::to_path_buf);

    log::set_logger(Box::leak(Box::new(logger)))
        .map_err(|e| Error::invalid_argument(format!("logger 已經安裝: {}", e)))?;
    log::set_max_level(level);

    if let Some(path) = path {
        log::info!("日誌檔案: {}", path.display());
    }
    Ok(())
}
