use std::thread;
use std::time::Duration;

/// 秒數轉為 Duration，負數與 NaN 視為 0
pub fn seconds(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

/// 暫停目前執行緒
pub fn sleep(secs: f64) {
    let duration = seconds(secs);
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
