// External interface module

pub mod headless;
pub mod window;

pub use headless::{HeadlessBackend, HeadlessRemote};
pub use window::MinifbBackend;

use crate::config::VideoConfig;
use crate::error::Result;
use crate::input::{Key, MouseRecord};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::time::Duration;

/// Pending key events and mouse samples kept per queue. Older entries are
/// dropped first once a queue is full.
pub const MAX_PENDING_EVENTS: usize = 64;

pub(crate) fn push_bounded<T>(queue: &mut VecDeque<T>, item: T) {
    if queue.len() >= MAX_PENDING_EVENTS {
        queue.pop_front();
    }
    queue.push_back(item);
}

/// The seam between the device and whatever actually shows pixels and
/// produces input.
///
/// Frames are handed over as `0x00RRGGBB` words, one per pixel, row-major.
pub trait Backend: Debug {
    fn open(&mut self, width: usize, height: usize, video: &VideoConfig) -> Result<()>;
    fn close(&mut self);
    fn is_open(&self) -> bool;
    fn present(&mut self, frame: &[u32], width: usize, height: usize) -> Result<()>;

    /// Pops one pending key event.
    fn next_key(&mut self) -> Option<Key>;
    /// Pops one pending mouse sample without waiting.
    fn next_mouse_sample(&mut self) -> Option<MouseRecord>;
    /// Blocks until a mouse sample arrives or `timeout` expires. Must not spin.
    fn wait_mouse_sample(&mut self, timeout: Option<Duration>) -> Option<MouseRecord>;
    /// Last known pointer state, regardless of pending samples.
    fn current_mouse(&self) -> MouseRecord;
}
