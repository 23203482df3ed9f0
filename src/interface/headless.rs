//! In-memory backend: keeps the last presented frame and takes input from a
//! [`HeadlessRemote`] over a channel. Useful for tests and offscreen rendering.

use super::{push_bounded, Backend};
use crate::config::VideoConfig;
use crate::error::{Error, Result};
use crate::input::{Key, MouseRecord};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug)]
enum InputEvent {
    Key(Key),
    Mouse(MouseRecord),
}

#[derive(Debug, Default)]
struct Screen {
    open: bool,
    width: usize,
    height: usize,
    frame: Vec<u32>,
    presents: u64,
}

fn lock(screen: &Mutex<Screen>) -> MutexGuard<'_, Screen> {
    screen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
pub struct HeadlessBackend {
    screen: Arc<Mutex<Screen>>,
    events: Receiver<InputEvent>,
    keys: VecDeque<Key>,
    mice: VecDeque<MouseRecord>,
    mouse: MouseRecord,
}

/// Handle for feeding input to, and inspecting output of, a [`HeadlessBackend`].
#[derive(Debug, Clone)]
pub struct HeadlessRemote {
    screen: Arc<Mutex<Screen>>,
    events: Sender<InputEvent>,
}

impl HeadlessBackend {
    pub fn new() -> (Self, HeadlessRemote) {
        let (tx, rx) = mpsc::channel();
        let screen = Arc::new(Mutex::new(Screen::default()));
        let backend = Self {
            screen: Arc::clone(&screen),
            events: rx,
            keys: VecDeque::new(),
            mice: VecDeque::new(),
            mouse: MouseRecord::default(),
        };
        (backend, HeadlessRemote { screen, events: tx })
    }

    fn accept(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(key) => push_bounded(&mut self.keys, key),
            InputEvent::Mouse(sample) => push_bounded(&mut self.mice, sample),
        }
    }

    fn drain(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.accept(event);
        }
    }

    fn take_mouse(&mut self) -> Option<MouseRecord> {
        let sample = self.mice.pop_front()?;
        self.mouse = sample;
        Some(sample)
    }
}

impl Backend for HeadlessBackend {
    fn open(&mut self, width: usize, height: usize, _video: &VideoConfig) -> Result<()> {
        let mut screen = lock(&self.screen);
        screen.open = true;
        screen.width = width;
        screen.height = height;
        screen.frame = vec![0; width * height];
        Ok(())
    }

    fn close(&mut self) {
        lock(&self.screen).open = false;
    }

    fn is_open(&self) -> bool {
        lock(&self.screen).open
    }

    fn present(&mut self, frame: &[u32], width: usize, height: usize) -> Result<()> {
        let mut screen = lock(&self.screen);
        if !screen.open {
            return Err(Error::Display("headless screen is closed".to_string()));
        }
        if frame.len() != width * height {
            return Err(Error::Display(format!(
                "frame size mismatch: expected {} words, got {}",
                width * height,
                frame.len()
            )));
        }
        screen.width = width;
        screen.height = height;
        screen.frame.clear();
        screen.frame.extend_from_slice(frame);
        screen.presents += 1;
        Ok(())
    }

    fn next_key(&mut self) -> Option<Key> {
        self.drain();
        self.keys.pop_front()
    }

    fn next_mouse_sample(&mut self) -> Option<MouseRecord> {
        self.drain();
        self.take_mouse()
    }

    fn wait_mouse_sample(&mut self, timeout: Option<Duration>) -> Option<MouseRecord> {
        self.drain();
        if let Some(sample) = self.take_mouse() {
            return Some(sample);
        }

        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let event = match deadline {
                None => self.events.recv().ok()?,
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    match self.events.recv_timeout(left) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                            return None
                        }
                    }
                }
            };
            self.accept(event);
            if let Some(sample) = self.take_mouse() {
                return Some(sample);
            }
        }
    }

    fn current_mouse(&self) -> MouseRecord {
        self.mouse
    }
}

impl HeadlessRemote {
    pub fn press(&self, key: Key) {
        // the backend may already be dropped; input to nowhere is fine
        let _ = self.events.send(InputEvent::Key(key));
    }

    pub fn move_mouse(&self, sample: MouseRecord) {
        let _ = self.events.send(InputEvent::Mouse(sample));
    }

    pub fn is_open(&self) -> bool {
        lock(&self.screen).open
    }

    pub fn present_count(&self) -> u64 {
        lock(&self.screen).presents
    }

    pub fn frame(&self) -> Vec<u32> {
        lock(&self.screen).frame.clone()
    }

    /// Presented `0x00RRGGBB` value at (x, y), if on screen.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        let screen = lock(&self.screen);
        if x < screen.width && y < screen.height {
            screen.frame.get(y * screen.width + x).copied()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::MAX_PENDING_EVENTS;

    #[test]
    fn test_present_records_frame() {
        let (mut backend, remote) = HeadlessBackend::new();
        assert!(backend.present(&[1, 2], 2, 1).is_err());

        backend.open(2, 1, &VideoConfig::default()).unwrap();
        backend.present(&[0x00FF_0000, 0x0000_00FF], 2, 1).unwrap();
        assert_eq!(remote.present_count(), 1);
        assert_eq!(remote.pixel(1, 0), Some(0x0000_00FF));
        assert_eq!(remote.pixel(2, 0), None);

        assert!(backend.present(&[0; 3], 2, 1).is_err());
        backend.close();
        assert!(!remote.is_open());
    }

    #[test]
    fn test_wait_keeps_keys_for_later() {
        let (mut backend, remote) = HeadlessBackend::new();
        remote.press(Key::Char('q'));
        remote.move_mouse(MouseRecord::new(3, 4));
        let sample = backend.wait_mouse_sample(Some(Duration::from_millis(10)));
        assert_eq!(sample, Some(MouseRecord::new(3, 4)));
        assert_eq!(backend.current_mouse(), MouseRecord::new(3, 4));
        assert_eq!(backend.next_key(), Some(Key::Char('q')));
    }

    #[test]
    fn test_pending_input_is_capped() {
        let (mut backend, remote) = HeadlessBackend::new();
        for i in 0..MAX_PENDING_EVENTS as i32 + 20 {
            remote.move_mouse(MouseRecord::new(i, 0));
            remote.press(Key::Char('a'));
        }
        remote.press(Key::Escape);

        let mut samples = Vec::new();
        while let Some(sample) = backend.next_mouse_sample() {
            samples.push(sample.x);
        }
        assert_eq!(samples.len(), MAX_PENDING_EVENTS);
        assert_eq!(samples.first(), Some(&20));
        assert_eq!(samples.last(), Some(&(MAX_PENDING_EVENTS as i32 + 19)));

        let mut keys = Vec::new();
        while let Some(key) = backend.next_key() {
            keys.push(key);
        }
        assert_eq!(keys.len(), MAX_PENDING_EVENTS);
        assert_eq!(keys.last(), Some(&Key::Escape));
    }

    #[test]
    fn test_wait_returns_when_remote_dropped() {
        let (mut backend, remote) = HeadlessBackend::new();
        drop(remote);
        assert_eq!(backend.wait_mouse_sample(None), None);
    }
}
