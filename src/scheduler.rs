//! Frame-coalesced redraws and trailing-edge debouncing.
//!
//! Nothing here spawns timers. The host calls `tick` once per frame and the
//! session asks its scheduler and debouncers what became due.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::util::time::current_time_millis;

/// Debounce window for crop actions.
pub const DEFAULT_DEBOUNCE_MS: f64 = 16.0;

pub trait Clock: Send + Sync {
    /// Milliseconds, monotonic enough for debouncing.
    fn now_ms(&self) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        current_time_millis()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Arc::new(Mutex::new(start_ms)),
        }
    }

    pub fn set(&self, ms: f64) {
        *self.now.lock() = ms;
    }

    pub fn advance(&self, ms: f64) {
        *self.now.lock() += ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        *self.now.lock()
    }
}

/// At most one pending repaint.
#[derive(Debug, Default)]
pub struct RedrawScheduler {
    pending: bool,
    requests: u64,
}

impl RedrawScheduler {
    /// Returns true when this request started a new pending frame.
    pub fn request(&mut self) -> bool {
        self.requests += 1;
        !std::mem::replace(&mut self.pending, true)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consumes the pending repaint, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    /// Total requests seen, coalesced or not.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

/// Trailing-edge coalescer: a new call replaces the pending one and restarts
/// the window.
#[derive(Debug)]
pub struct Debouncer<T> {
    window_ms: f64,
    pending: Option<(T, f64)>,
}

impl<T> Debouncer<T> {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            pending: None,
        }
    }

    pub fn call(&mut self, value: T, now_ms: f64) {
        self.pending = Some((value, now_ms + self.window_ms));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending value once its window has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        match self.pending {
            Some((_, due)) if now_ms >= due => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// The pending value regardless of time.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}
