//! Platform abstraction layer
//!
//! Handles frontend differences for:
//! - Time/ticks (frame clock and frame-rate cap)
//! - Input events and held keys
//!
//! The simulation never talks to a platform directly; `Session` reads input
//! from one and turns it into a `TickInput`.

#[cfg(not(target_arch = "wasm32"))]
pub mod terminal;

use std::io;
use std::time::{Duration, Instant};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Fire,
    Quit,
}

/// Keys currently held down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

/// Discrete events since the last poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformEvents {
    /// Window closed / quit requested
    pub quit: bool,
    /// Keys pressed since the last poll, in arrival order
    pub key_down: Vec<Key>,
}

impl PlatformEvents {
    pub fn pressed(&self, key: Key) -> bool {
        self.key_down.contains(&key)
    }
}

/// Input and clock provided by the frontend
pub trait Platform {
    /// Drain pending input events
    fn poll_events(&mut self) -> io::Result<PlatformEvents>;

    /// Held-key snapshot
    fn key_state(&self) -> KeyState;

    /// Wait out the rest of the frame; returns seconds since the previous call
    fn tick(&mut self, target_fps: u32) -> f64;

    /// Monotonic wall clock in seconds
    fn now(&self) -> f64;
}

/// Monotonic clock with a sleep-based frame cap
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
        }
    }

    /// Seconds since the clock was created
    pub fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Sleep until `1 / target_fps` has passed since the previous frame
    pub fn tick(&mut self, target_fps: u32) -> f64 {
        let budget = Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1)));
        let spent = self.last_frame.elapsed();
        if spent < budget {
            std::thread::sleep(budget - spent);
        }

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        dt
    }
}
