//! Terminal input via crossterm
//!
//! Puts the terminal in raw mode for the lifetime of the platform. Terminals
//! that support the keyboard enhancement protocol report key releases; on
//! the rest a key counts as held for a short window after its last press or
//! auto-repeat.

use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};

use super::{FrameClock, Key, KeyState, Platform, PlatformEvents};

/// How long a press keeps a key held when releases are not reported.
/// Long enough to bridge typical auto-repeat gaps.
const HOLD_WINDOW_SECS: f64 = 0.12;

/// Map a terminal key code to a game key
pub fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::Right),
        KeyCode::Char(' ') | KeyCode::Up => Some(Key::Fire),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Key::Quit),
        _ => None,
    }
}

/// Held state of one key
#[derive(Debug, Clone, Copy, Default)]
struct KeyLatch {
    last_press: Option<f64>,
}

impl KeyLatch {
    fn press(&mut self, now: f64) {
        self.last_press = Some(now);
    }

    fn release(&mut self) {
        self.last_press = None;
    }

    /// `window` is `None` when releases are reported explicitly
    fn is_held(&self, now: f64, window: Option<f64>) -> bool {
        match (self.last_press, window) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(at), Some(window)) => now - at < window,
        }
    }
}

#[derive(Debug, Default)]
struct HeldKeys {
    left: KeyLatch,
    right: KeyLatch,
    fire: KeyLatch,
}

impl HeldKeys {
    fn latch(&mut self, key: Key) -> Option<&mut KeyLatch> {
        match key {
            Key::Left => Some(&mut self.left),
            Key::Right => Some(&mut self.right),
            Key::Fire => Some(&mut self.fire),
            Key::Quit => None,
        }
    }

    fn apply(&mut self, key: &KeyEvent, mapped: Key, now: f64) {
        let Some(latch) = self.latch(mapped) else {
            return;
        };
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => latch.press(now),
            KeyEventKind::Release => latch.release(),
        }
    }

    fn snapshot(&self, now: f64, window: Option<f64>) -> KeyState {
        KeyState {
            left: self.left.is_held(now, window),
            right: self.right.is_held(now, window),
            fire: self.fire.is_held(now, window),
        }
    }
}

/// Crossterm-backed input and clock
pub struct TerminalPlatform {
    clock: FrameClock,
    held: HeldKeys,
    /// Keyboard enhancement flags were pushed; releases are reported
    reports_release: bool,
}

impl TerminalPlatform {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;

        let reports_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if reports_release {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        log::debug!("Terminal input ready (key releases reported: {reports_release})");

        Ok(Self {
            clock: FrameClock::new(),
            held: HeldKeys::default(),
            reports_release,
        })
    }

    fn hold_window(&self) -> Option<f64> {
        if self.reports_release {
            None
        } else {
            Some(HOLD_WINDOW_SECS)
        }
    }

    fn cleanup(&mut self) -> io::Result<()> {
        if self.reports_release {
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()
    }
}

impl Platform for TerminalPlatform {
    fn poll_events(&mut self) -> io::Result<PlatformEvents> {
        let now = self.clock.now();
        let mut events = PlatformEvents::default();

        while event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };

            // Raw mode swallows SIGINT
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                events.quit = true;
                continue;
            }

            let Some(mapped) = map_key(key.code) else {
                continue;
            };
            self.held.apply(&key, mapped, now);
            if key.kind == KeyEventKind::Press {
                if mapped == Key::Quit {
                    events.quit = true;
                }
                events.key_down.push(mapped);
            }
        }

        Ok(events)
    }

    fn key_state(&self) -> KeyState {
        self.held.snapshot(self.clock.now(), self.hold_window())
    }

    fn tick(&mut self, target_fps: u32) -> f64 {
        self.clock.tick(target_fps)
    }

    fn now(&self) -> f64 {
        self.clock.now()
    }
}

impl Drop for TerminalPlatform {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key(KeyCode::Left), Some(Key::Left));
        assert_eq!(map_key(KeyCode::Char('d')), Some(Key::Right));
        assert_eq!(map_key(KeyCode::Char(' ')), Some(Key::Fire));
        assert_eq!(map_key(KeyCode::Esc), Some(Key::Quit));
        assert_eq!(map_key(KeyCode::Char('x')), None);
    }

    #[test]
    fn test_press_expires_without_release_events() {
        let mut held = HeldKeys::default();
        held.apply(&press(KeyCode::Left), Key::Left, 1.0);

        let window = Some(HOLD_WINDOW_SECS);
        assert!(held.snapshot(1.05, window).left);
        assert!(!held.snapshot(1.0 + HOLD_WINDOW_SECS, window).left);
        assert!(!held.snapshot(1.05, window).right);
    }

    #[test]
    fn test_release_events_end_hold() {
        let mut held = HeldKeys::default();
        held.apply(&press(KeyCode::Right), Key::Right, 1.0);

        // Held indefinitely until the release arrives
        assert!(held.snapshot(30.0, None).right);

        held.apply(&release(KeyCode::Right), Key::Right, 30.0);
        assert!(!held.snapshot(30.0, None).right);
    }

    #[test]
    fn test_quit_has_no_latch() {
        let mut held = HeldKeys::default();
        held.apply(&press(KeyCode::Esc), Key::Quit, 1.0);
        assert_eq!(held.snapshot(1.0, None), KeyState::default());
    }
}
