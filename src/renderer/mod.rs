//! Rendering boundary
//!
//! The game draws through the `Canvas` trait in arena coordinates. Anything
//! about the output device (terminal size, cell scale) lives in the canvas
//! implementation, never in the simulation.

#[cfg(not(target_arch = "wasm32"))]
pub mod terminal;

use std::io;

use glam::Vec2;

use crate::sim::{BallRole, BlockColor, GameState, PowerUpKind, Rect};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const PINK: Rgb = Rgb(255, 0, 255);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const ORANGE: Rgb = Rgb(255, 160, 0);
    pub const CYAN: Rgb = Rgb(0, 255, 255);
}

/// Text styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Score and timers
    Score,
    /// Large centered phase messages
    Banner,
}

/// Drawing surface
///
/// Text is anchored at the horizontal center of its first line.
pub trait Canvas {
    fn clear(&mut self, color: Rgb);
    fn draw_rect(&mut self, rect: Rect, color: Rgb);
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Rgb);
    fn draw_text(&mut self, text: &str, pos: Vec2, font: Font, color: Rgb);
    fn present(&mut self) -> io::Result<()>;
}

pub fn block_color(color: BlockColor) -> Rgb {
    match color {
        BlockColor::Blue => Rgb::BLUE,
        BlockColor::Red => Rgb::RED,
        BlockColor::Green => Rgb::GREEN,
        BlockColor::Yellow => Rgb::YELLOW,
        BlockColor::Pink => Rgb::PINK,
    }
}

/// Color of a falling pickup; every kind is distinct
pub fn powerup_color(kind: PowerUpKind) -> Rgb {
    match kind {
        PowerUpKind::Enlarge => Rgb::GREEN,
        PowerUpKind::MultiBall => Rgb::CYAN,
        PowerUpKind::Sticky => Rgb::PINK,
        PowerUpKind::Shooting => Rgb::ORANGE,
    }
}

fn ball_color(role: BallRole) -> Rgb {
    match role {
        BallRole::Primary => Rgb::WHITE,
        BallRole::PowerUp(kind) => powerup_color(kind),
        BallRole::Bullet => Rgb::YELLOW,
    }
}

/// Draw one frame of `state` and present it
///
/// `now` is the same wall clock the simulation runs on; it drives the
/// power-up countdowns.
pub fn draw_frame<C: Canvas>(canvas: &mut C, state: &GameState, now: f64) -> io::Result<()> {
    let config = state.config();
    let width = config.arena_width;
    let height = config.arena_height;

    canvas.clear(Rgb::BLACK);

    canvas.draw_text(
        &state.score.to_string(),
        Vec2::new(width / 4.0, height / 3.0),
        Font::Score,
        Rgb::WHITE,
    );

    let timers = powerup_status(state, now);
    if !timers.is_empty() {
        canvas.draw_text(
            &timers,
            Vec2::new(width * 0.75, height / 3.0),
            Font::Score,
            Rgb::WHITE,
        );
    }

    canvas.draw_rect(state.paddle.rect(), Rgb::WHITE);

    for block in &state.blocks {
        canvas.draw_rect(block.rect, block_color(block.color));
    }

    for ball in &state.balls {
        canvas.draw_circle(ball.pos, ball.radius, ball_color(ball.role));
    }

    if let Some(banner) = state.phase.banner() {
        canvas.draw_text(
            banner,
            Vec2::new(width / 2.0, height / 2.0),
            Font::Banner,
            Rgb::WHITE,
        );
    }

    canvas.present()
}

/// "sticky 12s  enlarge 3s" style countdown of active timed power-ups
fn powerup_status(state: &GameState, now: f64) -> String {
    let config = state.config();
    let timed = [
        (PowerUpKind::Enlarge, config.enlarge_duration_secs),
        (PowerUpKind::Sticky, config.sticky_duration_secs),
        (PowerUpKind::Shooting, config.shooting_duration_secs),
    ];

    timed
        .iter()
        .filter_map(|&(kind, duration)| {
            let record = state.powerups.record(kind)?;
            record
                .active
                .then(|| format!("{} {:.0}s", kind.as_str(), record.remaining(now, duration).ceil()))
        })
        .collect::<Vec<_>>()
        .join("  ")
}
