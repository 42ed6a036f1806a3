//! Axis-aligned geometry for a rectangular arena
//!
//! Everything in the arena is either a circle (balls, pickups, bullets) or an
//! axis-aligned rectangle (paddle, blocks). Screen convention: +y points down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Grow the rectangle by `amount` on every side (Minkowski sum with a square)
    pub fn inflate(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.w + 2.0 * amount,
            self.h + 2.0 * amount,
        )
    }

    /// Inclusive point containment
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }
}

/// Reflect one velocity component (elastic, no energy loss)
#[inline]
pub fn reflect_axis(component: f32) -> f32 {
    -component
}

/// Circle vs. rectangle overlap using the radius-inflated AABB test
///
/// Corners are treated as square, which over-reports hits within `radius`
/// of a corner. At the speeds involved this is indistinguishable from the
/// exact test and keeps block hits symmetric with the edge windows.
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    rect.inflate(radius).contains(center)
}

/// Outgoing horizontal velocity after a paddle hit
///
/// Linear in the offset between ball and paddle centers: the paddle center
/// sends the ball straight up, either edge gives `±max_vel`.
pub fn paddle_bounce_angle(ball_x: f32, max_vel: f32, paddle: &Rect) -> f32 {
    let center_x = paddle.x + paddle.w / 2.0;
    let reduction_factor = (paddle.w / 2.0) / max_vel;
    -((center_x - ball_x) / reduction_factor)
}
