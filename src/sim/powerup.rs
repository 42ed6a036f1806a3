//! Power-up spawn, activation and expiry
//!
//! Timed kinds (enlarge, sticky, shooting) keep an always-present
//! `ActivationRecord`. At most one instance of each kind is active; catching
//! a kind that is already active changes nothing. Expiry is measured against
//! the wall clock passed into each frame.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Ball, GameEvent, GameState, PowerUpKind};

/// Lateral bias of the left-hand multi-ball split, as a fraction of max speed
const SPLIT_LEFT_BIAS: f32 = 0.4;
/// Vertical scale of the left-hand split (flatter)
const SPLIT_LEFT_STEEPNESS: f32 = 0.8;
/// Lateral bias of the right-hand split, as a fraction of max speed
const SPLIT_RIGHT_BIAS: f32 = 0.2;
/// Vertical scale of the right-hand split (steeper)
const SPLIT_RIGHT_STEEPNESS: f32 = 1.2;

/// Activation state of one timed power-up
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivationRecord {
    pub active: bool,
    /// Wall-clock seconds at activation
    pub started_at: f64,
}

impl ActivationRecord {
    pub fn start(&mut self, now: f64) {
        self.active = true;
        self.started_at = now;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_expired(&self, now: f64, duration: f64) -> bool {
        self.active && now - self.started_at >= duration
    }

    /// Seconds left before expiry (0 when inactive)
    pub fn remaining(&self, now: f64, duration: f64) -> f64 {
        if self.active {
            (duration - (now - self.started_at)).max(0.0)
        } else {
            0.0
        }
    }
}

/// Active power-up effects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUps {
    pub enlarge: ActivationRecord,
    pub sticky: ActivationRecord,
    /// Armed shooting window
    pub shooting: ActivationRecord,
}

impl PowerUps {
    /// Record for a timed kind; multi-ball has none
    pub fn record(&self, kind: PowerUpKind) -> Option<&ActivationRecord> {
        match kind {
            PowerUpKind::Enlarge => Some(&self.enlarge),
            PowerUpKind::Sticky => Some(&self.sticky),
            PowerUpKind::Shooting => Some(&self.shooting),
            PowerUpKind::MultiBall => None,
        }
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.record(kind).is_some_and(|r| r.active)
    }

    pub fn clear(&mut self) {
        self.enlarge.clear();
        self.sticky.clear();
        self.shooting.clear();
    }
}

/// Decide whether a destroyed block drops a pickup, and which kind
///
/// Panics if `chance` lies outside `[0, 1]`.
pub fn roll_spawn<R: Rng>(rng: &mut R, chance: f32) -> Option<PowerUpKind> {
    assert!(
        (0.0..=1.0).contains(&chance),
        "power-up spawn chance {chance} outside [0, 1]"
    );
    if rng.random::<f32>() >= chance {
        return None;
    }
    let index = rng.random_range(0..PowerUpKind::ALL.len());
    Some(PowerUpKind::ALL[index])
}

/// Roll for a pickup at `pos` and spawn it as a falling ball
pub fn maybe_spawn_pickup(state: &mut GameState, pos: Vec2, events: &mut Vec<GameEvent>) {
    let chance = state.config().powerup_spawn_chance;
    let Some(kind) = roll_spawn(state.rng_mut(), chance) else {
        return;
    };

    let id = state.next_entity_id();
    let ball = Ball::power_up(id, kind, pos, state.config());
    state.balls.push(ball);
    log::debug!("Spawned {} pickup at ({:.0}, {:.0})", kind.as_str(), pos.x, pos.y);
    events.push(GameEvent::PowerUpSpawned { kind });
}

/// Apply a caught pickup
pub fn activate(state: &mut GameState, kind: PowerUpKind, now: f64, events: &mut Vec<GameEvent>) {
    events.push(GameEvent::PowerUpCaught { kind });

    if state.powerups.is_active(kind) {
        log::debug!("{} already active, ignoring pickup", kind.as_str());
        return;
    }

    match kind {
        PowerUpKind::Enlarge => {
            let width = state.config().paddle_enlarged_width;
            state.resize_paddle(width);
            state.powerups.enlarge.start(now);
        }
        PowerUpKind::MultiBall => split_primary(state),
        PowerUpKind::Sticky => {
            for ball in state.balls.iter_mut().filter(|b| b.is_primary()) {
                ball.sticky = true;
            }
            state.powerups.sticky.start(now);
        }
        PowerUpKind::Shooting => state.powerups.shooting.start(now),
    }
    log::info!("Power-up activated: {}", kind.as_str());
}

/// Two extra primary balls from the first primary ball
fn split_primary(state: &mut GameState) {
    let Some(source) = state.balls.iter().find(|b| b.is_primary()).cloned() else {
        unreachable!("multi-ball caught with no primary ball in play");
    };

    let base = if source.is_glued() || source.vel == Vec2::ZERO {
        Vec2::new(0.0, -source.max_vel)
    } else {
        source.vel
    };
    let left = Vec2::new(
        base.x - source.max_vel * SPLIT_LEFT_BIAS,
        base.y * SPLIT_LEFT_STEEPNESS,
    );
    let right = Vec2::new(
        base.x + source.max_vel * SPLIT_RIGHT_BIAS,
        base.y * SPLIT_RIGHT_STEEPNESS,
    );

    let sticky = state.powerups.sticky.active;
    for vel in [left, right] {
        let id = state.next_entity_id();
        let mut ball = Ball::primary(id, state.config());
        ball.pos = source.pos;
        ball.vel = vel;
        ball.sticky = sticky;
        state.balls.push(ball);
    }
}

/// Release every glued ball; returns how many left the paddle
pub fn release_glued(state: &mut GameState) -> usize {
    let mut released = 0;
    for ball in state.balls.iter_mut().filter(|b| b.is_glued()) {
        ball.release();
        released += 1;
    }
    released
}

/// Handle the fire signal: release glued balls and shoot if armed
pub fn fire(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let released = release_glued(state);
    if released > 0 {
        events.push(GameEvent::BallsReleased { count: released });
    }

    if !state.powerups.shooting.active {
        return;
    }

    let radius = state.config().bullet_radius;
    let paddle = state.paddle.rect();
    for x in [paddle.left(), paddle.right()] {
        let id = state.next_entity_id();
        let bullet = Ball::bullet(id, Vec2::new(x, paddle.top() - radius), state.config());
        state.balls.push(bullet);
    }
    state.powerups.shooting.clear();
    events.push(GameEvent::BulletsFired);
}

/// Expire timed power-ups and revert their effects
pub fn update_timers(state: &mut GameState, now: f64, events: &mut Vec<GameEvent>) {
    let config = state.config();
    let enlarge_secs = config.enlarge_duration_secs;
    let sticky_secs = config.sticky_duration_secs;
    let shooting_secs = config.shooting_duration_secs;

    if state.powerups.enlarge.is_expired(now, enlarge_secs) {
        let base = state.paddle.base_width;
        state.resize_paddle(base);
        state.powerups.enlarge.clear();
        expired(PowerUpKind::Enlarge, events);
    }

    if state.powerups.sticky.is_expired(now, sticky_secs) {
        let released = release_glued(state);
        if released > 0 {
            events.push(GameEvent::BallsReleased { count: released });
        }
        for ball in state.balls.iter_mut() {
            ball.sticky = false;
        }
        state.powerups.sticky.clear();
        expired(PowerUpKind::Sticky, events);
    }

    if state.powerups.shooting.is_expired(now, shooting_secs) {
        state.powerups.shooting.clear();
        expired(PowerUpKind::Shooting, events);
    }
}

fn expired(kind: PowerUpKind, events: &mut Vec<GameEvent>) {
    log::info!("Power-up expired: {}", kind.as_str());
    events.push(GameEvent::PowerUpExpired { kind });
}
