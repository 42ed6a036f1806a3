//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per frame, wall-clock time only for timers and pauses
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod level;
pub mod powerup;
pub mod state;
pub mod tick;

pub use collision::{CollisionOutcome, resolve_ball};
pub use geometry::Rect;
pub use level::{LEVELS, LevelError, generate_board};
pub use powerup::{ActivationRecord, PowerUps};
pub use state::{
    Ball, BallRole, Block, BlockColor, GameEvent, GamePhase, GameState, Paddle, PowerUpKind,
};
pub use tick::{TickInput, tick};
