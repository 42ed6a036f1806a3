//! Arkanoid - a Breakout clone with power-ups and a level sequence
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (physics, collisions, power-ups, progression)
//! - `config`: Immutable game configuration passed into the simulation
//! - `platform`: Input and clock collaborator (terminal implementation included)
//! - `renderer`: Drawing collaborator and frame rendering
//! - `session`: Frame loop tying platform, simulation and renderer together

pub mod config;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod sim;

pub use config::{Config, ConfigError};
pub use session::Session;

/// Default game constants (the values `Config::default()` is built from)
pub mod consts {
    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Frame rate cap
    pub const TARGET_FPS: u32 = 60;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    /// Horizontal paddle movement per frame
    pub const PADDLE_SPEED: f32 = 4.0;
    /// Gap between paddle bottom and arena bottom, as a fraction of arena height
    pub const PADDLE_BOTTOM_MARGIN: f32 = 0.04;
    /// Paddle width while the enlarge power-up is active
    pub const PADDLE_ENLARGED_WIDTH: f32 = 150.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 7.0;
    /// Ball speed scale, also the starting downward speed
    pub const BALL_MAX_VEL: f32 = 5.0;

    /// Block grid
    pub const BLOCK_WIDTH: f32 = 50.0;
    pub const BLOCK_HEIGHT: f32 = 20.0;
    pub const BLOCK_ROW_SPACING: f32 = 20.0;
    /// Top of the first block row, as a fraction of arena height
    pub const BLOCK_TOP_OFFSET: f32 = 0.05;
    /// Edge-proximity window used to pick the bounce axis on a block hit
    pub const BLOCK_EDGE_WINDOW: f32 = 6.0;
    /// Reward per point of block HP
    pub const BLOCK_REWARD_PER_HP: u64 = 10;

    /// Score bonus for clearing a level
    pub const LEVEL_CLEAR_BONUS: u64 = 100;

    /// Power-ups
    pub const POWERUP_SPAWN_CHANCE: f32 = 0.2;
    pub const POWERUP_FALL_SPEED: f32 = 3.0;
    pub const ENLARGE_DURATION_SECS: f64 = 10.0;
    pub const STICKY_DURATION_SECS: f64 = 15.0;
    pub const SHOOTING_DURATION_SECS: f64 = 3.0;

    /// Bullets
    pub const BULLET_SPEED: f32 = 8.0;
    pub const BULLET_RADIUS: f32 = 3.0;

    /// Length of the "next level" / "you lose" / "you won" pauses
    pub const MESSAGE_PAUSE_SECS: f64 = 2.0;
}
