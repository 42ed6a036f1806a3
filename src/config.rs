//! Game configuration
//!
//! One immutable `Config` is built at startup and handed to the simulation.
//! Every field has a default from `crate::consts`; a JSON file may override
//! any subset of them.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::level::{LEVELS, LevelError, validate_level};

/// Environment variable naming an optional JSON config file
pub const CONFIG_ENV_VAR: &str = "ARKANOID_CONFIG";

/// Errors raised while loading or validating a configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read
    Io(std::io::Error),
    /// Config file is not valid JSON for `Config`
    Parse(serde_json::Error),
    /// A level grid is malformed
    Level { index: usize, source: LevelError },
    /// A numeric setting is out of range
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {e}"),
            ConfigError::Level { index, source } => write!(f, "level {}: {source}", index + 1),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Level { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,
    pub target_fps: u32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_speed: f32,
    /// Gap below the paddle as a fraction of arena height
    pub paddle_bottom_margin: f32,
    pub paddle_enlarged_width: f32,

    // === Ball ===
    pub ball_radius: f32,
    pub ball_max_vel: f32,

    // === Blocks ===
    pub block_width: f32,
    pub block_height: f32,
    pub block_row_spacing: f32,
    /// Top of the first row as a fraction of arena height
    pub block_top_offset: f32,
    pub block_edge_window: f32,
    pub block_reward_per_hp: u64,
    pub level_clear_bonus: u64,

    // === Power-ups ===
    /// Probability that a destroyed block drops a pickup (0.0 - 1.0)
    pub powerup_spawn_chance: f32,
    pub powerup_fall_speed: f32,
    pub enlarge_duration_secs: f64,
    pub sticky_duration_secs: f64,
    pub shooting_duration_secs: f64,
    pub bullet_speed: f32,
    pub bullet_radius: f32,

    // === Progression ===
    pub message_pause_secs: f64,
    /// RNG seed for power-up rolls
    pub seed: u64,
    /// Level grids, one string per row
    pub levels: Vec<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            target_fps: TARGET_FPS,

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_speed: PADDLE_SPEED,
            paddle_bottom_margin: PADDLE_BOTTOM_MARGIN,
            paddle_enlarged_width: PADDLE_ENLARGED_WIDTH,

            ball_radius: BALL_RADIUS,
            ball_max_vel: BALL_MAX_VEL,

            block_width: BLOCK_WIDTH,
            block_height: BLOCK_HEIGHT,
            block_row_spacing: BLOCK_ROW_SPACING,
            block_top_offset: BLOCK_TOP_OFFSET,
            block_edge_window: BLOCK_EDGE_WINDOW,
            block_reward_per_hp: BLOCK_REWARD_PER_HP,
            level_clear_bonus: LEVEL_CLEAR_BONUS,

            powerup_spawn_chance: POWERUP_SPAWN_CHANCE,
            powerup_fall_speed: POWERUP_FALL_SPEED,
            enlarge_duration_secs: ENLARGE_DURATION_SECS,
            sticky_duration_secs: STICKY_DURATION_SECS,
            shooting_duration_secs: SHOOTING_DURATION_SECS,
            bullet_speed: BULLET_SPEED,
            bullet_radius: BULLET_RADIUS,

            message_pause_secs: MESSAGE_PAUSE_SECS,
            seed: 0x5EED,
            levels: LEVELS
                .iter()
                .map(|rows| rows.iter().map(|r| r.to_string()).collect())
                .collect(),
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load the config named by `ARKANOID_CONFIG`, falling back to defaults
    pub fn load() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            log::info!("Using default config");
            return Self::default();
        };

        match Self::from_path(&path) {
            Ok(config) => {
                log::info!("Loaded config from {path}");
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {path}: {e}");
                Self::default()
            }
        }
    }

    /// Check ranges and level grids
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.powerup_spawn_chance) {
            return Err(ConfigError::Invalid(format!(
                "powerup_spawn_chance must be within 0..=1, got {}",
                self.powerup_spawn_chance
            )));
        }
        if self.arena_width <= 0.0 || self.arena_height <= 0.0 {
            return Err(ConfigError::Invalid("arena must have a positive size".into()));
        }
        if self.paddle_width <= 0.0 || self.paddle_width > self.arena_width {
            return Err(ConfigError::Invalid(
                "paddle_width must be positive and fit the arena".into(),
            ));
        }
        if self.paddle_enlarged_width > self.arena_width {
            return Err(ConfigError::Invalid(
                "paddle_enlarged_width must fit the arena".into(),
            ));
        }
        if self.ball_max_vel <= 0.0 || self.ball_radius <= 0.0 {
            return Err(ConfigError::Invalid(
                "ball_max_vel and ball_radius must be positive".into(),
            ));
        }
        if self.block_width <= 0.0 || self.block_height <= 0.0 {
            return Err(ConfigError::Invalid("blocks must have a positive size".into()));
        }
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("target_fps must be positive".into()));
        }
        if self.levels.is_empty() {
            return Err(ConfigError::Invalid("at least one level is required".into()));
        }

        let columns = self.grid_columns();
        for (index, rows) in self.levels.iter().enumerate() {
            validate_level(rows, columns).map_err(|source| ConfigError::Level { index, source })?;
        }

        Ok(())
    }

    /// Number of block columns that fit across the arena
    pub fn grid_columns(&self) -> usize {
        (self.arena_width / self.block_width).floor() as usize
    }

    /// Absolute gap between paddle bottom and arena bottom
    pub fn paddle_bottom_margin(&self) -> f32 {
        (self.arena_height * self.paddle_bottom_margin).floor()
    }

    /// Absolute y of the first block row
    pub fn block_top(&self) -> f32 {
        (self.arena_height * self.block_top_offset).floor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_columns(), 16);
        assert_eq!(config.block_top(), 30.0);
        assert_eq!(config.paddle_bottom_margin(), 24.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "powerup_spawn_chance": 0.0, "seed": 7 }"#)
            .expect("partial config should parse");
        assert_eq!(config.powerup_spawn_chance, 0.0);
        assert_eq!(config.seed, 7);
        assert_eq!(config.arena_width, ARENA_WIDTH);
        assert_eq!(config.levels, Config::default().levels);
    }

    #[test]
    fn test_custom_levels_from_json() {
        let config = Config::from_json(r#"{ "levels": [["BR"], ["_P_"]] }"#).expect("valid levels");
        assert_eq!(config.levels.len(), 2);
        assert_eq!(config.levels[0], vec!["BR".to_string()]);
    }

    #[test]
    fn test_rejects_bad_spawn_chance() {
        let err = Config::from_json(r#"{ "powerup_spawn_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_unknown_symbol() {
        let err = Config::from_json(r#"{ "levels": [["BRX"]] }"#).unwrap_err();
        match err {
            ConfigError::Level { index, source } => {
                assert_eq!(index, 0);
                assert_eq!(
                    source,
                    LevelError::UnknownSymbol {
                        row: 0,
                        column: 2,
                        symbol: 'X'
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_empty_level_list() {
        let err = Config::from_json(r#"{ "levels": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Config::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::from_path("/nonexistent/arkanoid.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
