//! Game state and core simulation types
//!
//! Balls and blocks carry stable ids. Removal always goes through id-based
//! `retain`, so removing something that is already gone is a no-op.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::level::generate_board;
use super::powerup::PowerUps;
use crate::config::Config;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Board cleared, "next level" message showing
    LevelClear,
    /// Last primary ball lost, "you lose" message showing
    LifeLost,
    /// Every level cleared, "you won" message showing
    Won,
}

impl GamePhase {
    /// Transient message shown while the phase pause runs
    pub fn banner(&self) -> Option<&'static str> {
        match self {
            GamePhase::Playing => None,
            GamePhase::LevelClear => Some("Next level!"),
            GamePhase::LifeLost => Some("You lose!"),
            GamePhase::Won => Some("You WON!"),
        }
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Size restored on reset / enlarge expiry
    pub base_width: f32,
    pub base_height: f32,
    /// Horizontal movement per frame
    pub speed: f32,
}

impl Paddle {
    pub fn new(config: &Config) -> Self {
        Self {
            pos: Self::start_pos(config),
            width: config.paddle_width,
            height: config.paddle_height,
            base_width: config.paddle_width,
            base_height: config.paddle_height,
            speed: config.paddle_speed,
        }
    }

    /// Canonical start position: horizontally centered, just above the bottom margin
    pub fn start_pos(config: &Config) -> Vec2 {
        Vec2::new(
            config.arena_width / 2.0 - config.paddle_width / 2.0,
            config.arena_height - config.paddle_height - config.paddle_bottom_margin(),
        )
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Move horizontally by `dx`, keeping the paddle inside `[0, arena_width - width]`
    pub fn move_by(&mut self, dx: f32, arena_width: f32) {
        self.pos.x = (self.pos.x + dx).clamp(0.0, (arena_width - self.width).max(0.0));
    }

    /// Change width around the current center, then clamp back into the arena
    pub fn set_width_centered(&mut self, width: f32, arena_width: f32) {
        let center = self.center_x();
        self.width = width;
        self.pos.x = center - width / 2.0;
        self.move_by(0.0, arena_width);
    }

    /// Restore base size and start position
    pub fn reset(&mut self, config: &Config) {
        self.width = self.base_width;
        self.height = self.base_height;
        self.pos = Self::start_pos(config);
    }
}

/// Power-up kinds a falling pickup can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Wider paddle for a while
    Enlarge,
    /// Two extra primary balls
    MultiBall,
    /// Balls glue to the paddle until released
    Sticky,
    /// One shot of two bullets from the paddle ends
    Shooting,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Enlarge,
        PowerUpKind::MultiBall,
        PowerUpKind::Sticky,
        PowerUpKind::Shooting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Enlarge => "enlarge",
            PowerUpKind::MultiBall => "multi-ball",
            PowerUpKind::Sticky => "sticky",
            PowerUpKind::Shooting => "shooting",
        }
    }
}

/// What a ball is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallRole {
    /// Gameplay ball; losing the last one costs the life
    Primary,
    /// Falling pickup granting `kind` when caught
    PowerUp(PowerUpKind),
    /// Upward-only projectile that damages one block
    Bullet,
}

/// Paddle attachment of a glued ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glue {
    /// Ball x minus paddle left edge at the moment of contact
    pub offset: f32,
    /// Velocity the ball had when it touched the paddle
    pub cached_vel: Vec2,
}

/// A ball entity (gameplay ball, falling pickup or bullet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Speed scale for the paddle bounce angle
    pub max_vel: f32,
    pub role: BallRole,
    /// Glues to the paddle on contact instead of bouncing
    pub sticky: bool,
    /// Set while riding the paddle
    pub glue: Option<Glue>,
    /// Next paddle contact bounces even if sticky (set on release)
    pub skip_glue: bool,
}

impl Ball {
    /// A primary ball at the canonical start position, falling straight down
    pub fn primary(id: u32, config: &Config) -> Self {
        Self {
            id,
            pos: Self::start_pos(config),
            vel: Vec2::new(0.0, config.ball_max_vel),
            radius: config.ball_radius,
            max_vel: config.ball_max_vel,
            role: BallRole::Primary,
            sticky: false,
            glue: None,
            skip_glue: false,
        }
    }

    /// A falling pickup dropped at `pos`
    pub fn power_up(id: u32, kind: PowerUpKind, pos: Vec2, config: &Config) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::new(0.0, config.powerup_fall_speed),
            radius: config.ball_radius,
            max_vel: config.ball_max_vel,
            role: BallRole::PowerUp(kind),
            sticky: false,
            glue: None,
            skip_glue: false,
        }
    }

    /// A bullet fired upward from `pos`
    pub fn bullet(id: u32, pos: Vec2, config: &Config) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::new(0.0, -config.bullet_speed),
            radius: config.bullet_radius,
            max_vel: config.bullet_speed,
            role: BallRole::Bullet,
            sticky: false,
            glue: None,
            skip_glue: false,
        }
    }

    pub fn start_pos(config: &Config) -> Vec2 {
        Vec2::new(config.arena_width / 2.0, config.arena_height / 2.0)
    }

    #[inline]
    pub fn is_primary(&self) -> bool {
        self.role == BallRole::Primary
    }

    #[inline]
    pub fn is_bullet(&self) -> bool {
        self.role == BallRole::Bullet
    }

    #[inline]
    pub fn is_glued(&self) -> bool {
        self.glue.is_some()
    }

    /// Move one frame along the current velocity (glued balls stay put)
    pub fn advance(&mut self) {
        if self.glue.is_none() {
            self.pos += self.vel;
        }
    }

    /// Stick to the paddle: cache the incoming velocity and stop
    pub fn glue_to(&mut self, paddle: &Paddle) {
        self.glue = Some(Glue {
            offset: self.pos.x - paddle.pos.x,
            cached_vel: self.vel,
        });
        self.vel = Vec2::ZERO;
        self.pos.y = paddle.pos.y - self.radius;
    }

    /// Keep a glued ball riding on the paddle
    pub fn follow_paddle(&mut self, paddle: &Paddle) {
        if let Some(glue) = self.glue {
            self.pos.x = paddle.pos.x + glue.offset;
            self.pos.y = paddle.pos.y - self.radius;
        }
    }

    /// Pin a glued ball back onto the paddle after it changed size
    ///
    /// The ball keeps its position where the paddle still covers it and is
    /// pulled to the nearest edge otherwise.
    pub fn reanchor(&mut self, paddle: &Paddle) {
        if let Some(glue) = self.glue.as_mut() {
            glue.offset = (self.pos.x - paddle.pos.x).clamp(0.0, paddle.width);
            self.follow_paddle(paddle);
        }
    }

    /// Leave the paddle with the cached velocity (straight up if none was cached)
    pub fn release(&mut self) {
        if let Some(glue) = self.glue.take() {
            self.vel = if glue.cached_vel == Vec2::ZERO {
                Vec2::new(0.0, -self.max_vel)
            } else {
                glue.cached_vel
            };
            self.skip_glue = true;
        }
    }
}

/// Block colors; the level symbol alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockColor {
    Blue,
    Red,
    Green,
    Yellow,
    Pink,
}

impl BlockColor {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'B' => Some(BlockColor::Blue),
            'R' => Some(BlockColor::Red),
            'G' => Some(BlockColor::Green),
            'Y' => Some(BlockColor::Yellow),
            'P' => Some(BlockColor::Pink),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            BlockColor::Blue => 'B',
            BlockColor::Red => 'R',
            BlockColor::Green => 'G',
            BlockColor::Yellow => 'Y',
            BlockColor::Pink => 'P',
        }
    }

    /// Hits needed to destroy a block of this color
    pub fn max_hp(&self) -> u8 {
        match self {
            BlockColor::Yellow => 2,
            BlockColor::Pink => 3,
            _ => 1,
        }
    }
}

/// A block entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    pub rect: Rect,
    pub color: BlockColor,
    pub hp: u8,
    /// Score credited on the hit that destroys the block
    pub reward: u64,
}

impl Block {
    pub fn new(id: u32, rect: Rect, color: BlockColor, reward_per_hp: u64) -> Self {
        let hp = color.max_hp();
        Self {
            id,
            rect,
            color,
            hp,
            reward: reward_per_hp * u64::from(hp),
        }
    }

    /// Apply damage; returns true if this hit destroyed the block
    pub fn damage(&mut self, amount: u8) -> bool {
        if self.hp == 0 {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount);
        self.hp == 0
    }
}

/// Notable things that happened during a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BlockDamaged { block: u32, hp: u8 },
    BlockDestroyed { block: u32, reward: u64 },
    PowerUpSpawned { kind: PowerUpKind },
    PowerUpCaught { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
    BallsReleased { count: usize },
    BulletsFired,
    LifeLost,
    LevelCleared { next_level: usize },
    Won,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Immutable configuration the session was built with
    config: Config,
    /// Current level (0-based)
    pub level_index: usize,
    pub score: u64,
    pub phase: GamePhase,
    /// Wall-clock time (seconds) at which a message pause ends
    pub pause_until: f64,
    /// Session over; nothing more is processed
    pub finished: bool,
    pub paddle: Paddle,
    /// Live balls (sorted by id)
    pub balls: Vec<Ball>,
    /// Remaining blocks (sorted by id)
    pub blocks: Vec<Block>,
    pub powerups: PowerUps,
    /// Frames simulated
    pub frame: u64,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Start a session at the first level with one primary ball
    pub fn new(config: Config) -> Self {
        assert!(!config.levels.is_empty(), "level list must not be empty");

        let mut state = Self {
            rng: Pcg32::seed_from_u64(config.seed),
            paddle: Paddle::new(&config),
            config,
            level_index: 0,
            score: 0,
            phase: GamePhase::Playing,
            pause_until: 0.0,
            finished: false,
            balls: Vec::new(),
            blocks: Vec::new(),
            powerups: PowerUps::default(),
            frame: 0,
            next_id: 1,
        };

        generate_board(&mut state);
        state.spawn_primary_ball();

        state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn a primary ball at the start position
    pub fn spawn_primary_ball(&mut self) -> u32 {
        let id = self.next_entity_id();
        let mut ball = Ball::primary(id, &self.config);
        ball.sticky = self.powerups.sticky.active;
        self.balls.push(ball);
        id
    }

    pub fn primary_ball_count(&self) -> usize {
        self.balls.iter().filter(|b| b.is_primary()).count()
    }

    pub fn ball(&self, id: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn block(&self, id: u32) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Remove a ball by id; absent ids are ignored
    pub fn remove_ball(&mut self, id: u32) {
        self.balls.retain(|b| b.id != id);
    }

    /// Remove a block by id; absent ids are ignored
    pub fn remove_block(&mut self, id: u32) {
        self.blocks.retain(|b| b.id != id);
    }

    /// Resize the paddle around its center, keeping glued balls on it
    pub fn resize_paddle(&mut self, width: f32) {
        self.paddle.set_width_centered(width, self.config.arena_width);
        for ball in self.balls.iter_mut() {
            ball.reanchor(&self.paddle);
        }
    }

    /// Whether the current level index points past the last level
    pub fn all_levels_cleared(&self) -> bool {
        self.level_index >= self.config.levels.len()
    }

    /// Back to the serve layout: paddle at start and base size, one fresh
    /// primary ball, no power-ups
    pub fn reset_for_serve(&mut self) {
        self.powerups.clear();
        self.paddle.reset(&self.config);
        self.balls.clear();
        self.spawn_primary_ball();
    }

    /// Ensure balls and blocks are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
        self.blocks.sort_by_key(|b| b.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_layout() {
        let config = Config::default();
        let state = GameState::new(config.clone());

        assert_eq!(state.level_index, 0);
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.balls.len(), 1);
        assert!(state.balls[0].is_primary());
        assert_eq!(state.balls[0].pos, Vec2::new(400.0, 300.0));
        assert_eq!(state.paddle.pos, Vec2::new(350.0, 556.0));
        assert!(!state.blocks.is_empty());
    }

    #[test]
    #[should_panic(expected = "level list must not be empty")]
    fn test_empty_level_list_fails_fast() {
        let config = Config {
            levels: Vec::new(),
            ..Config::default()
        };
        let _ = GameState::new(config);
    }

    #[test]
    fn test_paddle_stays_in_arena() {
        let config = Config::default();
        let mut paddle = Paddle::new(&config);

        paddle.move_by(-10_000.0, config.arena_width);
        assert_eq!(paddle.pos.x, 0.0);

        paddle.move_by(10_000.0, config.arena_width);
        assert_eq!(paddle.pos.x, config.arena_width - paddle.width);
    }

    #[test]
    fn test_paddle_width_recenters_and_clamps() {
        let config = Config::default();
        let mut paddle = Paddle::new(&config);

        paddle.set_width_centered(150.0, config.arena_width);
        assert_eq!(paddle.width, 150.0);
        assert_eq!(paddle.center_x(), 400.0);

        // Against the right wall the wider paddle is pushed back inside
        let mut paddle = Paddle::new(&config);
        paddle.move_by(10_000.0, config.arena_width);
        assert_eq!(paddle.pos.x, 700.0);
        paddle.set_width_centered(150.0, config.arena_width);
        assert_eq!(paddle.pos.x, 650.0);
    }

    #[test]
    fn test_block_damage_and_reward() {
        let rect = Rect::new(0.0, 30.0, 50.0, 20.0);
        let mut block = Block::new(1, rect, BlockColor::Pink, 10);
        assert_eq!(block.hp, 3);
        assert_eq!(block.reward, 30);

        assert!(!block.damage(1));
        assert!(!block.damage(1));
        assert!(block.damage(1));
        // Already destroyed: further damage never reports a second kill
        assert!(!block.damage(1));
    }

    #[test]
    fn test_glue_and_release() {
        let config = Config::default();
        let paddle = Paddle::new(&config);
        let mut ball = Ball::primary(1, &config);
        ball.pos = Vec2::new(380.0, 550.0);
        ball.vel = Vec2::new(2.0, 5.0);

        ball.glue_to(&paddle);
        assert!(ball.is_glued());
        assert_eq!(ball.vel, Vec2::ZERO);
        assert_eq!(ball.glue.map(|g| g.offset), Some(30.0));

        ball.advance();
        assert_eq!(ball.pos.x, 380.0);

        ball.release();
        assert!(!ball.is_glued());
        assert_eq!(ball.vel, Vec2::new(2.0, 5.0));
        assert!(ball.skip_glue);
    }

    #[test]
    fn test_shrinking_paddle_keeps_glued_ball_on_it() {
        let mut state = GameState::new(Config::default());
        state.resize_paddle(150.0);
        assert_eq!(state.paddle.pos.x, 325.0);

        let paddle = state.paddle.clone();
        state.balls[0].pos = Vec2::new(470.0, 550.0);
        state.balls[0].glue_to(&paddle);

        state.resize_paddle(100.0);

        // Paddle now spans 350..450; the ball is pulled to the right edge
        let ball = &state.balls[0];
        assert_eq!(ball.pos.x, 450.0);
        assert_eq!(ball.glue.map(|g| g.offset), Some(100.0));
        assert_eq!(ball.pos.y, state.paddle.pos.y - ball.radius);
    }

    #[test]
    fn test_growing_paddle_leaves_glued_ball_in_place() {
        let mut state = GameState::new(Config::default());
        let paddle = state.paddle.clone();
        state.balls[0].pos = Vec2::new(380.0, 550.0);
        state.balls[0].glue_to(&paddle);

        state.resize_paddle(150.0);

        assert_eq!(state.balls[0].pos.x, 380.0);
        assert_eq!(state.balls[0].glue.map(|g| g.offset), Some(55.0));
    }

    #[test]
    fn test_release_without_cached_velocity() {
        let config = Config::default();
        let paddle = Paddle::new(&config);
        let mut ball = Ball::primary(1, &config);
        ball.vel = Vec2::ZERO;
        ball.glue_to(&paddle);

        ball.release();
        assert_eq!(ball.vel, Vec2::new(0.0, -config.ball_max_vel));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut state = GameState::new(Config::default());
        let balls = state.balls.len();
        let blocks = state.blocks.len();

        state.remove_ball(9999);
        state.remove_block(9999);

        assert_eq!(state.balls.len(), balls);
        assert_eq!(state.blocks.len(), blocks);
    }

    #[test]
    fn test_symbol_roundtrip() {
        for symbol in ['B', 'R', 'G', 'Y', 'P'] {
            let color = BlockColor::from_symbol(symbol).expect("palette symbol");
            assert_eq!(color.symbol(), symbol);
        }
        assert_eq!(BlockColor::from_symbol('_'), None);
        assert_eq!(BlockColor::from_symbol('X'), None);
    }
}
