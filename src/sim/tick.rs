//! Frame step
//!
//! One call to `tick` advances the session by one frame: paddle, power-up
//! timers, balls, collisions, then progression. Motion is per frame;
//! timers and message pauses use the wall-clock `now` (seconds).

use super::collision::{Bounds, CollisionOutcome, resolve_ball};
use super::level::generate_board;
use super::powerup;
use super::state::{Ball, BallRole, GameEvent, GamePhase, GameState};

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Move paddle left (held)
    pub left: bool,
    /// Move paddle right (held)
    pub right: bool,
    /// Release glued balls / shoot (pressed this frame)
    pub fire: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, now: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if state.finished {
        return events;
    }

    // Message pauses freeze input and physics
    if state.phase != GamePhase::Playing {
        if now < state.pause_until {
            return events;
        }
        if state.phase == GamePhase::Won {
            log::info!("Session finished with score {}", state.score);
            state.finished = true;
            return events;
        }
        state.phase = GamePhase::Playing;
    }

    state.frame += 1;

    move_paddle(state, input);
    // Expiry releases glued balls before they move, like the fire key
    powerup::update_timers(state, now, &mut events);
    if input.fire {
        powerup::fire(state, &mut events);
    }

    for ball in state.balls.iter_mut() {
        ball.advance();
    }

    resolve_collisions(state, now, &mut events);
    cull_off_screen(state);
    check_progression(state, now, &mut events);

    // Ensure deterministic ordering
    state.normalize_order();

    events
}

fn move_paddle(state: &mut GameState, input: &TickInput) {
    let speed = state.paddle.speed;
    let dx = match (input.left, input.right) {
        (true, false) => -speed,
        (false, true) => speed,
        _ => 0.0,
    };
    let arena_width = state.config().arena_width;
    state.paddle.move_by(dx, arena_width);

    for ball in state.balls.iter_mut() {
        ball.follow_paddle(&state.paddle);
    }
}

/// Resolve every ball, then apply the outcomes
///
/// Outcomes are collected first so the block and ball sets are never
/// mutated while they are being iterated.
fn resolve_collisions(state: &mut GameState, now: f64, events: &mut Vec<GameEvent>) {
    let bounds = Bounds {
        width: state.config().arena_width,
        edge_window: state.config().block_edge_window,
    };

    let mut glued = state.balls.iter().any(|b| b.is_glued());
    let mut outcomes = Vec::new();
    for ball in state.balls.iter_mut() {
        let outcome = resolve_ball(ball, &state.paddle, &state.blocks, bounds, !glued);
        glued |= ball.is_glued();
        if outcome != CollisionOutcome::NoCollision {
            outcomes.push((ball.id, outcome));
        }
    }

    let mut spent = Vec::new();
    for (ball_id, outcome) in outcomes {
        match outcome {
            CollisionOutcome::NoCollision | CollisionOutcome::PickupFalling => {}
            CollisionOutcome::BlockHit { block, damage } => {
                damage_block(state, block, damage, events);
            }
            CollisionOutcome::BulletSpent { block } => {
                damage_block(state, block, 1, events);
                spent.push(ball_id);
            }
            CollisionOutcome::PickupCaught { ball, kind } => {
                spent.push(ball);
                powerup::activate(state, kind, now, events);
            }
        }
    }

    if !spent.is_empty() {
        state.balls.retain(|b| !spent.contains(&b.id));
    }
}

/// Apply damage; credit the reward and roll for a pickup when it breaks
///
/// Blocks already removed this frame are ignored.
fn damage_block(state: &mut GameState, id: u32, damage: u8, events: &mut Vec<GameEvent>) {
    let Some(block) = state.blocks.iter_mut().find(|b| b.id == id) else {
        return;
    };

    if !block.damage(damage) {
        events.push(GameEvent::BlockDamaged {
            block: id,
            hp: block.hp,
        });
        return;
    }

    let reward = block.reward;
    let center = block.rect.center();
    state.remove_block(id);
    state.score += reward;
    log::debug!("Block {id} destroyed (+{reward}), {} left", state.blocks.len());
    events.push(GameEvent::BlockDestroyed { block: id, reward });

    powerup::maybe_spawn_pickup(state, center, events);
}

/// Drop bullets above the arena and pickups below it
///
/// Primary balls are left for `check_progression`, which decides between
/// discarding a spare ball and losing the life.
fn cull_off_screen(state: &mut GameState) {
    let height = state.config().arena_height;
    state.balls.retain(|ball| match ball.role {
        BallRole::Bullet => ball.pos.y + ball.radius >= 0.0,
        BallRole::PowerUp(_) => ball.pos.y - ball.radius <= height,
        BallRole::Primary => true,
    });
}

/// Level clear, win and life loss
fn check_progression(state: &mut GameState, now: f64, events: &mut Vec<GameEvent>) {
    let pause = state.config().message_pause_secs;

    if state.blocks.is_empty() {
        state.score += state.config().level_clear_bonus;
        state.level_index += 1;
        state.reset_for_serve();
        state.pause_until = now + pause;

        if state.all_levels_cleared() {
            log::info!("All levels cleared, final score {}", state.score);
            state.phase = GamePhase::Won;
            events.push(GameEvent::Won);
        } else {
            log::info!("Level cleared, score {}", state.score);
            generate_board(state);
            state.phase = GamePhase::LevelClear;
            events.push(GameEvent::LevelCleared {
                next_level: state.level_index,
            });
        }
        return;
    }

    assert!(
        state.primary_ball_count() > 0,
        "no primary ball in play at progression check"
    );

    let height = state.config().arena_height;
    let is_lost = |ball: &Ball| ball.is_primary() && ball.pos.y > height;
    let lost = state.balls.iter().filter(|&b| is_lost(b)).count();
    if lost == 0 {
        return;
    }

    // Spare primaries just drop out; the life goes with the last one
    if lost < state.primary_ball_count() {
        state.balls.retain(|b| !is_lost(b));
        return;
    }

    log::info!("Ball lost, score reset from {}", state.score);
    state.score = 0;
    state.reset_for_serve();
    state.phase = GamePhase::LifeLost;
    state.pause_until = now + pause;
    events.push(GameEvent::LifeLost);
}
