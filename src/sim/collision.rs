//! Collision detection and response for balls
//!
//! The resolver only moves the ball it is given (reflections, gluing). It
//! never touches block HP, score or the ball set; it reports what happened
//! through `CollisionOutcome` and the frame step applies the game rules.

use super::geometry::{Rect, circle_intersects_rect, paddle_bounce_angle, reflect_axis};
use super::state::{Ball, BallRole, Block, Paddle, PowerUpKind};

/// Result of resolving one ball for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Nothing the caller needs to act on
    NoCollision,
    /// A gameplay ball bounced off `block`
    BlockHit { block: u32, damage: u8 },
    /// A falling pickup touched the paddle
    PickupCaught { ball: u32, kind: PowerUpKind },
    /// A pickup is still on its way down above the paddle
    PickupFalling,
    /// A bullet struck `block` and is used up
    BulletSpent { block: u32 },
}

/// Velocity axis flipped by a block hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Arena walls and per-hit tuning the resolver needs
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub width: f32,
    pub edge_window: f32,
}

/// Resolve one ball against walls, paddle and blocks, in that order
///
/// `glue_available` is false while another ball is already glued to the
/// paddle; a sticky ball then bounces normally.
pub fn resolve_ball(
    ball: &mut Ball,
    paddle: &Paddle,
    blocks: &[Block],
    bounds: Bounds,
    glue_available: bool,
) -> CollisionOutcome {
    if let BallRole::PowerUp(kind) = ball.role {
        return resolve_pickup(ball, kind, paddle);
    }
    if ball.is_glued() {
        return CollisionOutcome::NoCollision;
    }
    if ball.vel.y < 0.0 {
        ball.skip_glue = false;
    }

    resolve_walls(ball, bounds.width);
    resolve_paddle(ball, paddle, glue_available);

    let mut touching = blocks
        .iter()
        .filter(|b| circle_intersects_rect(ball.pos, ball.radius, &b.rect));

    if ball.is_bullet() {
        return match touching.next() {
            Some(block) => CollisionOutcome::BulletSpent { block: block.id },
            None => CollisionOutcome::NoCollision,
        };
    }

    // A ball on its way out of a block it already bounced off is not hit again
    let Some((block, axis)) = touching.find_map(|b| {
        let axis = bounce_axis(ball, &b.rect, bounds.edge_window);
        approaching(ball, &b.rect, axis).then_some((b.id, axis))
    }) else {
        return CollisionOutcome::NoCollision;
    };

    match axis {
        Axis::X => ball.vel.x = reflect_axis(ball.vel.x),
        Axis::Y => ball.vel.y = reflect_axis(ball.vel.y),
    }
    CollisionOutcome::BlockHit { block, damage: 1 }
}

/// Whether the ball moves toward `rect` along `axis`
fn approaching(ball: &Ball, rect: &Rect, axis: Axis) -> bool {
    let center = rect.center();
    match axis {
        Axis::X => (ball.pos.x - center.x) * ball.vel.x < 0.0,
        Axis::Y => (ball.pos.y - center.y) * ball.vel.y < 0.0,
    }
}

/// Falling pickups only care about the paddle
fn resolve_pickup(ball: &Ball, kind: PowerUpKind, paddle: &Paddle) -> CollisionOutcome {
    let paddle_rect = paddle.rect();
    if circle_intersects_rect(ball.pos, ball.radius, &paddle_rect) {
        CollisionOutcome::PickupCaught {
            ball: ball.id,
            kind,
        }
    } else if ball.pos.y < paddle_rect.top() {
        CollisionOutcome::PickupFalling
    } else {
        CollisionOutcome::NoCollision
    }
}

/// Reflect off the top, left and right walls
///
/// A wall only reflects a ball moving toward it, so a ball that is still
/// overlapping after its bounce is not flipped back. Bullets fly out
/// through the top.
pub fn resolve_walls(ball: &mut Ball, arena_width: f32) {
    if !ball.is_bullet() && ball.pos.y - ball.radius <= 0.0 && ball.vel.y < 0.0 {
        ball.vel.y = reflect_axis(ball.vel.y);
    }
    if ball.pos.x - ball.radius <= 0.0 && ball.vel.x < 0.0 {
        ball.vel.x = reflect_axis(ball.vel.x);
    } else if ball.pos.x + ball.radius >= arena_width && ball.vel.x > 0.0 {
        ball.vel.x = reflect_axis(ball.vel.x);
    }
}

/// Bounce off (or glue to) the paddle; returns true on contact
pub fn resolve_paddle(ball: &mut Ball, paddle: &Paddle, glue_available: bool) -> bool {
    if ball.vel.y <= 0.0 {
        return false;
    }

    let rect = paddle.rect();
    // A ball just released from the paddle only has to overlap its span
    let reach = if ball.skip_glue { ball.radius } else { 0.0 };
    let within_span = ball.pos.x + reach >= rect.left() && ball.pos.x - reach <= rect.right();
    let reached_top = ball.pos.y + ball.radius >= rect.top();
    let not_past = ball.pos.y - ball.radius <= rect.bottom();
    if !(within_span && reached_top && not_past) {
        return false;
    }

    if ball.sticky && !ball.skip_glue && glue_available {
        ball.glue_to(paddle);
    } else {
        ball.vel.y = reflect_axis(ball.vel.y);
        ball.vel.x = paddle_bounce_angle(ball.pos.x, ball.max_vel, &rect)
            .clamp(-ball.max_vel, ball.max_vel);
        ball.skip_glue = false;
    }
    true
}

/// Pick the velocity axis to flip for a ball overlapping `rect`
///
/// Each block edge gets a window of `±edge_window` around it. When edges of
/// only one orientation are within their window, that orientation decides.
/// When both are (a corner hit), the nearer edge decides and ties go to the
/// horizontal edges. When none is (the ball is deep inside), Y flips.
pub fn bounce_axis(ball: &Ball, rect: &Rect, edge_window: f32) -> Axis {
    let r = ball.radius;
    let d_top = ((ball.pos.y + r) - rect.top()).abs();
    let d_bottom = ((ball.pos.y - r) - rect.bottom()).abs();
    let d_left = ((ball.pos.x + r) - rect.left()).abs();
    let d_right = ((ball.pos.x - r) - rect.right()).abs();

    let horizontal = d_top.min(d_bottom);
    let vertical = d_left.min(d_right);
    let near_horizontal = horizontal <= edge_window;
    let near_vertical = vertical <= edge_window;

    match (near_horizontal, near_vertical) {
        (true, false) => Axis::Y,
        (false, true) => Axis::X,
        (true, true) if vertical < horizontal => Axis::X,
        _ => Axis::Y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use glam::Vec2;

    fn bounds() -> Bounds {
        Bounds {
            width: 800.0,
            edge_window: 6.0,
        }
    }

    fn ball_at(x: f32, y: f32, vx: f32, vy: f32) -> Ball {
        let mut ball = Ball::primary(1, &Config::default());
        ball.pos = Vec2::new(x, y);
        ball.vel = Vec2::new(vx, vy);
        ball
    }

    fn block(id: u32, x: f32, y: f32) -> Block {
        Block::new(
            id,
            Rect::new(x, y, 50.0, 20.0),
            crate::sim::state::BlockColor::Blue,
            10,
        )
    }

    fn paddle() -> Paddle {
        Paddle::new(&Config::default())
    }

    #[test]
    fn test_top_wall_reflects_y() {
        let mut ball = ball_at(400.0, 5.0, 2.0, -5.0);
        let outcome = resolve_ball(&mut ball, &paddle(), &[], bounds(), true);
        assert_eq!(outcome, CollisionOutcome::NoCollision);
        assert_eq!(ball.vel, Vec2::new(2.0, 5.0));
    }

    #[test]
    fn test_side_walls_reflect_x() {
        let mut ball = ball_at(3.0, 300.0, -3.0, 5.0);
        resolve_ball(&mut ball, &paddle(), &[], bounds(), true);
        assert_eq!(ball.vel, Vec2::new(3.0, 5.0));

        let mut ball = ball_at(797.0, 300.0, 3.0, -5.0);
        resolve_ball(&mut ball, &paddle(), &[], bounds(), true);
        assert_eq!(ball.vel, Vec2::new(-3.0, -5.0));
    }

    #[test]
    fn test_wall_does_not_flip_receding_ball() {
        // Already bounced, still overlapping the wall: keep moving away
        let mut ball = ball_at(3.0, 300.0, 3.0, 5.0);
        resolve_ball(&mut ball, &paddle(), &[], bounds(), true);
        assert_eq!(ball.vel, Vec2::new(3.0, 5.0));
    }

    #[test]
    fn test_bullet_passes_through_top() {
        let config = Config::default();
        let mut bullet = Ball::bullet(5, Vec2::new(400.0, 1.0), &config);
        let vel = bullet.vel;
        resolve_ball(&mut bullet, &paddle(), &[], bounds(), true);
        assert_eq!(bullet.vel, vel);
    }

    #[test]
    fn test_paddle_center_bounces_straight_up() {
        // Paddle spans 350..450, top at 556
        let mut ball = ball_at(400.0, 550.0, 1.0, 5.0);
        resolve_ball(&mut ball, &paddle(), &[], bounds(), true);
        assert_eq!(ball.vel.y, -5.0);
        assert!(ball.vel.x.abs() < 1e-6);
    }

    #[test]
    fn test_paddle_edges_give_max_lateral_speed() {
        let mut left = ball_at(350.0, 550.0, 0.0, 5.0);
        resolve_ball(&mut left, &paddle(), &[], bounds(), true);
        assert!((left.vel.x + 5.0).abs() < 1e-6);

        let mut right = ball_at(450.0, 550.0, 0.0, 5.0);
        resolve_ball(&mut right, &paddle(), &[], bounds(), true);
        assert!((right.vel.x - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_paddle_ignores_rising_ball() {
        let mut ball = ball_at(400.0, 550.0, 0.0, -5.0);
        resolve_ball(&mut ball, &paddle(), &[], bounds(), true);
        assert_eq!(ball.vel, Vec2::new(0.0, -5.0));
    }

    #[test]
    fn test_paddle_ignores_ball_outside_span() {
        let mut ball = ball_at(300.0, 552.0, 0.0, 5.0);
        resolve_ball(&mut ball, &paddle(), &[], bounds(), true);
        assert_eq!(ball.vel, Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_sticky_ball_glues() {
        let paddle = paddle();
        let mut ball = ball_at(380.0, 550.0, 2.0, 5.0);
        ball.sticky = true;

        resolve_ball(&mut ball, &paddle, &[], bounds(), true);

        assert_eq!(ball.vel, Vec2::ZERO);
        let glue = ball.glue.expect("ball should be glued");
        assert_eq!(glue.offset, 30.0);
        assert_eq!(glue.cached_vel, Vec2::new(2.0, 5.0));
    }

    #[test]
    fn test_sticky_ball_bounces_when_glue_taken() {
        let mut ball = ball_at(400.0, 550.0, 2.0, 5.0);
        ball.sticky = true;

        resolve_ball(&mut ball, &paddle(), &[], bounds(), false);

        assert!(!ball.is_glued());
        assert_eq!(ball.vel.y, -5.0);
    }

    #[test]
    fn test_released_ball_bounces_once() {
        let mut ball = ball_at(400.0, 550.0, 2.0, 5.0);
        ball.sticky = true;
        ball.skip_glue = true;

        resolve_ball(&mut ball, &paddle(), &[], bounds(), true);
        assert!(!ball.is_glued());
        assert_eq!(ball.vel.y, -5.0);
        assert!(!ball.skip_glue);
    }

    #[test]
    fn test_block_hit_from_below_flips_y() {
        // Block spans x 100..150, y 30..50; ball top just under the bottom edge
        let blocks = [block(7, 100.0, 30.0)];
        let mut ball = ball_at(125.0, 55.0, 1.0, -5.0);

        let outcome = resolve_ball(&mut ball, &paddle(), &blocks, bounds(), true);

        assert_eq!(outcome, CollisionOutcome::BlockHit { block: 7, damage: 1 });
        assert_eq!(ball.vel, Vec2::new(1.0, 5.0));
    }

    #[test]
    fn test_block_hit_from_side_flips_x() {
        // Ball right edge at the block's left edge, vertically centered
        let blocks = [block(7, 100.0, 30.0)];
        let mut ball = ball_at(95.0, 40.0, 4.0, -1.0);

        let outcome = resolve_ball(&mut ball, &paddle(), &blocks, bounds(), true);

        assert_eq!(outcome, CollisionOutcome::BlockHit { block: 7, damage: 1 });
        assert_eq!(ball.vel, Vec2::new(-4.0, -1.0));
    }

    #[test]
    fn test_corner_hit_flips_one_axis() {
        // Bottom-left corner: both windows match
        let blocks = [block(7, 100.0, 30.0)];
        let mut ball = ball_at(94.0, 56.0, 3.0, -3.0);

        resolve_ball(&mut ball, &paddle(), &blocks, bounds(), true);

        // d_bottom = |49 - 50| = 1, d_left = |101 - 100| = 1 -> tie goes to Y
        assert_eq!(ball.vel, Vec2::new(3.0, 3.0));

        let mut ball = ball_at(94.5, 55.0, 3.0, -3.0);
        resolve_ball(&mut ball, &paddle(), &blocks, bounds(), true);
        // d_bottom = 2, d_left = 1.5 -> X
        assert_eq!(ball.vel, Vec2::new(-3.0, -3.0));
    }

    #[test]
    fn test_receding_ball_touching_block_is_ignored() {
        // Already bounced off the underside, bottom edge still touching
        let blocks = [block(7, 100.0, 30.0)];
        let mut ball = ball_at(125.0, 57.0, 1.0, 5.0);

        let outcome = resolve_ball(&mut ball, &paddle(), &blocks, bounds(), true);

        assert_eq!(outcome, CollisionOutcome::NoCollision);
        assert_eq!(ball.vel, Vec2::new(1.0, 5.0));
    }

    #[test]
    fn test_receding_ball_still_hits_next_block() {
        // In the gap between two blocks: leaving block 1, running into block 2
        let blocks = [block(1, 100.0, 30.0), block(2, 40.0, 30.0)];
        let mut ball = ball_at(95.0, 40.0, -4.0, -1.0);

        let outcome = resolve_ball(&mut ball, &paddle(), &blocks, bounds(), true);

        assert_eq!(outcome, CollisionOutcome::BlockHit { block: 2, damage: 1 });
        assert_eq!(ball.vel, Vec2::new(4.0, -1.0));
    }

    #[test]
    fn test_released_ball_bounces_off_paddle_end() {
        // Just left the left end of the 350..450 paddle, still overlapping it
        let mut ball = ball_at(347.0, 554.0, -3.0, 5.0);
        ball.sticky = true;
        ball.skip_glue = true;

        resolve_ball(&mut ball, &paddle(), &[], bounds(), true);

        assert_eq!(ball.vel, Vec2::new(-5.0, -5.0));
        assert!(!ball.is_glued());
    }

    #[test]
    fn test_only_first_block_reports() {
        let blocks = [block(1, 0.0, 30.0), block(2, 50.0, 30.0)];
        // Straddles both blocks
        let mut ball = ball_at(50.0, 55.0, 0.0, -5.0);

        let outcome = resolve_ball(&mut ball, &paddle(), &blocks, bounds(), true);

        assert_eq!(outcome, CollisionOutcome::BlockHit { block: 1, damage: 1 });
        assert_eq!(ball.vel, Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_bullet_is_spent_without_bounce() {
        let config = Config::default();
        let blocks = [block(3, 100.0, 30.0)];
        let mut bullet = Ball::bullet(9, Vec2::new(120.0, 52.0), &config);
        let vel = bullet.vel;

        let outcome = resolve_ball(&mut bullet, &paddle(), &blocks, bounds(), true);

        assert_eq!(outcome, CollisionOutcome::BulletSpent { block: 3 });
        assert_eq!(bullet.vel, vel);
    }

    #[test]
    fn test_pickup_outcomes() {
        let config = Config::default();
        let paddle = paddle();

        let mut falling = Ball::power_up(4, PowerUpKind::Sticky, Vec2::new(400.0, 300.0), &config);
        assert_eq!(
            resolve_ball(&mut falling, &paddle, &[], bounds(), true),
            CollisionOutcome::PickupFalling
        );

        let mut caught = Ball::power_up(4, PowerUpKind::Sticky, Vec2::new(400.0, 552.0), &config);
        assert_eq!(
            resolve_ball(&mut caught, &paddle, &[], bounds(), true),
            CollisionOutcome::PickupCaught {
                ball: 4,
                kind: PowerUpKind::Sticky
            }
        );

        // Beside the paddle and below its top: missed
        let mut missed = Ball::power_up(4, PowerUpKind::Sticky, Vec2::new(100.0, 570.0), &config);
        assert_eq!(
            resolve_ball(&mut missed, &paddle, &[], bounds(), true),
            CollisionOutcome::NoCollision
        );
    }

    #[test]
    fn test_pickup_ignores_blocks_and_walls() {
        let config = Config::default();
        let blocks = [block(1, 375.0, 290.0)];
        let mut pickup = Ball::power_up(4, PowerUpKind::Enlarge, Vec2::new(400.0, 300.0), &config);
        let vel = pickup.vel;

        let outcome = resolve_ball(&mut pickup, &paddle(), &blocks, bounds(), true);

        assert_eq!(outcome, CollisionOutcome::PickupFalling);
        assert_eq!(pickup.vel, vel);
    }
}
