//! Collision detection and response
//!
//! Ball vs paddle: a flat center zone reflects like a mirror, the edge zones
//! rotate the reflection normal up to a maximum sharp angle. Ball vs field:
//! top/bottom bounce, left/right are exits that score for the other player.

use glam::Vec2;

use super::state::{Ball, Edge, Paddle, Side};
use crate::tuning::Tuning;
use crate::{angle_of, deg_to_rad};

/// Steepest allowed outgoing direction, measured from the paddle normal.
/// Keeps edge hits from sending the ball straight up/down or back behind the
/// paddle.
pub const MAX_BOUNCE_FROM_NORMAL_DEG: f32 = 75.0;

/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// How far into an edge zone an impact lands: 0 inside the flat zone or at
/// its boundary, 1 at the paddle's extreme edge.
///
/// `relative_y` is the impact offset from the paddle center.
pub fn edge_fraction(relative_y: f32, height: f32, center_size: f32) -> f32 {
    let half = height / 2.0;
    let flat_half = half * center_size.clamp(0.0, 1.0);
    let offset = relative_y.abs().min(half);

    if offset <= flat_half || half <= flat_half {
        return 0.0;
    }
    ((offset - flat_half) / (half - flat_half)).clamp(0.0, 1.0)
}

/// Signed rotation (radians) applied to the paddle normal for an impact.
///
/// Lower-edge hits turn the normal downward and upper-edge hits upward, so
/// the ball leaves toward the side of the paddle it struck while still
/// heading into the opponent's half.
pub fn edge_rotation(
    side: Side,
    relative_y: f32,
    height: f32,
    center_size: f32,
    max_sharp_angle: f32,
) -> f32 {
    let magnitude = edge_fraction(relative_y, height, center_size) * max_sharp_angle;
    if magnitude == 0.0 {
        return 0.0;
    }
    // Screen space, y down: +angle turns +X toward +Y and -X toward -Y
    let toward_edge = relative_y.signum();
    let facing = match side {
        Side::Left => 1.0,
        Side::Right => -1.0,
    };
    magnitude * toward_edge * facing
}

/// Outgoing unit direction after a paddle hit
pub fn paddle_reflection(
    incoming: Vec2,
    paddle_normal: Vec2,
    rotation: f32,
) -> Vec2 {
    let normal = Vec2::from_angle(rotation).rotate(paddle_normal);
    let out = reflect_velocity(incoming.normalize_or_zero(), normal);
    keep_away_from_paddle(out, paddle_normal)
}

/// Clamp a direction so it leaves the paddle at no more than
/// `MAX_BOUNCE_FROM_NORMAL_DEG` from its normal
fn keep_away_from_paddle(out: Vec2, paddle_normal: Vec2) -> Vec2 {
    let max = deg_to_rad(MAX_BOUNCE_FROM_NORMAL_DEG);
    if out.dot(paddle_normal) >= max.cos() {
        return out;
    }
    let tangent = Vec2::new(-paddle_normal.y, paddle_normal.x);
    let along = if out.dot(tangent) >= 0.0 { 1.0 } else { -1.0 };
    paddle_normal * max.cos() + tangent * along * max.sin()
}

/// Is the ball touching the paddle face in a way that should bounce?
///
/// Rejects contacts where the ball is moving away, has not yet reached the
/// front face, or is already behind the paddle's center line.
pub fn ball_paddle_contact(ball: &Ball, paddle: &Paddle) -> bool {
    let normal = paddle.normal();
    if ball.vel().dot(normal) >= 0.0 {
        return false;
    }

    let pos = ball.pos();
    let radius = ball.radius();

    // Leading edge must have crossed the front face
    let leading_x = pos.x - normal.x * radius;
    let crossed = (leading_x - paddle.front_face_x()) * normal.x <= 0.0;
    // Center still on the field side of the paddle
    let in_front = (pos.x - paddle.pos().x) * normal.x > 0.0;
    if !crossed || !in_front {
        return false;
    }

    // Circle vs rectangle overlap
    let half = Vec2::new(paddle.width() / 2.0, paddle.height() / 2.0);
    let closest = pos.clamp(paddle.pos() - half, paddle.pos() + half);
    (pos - closest).length_squared() <= radius * radius
}

/// Result of a honored paddle hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleBounce {
    pub side: Side,
    pub angle: f32,
    pub relative_y: f32,
    pub rotation: f32,
}

/// Bounce the ball off `paddle` if it is in contact and not cooling down
pub fn resolve_paddle_hit(ball: &mut Ball, paddle: &Paddle, tuning: &Tuning) -> Option<PaddleBounce> {
    if !ball.can_hit_paddle() || !ball_paddle_contact(ball, paddle) {
        return None;
    }

    let half = paddle.height() / 2.0;
    let relative_y = (ball.pos().y - paddle.pos().y).clamp(-half, half);
    let rotation = edge_rotation(
        paddle.side(),
        relative_y,
        paddle.height(),
        tuning.center_size,
        deg_to_rad(tuning.max_sharp_angle_deg),
    );

    let out = paddle_reflection(ball.vel(), paddle.normal(), rotation);
    let angle = angle_of(out);
    ball.set_velocity_by_angle(angle);
    ball.suspend_paddle_hits(tuning.paddle_hit_cooldown_ms);

    Some(PaddleBounce {
        side: paddle.side(),
        angle,
        relative_y,
        rotation,
    })
}

/// Result of a field boundary check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryHit {
    /// Bounced off the top or bottom
    Edge { edge: Edge, angle: f32 },
    /// Left the play area through `side`
    Exit { side: Side },
}

impl BoundaryHit {
    /// Player credited with the point, for exits
    pub fn scorer(&self) -> Option<Side> {
        match self {
            BoundaryHit::Exit { side } => Some(side.opposite()),
            BoundaryHit::Edge { .. } => None,
        }
    }
}

/// Check the ball against the field bounds
pub fn resolve_boundary(ball: &mut Ball, tuning: &Tuning) -> Option<BoundaryHit> {
    if !ball.collisions_enabled() {
        return None;
    }

    let pos = ball.pos();
    let vel = ball.vel();
    let radius = ball.radius();

    if pos.x < -tuning.exit_margin {
        return Some(BoundaryHit::Exit { side: Side::Left });
    }
    if pos.x > tuning.field_width + tuning.exit_margin {
        return Some(BoundaryHit::Exit { side: Side::Right });
    }

    let (edge, normal) = if pos.y - radius <= 0.0 && vel.y < 0.0 {
        (Edge::Top, Vec2::Y)
    } else if pos.y + radius >= tuning.field_height && vel.y > 0.0 {
        (Edge::Bottom, Vec2::NEG_Y)
    } else {
        return None;
    };

    let out = reflect_velocity(vel.normalize_or_zero(), normal);
    let angle = angle_of(out);
    ball.set_velocity_by_angle(angle);
    Some(BoundaryHit::Edge { edge, angle })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_4, PI};

    fn ball_at(pos: Vec2, angle: f32) -> Ball {
        let mut ball = Ball::new(20.0, 10.0, 4.0);
        ball.launch(angle, 450.0);
        ball.set_position(pos);
        ball
    }

    #[test]
    fn test_reflect_velocity() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0));
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_edge_fraction_zones() {
        // 150 tall, 0.4 center: flat zone is |y| <= 30
        assert_eq!(edge_fraction(0.0, 150.0, 0.4), 0.0);
        assert_eq!(edge_fraction(30.0, 150.0, 0.4), 0.0);
        assert!((edge_fraction(52.5, 150.0, 0.4) - 0.5).abs() < 1e-6);
        assert_eq!(edge_fraction(75.0, 150.0, 0.4), 1.0);
        assert_eq!(edge_fraction(-75.0, 150.0, 0.4), 1.0);
        // Past the end still counts as the extreme edge
        assert_eq!(edge_fraction(90.0, 150.0, 0.4), 1.0);
    }

    #[test]
    fn test_extreme_edge_uses_max_angle() {
        let max = deg_to_rad(45.0);
        assert!((edge_rotation(Side::Left, 75.0, 150.0, 0.4, max) - max).abs() < 1e-6);
        assert!((edge_rotation(Side::Left, -75.0, 150.0, 0.4, max) + max).abs() < 1e-6);
        assert!((edge_rotation(Side::Right, 75.0, 150.0, 0.4, max) + max).abs() < 1e-6);
        assert_eq!(edge_rotation(Side::Right, 0.0, 150.0, 0.4, max), 0.0);
    }

    #[test]
    fn test_edge_hits_deflect_toward_struck_edge() {
        let max = deg_to_rad(45.0);
        // Head-on into the lower edge of the left paddle: leaves down-right
        let rot = edge_rotation(Side::Left, 70.0, 150.0, 0.4, max);
        let out = paddle_reflection(Vec2::NEG_X, Vec2::X, rot);
        assert!(out.x > 0.0 && out.y > 0.0);

        // Upper edge of the right paddle: leaves up-left
        let rot = edge_rotation(Side::Right, -70.0, 150.0, 0.4, max);
        let out = paddle_reflection(Vec2::X, Vec2::NEG_X, rot);
        assert!(out.x < 0.0 && out.y < 0.0);
    }

    #[test]
    fn test_steep_result_is_clamped_away_from_paddle() {
        // Full 45° rotation on a head-on hit would go straight down
        let out = paddle_reflection(Vec2::NEG_X, Vec2::X, deg_to_rad(45.0));
        let from_normal = out.dot(Vec2::X).clamp(-1.0, 1.0).acos();
        assert!(from_normal <= deg_to_rad(MAX_BOUNCE_FROM_NORMAL_DEG) + 1e-4);
        assert!(out.x > 0.0 && out.y > 0.0);
    }

    #[test]
    fn test_paddle_hit_at_center_mirrors() {
        let tuning = Tuning::default();
        let paddle = Paddle::new(Side::Left, &tuning);
        // Left paddle front face at x = 62.5
        let incoming = PI - 0.3;
        let mut ball = ball_at(Vec2::new(80.0, paddle.pos().y), incoming);
        let speed_before = ball.speed();

        let bounce = resolve_paddle_hit(&mut ball, &paddle, &tuning).expect("should bounce");
        assert_eq!(bounce.rotation, 0.0);
        assert!((bounce.angle - 0.3).abs() < 1e-4);
        assert_eq!(ball.speed(), speed_before + tuning.speed_creep);
        assert!(!ball.can_hit_paddle());

        // Cooldown blocks an immediate second bounce
        assert!(resolve_paddle_hit(&mut ball, &paddle, &tuning).is_none());
    }

    #[test]
    fn test_paddle_hit_guards() {
        let tuning = Tuning::default();
        let paddle = Paddle::new(Side::Left, &tuning);
        let y = paddle.pos().y;

        // Not touching yet
        let mut far = ball_at(Vec2::new(200.0, y), PI);
        assert!(resolve_paddle_hit(&mut far, &paddle, &tuning).is_none());

        // Moving away
        let mut leaving = ball_at(Vec2::new(75.0, y), 0.0);
        assert!(resolve_paddle_hit(&mut leaving, &paddle, &tuning).is_none());

        // Center already behind the paddle's center line
        let mut behind = ball_at(Vec2::new(45.0, y), PI);
        assert!(resolve_paddle_hit(&mut behind, &paddle, &tuning).is_none());

        // Above the paddle entirely
        let mut above = ball_at(Vec2::new(75.0, y - 120.0), PI);
        assert!(resolve_paddle_hit(&mut above, &paddle, &tuning).is_none());
    }

    #[test]
    fn test_right_paddle_sends_ball_left() {
        let tuning = Tuning::default();
        let paddle = Paddle::new(Side::Right, &tuning);
        let mut ball = ball_at(Vec2::new(paddle.front_face_x() - 15.0, paddle.pos().y + 60.0), 0.2);

        let bounce = resolve_paddle_hit(&mut ball, &paddle, &tuning).expect("should bounce");
        assert_eq!(bounce.side, Side::Right);
        assert!(ball.vel().x < 0.0);
        assert!(ball.vel().y > 0.0);
    }

    #[test]
    fn test_top_and_bottom_bounce() {
        let tuning = Tuning::default();
        let mut ball = ball_at(Vec2::new(500.0, 10.0), -FRAC_PI_4);
        match resolve_boundary(&mut ball, &tuning) {
            Some(BoundaryHit::Edge { edge, angle }) => {
                assert_eq!(edge, Edge::Top);
                assert!((angle - FRAC_PI_4).abs() < 1e-4);
            }
            other => panic!("expected top bounce, got {other:?}"),
        }
        assert!(ball.vel().y > 0.0);
        // Already heading down: no second bounce
        assert!(resolve_boundary(&mut ball, &tuning).is_none());

        let mut ball = ball_at(Vec2::new(500.0, tuning.field_height - 5.0), 3.0 * FRAC_PI_4);
        match resolve_boundary(&mut ball, &tuning) {
            Some(BoundaryHit::Edge { edge, .. }) => assert_eq!(edge, Edge::Bottom),
            other => panic!("expected bottom bounce, got {other:?}"),
        }
        assert!(ball.vel().y < 0.0);
    }

    #[test]
    fn test_exits_score_for_the_other_side() {
        let tuning = Tuning::default();

        let mut ball = ball_at(Vec2::new(-tuning.exit_margin - 1.0, 300.0), PI);
        let hit = resolve_boundary(&mut ball, &tuning).unwrap();
        assert_eq!(hit, BoundaryHit::Exit { side: Side::Left });
        assert_eq!(hit.scorer(), Some(Side::Right));

        let mut ball = ball_at(Vec2::new(tuning.field_width + tuning.exit_margin + 1.0, 300.0), 0.0);
        let hit = resolve_boundary(&mut ball, &tuning).unwrap();
        assert_eq!(hit.scorer(), Some(Side::Left));
    }

    #[test]
    fn test_disabled_collisions_ignore_bounds() {
        let tuning = Tuning::default();
        let mut ball = ball_at(Vec2::new(-500.0, 300.0), PI);
        ball.disable_collisions();
        assert!(resolve_boundary(&mut ball, &tuning).is_none());
    }

    proptest! {
        #[test]
        fn center_hit_is_plain_mirror(theta in -1.2f32..1.2) {
            // Incoming toward the left paddle at angle theta from the -X axis
            let incoming = direction(PI - theta);
            let rot = edge_rotation(Side::Left, 0.0, 150.0, 0.4, deg_to_rad(45.0));
            prop_assert_eq!(rot, 0.0);
            let out = paddle_reflection(incoming, Vec2::X, rot);
            let expected = direction(theta);
            prop_assert!((out - expected).length() < 1e-4);
        }

        #[test]
        fn paddle_bounce_always_heads_to_opponent(
            theta in -1.3f32..1.3,
            rel in -75.0f32..75.0,
        ) {
            let max = deg_to_rad(45.0);
            let left = paddle_reflection(
                direction(PI - theta),
                Vec2::X,
                edge_rotation(Side::Left, rel, 150.0, 0.4, max),
            );
            prop_assert!(left.x > 0.0);
            let right = paddle_reflection(
                direction(theta),
                Vec2::NEG_X,
                edge_rotation(Side::Right, rel, 150.0, 0.4, max),
            );
            prop_assert!(right.x < 0.0);
        }
    }
}
