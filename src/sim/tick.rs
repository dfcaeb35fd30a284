//! Per-frame simulation update
//!
//! One call per rendered frame. Order within a frame: due timers, input,
//! kinematics with collisions after every ball substep, effect timers
//! (expired effects removed last).

use super::collision::{BoundaryHit, resolve_boundary, resolve_paddle_hit};
use super::events::GameEvent;
use super::state::{GamePhase, GameState, Intent, Side, Skill};

/// Nominal frame length at 60 Hz
pub const FRAME_MS: f32 = 1000.0 / 60.0;
/// Longest frame simulated; slower frames (tab switch, hitch) are clamped
pub const MAX_FRAME_MS: f32 = 100.0;
/// Upper bound on ball substeps per frame
pub const MAX_BALL_SUBSTEPS: usize = 20;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent per paddle, indexed by `Side::index`
    pub intents: [Intent; 2],
    /// Skill buttons currently held per paddle (skill 1, skill 2)
    pub skills: [[bool; 2]; 2],
}

impl TickInput {
    pub fn with_intent(mut self, side: Side, intent: Intent) -> Self {
        self.intents[side.index()] = intent;
        self
    }

    /// Hold a skill button this frame
    pub fn with_skill(mut self, side: Side, skill: Skill) -> Self {
        self.skills[side.index()][skill.index()] = true;
        self
    }
}

/// Move `side`'s paddle toward the ball, or back to center when the ball is
/// heading away. Used by the demo match.
pub fn tracking_intent(state: &GameState, side: Side, dead_zone: f32) -> Intent {
    let paddle = state.field.paddle(side);
    let ball = &state.field.ball;

    let incoming = ball.vel().dot(paddle.normal()) < 0.0;
    let target = if state.phase == GamePhase::RoundActive && incoming {
        ball.pos().y
    } else {
        state.field.center().y
    };

    let diff = target - paddle.pos().y;
    if diff.abs() <= dead_zone {
        Intent::None
    } else if diff < 0.0 {
        Intent::Up
    } else {
        Intent::Down
    }
}

/// Advance the match to `now_ms`, `delta_ms` after the previous frame
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: f64, delta_ms: f32) {
    // The clock never runs backwards
    state.now_ms = state.now_ms.max(now_ms);
    state.run_timers();

    match state.phase {
        GamePhase::Idle | GamePhase::MatchOver => return,
        _ => {}
    }

    let delta_ms = delta_ms.clamp(0.0, MAX_FRAME_MS);

    // Input
    for side in Side::BOTH {
        let paddle = state.field.paddle_mut(side);
        paddle.set_intent(input.intents[side.index()]);
        let pressed = paddle.press_skills(input.skills[side.index()]);
        for skill in pressed {
            state.use_skill(side, skill);
        }
    }

    // Kinematics
    let field_height = state.field.height;
    for side in Side::BOTH {
        state.field.paddle_mut(side).advance(delta_ms, field_height);
    }
    for id in state.field.advance_projectiles(delta_ms) {
        log::debug!("Projectile {id} left the field");
        state.events.emit(GameEvent::ProjectileDespawned { id });
    }

    if state.phase != GamePhase::RoundActive {
        return;
    }

    // Move the ball in small steps so a long frame cannot carry it through
    // a paddle
    let ball = &state.field.ball;
    let move_dist = ball.vel().length() * delta_ms / 1000.0;
    let step_size = ball.radius() * 0.3;
    let num_steps = ((move_dist / step_size).ceil() as usize).clamp(1, MAX_BALL_SUBSTEPS);
    let step_ms = delta_ms / num_steps as f32;

    for _ in 0..num_steps {
        state.field.ball.advance(step_ms);
        if let Some(exited) = resolve_ball_collisions(state) {
            state.ball_left_play_area(exited);
            return;
        }
    }

    state.tick_effects(delta_ms);
}

/// Paddle and boundary checks at the ball's current position. Returns the
/// side the ball left through, if it did.
fn resolve_ball_collisions(state: &mut GameState) -> Option<Side> {
    for side in Side::BOTH {
        let (ball, paddle) = state.field.ball_and_paddle(side);
        if let Some(bounce) = resolve_paddle_hit(ball, paddle, &state.tuning) {
            state.events.emit(GameEvent::BallReflectOnPaddle {
                side: bounce.side,
                angle: bounce.angle,
            });
        }
    }

    match resolve_boundary(&mut state.field.ball, &state.tuning)? {
        BoundaryHit::Edge { edge, angle } => {
            state
                .events
                .emit(GameEvent::BallReflectOnSceneEdge { edge, angle });
            None
        }
        BoundaryHit::Exit { side } => Some(side),
    }
}
