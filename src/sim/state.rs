//! Game state and core simulation types
//!
//! Ball and Paddle keep their fields private: speed changes must go through
//! `set_velocity_by_angle` (rally creep) or `set_speed` (effects), and size
//! changes through the multiplier setters.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effect::{Effect, EffectInfo};
use super::events::EventBus;
use super::loadout::EffectCatalog;
use super::timers::{Scheduler, TimerAction};
use crate::tuning::Tuning;
use crate::{angle_of, direction};

/// One of the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Index into per-player arrays
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Horizontal field boundaries the ball bounces off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
}

/// Directional paddle intent for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Up,
    Down,
    #[default]
    None,
}

impl Intent {
    /// Vertical direction in screen space (y grows downward)
    pub fn dir(&self) -> f32 {
        match self {
            Intent::Up => -1.0,
            Intent::Down => 1.0,
            Intent::None => 0.0,
        }
    }

    /// From a signed axis value (negative = up)
    pub fn from_axis(axis: i8) -> Self {
        match axis.signum() {
            -1 => Intent::Up,
            1 => Intent::Down,
            _ => Intent::None,
        }
    }
}

/// Skill button slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skill {
    One,
    Two,
}

impl Skill {
    pub const BOTH: [Skill; 2] = [Skill::One, Skill::Two];

    pub fn number(self) -> u8 {
        match self {
            Skill::One => 1,
            Skill::Two => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Skill::One),
            2 => Some(Skill::Two),
            _ => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        self.number() as usize - 1
    }
}

/// The ball
#[derive(Debug, Clone)]
pub struct Ball {
    pos: Vec2,
    vel: Vec2,
    /// Baseline speed magnitude
    speed: f32,
    radius: f32,
    alpha: f32,
    /// Off while a score is being resolved
    collisions_enabled: bool,
    /// Paddle hits ignored until this reaches zero
    paddle_cooldown_ms: f32,
    speed_creep: f32,
    nudge: f32,
}

impl Ball {
    pub fn new(radius: f32, speed_creep: f32, nudge: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            speed: 0.0,
            radius,
            alpha: 1.0,
            collisions_enabled: true,
            paddle_cooldown_ms: 0.0,
            speed_creep,
            nudge,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn vel(&self) -> Vec2 {
        self.vel
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Heading of the current velocity (radians)
    pub fn angle(&self) -> f32 {
        angle_of(self.vel)
    }

    pub fn collisions_enabled(&self) -> bool {
        self.collisions_enabled
    }

    /// Whether a paddle contact would be honored right now
    pub fn can_hit_paddle(&self) -> bool {
        self.collisions_enabled && self.paddle_cooldown_ms <= 0.0
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    /// Set velocity along `angle` from the current speed.
    ///
    /// Every call adds the rally creep to the baseline speed and nudges the
    /// ball a few units along the new heading so the same contact does not
    /// trigger again next frame.
    pub fn set_velocity_by_angle(&mut self, angle: f32) {
        self.speed += self.speed_creep;
        let dir = direction(angle);
        self.vel = dir * self.speed;
        self.pos += dir * self.nudge;
    }

    /// Change the speed magnitude, keeping the heading
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
        self.vel = self.vel.normalize_or_zero() * self.speed;
    }

    /// Fresh launch at `base_speed` along `angle`
    pub fn launch(&mut self, angle: f32, base_speed: f32) {
        self.speed = base_speed;
        self.alpha = 1.0;
        self.collisions_enabled = true;
        self.paddle_cooldown_ms = 0.0;
        self.set_velocity_by_angle(angle);
    }

    /// Stop in place with zero speed
    pub fn freeze(&mut self) {
        self.vel = Vec2::ZERO;
        self.speed = 0.0;
    }

    pub fn disable_collisions(&mut self) {
        self.collisions_enabled = false;
    }

    pub fn suspend_paddle_hits(&mut self, ms: f32) {
        self.paddle_cooldown_ms = self.paddle_cooldown_ms.max(ms);
    }

    /// Back to a centered, motionless, visible ball
    pub fn reset(&mut self, pos: Vec2) {
        self.pos = pos;
        self.freeze();
        self.alpha = 1.0;
        self.collisions_enabled = true;
        self.paddle_cooldown_ms = 0.0;
    }

    pub fn advance(&mut self, dt_ms: f32) {
        self.pos += self.vel * (dt_ms / 1000.0);
        if self.paddle_cooldown_ms > 0.0 {
            self.paddle_cooldown_ms = (self.paddle_cooldown_ms - dt_ms).max(0.0);
        }
    }
}

/// Display-only interpolation of the paddle size multiplier
#[derive(Debug, Clone, Copy)]
struct SizeTween {
    from: f32,
    to: f32,
    elapsed_ms: f32,
    duration_ms: f32,
}

impl SizeTween {
    fn settled(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            elapsed_ms: 0.0,
            duration_ms: 0.0,
        }
    }

    fn value(&self) -> f32 {
        if self.duration_ms <= 0.0 || self.elapsed_ms >= self.duration_ms {
            return self.to;
        }
        let t = self.elapsed_ms / self.duration_ms;
        self.from + (self.to - self.from) * t
    }
}

/// A player's paddle (moves on the vertical axis only)
#[derive(Debug, Clone)]
pub struct Paddle {
    side: Side,
    pos: Vec2,
    width: f32,
    base_height: f32,
    base_speed: f32,
    size_factor: f32,
    speed_factor: f32,
    intent: Intent,
    tween: SizeTween,
    tween_ms: f32,
    skills_held: [bool; 2],
}

impl Paddle {
    pub fn new(side: Side, tuning: &Tuning) -> Self {
        let x = match side {
            Side::Left => tuning.paddle_inset,
            Side::Right => tuning.field_width - tuning.paddle_inset,
        };
        Self {
            side,
            pos: Vec2::new(x, tuning.center_y()),
            width: tuning.paddle_width,
            base_height: tuning.paddle_height,
            base_speed: tuning.paddle_speed,
            size_factor: 1.0,
            speed_factor: 1.0,
            intent: Intent::None,
            tween: SizeTween::settled(1.0),
            tween_ms: tuning.size_tween_ms,
            skills_held: [false; 2],
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Logical height used by collision (multiplier applied instantly)
    pub fn height(&self) -> f32 {
        self.base_height * self.size_factor
    }

    /// Height to draw, following the size tween
    pub fn display_height(&self) -> f32 {
        self.base_height * self.tween.value()
    }

    pub fn size_factor(&self) -> f32 {
        self.size_factor
    }

    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    /// Vertical speed in units per second
    pub fn move_speed(&self) -> f32 {
        self.base_speed * self.speed_factor
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// Unit normal of the face looking at the field
    pub fn normal(&self) -> Vec2 {
        match self.side {
            Side::Left => Vec2::X,
            Side::Right => Vec2::NEG_X,
        }
    }

    /// X of the face looking at the field
    pub fn front_face_x(&self) -> f32 {
        self.pos.x + self.normal().x * self.width / 2.0
    }

    pub fn set_size_factor(&mut self, factor: f32) {
        let factor = factor.max(0.0);
        self.tween = SizeTween {
            from: self.tween.value(),
            to: factor,
            elapsed_ms: 0.0,
            duration_ms: self.tween_ms,
        };
        self.size_factor = factor;
    }

    pub fn set_speed_factor(&mut self, factor: f32) {
        self.speed_factor = factor.max(0.0);
    }

    /// Both multipliers back to 1 with no tween
    pub fn reset_multipliers(&mut self) {
        self.size_factor = 1.0;
        self.speed_factor = 1.0;
        self.tween = SizeTween::settled(1.0);
    }

    pub fn set_intent(&mut self, intent: Intent) {
        self.intent = intent;
    }

    pub fn set_y(&mut self, y: f32) {
        self.pos.y = y;
    }

    /// Record held skill buttons and return the ones pressed this frame
    pub fn press_skills(&mut self, held: [bool; 2]) -> Vec<Skill> {
        let pressed = Skill::BOTH
            .into_iter()
            .filter(|s| held[s.index()] && !self.skills_held[s.index()])
            .collect();
        self.skills_held = held;
        pressed
    }

    /// Move by intent and keep the paddle inside the field
    pub fn advance(&mut self, dt_ms: f32, field_height: f32) {
        self.pos.y += self.intent.dir() * self.move_speed() * (dt_ms / 1000.0);
        let half = (self.height() / 2.0).min(field_height / 2.0);
        self.pos.y = self.pos.y.clamp(half, field_height - half);
        self.tween.elapsed_ms += dt_ms;
    }
}

/// Straight-line projectile spawned by an effect
#[derive(Debug, Clone, Serialize)]
pub struct Projectile {
    pub id: u32,
    pub sprite: &'static str,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Projectile {
    pub fn advance(&mut self, dt_ms: f32) {
        self.pos += self.vel * (dt_ms / 1000.0);
    }
}

/// Entities on the playfield
#[derive(Debug, Clone)]
pub struct Field {
    pub width: f32,
    pub height: f32,
    pub exit_margin: f32,
    pub ball: Ball,
    paddles: [Paddle; 2],
    pub projectiles: Vec<Projectile>,
    projectile_speed: f32,
    projectile_nudge: f32,
    next_projectile_id: u32,
}

impl Field {
    pub fn new(tuning: &Tuning) -> Self {
        let mut field = Self {
            width: tuning.field_width,
            height: tuning.field_height,
            exit_margin: tuning.exit_margin,
            ball: Ball::new(tuning.ball_radius, tuning.speed_creep, tuning.nudge),
            paddles: [Paddle::new(Side::Left, tuning), Paddle::new(Side::Right, tuning)],
            projectiles: Vec::new(),
            projectile_speed: tuning.projectile_speed,
            projectile_nudge: tuning.nudge,
            next_projectile_id: 1,
        };
        field.reset();
        field
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        &self.paddles[side.index()]
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        &mut self.paddles[side.index()]
    }

    pub fn paddles(&self) -> impl Iterator<Item = &Paddle> {
        self.paddles.iter()
    }

    /// Ball and one paddle, borrowed together for collision response
    pub fn ball_and_paddle(&mut self, side: Side) -> (&mut Ball, &Paddle) {
        (&mut self.ball, &self.paddles[side.index()])
    }

    /// Center everything, stop the ball, paddles at baseline, no projectiles.
    /// Returns the ids of the projectiles that were cleared.
    pub fn reset(&mut self) -> Vec<u32> {
        let center = self.center();
        self.ball.reset(center);
        for paddle in &mut self.paddles {
            paddle.reset_multipliers();
            paddle.set_y(center.y);
            paddle.set_intent(Intent::None);
        }
        self.projectiles.drain(..).map(|p| p.id).collect()
    }

    /// Launch a projectile from `side`'s paddle toward the opponent
    pub fn spawn_projectile(&mut self, side: Side, sprite: &'static str) -> Projectile {
        let paddle = self.paddle(side);
        let vel = paddle.normal() * self.projectile_speed;
        let pos = paddle.pos() + vel.normalize_or_zero() * self.projectile_nudge;
        let projectile = Projectile {
            id: self.next_projectile_id,
            sprite,
            pos,
            vel,
        };
        self.next_projectile_id += 1;
        self.projectiles.push(projectile.clone());
        projectile
    }

    /// Move projectiles; returns ids of those culled for leaving the field
    pub fn advance_projectiles(&mut self, dt_ms: f32) -> Vec<u32> {
        let (w, h, m) = (self.width, self.height, self.exit_margin);
        let mut culled = Vec::new();
        self.projectiles.retain_mut(|p| {
            p.advance(dt_ms);
            let outside = p.pos.x < -m || p.pos.x > w + m || p.pos.y < -m || p.pos.y > h + m;
            if outside {
                culled.push(p.id);
            }
            !outside
        });
        culled
    }
}

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Before the first `initial_setup`
    Idle,
    /// Entities reset, countdown running
    RoundSetup,
    /// Ball in play
    RoundActive,
    /// Ball frozen while the lost life is shown
    ScoreResolution,
    /// A player ran out of lives
    MatchOver,
}

/// Complete match state
#[derive(Debug)]
pub struct GameState {
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub field: Field,
    /// Remaining lives, indexed by `Side::index`
    pub lives: [u8; 2],
    pub winner: Option<Side>,
    pub catalog: EffectCatalog,
    /// Icon index of each player's loadout
    pub loadouts: [Option<u8>; 2],
    pub events: EventBus,
    /// Game clock (ms), supplied by `tick`
    pub now_ms: f64,
    pub(crate) effects: Vec<Effect>,
    pub(crate) timers: Scheduler,
    pub(crate) rng: Pcg32,
    next_effect_id: u64,
}

impl GameState {
    /// Create a match in `Idle`; call `initial_setup` to begin
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self::with_catalog(tuning, seed, EffectCatalog::standard())
    }

    pub fn with_catalog(tuning: Tuning, seed: u64, catalog: EffectCatalog) -> Self {
        let tuning = tuning.validated();
        Self {
            seed,
            field: Field::new(&tuning),
            lives: [tuning.starting_lives; 2],
            tuning,
            phase: GamePhase::Idle,
            winner: None,
            catalog,
            loadouts: [None; 2],
            events: EventBus::new(),
            now_ms: 0.0,
            effects: Vec::new(),
            timers: Scheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_effect_id: 1,
        }
    }

    pub fn lives(&self, side: Side) -> u8 {
        self.lives[side.index()]
    }

    /// Active effects in the order they were applied
    pub fn active_effects(&self) -> &[Effect] {
        &self.effects
    }

    pub(crate) fn next_effect_id(&mut self) -> u64 {
        let id = self.next_effect_id;
        self.next_effect_id += 1;
        id
    }

    /// Whole seconds left on the round countdown (for the HUD)
    pub fn countdown_remaining_secs(&self) -> Option<u32> {
        self.timers
            .remaining_ms(self.now_ms, TimerAction::StartRound)
            .map(|ms| (ms / 1000.0).ceil() as u32)
    }

    /// Everything the presentation layer draws this frame
    pub fn snapshot(&self) -> FrameSnapshot {
        let ball = &self.field.ball;
        FrameSnapshot {
            phase: self.phase,
            ball: BallView {
                pos: ball.pos(),
                angle: ball.angle(),
                speed: ball.speed(),
                alpha: ball.alpha(),
            },
            paddles: Side::BOTH.map(|side| {
                let p = self.field.paddle(side);
                PaddleView {
                    side,
                    pos: p.pos(),
                    width: p.width(),
                    height: p.height(),
                    display_height: p.display_height(),
                }
            }),
            projectiles: self.field.projectiles.clone(),
            lives: self.lives,
            loadouts: self.loadouts,
            winner: self.winner,
            countdown: self.countdown_remaining_secs(),
            effects: self.effects.iter().map(Effect::info).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BallView {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaddleView {
    pub side: Side,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub display_height: f32,
}

/// Serializable per-frame view for the renderer/HUD
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub phase: GamePhase,
    pub ball: BallView,
    pub paddles: [PaddleView; 2],
    pub projectiles: Vec<Projectile>,
    pub lives: [u8; 2],
    pub loadouts: [Option<u8>; 2],
    pub winner: Option<Side>,
    pub countdown: Option<u32>,
    pub effects: Vec<EffectInfo>,
}
