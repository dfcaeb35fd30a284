//! Timed buffs and debuffs
//!
//! An [`Effect`] is a closed set of variants sharing one lifecycle:
//! `Pending -> Applied -> Removed`, or `Pending -> Discarded` when it is
//! rejected or retired before ever being applied. `apply` and `remove` are
//! guarded by that state, so each runs at most once and `remove` never runs
//! without `apply`.

use std::fmt;

use serde::Serialize;

use super::events::{EventBus, GameEvent};
use super::state::{Field, Side};

pub type EffectId = u64;

/// Paddle effect duration
pub const PADDLE_EFFECT_MS: f32 = 8000.0;
/// Constant ball speed effect duration
pub const BALL_SPEED_MS: f32 = 700.0;
/// Ball invisibility duration
pub const BALL_INVISIBLE_MS: f32 = 500.0;
/// Default effect duration
pub const DEFAULT_EFFECT_MS: f32 = 5000.0;

/// Variant discriminant, used for lookup tables (sprites, sound cues)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    BallSpeed,
    PaddleSize,
    BallInvisible,
    SpawnProjectile,
}

impl EffectKind {
    pub fn sprite_name(&self) -> &'static str {
        match self {
            EffectKind::BallSpeed => "effect/ball-speed",
            EffectKind::PaddleSize => "effect/paddle-size",
            EffectKind::BallInvisible => "effect/ball-invisible",
            EffectKind::SpawnProjectile => "effect/spawn-projectile",
        }
    }
}

/// Which player an effect is credited to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectTarget {
    Left,
    Right,
    Both,
}

impl From<Side> for EffectTarget {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => EffectTarget::Left,
            Side::Right => EffectTarget::Right,
        }
    }
}

/// Three-phase speed multiplier: ease-out cubic up to `max`, hold, ease-in
/// cubic back down to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedEnvelope {
    pub max: f32,
    pub ramp_up_ms: f32,
    pub hold_ms: f32,
    pub ramp_down_ms: f32,
}

impl SpeedEnvelope {
    pub const STANDARD: SpeedEnvelope = SpeedEnvelope {
        max: 1.8,
        ramp_up_ms: 400.0,
        hold_ms: 1600.0,
        ramp_down_ms: 600.0,
    };

    pub fn total_ms(&self) -> f32 {
        self.ramp_up_ms + self.hold_ms + self.ramp_down_ms
    }

    /// Multiplier after `elapsed_ms`
    pub fn multiplier_at(&self, elapsed_ms: f32) -> f32 {
        let elapsed = elapsed_ms.max(0.0);
        let hold_end = self.ramp_up_ms + self.hold_ms;

        if elapsed < self.ramp_up_ms {
            let t = elapsed / self.ramp_up_ms;
            let eased = 1.0 - (1.0 - t).powi(3);
            1.0 + (self.max - 1.0) * eased
        } else if elapsed < hold_end {
            self.max
        } else if elapsed < self.total_ms() {
            let t = (elapsed - hold_end) / self.ramp_down_ms;
            self.max + (1.0 - self.max) * t.powi(3)
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedProfile {
    Constant(f32),
    Ramp(SpeedEnvelope),
}

impl SpeedProfile {
    fn multiplier_at(&self, elapsed_ms: f32) -> f32 {
        match self {
            SpeedProfile::Constant(m) => *m,
            SpeedProfile::Ramp(env) => env.multiplier_at(elapsed_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectVariant {
    /// Scales the ball speed; `applied` is the multiplier currently in force
    BallSpeed { profile: SpeedProfile, applied: f32 },
    /// Scales one paddle's height and move speed
    PaddleSize { paddle: Side, size: f32, speed: f32 },
    /// Hides the ball
    BallInvisible,
    /// Fires a projectile from a paddle
    SpawnProjectile { paddle: Side, sprite: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Pending,
    Applied,
    Removed,
    Discarded,
}

/// A timed modifier
#[derive(Debug, Clone)]
pub struct Effect {
    id: EffectId,
    target: EffectTarget,
    display_name: Option<&'static str>,
    /// `None` = infinite
    total_ms: Option<f32>,
    remaining_ms: Option<f32>,
    elapsed_ms: f32,
    lifecycle: Lifecycle,
    variant: EffectVariant,
}

impl Effect {
    fn new(target: EffectTarget, duration_ms: f32, variant: EffectVariant) -> Self {
        Self {
            id: 0,
            target,
            display_name: None,
            total_ms: Some(duration_ms),
            remaining_ms: Some(duration_ms),
            elapsed_ms: 0.0,
            lifecycle: Lifecycle::Pending,
            variant,
        }
    }

    /// Constant ball speed multiplier
    pub fn ball_speed(target: EffectTarget, multiplier: f32) -> Self {
        Self::new(
            target,
            BALL_SPEED_MS,
            EffectVariant::BallSpeed {
                profile: SpeedProfile::Constant(multiplier),
                applied: 1.0,
            },
        )
    }

    /// Ramped ball speed; lasts exactly as long as the envelope
    pub fn ball_speed_ramp(target: EffectTarget, envelope: SpeedEnvelope) -> Self {
        Self::new(
            target,
            envelope.total_ms(),
            EffectVariant::BallSpeed {
                profile: SpeedProfile::Ramp(envelope),
                applied: 1.0,
            },
        )
    }

    pub fn paddle(paddle: Side, size: f32, speed: f32) -> Self {
        Self::new(
            paddle.into(),
            PADDLE_EFFECT_MS,
            EffectVariant::PaddleSize { paddle, size, speed },
        )
    }

    pub fn ball_invisible(target: EffectTarget) -> Self {
        Self::new(target, BALL_INVISIBLE_MS, EffectVariant::BallInvisible)
    }

    pub fn spawn_projectile(paddle: Side, sprite: &'static str) -> Self {
        Self::new(
            paddle.into(),
            DEFAULT_EFFECT_MS,
            EffectVariant::SpawnProjectile { paddle, sprite },
        )
    }

    pub fn with_display_name(mut self, name: &'static str) -> Self {
        self.display_name = Some(name);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: f32) -> Self {
        self.total_ms = Some(duration_ms);
        self.remaining_ms = Some(duration_ms);
        self
    }

    /// Never expires on its own
    pub fn infinite(mut self) -> Self {
        self.total_ms = None;
        self.remaining_ms = None;
        self
    }

    pub(crate) fn assign_id(&mut self, id: EffectId) {
        self.id = id;
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    pub fn target(&self) -> EffectTarget {
        self.target
    }

    pub fn display_name(&self) -> Option<&'static str> {
        self.display_name
    }

    pub fn variant(&self) -> &EffectVariant {
        &self.variant
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn remaining_ms(&self) -> Option<f32> {
        self.remaining_ms
    }

    pub fn kind(&self) -> EffectKind {
        match self.variant {
            EffectVariant::BallSpeed { .. } => EffectKind::BallSpeed,
            EffectVariant::PaddleSize { .. } => EffectKind::PaddleSize,
            EffectVariant::BallInvisible => EffectKind::BallInvisible,
            EffectVariant::SpawnProjectile { .. } => EffectKind::SpawnProjectile,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_ms.is_some_and(|ms| ms <= 0.0)
    }

    /// True when both effects contend for the same resource: the same
    /// paddle, the ball speed, or the ball visibility. Anything else is only
    /// exclusive with itself.
    pub fn is_exclusive_with(&self, other: &Effect) -> bool {
        use EffectVariant::*;
        match (&self.variant, &other.variant) {
            (PaddleSize { paddle: a, .. }, PaddleSize { paddle: b, .. }) => a == b,
            (BallSpeed { .. }, BallSpeed { .. }) => true,
            (BallInvisible, BallInvisible) => true,
            _ => self.id == other.id,
        }
    }

    /// Mutate the target and announce it. Only a pending effect applies.
    pub fn apply(&mut self, field: &mut Field, events: &mut EventBus) -> bool {
        if self.lifecycle != Lifecycle::Pending {
            return false;
        }

        match &mut self.variant {
            EffectVariant::BallSpeed { profile, applied } => {
                let multiplier = profile.multiplier_at(0.0);
                let base = field.ball.speed();
                field.ball.set_speed(base * multiplier);
                *applied = multiplier;
            }
            EffectVariant::PaddleSize { paddle, size, speed } => {
                let paddle = field.paddle_mut(*paddle);
                paddle.set_size_factor(*size);
                paddle.set_speed_factor(*speed);
            }
            EffectVariant::BallInvisible => field.ball.set_alpha(0.0),
            EffectVariant::SpawnProjectile { paddle, sprite } => {
                let projectile = field.spawn_projectile(*paddle, *sprite);
                events.emit(GameEvent::SpawnProjectile {
                    id: projectile.id,
                    sprite: projectile.sprite,
                    position: projectile.pos,
                    velocity: projectile.vel,
                });
            }
        }

        self.lifecycle = Lifecycle::Applied;
        log::debug!("Effect applied: {self}");
        events.emit(GameEvent::EffectApplied { effect: self.info() });
        true
    }

    /// Revert the target to baseline and announce it. Only an applied effect
    /// is reverted; a pending one is discarded silently.
    pub fn remove(&mut self, field: &mut Field, events: &mut EventBus) -> bool {
        match self.lifecycle {
            Lifecycle::Applied => {}
            Lifecycle::Pending => {
                self.lifecycle = Lifecycle::Discarded;
                return false;
            }
            Lifecycle::Removed | Lifecycle::Discarded => return false,
        }

        match &mut self.variant {
            EffectVariant::BallSpeed { applied, .. } => {
                // Divide out what this effect added; rally creep gained while
                // active stays
                let base = field.ball.speed() / applied.max(f32::EPSILON);
                field.ball.set_speed(base);
                *applied = 1.0;
            }
            EffectVariant::PaddleSize { paddle, .. } => {
                let paddle = field.paddle_mut(*paddle);
                paddle.set_size_factor(1.0);
                paddle.set_speed_factor(1.0);
            }
            EffectVariant::BallInvisible => field.ball.set_alpha(1.0),
            EffectVariant::SpawnProjectile { .. } => {}
        }

        self.lifecycle = Lifecycle::Removed;
        log::debug!("Effect removed: {self}");
        events.emit(GameEvent::EffectRemoved { effect: self.info() });
        true
    }

    /// Retire a never-applied effect
    pub(crate) fn discard(&mut self) {
        if self.lifecycle == Lifecycle::Pending {
            self.lifecycle = Lifecycle::Discarded;
        }
    }

    /// Count down and update continuous multipliers
    pub fn tick(&mut self, delta_ms: f32, field: &mut Field) {
        if self.lifecycle != Lifecycle::Applied {
            return;
        }

        self.elapsed_ms += delta_ms;
        if let Some(remaining) = self.remaining_ms.as_mut() {
            *remaining -= delta_ms;
        }

        if let EffectVariant::BallSpeed {
            profile: SpeedProfile::Ramp(env),
            applied,
        } = &mut self.variant
        {
            let multiplier = env.multiplier_at(self.elapsed_ms);
            let base = field.ball.speed() / applied.max(f32::EPSILON);
            field.ball.set_speed(base * multiplier);
            *applied = multiplier;
        }
    }

    /// Snapshot for events and the HUD
    pub fn info(&self) -> EffectInfo {
        EffectInfo {
            id: self.id,
            kind: self.kind(),
            target: self.target,
            name: self.display_name,
            label: self.to_string(),
            sprite: self.kind().sprite_name(),
            total_ms: self.total_ms,
            remaining_ms: self.remaining_ms,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            EffectVariant::BallSpeed { profile, .. } => {
                let peak = match profile {
                    SpeedProfile::Constant(m) => *m,
                    SpeedProfile::Ramp(env) => env.max,
                };
                if peak > 1.0 {
                    write!(f, "Ball Speed Up ({:.0}%)", peak * 100.0)
                } else if peak < 1.0 {
                    write!(f, "Ball Speed Down ({:.0}%)", peak * 100.0)
                } else {
                    write!(f, "Ball Speed Effect")
                }
            }
            EffectVariant::PaddleSize { paddle, size, .. } => {
                let side = paddle.as_str();
                if *size > 1.0 {
                    write!(f, "Paddle Size Up ({side})")
                } else if *size < 1.0 {
                    write!(f, "Paddle Size Down ({side})")
                } else {
                    write!(f, "Paddle Effect ({side})")
                }
            }
            EffectVariant::BallInvisible => write!(f, "Ball Invisible"),
            EffectVariant::SpawnProjectile { .. } => write!(f, "Projectile Spawned"),
        }
    }
}

/// Serializable description of an effect carried by events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectInfo {
    pub id: EffectId,
    pub kind: EffectKind,
    pub target: EffectTarget,
    pub name: Option<&'static str>,
    pub label: String,
    pub sprite: &'static str,
    pub total_ms: Option<f32>,
    pub remaining_ms: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::EventKind;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn setup() -> (Field, EventBus) {
        (Field::new(&Tuning::default()), EventBus::new())
    }

    fn with_id(mut effect: Effect, id: EffectId) -> Effect {
        effect.assign_id(id);
        effect
    }

    #[test]
    fn test_apply_and_remove_run_once() {
        let (mut field, mut events) = setup();
        let mut effect = with_id(Effect::paddle(Side::Left, 1.5, 0.75), 1);

        assert!(effect.apply(&mut field, &mut events));
        assert!(!effect.apply(&mut field, &mut events));
        assert_eq!(field.paddle(Side::Left).height(), 225.0);
        assert_eq!(field.paddle(Side::Left).speed_factor(), 0.75);

        assert!(effect.remove(&mut field, &mut events));
        assert!(!effect.remove(&mut field, &mut events));
        assert_eq!(field.paddle(Side::Left).height(), 150.0);
        assert_eq!(field.paddle(Side::Left).speed_factor(), 1.0);

        let kinds: Vec<_> = events.drain().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EventKind::EffectApplied, EventKind::EffectRemoved]);
    }

    #[test]
    fn test_remove_before_apply_is_silent() {
        let (mut field, mut events) = setup();
        let mut effect = with_id(Effect::ball_invisible(EffectTarget::Both), 1);

        assert!(!effect.remove(&mut field, &mut events));
        assert_eq!(effect.lifecycle(), Lifecycle::Discarded);
        assert!(!effect.apply(&mut field, &mut events));
        assert!(events.pending().is_empty());
        assert_eq!(field.ball.alpha(), 1.0);
    }

    #[test]
    fn test_invisibility_toggles_alpha() {
        let (mut field, mut events) = setup();
        let mut effect = with_id(Effect::ball_invisible(EffectTarget::Left), 1);
        effect.apply(&mut field, &mut events);
        assert_eq!(field.ball.alpha(), 0.0);
        effect.remove(&mut field, &mut events);
        assert_eq!(field.ball.alpha(), 1.0);
    }

    #[test]
    fn test_constant_speed_restores_original() {
        let (mut field, mut events) = setup();
        field.ball.launch(0.3, 450.0);
        let original = field.ball.speed();

        let mut effect = with_id(Effect::ball_speed(EffectTarget::Both, 1.5), 1);
        effect.apply(&mut field, &mut events);
        assert!((field.ball.speed() - original * 1.5).abs() < 1e-3);
        assert!((field.ball.angle() - 0.3).abs() < 1e-5);

        effect.remove(&mut field, &mut events);
        assert!((field.ball.speed() - original).abs() < 1e-3);
    }

    #[test]
    fn test_ramp_envelope_phases() {
        let env = SpeedEnvelope::STANDARD;
        assert_eq!(env.total_ms(), 2600.0);
        assert_eq!(env.multiplier_at(0.0), 1.0);
        // ease-out: more than linear progress at the midpoint
        let mid = env.multiplier_at(200.0);
        assert!(mid > 1.0 + (env.max - 1.0) * 0.5);
        assert_eq!(env.multiplier_at(400.0), env.max);
        assert_eq!(env.multiplier_at(1999.0), env.max);
        // ease-in: still near max early in the ramp-down
        assert!(env.multiplier_at(2100.0) > env.max - 0.05);
        assert_eq!(env.multiplier_at(2600.0), 1.0);
    }

    #[test]
    fn test_ramp_effect_tracks_envelope_and_expires() {
        let (mut field, mut events) = setup();
        field.ball.launch(0.0, 450.0);
        let original = field.ball.speed();
        let env = SpeedEnvelope::STANDARD;

        let mut effect = with_id(Effect::ball_speed_ramp(EffectTarget::Left, env), 1);
        effect.apply(&mut field, &mut events);
        assert_eq!(effect.remaining_ms(), Some(env.total_ms()));

        effect.tick(1000.0, &mut field);
        assert!((field.ball.speed() - original * env.max).abs() < 1e-2);
        assert!(!effect.is_expired());

        effect.tick(1600.0, &mut field);
        assert!(effect.is_expired());
        assert!((field.ball.speed() - original).abs() < 1e-2);

        effect.remove(&mut field, &mut events);
        assert!((field.ball.speed() - original).abs() < 1e-2);
    }

    #[test]
    fn test_infinite_never_expires() {
        let (mut field, mut events) = setup();
        let mut effect = with_id(Effect::ball_invisible(EffectTarget::Both).infinite(), 1);
        effect.apply(&mut field, &mut events);
        effect.tick(1.0e9, &mut field);
        assert!(!effect.is_expired());
        assert_eq!(effect.remaining_ms(), None);
    }

    #[test]
    fn test_projectile_effect_spawns() {
        let (mut field, mut events) = setup();
        let mut effect = with_id(Effect::spawn_projectile(Side::Right, "gas_cloud"), 1);
        effect.apply(&mut field, &mut events);

        assert_eq!(field.projectiles.len(), 1);
        assert!(field.projectiles[0].vel.x < 0.0);
        let kinds: Vec<_> = events.drain().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EventKind::SpawnProjectile, EventKind::EffectApplied]);
    }

    #[test]
    fn test_exclusivity_by_resource() {
        let speed_a = with_id(Effect::ball_speed(EffectTarget::Left, 1.2), 1);
        let speed_b = with_id(Effect::ball_speed_ramp(EffectTarget::Right, SpeedEnvelope::STANDARD), 2);
        let hide_a = with_id(Effect::ball_invisible(EffectTarget::Left), 3);
        let hide_b = with_id(Effect::ball_invisible(EffectTarget::Right), 4);
        let shot_a = with_id(Effect::spawn_projectile(Side::Left, "virus"), 5);
        let shot_b = with_id(Effect::spawn_projectile(Side::Left, "virus"), 6);

        assert!(speed_a.is_exclusive_with(&speed_b));
        assert!(hide_a.is_exclusive_with(&hide_b));
        assert!(!speed_a.is_exclusive_with(&hide_a));
        assert!(!shot_a.is_exclusive_with(&shot_b));
        assert!(shot_a.is_exclusive_with(&shot_a));
    }

    #[test]
    fn test_labels() {
        assert_eq!(Effect::paddle(Side::Left, 1.4, 0.9).to_string(), "Paddle Size Up (left)");
        assert_eq!(Effect::paddle(Side::Right, 0.7, 1.0).to_string(), "Paddle Size Down (right)");
        assert_eq!(
            Effect::ball_speed_ramp(EffectTarget::Both, SpeedEnvelope::STANDARD).to_string(),
            "Ball Speed Up (180%)"
        );
        let named = Effect::ball_invisible(EffectTarget::Both).with_display_name("Portals");
        assert_eq!(named.info().name, Some("Portals"));
    }

    fn side() -> impl Strategy<Value = Side> {
        prop_oneof![Just(Side::Left), Just(Side::Right)]
    }

    proptest! {
        #[test]
        fn paddle_effects_exclusive_iff_same_paddle(
            a in side(), b in side(),
            size_a in 0.5f32..2.0, size_b in 0.5f32..2.0,
        ) {
            let first = with_id(Effect::paddle(a, size_a, 1.0), 1);
            let second = with_id(Effect::paddle(b, size_b, 1.0), 2);
            prop_assert_eq!(first.is_exclusive_with(&second), a == b);
            prop_assert_eq!(second.is_exclusive_with(&first), a == b);
        }

        #[test]
        fn envelope_stays_between_one_and_max(elapsed in 0.0f32..5000.0) {
            let env = SpeedEnvelope::STANDARD;
            let m = env.multiplier_at(elapsed);
            prop_assert!(m >= 1.0 - 1e-5 && m <= env.max + 1e-5);
        }
    }
}
