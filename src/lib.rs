//! Buff Pong - two-player Pong with timed buffs and debuffs
//!
//! Core modules:
//! - `sim`: Deterministic round/effect simulation (entities, collisions, effects, events)
//! - `tuning`: Data-driven match balance
//! - `cues`: Sound cue lookup for the presentation layer
//! - `web`: wasm-bindgen bridge (wasm32 only)

pub mod cues;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use cues::{CueTable, SoundCue};
pub use tuning::{SkillBinding, Tuning};

use glam::Vec2;

/// Baseline numbers (all distances in world units, all times in milliseconds)
pub mod consts {
    /// Playfield size
    pub const FIELD_WIDTH: f32 = 1024.0;
    pub const FIELD_HEIGHT: f32 = 768.0;
    /// How far past the left/right edge the ball must travel to count as out
    pub const EXIT_MARGIN: f32 = 40.0;

    /// Paddle defaults
    pub const PADDLE_INSET: f32 = 50.0;
    pub const PADDLE_WIDTH: f32 = 25.0;
    pub const PADDLE_HEIGHT: f32 = 150.0;
    /// Vertical move speed (units per second)
    pub const PADDLE_SPEED: f32 = 500.0;
    /// Fraction of the paddle face that reflects without edge adjustment
    pub const PADDLE_CENTER_SIZE: f32 = 0.4;
    /// Maximum normal rotation at the paddle's extreme edge (degrees)
    pub const MAX_SHARP_ANGLE_DEG: f32 = 45.0;
    /// Size multiplier tween length
    pub const SIZE_TWEEN_MS: f32 = 150.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 20.0;
    pub const BALL_START_SPEED: f32 = 450.0;
    /// Rally-speed creep added on every velocity change by angle
    pub const BALL_SPEED_CREEP: f32 = 10.0;
    /// Position nudge along the new velocity after a reflection
    pub const BALL_NUDGE: f32 = 4.0;
    /// Paddle collision suspension after a paddle hit
    pub const PADDLE_HIT_COOLDOWN_MS: f32 = 500.0;
    /// Random launch spread around the horizontal (degrees)
    pub const LAUNCH_SPREAD_DEG: f32 = 45.0;
    /// Ball alpha while the score feedback plays
    pub const SCORED_BALL_ALPHA: f32 = 0.3;

    /// Round flow
    pub const COUNTDOWN_MS: f64 = 3000.0;
    pub const SCORE_FEEDBACK_MS: f64 = 1400.0;
    pub const STARTING_LIVES: u8 = 5;

    /// Projectiles
    pub const PROJECTILE_SPEED: f32 = 450.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Direction angle of a vector (radians, screen space with y down)
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector pointing along `angle`
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

#[inline]
pub fn deg_to_rad(deg: f32) -> f32 {
    deg * std::f32::consts::PI / 180.0
}
