//! Match tuning
//!
//! Every gameplay number lives here so balance can be tweaked from JSON
//! without touching the simulation. Missing keys fall back to `consts`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// What the two skill buttons of a paddle trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SkillBinding {
    /// Skill 1: enlarge own paddle. Skill 2: ball speed ramp.
    #[default]
    Fixed,
    /// Skill 1: loadout buff. Skill 2: loadout debuff aimed at the opponent.
    Loadout,
}

impl SkillBinding {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillBinding::Fixed => "fixed",
            SkillBinding::Loadout => "loadout",
        }
    }
}

/// Data-driven match balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,
    /// Distance past the side edges before a ball counts as scored
    pub exit_margin: f32,

    // === Paddles ===
    /// Horizontal distance of each paddle from its side edge
    pub paddle_inset: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Units per second
    pub paddle_speed: f32,
    /// Fraction of the paddle face with plain mirror reflection
    pub center_size: f32,
    /// Degrees of normal rotation at the paddle's extreme edge
    pub max_sharp_angle_deg: f32,
    pub size_tween_ms: f32,

    // === Ball ===
    pub ball_radius: f32,
    pub ball_start_speed: f32,
    pub speed_creep: f32,
    pub nudge: f32,
    pub paddle_hit_cooldown_ms: f32,
    pub launch_spread_deg: f32,
    pub scored_ball_alpha: f32,

    // === Round flow ===
    pub countdown_ms: f64,
    pub score_feedback_ms: f64,
    pub starting_lives: u8,

    // === Effects ===
    pub projectile_speed: f32,
    pub skill_binding: SkillBinding,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            exit_margin: EXIT_MARGIN,

            paddle_inset: PADDLE_INSET,
            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_speed: PADDLE_SPEED,
            center_size: PADDLE_CENTER_SIZE,
            max_sharp_angle_deg: MAX_SHARP_ANGLE_DEG,
            size_tween_ms: SIZE_TWEEN_MS,

            ball_radius: BALL_RADIUS,
            ball_start_speed: BALL_START_SPEED,
            speed_creep: BALL_SPEED_CREEP,
            nudge: BALL_NUDGE,
            paddle_hit_cooldown_ms: PADDLE_HIT_COOLDOWN_MS,
            launch_spread_deg: LAUNCH_SPREAD_DEG,
            scored_ball_alpha: SCORED_BALL_ALPHA,

            countdown_ms: COUNTDOWN_MS,
            score_feedback_ms: SCORE_FEEDBACK_MS,
            starting_lives: STARTING_LIVES,

            projectile_speed: PROJECTILE_SPEED,
            skill_binding: SkillBinding::Fixed,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON (missing keys keep their defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.validated())
    }

    /// Parse tuning from JSON, falling back to defaults on error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning ({} skill binding)", tuning.skill_binding.as_str());
                tuning
            }
            Err(e) => {
                log::warn!("Invalid tuning JSON ({e}), using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp values the simulation cannot work with
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if !(0.0..=1.0).contains(&self.center_size) {
            log::warn!("center_size {} outside [0, 1], clamping", self.center_size);
            self.center_size = self.center_size.clamp(0.0, 1.0);
        }
        if self.starting_lives == 0 {
            log::warn!("starting_lives must be at least 1");
            self.starting_lives = 1;
        }
        for (name, value, fallback) in [
            ("field_width", &mut self.field_width, defaults.field_width),
            ("field_height", &mut self.field_height, defaults.field_height),
            ("paddle_width", &mut self.paddle_width, defaults.paddle_width),
            ("paddle_height", &mut self.paddle_height, defaults.paddle_height),
            ("ball_radius", &mut self.ball_radius, defaults.ball_radius),
        ] {
            if *value <= 0.0 {
                log::warn!("{name} must be positive, got {value}");
                *value = fallback;
            }
        }
        self.max_sharp_angle_deg = self.max_sharp_angle_deg.clamp(0.0, 89.0);
        self.scored_ball_alpha = self.scored_ball_alpha.clamp(0.0, 1.0);
        self
    }

    /// Vertical center of the field
    pub fn center_y(&self) -> f32 {
        self.field_height / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let t = Tuning::default();
        assert_eq!(t.starting_lives, 5);
        assert_eq!(t.paddle_height, 150.0);
        assert_eq!(t.center_size, 0.4);
        assert_eq!(t.countdown_ms, 3000.0);
        assert_eq!(t.skill_binding, SkillBinding::Fixed);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "starting_lives": 3, "skill_binding": "loadout" }"#).unwrap();
        assert_eq!(t.starting_lives, 3);
        assert_eq!(t.skill_binding, SkillBinding::Loadout);
        assert_eq!(t.ball_start_speed, BALL_START_SPEED);
    }

    #[test]
    fn test_invalid_json_falls_back() {
        let t = Tuning::from_json_or_default("{ not json");
        assert_eq!(t.starting_lives, STARTING_LIVES);
    }

    #[test]
    fn test_validated_clamps() {
        let t = Tuning::from_json(r#"{ "center_size": 1.7, "starting_lives": 0, "paddle_height": -4 }"#)
            .unwrap();
        assert_eq!(t.center_size, 1.0);
        assert_eq!(t.starting_lives, 1);
        assert_eq!(t.paddle_height, PADDLE_HEIGHT);
    }

    #[test]
    fn test_json_round_trip() {
        let t = Tuning::default();
        let json = t.to_json().unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert_eq!(back.field_width, t.field_width);
    }
}
