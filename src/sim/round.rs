//! Round and match flow
//!
//! Idle -> RoundSetup -> RoundActive -> ScoreResolution -> RoundSetup ... ->
//! MatchOver. Every transition is a guarded no-op when called from the wrong
//! phase, so duplicate triggers are harmless.

use std::f32::consts::PI;

use rand::Rng;

use super::effect::{Effect, EffectId, SpeedEnvelope};
use super::events::GameEvent;
use super::loadout::EffectLoadout;
use super::state::{GamePhase, GameState, Side, Skill};
use super::timers::TimerAction;
use crate::tuning::SkillBinding;
use crate::{deg_to_rad, normalize_angle};

/// Fixed skill 1: bigger but slower paddle
pub const FIXED_PADDLE_SIZE: f32 = 1.5;
pub const FIXED_PADDLE_SPEED: f32 = 0.75;

impl GameState {
    /// Start a fresh match: retire effects, refill lives, deal loadouts and
    /// enter the first round countdown
    pub fn initial_setup(&mut self) {
        log::info!("Match setup (seed {})", self.seed);

        self.retire_all_effects();
        self.timers.clear();
        self.lives = [self.tuning.starting_lives; 2];
        self.winner = None;

        let pair = self
            .catalog
            .pick_default_pair(&mut self.rng)
            .map(|(left, right)| [left.icon_index, right.icon_index]);
        match pair {
            Some(icons) => {
                self.loadouts = icons.map(Some);
                for side in Side::BOTH {
                    self.announce_loadout(side);
                }
            }
            None => {
                log::warn!("Effect catalog is empty, players get no loadout");
                self.loadouts = [None; 2];
            }
        }

        for side in Side::BOTH {
            self.events.emit(GameEvent::PlayerLivesUpdated {
                player: side,
                lives: self.lives(side),
            });
        }

        self.enter_round_setup();
    }

    /// Re-enter the countdown. Ignored before the match starts and after it
    /// ends; a countdown already running is restarted.
    pub fn setup_round(&mut self) -> bool {
        match self.phase {
            GamePhase::Idle | GamePhase::MatchOver => false,
            _ => {
                self.enter_round_setup();
                true
            }
        }
    }

    fn enter_round_setup(&mut self) {
        self.retire_all_effects();
        for id in self.field.reset() {
            log::debug!("Projectile {id} cleared for the new round");
            self.events.emit(GameEvent::ProjectileDespawned { id });
        }
        self.phase = GamePhase::RoundSetup;

        let cancelled = self.timers.cancel_matching(TimerAction::StartRound);
        if cancelled > 0 {
            log::debug!("Restarting round countdown ({cancelled} pending cancelled)");
        }
        self.timers
            .schedule(self.now_ms, self.tuning.countdown_ms, TimerAction::StartRound);

        log::info!(
            "Round setup, lives left {} / right {}",
            self.lives(Side::Left),
            self.lives(Side::Right)
        );
        self.events.emit(GameEvent::GameSetupRound);
    }

    /// Countdown over: serve the ball toward a random side
    pub fn start_round(&mut self) -> bool {
        if self.phase != GamePhase::RoundSetup {
            return false;
        }
        self.timers.cancel_matching(TimerAction::StartRound);

        let heading = if self.rng.random_bool(0.5) { 0.0 } else { PI };
        let spread = deg_to_rad(self.tuning.launch_spread_deg);
        let offset = if spread > 0.0 {
            self.rng.random_range(-spread..=spread)
        } else {
            0.0
        };
        let angle = normalize_angle(heading + offset);

        self.field.ball.launch(angle, self.tuning.ball_start_speed);
        self.phase = GamePhase::RoundActive;

        log::info!("Round started, serve angle {:.1}°", angle.to_degrees());
        self.events.emit(GameEvent::GameStartRound);
        true
    }

    /// The ball crossed the `exited` side's bound: that player loses a life
    pub fn ball_left_play_area(&mut self, exited: Side) -> bool {
        if self.phase != GamePhase::RoundActive {
            return false;
        }
        let loser = exited;
        let scorer = exited.opposite();

        self.retire_all_effects();
        self.phase = GamePhase::ScoreResolution;

        let ball = &mut self.field.ball;
        ball.disable_collisions();
        ball.freeze();
        ball.set_alpha(self.tuning.scored_ball_alpha);

        let lives = &mut self.lives[loser.index()];
        *lives = lives.saturating_sub(1);
        let remaining = *lives;

        log::info!("{} scored, {} has {remaining} lives", scorer.as_str(), loser.as_str());
        self.events.emit(GameEvent::BallScored { scorer });
        self.events.emit(GameEvent::PlayerLivesUpdated {
            player: loser,
            lives: remaining,
        });

        self.timers.schedule(
            self.now_ms,
            self.tuning.score_feedback_ms,
            TimerAction::FinishScore { loser },
        );
        true
    }

    /// Score feedback over: next round, or game over
    pub fn finish_score(&mut self, loser: Side) {
        if self.phase != GamePhase::ScoreResolution {
            return;
        }

        if self.lives(loser) > 0 {
            self.enter_round_setup();
            return;
        }

        let winner = loser.opposite();
        self.phase = GamePhase::MatchOver;
        self.winner = Some(winner);
        self.timers.clear();
        log::info!("Game over, {} wins", winner.as_str());
        self.events.emit(GameEvent::GameOver { winner });
    }

    /// Run every timer due at the current clock
    pub fn run_timers(&mut self) {
        for action in self.timers.take_due(self.now_ms) {
            match action {
                TimerAction::StartRound => {
                    self.start_round();
                }
                TimerAction::FinishScore { loser } => self.finish_score(loser),
            }
        }
    }

    pub fn loadout(&self, side: Side) -> Option<&EffectLoadout> {
        self.loadouts[side.index()].and_then(|icon| self.catalog.by_icon(icon))
    }

    /// Swap a player's loadout for a different one; returns the new icon
    pub fn reroll_loadout(&mut self, side: Side) -> Option<u8> {
        let previous = self.loadout(side).copied();
        let icon = self
            .catalog
            .pick_different_from(previous.as_ref(), &mut self.rng)?
            .icon_index;

        self.loadouts[side.index()] = Some(icon);
        log::debug!("{} loadout rerolled to {icon}", side.as_str());
        self.announce_loadout(side);
        Some(icon)
    }

    fn announce_loadout(&mut self, side: Side) {
        let Some(loadout) = self.loadout(side).copied() else {
            return;
        };
        self.events.emit(GameEvent::PlayerIconUpdated {
            player: side,
            icon: loadout.icon_index,
            ball_texture: loadout.ball_texture,
        });
    }

    /// A skill button was pressed. Only honored while the ball is in play.
    pub fn use_skill(&mut self, player: Side, skill: Skill) -> bool {
        if self.phase != GamePhase::RoundActive {
            log::debug!("Skill {} from {} ignored outside play", skill.number(), player.as_str());
            return false;
        }

        let effect = match self.tuning.skill_binding {
            SkillBinding::Fixed => match skill {
                Skill::One => Effect::paddle(player, FIXED_PADDLE_SIZE, FIXED_PADDLE_SPEED),
                Skill::Two => Effect::ball_speed_ramp(player.into(), SpeedEnvelope::STANDARD),
            },
            SkillBinding::Loadout => {
                let Some(loadout) = self.loadout(player) else {
                    log::warn!("{} has no loadout, skill ignored", player.as_str());
                    return false;
                };
                match skill {
                    Skill::One => loadout.buff_for(player),
                    Skill::Two => loadout.debuff_for(player),
                }
            }
        };

        self.events.emit(GameEvent::PaddleSkillUsed {
            player,
            skill: skill.number(),
        });
        self.add_effect(effect)
    }

    /// Activate an effect unless an exclusive one is already active
    pub fn add_effect(&mut self, mut effect: Effect) -> bool {
        effect.assign_id(self.next_effect_id());

        if let Some(active) = self.effects.iter().find(|e| e.is_exclusive_with(&effect)) {
            log::debug!("Effect rejected: {effect} conflicts with #{}", active.id());
            effect.discard();
            return false;
        }

        if !effect.apply(&mut self.field, &mut self.events) {
            return false;
        }
        self.effects.push(effect);
        true
    }

    /// Retire one active effect. Unknown ids are ignored.
    pub fn remove_effect(&mut self, id: EffectId) -> bool {
        let Some(index) = self.effects.iter().position(|e| e.id() == id) else {
            return false;
        };
        let mut effect = self.effects.remove(index);
        effect.remove(&mut self.field, &mut self.events)
    }

    pub fn retire_all_effects(&mut self) {
        for mut effect in std::mem::take(&mut self.effects) {
            effect.remove(&mut self.field, &mut self.events);
        }
    }

    /// Advance every active effect, then retire the expired ones
    pub fn tick_effects(&mut self, delta_ms: f32) {
        for effect in &mut self.effects {
            effect.tick(delta_ms, &mut self.field);
        }

        let expired: Vec<EffectId> = self
            .effects
            .iter()
            .filter(|e| e.is_expired())
            .map(Effect::id)
            .collect();
        for id in expired {
            self.remove_effect(id);
        }
    }

    /// Accept a trigger event from the presentation layer
    pub fn handle_event(&mut self, event: &GameEvent) -> bool {
        match event {
            GameEvent::GameSetupRound => self.setup_round(),
            GameEvent::GameStartRound => self.start_round(),
            GameEvent::PaddleSkillUsed { player, skill } => match Skill::from_number(*skill) {
                Some(skill) => self.use_skill(*player, skill),
                None => {
                    log::warn!("Unknown skill slot {skill} from {}", player.as_str());
                    false
                }
            },
            _ => false,
        }
    }
}
