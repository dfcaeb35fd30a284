//! Sound cue lookup
//!
//! Maps effects (by variant) and game events (by kind) to the sample the
//! presentation layer should play. Playback itself happens elsewhere; an
//! unmapped effect or event simply has no cue.

use std::collections::HashMap;

use serde::Serialize;

use crate::sim::effect::EffectKind;
use crate::sim::events::{EventKind, GameEvent};

/// A sample to play
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundCue {
    /// Audio asset key
    pub key: String,
    pub volume: f32,
    /// Playback rate (1.0 = normal pitch)
    pub rate: f32,
}

impl SoundCue {
    pub fn new(key: impl Into<String>, volume: f32) -> Self {
        Self {
            key: key.into(),
            volume: volume.clamp(0.0, 1.0),
            rate: 1.0,
        }
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate.max(0.0);
        self
    }
}

/// Cue configuration for the whole match
#[derive(Debug, Clone)]
pub struct CueTable {
    effects: HashMap<EffectKind, SoundCue>,
    events: HashMap<EventKind, SoundCue>,
    master_volume: f32,
    muted: bool,
}

impl Default for CueTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CueTable {
    /// Standard mapping
    pub fn new() -> Self {
        let mut table = Self::empty();
        table.set_effect_cue(EffectKind::BallSpeed, SoundCue::new("speedBoost", 0.7));
        table.set_effect_cue(EffectKind::PaddleSize, SoundCue::new("paddleSize", 0.5));
        table.set_event_cue(EventKind::BallReflectOnPaddle, SoundCue::new("paddleHit", 0.6));
        table.set_event_cue(EventKind::BallReflectOnSceneEdge, SoundCue::new("ballBounce", 0.4));
        table.set_event_cue(EventKind::BallScored, SoundCue::new("score", 0.8));
        table
    }

    /// No cues at all
    pub fn empty() -> Self {
        Self {
            effects: HashMap::new(),
            events: HashMap::new(),
            master_volume: 1.0,
            muted: false,
        }
    }

    /// Add or replace the cue for an effect variant
    pub fn set_effect_cue(&mut self, kind: EffectKind, cue: SoundCue) {
        self.effects.insert(kind, cue);
    }

    /// Add or replace the cue for an event kind
    pub fn set_event_cue(&mut self, kind: EventKind, cue: SoundCue) {
        self.events.insert(kind, cue);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Cue to play for `event`, scaled by the master volume.
    ///
    /// `effect-applied` looks up the effect's variant; every other event is
    /// looked up by kind.
    pub fn cue_for(&self, event: &GameEvent) -> Option<SoundCue> {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return None;
        }

        let cue = match event {
            GameEvent::EffectApplied { effect } => self.effects.get(&effect.kind),
            GameEvent::EffectRemoved { .. } => None,
            other => self.events.get(&other.kind()),
        }?;

        Some(SoundCue {
            volume: cue.volume * vol,
            ..cue.clone()
        })
    }
}
