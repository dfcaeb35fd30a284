//! Browser bridge
//!
//! The JS presentation layer owns rendering, audio playback and input. Each
//! animation frame it calls `tick` with the clock, the paddle axes and the
//! held skill buttons, then drains events (with their sound cues) and a
//! frame snapshot as JSON.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::cues::{CueTable, SoundCue};
use crate::sim::{GameEvent, GameState, Intent, Side, Skill, TickInput, tick};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Already initialized by an earlier module instance
        return;
    }
    log::info!("Buff Pong core loaded");
}

/// Event plus the cue to play for it
#[derive(Serialize)]
struct Outgoing<'a> {
    #[serde(flatten)]
    event: &'a GameEvent,
    cue: Option<SoundCue>,
}

fn skill_buttons(mask: u8) -> [bool; 2] {
    [mask & 0b01 != 0, mask & 0b10 != 0]
}

fn side_of(right: bool) -> Side {
    if right { Side::Right } else { Side::Left }
}

/// One match, driven from JS
#[wasm_bindgen]
pub struct WebMatch {
    state: GameState,
    cues: CueTable,
}

#[wasm_bindgen]
impl WebMatch {
    /// `tuning_json` may be omitted or partial; bad JSON falls back to
    /// defaults
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, tuning_json: Option<String>) -> WebMatch {
        let tuning = tuning_json
            .as_deref()
            .map(Tuning::from_json_or_default)
            .unwrap_or_default();
        WebMatch {
            state: GameState::new(tuning, seed),
            cues: CueTable::new(),
        }
    }

    pub fn initial_setup(&mut self) {
        self.state.initial_setup();
    }

    pub fn setup_round(&mut self) -> bool {
        self.state.setup_round()
    }

    /// Axes: negative = up, positive = down. Skill masks: bit 0 = skill 1,
    /// bit 1 = skill 2.
    pub fn tick(
        &mut self,
        now_ms: f64,
        delta_ms: f32,
        left_axis: i8,
        right_axis: i8,
        left_skills: u8,
        right_skills: u8,
    ) {
        let input = TickInput {
            intents: [Intent::from_axis(left_axis), Intent::from_axis(right_axis)],
            skills: [skill_buttons(left_skills), skill_buttons(right_skills)],
        };
        tick(&mut self.state, &input, now_ms, delta_ms);
    }

    /// Trigger a skill outside the per-frame input (e.g. an on-screen button)
    pub fn use_skill(&mut self, right: bool, skill: u8) -> bool {
        match Skill::from_number(skill) {
            Some(skill) => self.state.use_skill(side_of(right), skill),
            None => {
                log::warn!("Unknown skill slot {skill}");
                false
            }
        }
    }

    pub fn reroll_loadout(&mut self, right: bool) -> Option<u8> {
        self.state.reroll_loadout(side_of(right))
    }

    pub fn set_master_volume(&mut self, vol: f32) {
        self.cues.set_master_volume(vol);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.cues.set_muted(muted);
    }

    /// Events since the last call, oldest first, as a JSON array
    pub fn drain_events(&mut self) -> String {
        let events = self.state.events.drain();
        let outgoing: Vec<Outgoing<'_>> = events
            .iter()
            .map(|event| Outgoing {
                event,
                cue: self.cues.cue_for(event),
            })
            .collect();
        serde_json::to_string(&outgoing).unwrap_or_else(|e| {
            log::warn!("Failed to serialize events: {e}");
            "[]".to_string()
        })
    }

    /// Current frame as JSON
    pub fn snapshot(&self) -> String {
        serde_json::to_string(&self.state.snapshot()).unwrap_or_else(|e| {
            log::warn!("Failed to serialize snapshot: {e}");
            "null".to_string()
        })
    }

    pub fn tuning_json(&self) -> String {
        self.state.tuning.to_json().unwrap_or_else(|e| {
            log::warn!("Failed to serialize tuning: {e}");
            "{}".to_string()
        })
    }
}
