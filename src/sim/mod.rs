//! Deterministic match simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Game clock supplied by the caller, never read from the OS
//! - Seeded RNG only
//! - Effects kept in application order
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod effect;
pub mod events;
pub mod loadout;
pub mod round;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{BoundaryHit, PaddleBounce, resolve_boundary, resolve_paddle_hit};
pub use effect::{Effect, EffectId, EffectInfo, EffectKind, EffectTarget, SpeedEnvelope};
pub use events::{EventBus, EventKind, GameEvent, ListenerId};
pub use loadout::{EffectCatalog, EffectLoadout};
pub use state::{Ball, Edge, FrameSnapshot, GamePhase, GameState, Intent, Paddle, Side, Skill};
pub use tick::{FRAME_MS, TickInput, tick, tracking_intent};
