//! Typed event channel between the simulation and the presentation layer
//!
//! Listeners are plain callbacks registered per event kind (or for every
//! event). Dispatch is synchronous inside `emit`. Every emitted event is also
//! queued in a pending outbox so a polling frontend can `drain` it once per
//! frame.

use glam::Vec2;
use serde::Serialize;

use super::effect::EffectInfo;
use super::state::{Edge, Side};

/// Maximum queued events kept for polling consumers
pub const MAX_PENDING_EVENTS: usize = 1024;

/// Everything the core announces (or accepts as a trigger)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum GameEvent {
    /// Entities reset, countdown running
    GameSetupRound,
    /// Countdown elapsed, ball launched
    GameStartRound,
    BallScored { scorer: Side },
    BallReflectOnPaddle { side: Side, angle: f32 },
    BallReflectOnSceneEdge { edge: Edge, angle: f32 },
    PaddleSkillUsed { player: Side, skill: u8 },
    EffectApplied { effect: EffectInfo },
    EffectRemoved { effect: EffectInfo },
    PlayerLivesUpdated { player: Side, lives: u8 },
    PlayerIconUpdated { player: Side, icon: u8, ball_texture: &'static str },
    SpawnProjectile { id: u32, sprite: &'static str, position: Vec2, velocity: Vec2 },
    ProjectileDespawned { id: u32 },
    GameOver { winner: Side },
}

/// Discriminant of a [`GameEvent`], used for subscriptions and lookup tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    GameSetupRound,
    GameStartRound,
    BallScored,
    BallReflectOnPaddle,
    BallReflectOnSceneEdge,
    PaddleSkillUsed,
    EffectApplied,
    EffectRemoved,
    PlayerLivesUpdated,
    PlayerIconUpdated,
    SpawnProjectile,
    ProjectileDespawned,
    GameOver,
}

impl EventKind {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::GameSetupRound => "game-setup-round",
            EventKind::GameStartRound => "game-start-round",
            EventKind::BallScored => "ball-scored",
            EventKind::BallReflectOnPaddle => "ball-reflect-on-paddle",
            EventKind::BallReflectOnSceneEdge => "ball-reflect-on-scene-edge",
            EventKind::PaddleSkillUsed => "paddle-skill-used",
            EventKind::EffectApplied => "effect-applied",
            EventKind::EffectRemoved => "effect-removed",
            EventKind::PlayerLivesUpdated => "player-lives-updated",
            EventKind::PlayerIconUpdated => "player-icon-updated",
            EventKind::SpawnProjectile => "spawn-projectile",
            EventKind::ProjectileDespawned => "projectile-despawned",
            EventKind::GameOver => "game-over",
        }
    }
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::GameSetupRound => EventKind::GameSetupRound,
            GameEvent::GameStartRound => EventKind::GameStartRound,
            GameEvent::BallScored { .. } => EventKind::BallScored,
            GameEvent::BallReflectOnPaddle { .. } => EventKind::BallReflectOnPaddle,
            GameEvent::BallReflectOnSceneEdge { .. } => EventKind::BallReflectOnSceneEdge,
            GameEvent::PaddleSkillUsed { .. } => EventKind::PaddleSkillUsed,
            GameEvent::EffectApplied { .. } => EventKind::EffectApplied,
            GameEvent::EffectRemoved { .. } => EventKind::EffectRemoved,
            GameEvent::PlayerLivesUpdated { .. } => EventKind::PlayerLivesUpdated,
            GameEvent::PlayerIconUpdated { .. } => EventKind::PlayerIconUpdated,
            GameEvent::SpawnProjectile { .. } => EventKind::SpawnProjectile,
            GameEvent::ProjectileDespawned { .. } => EventKind::ProjectileDespawned,
            GameEvent::GameOver { .. } => EventKind::GameOver,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(&GameEvent)>;

struct Subscription {
    id: ListenerId,
    /// `None` = every event
    kind: Option<EventKind>,
    listener: Listener,
}

/// Callback registry plus pending outbox
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    pending: Vec<GameEvent>,
    next_id: u32,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.subscriptions.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for one kind of event
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&GameEvent) + 'static,
    ) -> ListenerId {
        self.add(Some(kind), Box::new(listener))
    }

    /// Listen for every event
    pub fn subscribe_all(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        self.add(None, Box::new(listener))
    }

    fn add(&mut self, kind: Option<EventKind>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kind, listener });
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Dispatch to matching listeners and queue for polling
    pub fn emit(&mut self, event: GameEvent) {
        let kind = event.kind();
        log::trace!("Event emitted: {} {:?}", kind.name(), event);

        for sub in &mut self.subscriptions {
            if sub.kind.is_none_or(|k| k == kind) {
                (sub.listener)(&event);
            }
        }

        if self.pending.len() >= MAX_PENDING_EVENTS {
            // Nobody is draining; drop the oldest
            self.pending.remove(0);
        }
        self.pending.push(event);
    }

    /// Events emitted since the last drain (oldest first)
    pub fn pending(&self) -> &[GameEvent] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_subscribe_by_kind() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(EventKind::BallScored, move |e| sink.borrow_mut().push(e.clone()));

        bus.emit(GameEvent::GameSetupRound);
        bus.emit(GameEvent::BallScored { scorer: Side::Left });

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0], GameEvent::BallScored { scorer: Side::Left });
    }

    #[test]
    fn test_multiple_listeners_and_unsubscribe() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let a = Rc::clone(&count);
        let b = Rc::clone(&count);
        let id = bus.subscribe_all(move |_| *a.borrow_mut() += 1);
        bus.subscribe(EventKind::GameOver, move |_| *b.borrow_mut() += 10);

        bus.emit(GameEvent::GameOver { winner: Side::Right });
        assert_eq!(*count.borrow(), 11);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(GameEvent::GameOver { winner: Side::Right });
        assert_eq!(*count.borrow(), 21);
    }

    #[test]
    fn test_drain_empties_outbox() {
        let mut bus = EventBus::new();
        bus.emit(GameEvent::GameSetupRound);
        bus.emit(GameEvent::GameStartRound);
        assert_eq!(bus.pending().len(), 2);

        let drained = bus.drain();
        assert_eq!(drained[0].kind(), EventKind::GameSetupRound);
        assert!(bus.pending().is_empty());
    }

    #[test]
    fn test_outbox_is_bounded() {
        let mut bus = EventBus::new();
        for id in 0..(MAX_PENDING_EVENTS as u32 + 5) {
            bus.emit(GameEvent::ProjectileDespawned { id });
        }
        assert_eq!(bus.pending().len(), MAX_PENDING_EVENTS);
        assert_eq!(bus.pending()[0], GameEvent::ProjectileDespawned { id: 5 });
    }

    #[test]
    fn test_wire_names_serialize() {
        let json = serde_json::to_string(&GameEvent::BallScored { scorer: Side::Right }).unwrap();
        assert_eq!(json, r#"{"event":"ball-scored","scorer":"right"}"#);
        assert_eq!(
            GameEvent::BallReflectOnSceneEdge { edge: Edge::Top, angle: 0.0 }.kind().name(),
            "ball-reflect-on-scene-edge"
        );
    }
}
