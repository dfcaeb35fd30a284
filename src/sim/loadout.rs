//! Buff/debuff loadouts
//!
//! A loadout pairs a buff for its owner with a debuff aimed at the opponent.
//! Identity is the icon index.

use rand::Rng;

use super::effect::{Effect, EffectTarget, SpeedEnvelope};
use super::state::Side;

/// Builds an effect for the player who owns the loadout
pub type EffectFactory = fn(Side) -> Effect;

#[derive(Debug, Clone, Copy)]
pub struct EffectLoadout {
    pub icon_index: u8,
    pub name: &'static str,
    pub ball_texture: &'static str,
    pub buff: EffectFactory,
    pub debuff: EffectFactory,
}

impl PartialEq for EffectLoadout {
    fn eq(&self, other: &Self) -> bool {
        self.icon_index == other.icon_index
    }
}

impl Eq for EffectLoadout {}

impl EffectLoadout {
    pub fn buff_for(&self, owner: Side) -> Effect {
        (self.buff)(owner)
    }

    pub fn debuff_for(&self, owner: Side) -> Effect {
        (self.debuff)(owner)
    }
}

fn ramp_for_everyone(_: Side) -> Effect {
    Effect::ball_speed_ramp(EffectTarget::Both, SpeedEnvelope::STANDARD)
}

/// The nine standard loadouts
pub fn standard_loadouts() -> Vec<EffectLoadout> {
    vec![
        EffectLoadout {
            icon_index: 0,
            name: "619 / Dizzyness",
            ball_texture: "ball",
            buff: |p| ramp_for_everyone(p).with_display_name("619"),
            debuff: |p| Effect::paddle(p.opposite(), 0.75, 0.8).with_display_name("Dizzyness"),
        },
        EffectLoadout {
            icon_index: 1,
            name: "Inflate / Deflate",
            ball_texture: "ball/blowfish",
            buff: |p| Effect::paddle(p, 1.4, 0.9).with_display_name("Inflate"),
            debuff: |p| Effect::paddle(p.opposite(), 0.7, 1.0).with_display_name("Deflate"),
        },
        EffectLoadout {
            icon_index: 2,
            name: "Virus Attack / Mask Mandate",
            ball_texture: "ball/covidMask",
            buff: |p| Effect::spawn_projectile(p, "virus").with_display_name("Virus Attack"),
            debuff: |_| Effect::ball_invisible(EffectTarget::Both).with_display_name("Mask Mandate"),
        },
        EffectLoadout {
            icon_index: 3,
            name: "Thief / Trash Cans",
            ball_texture: "ball/racoon",
            buff: |p| ramp_for_everyone(p).with_display_name("Thief"),
            debuff: |p| {
                Effect::spawn_projectile(p.opposite(), "gas_cloud").with_display_name("Trash Cans")
            },
        },
        EffectLoadout {
            icon_index: 4,
            name: "Tear Gas / Gas Cloud",
            ball_texture: "ball/gasMask",
            buff: |p| Effect::spawn_projectile(p, "gas_cloud").with_display_name("Tear Gas"),
            debuff: |_| Effect::ball_invisible(EffectTarget::Both).with_display_name("Gas Cloud"),
        },
        EffectLoadout {
            icon_index: 5,
            name: "Sword Slash / Shield Strike",
            ball_texture: "ball/knightHelmet",
            buff: |p| Effect::paddle(p, 1.2, 1.1).with_display_name("Sword Slash"),
            debuff: |p| Effect::paddle(p.opposite(), 0.9, 0.65).with_display_name("Shield Strike"),
        },
        EffectLoadout {
            icon_index: 6,
            name: "Rat / Possession",
            ball_texture: "ball/corvo",
            buff: |p| ramp_for_everyone(p).with_display_name("Rat"),
            debuff: |p| Effect::paddle(p.opposite(), 0.85, 0.6).with_display_name("Possession"),
        },
        EffectLoadout {
            icon_index: 7,
            name: "Portals / Fake Paddle",
            ball_texture: "ball/portalWheatley",
            buff: |_| Effect::ball_invisible(EffectTarget::Both).with_display_name("Portals"),
            debuff: |p| Effect::paddle(p.opposite(), 0.8, 0.8).with_display_name("Fake Paddle"),
        },
        EffectLoadout {
            icon_index: 8,
            name: "Axe Throw / Battle Cry",
            ball_texture: "ball/vikingHelmet",
            buff: |p| Effect::spawn_projectile(p, "gas_cloud").with_display_name("Axe Throw"),
            debuff: |p| Effect::paddle(p.opposite(), 0.8, 0.7).with_display_name("Battle Cry"),
        },
    ]
}

/// Fixed set of loadouts players pick from
#[derive(Debug, Clone)]
pub struct EffectCatalog {
    loadouts: Vec<EffectLoadout>,
}

impl Default for EffectCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl EffectCatalog {
    pub fn new(loadouts: Vec<EffectLoadout>) -> Self {
        Self { loadouts }
    }

    pub fn standard() -> Self {
        Self::new(standard_loadouts())
    }

    pub fn len(&self) -> usize {
        self.loadouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loadouts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectLoadout> {
        self.loadouts.iter()
    }

    pub fn by_icon(&self, icon_index: u8) -> Option<&EffectLoadout> {
        self.loadouts.iter().find(|l| l.icon_index == icon_index)
    }

    fn random<R: Rng>(&self, rng: &mut R) -> Option<&EffectLoadout> {
        if self.loadouts.is_empty() {
            return None;
        }
        Some(&self.loadouts[rng.random_range(0..self.loadouts.len())])
    }

    /// Two loadouts for (left, right), distinct unless the catalog has only
    /// one entry
    pub fn pick_default_pair<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Option<(&EffectLoadout, &EffectLoadout)> {
        let left = self.random(rng)?;
        let mut right = self.random(rng)?;

        if self.loadouts.iter().any(|l| l != left) {
            while right == left {
                right = self.random(rng)?;
            }
        }

        Some((left, right))
    }

    /// Any loadout but `previous`. With no previous, any loadout at all. If
    /// nothing else exists, `previous` comes back unchanged.
    pub fn pick_different_from<'a, R: Rng>(
        &'a self,
        previous: Option<&'a EffectLoadout>,
        rng: &mut R,
    ) -> Option<&'a EffectLoadout> {
        let Some(previous) = previous else {
            return self.random(rng);
        };

        let candidates: Vec<&EffectLoadout> =
            self.loadouts.iter().filter(|l| *l != previous).collect();
        if candidates.is_empty() {
            return Some(previous);
        }
        Some(candidates[rng.random_range(0..candidates.len())])
    }
}
