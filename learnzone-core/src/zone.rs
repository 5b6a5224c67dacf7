//! Zone registry: the static points of interest in the learning world.
//!
//! A zone is a [`WorldObject`] (identity, position, lock) plus a
//! [`ZoneKind`] payload. Only [`ZoneKind::Challenge`] zones can be
//! interacted with; landmarks are still reported by the proximity
//! resolver so a host can show them.
//!
//! The registry is loaded once and never mutated. Order matters: the
//! proximity resolver breaks distance ties by registry order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{LearnZoneError, Result};
use crate::types::{Position, ZoneId};

// ---------------------------------------------------------------------------
// Items & Challenges
// ---------------------------------------------------------------------------

/// A draggable block representing one instruction choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Block identifier inside its toolbox.
    pub id: String,
    /// Instruction type, compared against the solution (e.g. `"Speak"`).
    #[serde(rename = "type")]
    pub item_type: String,
    /// Text shown on the block.
    pub content: String,
}

impl Item {
    /// Create an item.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        item_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            item_type: item_type.into(),
            content: content.into(),
        }
    }
}

/// Expected answer for a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Item type that solves the challenge.
    pub item_type: String,
    /// What the character says once the challenge is solved.
    pub value: String,
}

/// A single puzzle: place the right block and run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Challenge identifier.
    pub id: String,
    /// Title shown in the challenge panel.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Blocks offered to the player.
    pub toolbox: Vec<Item>,
    /// The expected answer.
    pub solution: Solution,
    /// Experience awarded on success.
    pub reward_xp: u32,
}

impl Challenge {
    /// Whether the given item type is offered by this challenge's toolbox.
    #[must_use]
    pub fn offers(&self, item_type: &str) -> bool {
        self.toolbox.iter().any(|i| i.item_type == item_type)
    }

    /// Whether the item solves the challenge.
    #[must_use]
    pub fn is_solved_by(&self, item: &Item) -> bool {
        item.item_type == self.solution.item_type
    }
}

// ---------------------------------------------------------------------------
// World objects
// ---------------------------------------------------------------------------

/// Access gate on a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lock {
    /// Always enterable.
    Open,
    /// Enterable once the player reaches this level.
    UntilLevel(u32),
}

/// Unlock level for a zone marked locked without one.
pub const DEFAULT_UNLOCK_LEVEL: u32 = 99;

impl Lock {
    /// Whether a player at `level` may enter.
    #[must_use]
    pub fn admits(self, level: u32) -> bool {
        match self {
            Self::Open => true,
            Self::UntilLevel(required) => level >= required,
        }
    }
}

/// Identity, placement and gating shared by every zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    /// Zone identifier.
    pub id: ZoneId,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// World position.
    pub position: Position,
    /// Access gate.
    pub lock: Lock,
}

/// What a zone offers beyond its world placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ZoneKind {
    /// A point of interest with nothing to solve.
    Landmark,
    /// A zone hosting a challenge.
    Challenge(Challenge),
}

/// A fixed point of interest in the simulated space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Shared world-object record.
    pub object: WorldObject,
    /// Zone payload.
    pub kind: ZoneKind,
}

impl Zone {
    /// Zone identifier.
    #[must_use]
    pub fn id(&self) -> &ZoneId {
        &self.object.id
    }

    /// Zone position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.object.position
    }

    /// The challenge hosted here, if any.
    #[must_use]
    pub fn challenge(&self) -> Option<&Challenge> {
        match &self.kind {
            ZoneKind::Challenge(c) => Some(c),
            ZoneKind::Landmark => None,
        }
    }

    /// Whether a player at `level` may enter this zone.
    #[must_use]
    pub fn is_unlocked_for(&self, level: u32) -> bool {
        self.object.lock.admits(level)
    }
}

// ---------------------------------------------------------------------------
// Flat definition (config shape)
// ---------------------------------------------------------------------------

/// Flat zone definition as written in `learnzone.toml` `[[zones]]` tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDefinition {
    /// Zone identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// World position.
    pub position: Position,
    /// Whether the zone starts locked.
    #[serde(default)]
    pub is_locked: bool,
    /// Level at which a locked zone opens; defaults to
    /// [`DEFAULT_UNLOCK_LEVEL`].
    #[serde(default)]
    pub unlock_level: Option<u32>,
    /// Optional challenge payload.
    #[serde(default)]
    pub challenge: Option<Challenge>,
}

impl From<ZoneDefinition> for Zone {
    fn from(def: ZoneDefinition) -> Self {
        let lock = match (def.is_locked, def.unlock_level) {
            (false, _) => Lock::Open,
            (true, level) => Lock::UntilLevel(level.unwrap_or(DEFAULT_UNLOCK_LEVEL)),
        };
        Self {
            object: WorldObject {
                id: ZoneId(def.id),
                name: def.name,
                description: def.description,
                position: def.position,
                lock,
            },
            kind: def.challenge.map_or(ZoneKind::Landmark, ZoneKind::Challenge),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Ordered, immutable list of zones.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    /// Build a registry, validating ids and challenge definitions.
    ///
    /// # Errors
    /// Returns [`LearnZoneError::Config`] on duplicate zone ids or a
    /// challenge whose solution type is not offered by its toolbox.
    pub fn new(zones: Vec<Zone>) -> Result<Self> {
        let mut seen = HashSet::new();
        for zone in &zones {
            if !seen.insert(zone.id().clone()) {
                return Err(LearnZoneError::Config(format!(
                    "duplicate zone id: {}",
                    zone.id()
                )));
            }
            if let Some(challenge) = zone.challenge() {
                if !challenge.offers(&challenge.solution.item_type) {
                    return Err(LearnZoneError::Config(format!(
                        "challenge {} in zone {} expects item type {} which its toolbox does not offer",
                        challenge.id,
                        zone.id(),
                        challenge.solution.item_type
                    )));
                }
            }
        }
        Ok(Self { zones })
    }

    /// Build a registry from flat definitions.
    ///
    /// # Errors
    /// See [`ZoneRegistry::new`].
    pub fn from_definitions(defs: Vec<ZoneDefinition>) -> Result<Self> {
        Self::new(defs.into_iter().map(Zone::from).collect())
    }

    /// The zones shipped with the platform.
    #[must_use]
    pub fn builtin() -> Self {
        let camp = Zone {
            object: WorldObject {
                id: ZoneId::from("programming_camp"),
                name: "Programming Camp".into(),
                description: "Start here: learn the basics of program logic and how to give commands."
                    .into(),
                position: Position::new(0.0, 0.0, -200.0),
                lock: Lock::Open,
            },
            kind: ZoneKind::Challenge(Challenge {
                id: "challenge_1".into(),
                title: "Challenge 1: Say hello!".into(),
                description: "Make your character talk. Drag the \"Speak\" block into the workspace and run it."
                    .into(),
                toolbox: vec![Item::new("block_speak", "Speak", "Speak(...)")],
                solution: Solution {
                    item_type: "Speak".into(),
                    value: "Hello, world!".into(),
                },
                reward_xp: 50,
            }),
        };

        let workshop = Zone {
            object: WorldObject {
                id: ZoneId::from("graphics_workshop"),
                name: "Graphics Workshop".into(),
                description: "Learn to design characters and worlds. (Locked until level 2)".into(),
                position: Position::new(250.0, 0.0, -400.0),
                lock: Lock::UntilLevel(2),
            },
            kind: ZoneKind::Landmark,
        };

        Self {
            zones: vec![camp, workshop],
        }
    }

    /// Look up a zone by id.
    #[must_use]
    pub fn get(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id() == id)
    }

    /// Iterate zones in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speak_challenge() -> Challenge {
        Challenge {
            id: "c".into(),
            title: "t".into(),
            description: "d".into(),
            toolbox: vec![Item::new("b", "Speak", "Speak(...)")],
            solution: Solution {
                item_type: "Speak".into(),
                value: "hi".into(),
            },
            reward_xp: 10,
        }
    }

    #[test]
    fn builtin_registry_is_valid() {
        let builtin = ZoneRegistry::builtin();
        let rebuilt = ZoneRegistry::new(builtin.iter().cloned().collect());
        assert!(rebuilt.is_ok());
        assert_eq!(builtin.len(), 2);
    }

    #[test]
    fn builtin_workshop_locked_until_level_two() {
        let reg = ZoneRegistry::builtin();
        let workshop = reg.get(&ZoneId::from("graphics_workshop")).expect("workshop");
        assert!(!workshop.is_unlocked_for(1));
        assert!(workshop.is_unlocked_for(2));
        assert!(workshop.challenge().is_none());
    }

    #[test]
    fn definition_maps_lock_variants() {
        let base = ZoneDefinition {
            id: "z".into(),
            name: "Z".into(),
            description: String::new(),
            position: Position::default(),
            is_locked: false,
            unlock_level: Some(3),
            challenge: None,
        };
        assert_eq!(Zone::from(base.clone()).object.lock, Lock::Open);

        let locked = ZoneDefinition { is_locked: true, ..base.clone() };
        assert_eq!(Zone::from(locked).object.lock, Lock::UntilLevel(3));

        let no_level = ZoneDefinition {
            is_locked: true,
            unlock_level: None,
            ..base
        };
        let zone = Zone::from(no_level);
        assert_eq!(zone.object.lock, Lock::UntilLevel(DEFAULT_UNLOCK_LEVEL));
        assert!(!zone.is_unlocked_for(98));
        assert!(zone.is_unlocked_for(99));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let reg = ZoneRegistry::builtin();
        let mut zones: Vec<Zone> = reg.iter().cloned().collect();
        zones.push(zones[0].clone());
        assert!(matches!(
            ZoneRegistry::new(zones),
            Err(LearnZoneError::Config(_))
        ));
    }

    #[test]
    fn solution_missing_from_toolbox_rejected() {
        let mut challenge = speak_challenge();
        challenge.solution.item_type = "Move".into();
        let zone = Zone {
            object: WorldObject {
                id: ZoneId::from("z"),
                name: "Z".into(),
                description: String::new(),
                position: Position::default(),
                lock: Lock::Open,
            },
            kind: ZoneKind::Challenge(challenge),
        };
        assert!(ZoneRegistry::new(vec![zone]).is_err());
    }

    #[test]
    fn challenge_matches_on_type_only() {
        let c = speak_challenge();
        assert!(c.is_solved_by(&Item::new("other-id", "Speak", "anything")));
        assert!(!c.is_solved_by(&Item::new("b", "Move", "Speak(...)")));
    }
}
