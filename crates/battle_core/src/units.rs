//! Unit definitions.
//!
//! Units are pure data; all behavior lives in the scheduler, resolver,
//! executor and reducer modules.

use serde::{Deserialize, Serialize};

use crate::data::SkillId;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Unique identifier for units within one battle.
///
/// Assigned sequentially at spawn and never reused. All per-frame
/// processing iterates units in ascending id order for determinism.
pub type UnitId = u32;

/// Core attribute block shared by players and enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Constitution; reserved for future timeline scaling.
    pub resilience: i32,
    /// Movement budget in path steps (tiles) per move action.
    pub movement: i32,
    /// Physical power, scales physical skill damage.
    pub str: i32,
    /// Magical power, scales spell damage.
    pub mag: i32,
    /// Wisdom, scales support skills.
    pub wis: i32,
}

/// Which side of the battle a unit fights on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Player-controlled units.
    Players,
    /// AI-controlled units.
    Enemies,
}

/// Player/enemy discriminant, with the enemy AI policy tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    /// A player-controlled unit; decisions come from user input.
    Player,
    /// An AI-controlled unit; decisions come from the AI policy.
    Enemy {
        /// Optional AI policy tag (`None` = passive idle).
        ai_type: Option<String>,
    },
}

impl UnitKind {
    /// The side this kind fights on.
    #[must_use]
    pub const fn side(&self) -> Side {
        match self {
            Self::Player => Side::Players,
            Self::Enemy { .. } => Side::Enemies,
        }
    }
}

/// A timed status kind applied by a skill effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Blinded; `severity` is the accuracy penalty while active.
    Blind {
        /// Strength of the penalty.
        severity: i32,
    },
}

/// A status effect currently active on a unit.
///
/// Durations are tracked in frames and ticked down once per simulated
/// frame by the scheduler; expired statuses are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusEffect {
    /// What kind of status this is.
    pub kind: StatusKind,
    /// Frames remaining before expiry.
    pub remaining_frames: u32,
}

/// A combatant in the battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique id within this battle.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Collision/display radius in world units (presentation-only).
    #[serde(with = "fixed_serde")]
    pub size: Fixed,
    /// World position.
    pub pos: Vec2Fixed,
    /// Current hit points, always within `[0, max_hp]`.
    pub current_hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Attribute block.
    pub stats: Stats,
    /// Skills this unit knows, by id.
    pub skills: Vec<SkillId>,
    /// Player or enemy, with the AI tag for enemies.
    pub kind: UnitKind,
    /// Active timed statuses.
    pub statuses: Vec<StatusEffect>,
}

impl Unit {
    /// The side this unit fights on.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.kind.side()
    }

    /// Whether this unit knows the given skill.
    #[must_use]
    pub fn knows_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }

    /// Whether this unit is an ally of `other` (same side; a unit is its
    /// own ally).
    #[must_use]
    pub fn is_ally_of(&self, other: &Unit) -> bool {
        self.side() == other.side()
    }
}
