//! Skill definitions for data-driven combat.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::units::Stats;

/// Unique string identifier for a skill.
pub type SkillId = String;

/// Which relation a single-target skill may aim at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// Same side as the actor.
    Ally,
    /// Opposing side.
    Enemy,
    /// Any living unit.
    Any,
}

/// Which units a radius skill affects around its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affects {
    /// Only the actor's allies.
    Ally,
    /// Only the actor's enemies.
    Enemy,
    /// Everyone in the radius.
    All,
}

/// Targeting mode of a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillTarget {
    /// Affects exactly one unit.
    Single {
        /// Relation the target must have to the actor.
        valid: Relation,
    },
    /// Affects every matching unit within `size` of the target point.
    Radius {
        /// Radius in world units.
        size: i32,
        /// Relation filter for affected units.
        affects: Affects,
    },
}

/// Timing data for a skill, in milliseconds.
///
/// Converted to frames with integer math (`ms * fps / 1000`) so timing
/// is deterministic at any frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillTime {
    /// Wind-up before the skill lands.
    #[serde(default)]
    pub startup_ms: u32,
    /// Extra cooldown after use, on top of the base cooldown.
    #[serde(default)]
    pub cooldown_ms: u32,
    /// Time before the skill is available again.
    #[serde(default)]
    pub recharge_ms: u32,
}

/// Per-stat damage scaling, as integer percentages (100 = x1.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatScale {
    /// Percentage of resilience added to the base amount.
    #[serde(default)]
    pub resilience: i32,
    /// Percentage of movement added.
    #[serde(default)]
    pub movement: i32,
    /// Percentage of strength added.
    #[serde(default)]
    pub str: i32,
    /// Percentage of magic added.
    #[serde(default)]
    pub mag: i32,
    /// Percentage of wisdom added.
    #[serde(default)]
    pub wis: i32,
}

impl StatScale {
    /// Total scaled contribution of `stats`, truncating toward zero.
    #[must_use]
    pub fn apply(&self, stats: &Stats) -> i32 {
        let sum = i64::from(stats.resilience) * i64::from(self.resilience)
            + i64::from(stats.movement) * i64::from(self.movement)
            + i64::from(stats.str) * i64::from(self.str)
            + i64::from(stats.mag) * i64::from(self.mag)
            + i64::from(stats.wis) * i64::from(self.wis);
        (sum / 100) as i32
    }
}

/// One discrete consequence of landing a skill.
///
/// Effects are applied to each affected unit in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillEffect {
    /// Hit point damage (or healing for negative amounts).
    Damage {
        /// Base amount before stat scaling.
        amount: i32,
        /// Per-stat scaling percentages.
        #[serde(default)]
        scale: StatScale,
    },
    /// Push the target back on the timeline.
    Setback {
        /// Frames added to the target's wait (or removed from its act).
        amount: u32,
    },
    /// Apply a timed blind status.
    Blind {
        /// Accuracy penalty while blinded.
        amount: i32,
        /// Status duration in milliseconds.
        duration_ms: u32,
    },
}

/// Data-driven skill definition.
///
/// # Example RON
///
/// ```ron
/// Skill(
///     name: "slash",
///     range: 48,
///     cost: 0,
///     time: SkillTime(startup_ms: 500, cooldown_ms: 250),
///     target: Single(valid: enemy),
///     effects: [Damage(amount: 10, scale: StatScale(str: 100))],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Unique skill id, referenced by units.
    pub name: SkillId,
    /// Maximum targeting distance in world units.
    pub range: i32,
    /// Resource cost (reserved; no resource pool in the core yet).
    #[serde(default)]
    pub cost: i32,
    /// Wind-up / cooldown / recharge timing.
    #[serde(default)]
    pub time: SkillTime,
    /// Targeting mode.
    pub target: SkillTarget,
    /// Consequences applied per affected unit, in order.
    pub effects: Vec<SkillEffect>,
}

impl Skill {
    /// Whether this skill can be aimed at the actor's enemies.
    #[must_use]
    pub fn targets_enemies(&self) -> bool {
        match self.target {
            SkillTarget::Single { valid } => matches!(valid, Relation::Enemy | Relation::Any),
            SkillTarget::Radius { affects, .. } => {
                matches!(affects, Affects::Enemy | Affects::All)
            }
        }
    }
}

/// Immutable lookup table of all skill definitions.
///
/// Built once at startup and shared read-only across battles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillBook {
    skills: HashMap<SkillId, Skill>,
}

impl SkillBook {
    /// Build a skill book from a list of definitions.
    ///
    /// Later entries silently replace earlier ones with the same name.
    #[must_use]
    pub fn new(skills: Vec<Skill>) -> Self {
        Self {
            skills: skills.into_iter().map(|s| (s.name.clone(), s)).collect(),
        }
    }

    /// Look up a skill by id.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.skills.get(name)
    }

    /// Whether a skill with this id exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.skills.contains_key(name)
    }

    /// Number of skills in the book.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Whether the book is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_scale_apply() {
        let stats = Stats {
            str: 5,
            mag: 10,
            ..Stats::default()
        };
        let scale = StatScale {
            str: 100,
            mag: 50,
            ..StatScale::default()
        };
        // 5 * 100% + 10 * 50% = 10
        assert_eq!(scale.apply(&stats), 10);
    }

    #[test]
    fn test_stat_scale_default_is_zero() {
        let stats = Stats {
            str: 99,
            ..Stats::default()
        };
        assert_eq!(StatScale::default().apply(&stats), 0);
    }

    #[test]
    fn test_skill_book_lookup() {
        let book = SkillBook::new(vec![Skill {
            name: "slash".into(),
            range: 48,
            cost: 0,
            time: SkillTime::default(),
            target: SkillTarget::Single {
                valid: Relation::Enemy,
            },
            effects: vec![],
        }]);
        assert!(book.contains("slash"));
        assert!(book.get("fireball").is_none());
        assert_eq!(book.len(), 1);
    }
}
