//! Battle state and the immutable shared context.
//!
//! [`GameState`] is exclusively owned by one simulation loop and holds
//! every mutable map for one battle. [`BattleContext`] holds the static
//! collaborators - skill book, map, planner, tuning - injected at
//! construction and shared read-only across arbitrarily many battles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::SkillBook;
use crate::decision::PendingDecision;
use crate::intent::{ActionState, UserInput};
use crate::map::{BattleMap, Planner};
use crate::timeline::TimelinePos;
use crate::units::{Unit, UnitId};

/// Whether the timeline is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattleMode {
    /// Timeline runs; decisions and actions are processed.
    #[default]
    Battle,
    /// Free exploration; the frame counter advances but units do not.
    Explore,
}

/// Simulation tuning shared by every battle on a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Simulated frames per second.
    pub fps: u32,
    /// Initial wait assigned to every unit at battle start, in frames.
    pub timeline_wait_frames: u32,
    /// Wind-up time for movement actions, in milliseconds.
    pub movement_startup_ms: u32,
    /// Cooldown applied after every action, in milliseconds.
    pub base_cooldown_ms: u32,
}

impl BattleConfig {
    /// Convert a millisecond duration to frames, rounding down but never
    /// below one frame.
    #[must_use]
    pub fn frames(&self, ms: u32) -> u32 {
        let frames = u64::from(ms) * u64::from(self.fps) / 1000;
        (frames as u32).max(1)
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            timeline_wait_frames: 300,
            movement_startup_ms: 500,
            base_cooldown_ms: 1000,
        }
    }
}

/// Static collaborators for one battle: tuning, skill book, map and the
/// path-query capability. Never mutated by the core.
pub struct BattleContext {
    /// Simulation tuning.
    pub config: BattleConfig,
    /// All skill definitions.
    pub skills: SkillBook,
    /// The static battle map.
    pub map: BattleMap,
    /// Path-query capability over the map.
    pub planner: Box<dyn Planner>,
}

impl std::fmt::Debug for BattleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleContext")
            .field("config", &self.config)
            .field("skills", &self.skills.len())
            .field("map", &self.map.id)
            .finish_non_exhaustive()
    }
}

/// All mutable state for one battle.
///
/// Invariants (maintained by the scheduler and reducer, asserted in
/// debug builds):
/// - every live unit id has exactly one `timeline` entry;
/// - a unit has a pending decision or an intent, never both;
/// - `frame` is monotonically non-decreasing;
/// - decision ids are unique and single-use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Current simulation frame.
    pub frame: u64,
    /// Battle or exploration mode.
    pub mode: BattleMode,
    /// All live units by id.
    pub units: HashMap<UnitId, Unit>,
    /// Timeline entry per live unit.
    pub timeline: HashMap<UnitId, TimelinePos>,
    /// Outstanding decision requests by unit id.
    pub pending_decisions: HashMap<UnitId, PendingDecision>,
    /// Committed, not-yet-executed intents by unit id.
    pub intents: HashMap<UnitId, ActionState>,
    /// Last accepted input per unit, kept until the intent executes.
    pub inputs: HashMap<UnitId, UserInput>,
    /// Next unit id to assign.
    pub next_unit_id: UnitId,
    /// Next decision id to assign. Monotonic, never reused.
    pub next_decision_id: u64,
}

impl GameState {
    /// Unit ids in ascending order, for deterministic iteration.
    #[must_use]
    pub fn sorted_unit_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<_> = self.units.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get a unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a mutable unit by id.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Remove a dead unit from every per-unit map in one step.
    ///
    /// Death is terminal: there is no resurrection path in this core.
    pub(crate) fn remove_unit(&mut self, id: UnitId) {
        self.units.remove(&id);
        self.timeline.remove(&id);
        self.pending_decisions.remove(&id);
        self.intents.remove(&id);
        self.inputs.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_conversion() {
        let config = BattleConfig {
            fps: 30,
            ..BattleConfig::default()
        };
        assert_eq!(config.frames(1000), 30);
        assert_eq!(config.frames(500), 15);
        // Rounds down, but never below one frame.
        assert_eq!(config.frames(1), 1);
        assert_eq!(config.frames(0), 1);
    }

    #[test]
    fn test_sorted_unit_ids() {
        let mut state = GameState::default();
        for id in [7u32, 2, 9] {
            state.units.insert(
                id,
                crate::units::Unit {
                    id,
                    name: String::new(),
                    size: crate::math::Fixed::ZERO,
                    pos: crate::math::Vec2Fixed::ZERO,
                    current_hp: 1,
                    max_hp: 1,
                    stats: crate::units::Stats::default(),
                    skills: vec![],
                    kind: crate::units::UnitKind::Player,
                    statuses: vec![],
                },
            );
        }
        assert_eq!(state.sorted_unit_ids(), vec![2, 7, 9]);
    }
}
