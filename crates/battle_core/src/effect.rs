//! Effects: the sole channel for state change and user-facing errors.
//!
//! The executor and resolver only ever *describe* consequences as
//! effects; [`apply`] folds them into the state strictly in emission
//! order. Anything the UI needs to render - including rule violations -
//! arrives through this channel, never through exceptions.

use serde::{Deserialize, Serialize};

use crate::data::SkillId;
use crate::intent::ActionTarget;
use crate::math::Vec2Fixed;
use crate::state::GameState;
use crate::units::{StatusEffect, StatusKind, UnitId};

/// One observable consequence of a decision or an executed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// A submission or action was rejected. Carries no state change.
    InvalidAction {
        /// Human-readable rejection reason.
        message: String,
    },
    /// A skill decision was committed (the wind-up is now running).
    SkillTarget {
        /// Unit that committed the skill.
        actor: UnitId,
        /// Aim of the skill.
        target: ActionTarget,
        /// Which skill was committed.
        skill: SkillId,
    },
    /// A unit moved; folding this repositions the actor.
    MoveTarget {
        /// Unit that moved.
        actor: UnitId,
        /// Where it ended up.
        target: Vec2Fixed,
    },
    /// Hit point change: negative for damage, positive for healing,
    /// zero for a canonical miss.
    HpChange {
        /// Unit that caused the change.
        actor: UnitId,
        /// Unit whose hit points change.
        target: UnitId,
        /// Signed hit point delta, clamped into `[0, max_hp]` on fold.
        amount: i32,
    },
    /// Timeline regression: the target's wait grows (or its act
    /// progress shrinks) by `amount` frames.
    Setback {
        /// Unit that caused the setback.
        actor: UnitId,
        /// Unit pushed back on the timeline.
        target: UnitId,
        /// Frames of regression.
        amount: u32,
    },
    /// A timed status was applied to the target.
    StatusApplied {
        /// Unit that applied the status.
        actor: UnitId,
        /// Unit receiving the status.
        target: UnitId,
        /// What was applied.
        status: StatusKind,
        /// Duration in frames.
        duration_frames: u32,
    },
    /// Movement was truncated at the unit's movement budget. Carries no
    /// state change; the accompanying `MoveTarget` does the repositioning.
    MovementBlocked {
        /// Unit whose movement was truncated.
        actor: UnitId,
        /// The point on the planned path where the budget ran out.
        block_pos: Vec2Fixed,
    },
    /// No path exists to the requested destination. Carries no state
    /// change.
    MovementImpossible {
        /// Unit that tried to move.
        actor: UnitId,
    },
}

/// Fold effects into the state, strictly in emission order.
///
/// A unit reaching zero hit points is removed from every per-unit map
/// in the same fold step. Effects referencing units that died earlier
/// in the same fold are silently skipped.
pub fn apply(state: &mut GameState, effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::HpChange { target, amount, .. } => {
                let Some(unit) = state.unit_mut(*target) else {
                    continue;
                };
                unit.current_hp = unit.current_hp.saturating_add(*amount).clamp(0, unit.max_hp);
                if unit.current_hp == 0 {
                    tracing::debug!(unit = *target, "unit died");
                    state.remove_unit(*target);
                }
            }
            Effect::Setback { target, amount, .. } => {
                if let Some(pos) = state.timeline.get_mut(target) {
                    pos.setback(*amount);
                }
            }
            Effect::MoveTarget { actor, target } => {
                if let Some(unit) = state.unit_mut(*actor) {
                    unit.pos = *target;
                }
            }
            Effect::StatusApplied {
                target,
                status,
                duration_frames,
                ..
            } => {
                if let Some(unit) = state.unit_mut(*target) {
                    unit.statuses.push(StatusEffect {
                        kind: *status,
                        remaining_frames: *duration_frames,
                    });
                }
            }
            // Observability-only effects: recorded in the log, no fold.
            Effect::InvalidAction { .. }
            | Effect::SkillTarget { .. }
            | Effect::MovementBlocked { .. }
            | Effect::MovementImpossible { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;
    use crate::timeline::TimelinePos;
    use crate::units::{Stats, Unit, UnitKind};

    fn state_with_unit(id: UnitId, hp: i32, max_hp: i32) -> GameState {
        let mut state = GameState::default();
        state.units.insert(
            id,
            Unit {
                id,
                name: format!("u{id}"),
                size: Fixed::from_num(8),
                pos: Vec2Fixed::ZERO,
                current_hp: hp,
                max_hp,
                stats: Stats::default(),
                skills: vec![],
                kind: UnitKind::Player,
                statuses: vec![],
            },
        );
        state.timeline.insert(id, TimelinePos::Wait { value: 10 });
        state
    }

    #[test]
    fn test_hp_change_clamps_to_max() {
        let mut state = state_with_unit(1, 15, 20);
        apply(
            &mut state,
            &[Effect::HpChange {
                actor: 2,
                target: 1,
                amount: 50,
            }],
        );
        assert_eq!(state.unit(1).unwrap().current_hp, 20);
    }

    #[test]
    fn test_death_removes_unit_everywhere() {
        let mut state = state_with_unit(1, 5, 20);
        state
            .intents
            .insert(1, crate::intent::ActionState::Passive);
        apply(
            &mut state,
            &[Effect::HpChange {
                actor: 2,
                target: 1,
                amount: -5,
            }],
        );
        assert!(state.units.is_empty());
        assert!(state.timeline.is_empty());
        assert!(state.pending_decisions.is_empty());
        assert!(state.intents.is_empty());
    }

    #[test]
    fn test_effects_after_death_are_skipped() {
        let mut state = state_with_unit(1, 5, 20);
        apply(
            &mut state,
            &[
                Effect::HpChange {
                    actor: 2,
                    target: 1,
                    amount: -5,
                },
                Effect::Setback {
                    actor: 2,
                    target: 1,
                    amount: 30,
                },
            ],
        );
        assert!(state.units.is_empty());
        assert!(state.timeline.is_empty());
    }

    #[test]
    fn test_setback_grows_wait() {
        let mut state = state_with_unit(1, 5, 20);
        apply(
            &mut state,
            &[Effect::Setback {
                actor: 2,
                target: 1,
                amount: 30,
            }],
        );
        assert_eq!(state.timeline[&1], TimelinePos::Wait { value: 40 });
    }

    #[test]
    fn test_move_target_repositions() {
        let mut state = state_with_unit(1, 5, 20);
        let dest = Vec2Fixed::new(Fixed::from_num(3), Fixed::from_num(4));
        apply(
            &mut state,
            &[Effect::MoveTarget {
                actor: 1,
                target: dest,
            }],
        );
        assert_eq!(state.unit(1).unwrap().pos, dest);
    }

    #[test]
    fn test_empty_fold_is_identity() {
        let state = state_with_unit(1, 5, 20);
        let mut folded = state.clone();
        apply(&mut folded, &[]);
        assert_eq!(folded, state);
    }
}
