//! Player input, committed intents, and the resolver between them.
//!
//! The resolver turns an accepted decision into a committed
//! [`ActionState`] plus an act duration, or rejects it with a typed
//! reason. A failed decision does not consume the unit's turn: the unit
//! stays at wait zero and is asked again on the next frame.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{Relation, SkillId, SkillTarget};
use crate::decision::DecisionId;
use crate::effect::Effect;
use crate::math::{Fixed, Vec2Fixed};
use crate::state::{BattleContext, GameState};
use crate::units::UnitId;

/// Aim of a battle action: a unit or a point in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionTarget {
    /// Aim at a specific unit.
    Unit(UnitId),
    /// Aim at a world position.
    Point(Vec2Fixed),
}

/// What a player asked a unit to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleAction {
    /// Use a skill on a unit or point.
    Skill {
        /// Skill id, which must be known to the actor.
        skill: SkillId,
        /// Aim of the skill.
        target: ActionTarget,
    },
    /// Use an item on a unit or point.
    Item {
        /// Aim of the item.
        target: ActionTarget,
    },
    /// Move to a world position.
    Move {
        /// Destination.
        target: Vec2Fixed,
    },
}

/// Input arriving from a player, keyed by the decision it answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    /// The decision this input answers. Stale ids are rejected.
    pub pending_decision_id: DecisionId,
    /// The chosen action.
    pub action: BattleAction,
}

/// A committed, not-yet-executed action bound to a unit's act counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionState {
    /// Do nothing this turn.
    Passive,
    /// Move toward a destination.
    Move {
        /// Destination.
        target: Vec2Fixed,
    },
    /// Use a skill on a unit.
    TargetUnit {
        /// The aimed-at unit.
        target: UnitId,
        /// Committed skill id.
        skill: SkillId,
    },
    /// Use a skill on a point.
    TargetPoint {
        /// The aimed-at position.
        target: Vec2Fixed,
        /// Committed skill id.
        skill: SkillId,
    },
}

/// Why a submitted action was rejected.
///
/// Rendered into the `invalid-action` effect message; never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    /// The quoted decision id matches nothing (duplicate or late input).
    #[error("no such pending decision")]
    StaleDecision,
    /// The acting unit is gone.
    #[error("actor is no longer in the battle")]
    ActorGone,
    /// The actor does not know the requested skill.
    #[error("unit does not know skill '{0}'")]
    UnknownSkill(SkillId),
    /// The skill id is missing from the skill book.
    #[error("skill '{0}' is not defined")]
    UndefinedSkill(SkillId),
    /// A single-target skill was aimed at a point.
    #[error("skill '{0}' must target a unit")]
    NeedsUnitTarget(SkillId),
    /// The aimed-at unit is gone.
    #[error("target is no longer in the battle")]
    TargetGone,
    /// The target's relation does not satisfy the skill's constraint.
    #[error("invalid target for skill '{0}'")]
    WrongRelation(SkillId),
    /// The target lies beyond the skill's range.
    #[error("target out of range for skill '{0}'")]
    OutOfRange(SkillId),
    /// Items are not usable (no item catalog exists yet).
    #[error("items cannot be used in battle")]
    ItemsUnavailable,
}

/// A successfully resolved decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The committed intent.
    pub intent: ActionState,
    /// Frames until the intent executes.
    pub act_frames: u32,
    /// Decision effects to surface immediately (e.g. skill commitment).
    pub effects: Vec<Effect>,
}

/// Resolve an accepted decision into a committed intent.
///
/// Validation order: actor liveness, skill knowledge and definition,
/// target relation, then range. Any failure leaves the unit without an
/// intent; it re-decides the next time its wait reaches zero.
pub fn resolve(
    actor_id: UnitId,
    action: &BattleAction,
    state: &GameState,
    ctx: &BattleContext,
) -> Result<Resolution, InvalidReason> {
    let actor = state.unit(actor_id).ok_or(InvalidReason::ActorGone)?;

    match action {
        BattleAction::Move { target } => Ok(Resolution {
            intent: ActionState::Move { target: *target },
            act_frames: ctx.config.frames(ctx.config.movement_startup_ms),
            effects: Vec::new(),
        }),

        BattleAction::Item { .. } => Err(InvalidReason::ItemsUnavailable),

        BattleAction::Skill { skill, target } => {
            if !actor.knows_skill(skill) {
                return Err(InvalidReason::UnknownSkill(skill.clone()));
            }
            let definition = ctx
                .skills
                .get(skill)
                .ok_or_else(|| InvalidReason::UndefinedSkill(skill.clone()))?;

            // Relation check, then range check, per the validation order.
            let aim_pos = match (definition.target, target) {
                (SkillTarget::Single { valid }, ActionTarget::Unit(target_id)) => {
                    let target_unit =
                        state.unit(*target_id).ok_or(InvalidReason::TargetGone)?;
                    let relation_ok = match valid {
                        Relation::Any => true,
                        Relation::Ally => actor.is_ally_of(target_unit),
                        Relation::Enemy => !actor.is_ally_of(target_unit),
                    };
                    if !relation_ok {
                        return Err(InvalidReason::WrongRelation(skill.clone()));
                    }
                    target_unit.pos
                }
                (SkillTarget::Single { .. }, ActionTarget::Point(_)) => {
                    return Err(InvalidReason::NeedsUnitTarget(skill.clone()));
                }
                // Radius skills aim anywhere; the affects filter is
                // applied to the blast at execution time.
                (SkillTarget::Radius { .. }, ActionTarget::Unit(target_id)) => {
                    state.unit(*target_id).ok_or(InvalidReason::TargetGone)?.pos
                }
                (SkillTarget::Radius { .. }, ActionTarget::Point(point)) => *point,
            };

            let range = Fixed::from_num(definition.range);
            if !actor.pos.within(aim_pos, range) {
                return Err(InvalidReason::OutOfRange(skill.clone()));
            }

            let intent = match target {
                ActionTarget::Unit(target_id) => ActionState::TargetUnit {
                    target: *target_id,
                    skill: skill.clone(),
                },
                ActionTarget::Point(point) => ActionState::TargetPoint {
                    target: *point,
                    skill: skill.clone(),
                },
            };

            Ok(Resolution {
                intent,
                act_frames: ctx.config.frames(definition.time.startup_ms),
                effects: vec![Effect::SkillTarget {
                    actor: actor_id,
                    target: *target,
                    skill: skill.clone(),
                }],
            })
        }
    }
}
