//! Action execution: matured intents become effect sequences.
//!
//! The executor reads state and describes consequences; it never
//! mutates anything. Folding the returned effects is the reducer's job.

use crate::data::{Affects, SkillEffect, SkillTarget};
use crate::effect::Effect;
use crate::intent::ActionState;
use crate::math::{Fixed, Vec2Fixed};
use crate::state::{BattleContext, GameState};
use crate::units::{StatusKind, Unit, UnitId};

/// Execute a matured intent, producing the effects it causes.
pub fn execute(
    actor_id: UnitId,
    intent: &ActionState,
    state: &GameState,
    ctx: &BattleContext,
) -> Vec<Effect> {
    let Some(actor) = state.unit(actor_id) else {
        return Vec::new();
    };

    match intent {
        ActionState::Passive => Vec::new(),
        ActionState::Move { target } => execute_move(actor, *target, ctx),
        ActionState::TargetUnit { target, skill } => {
            let Some(target_unit) = state.unit(*target) else {
                // Target died during the wind-up; the action whiffs.
                tracing::debug!(actor = actor_id, target = *target, "skill target gone");
                return Vec::new();
            };
            execute_skill(actor, skill, target_unit.pos, Some(*target), state, ctx)
        }
        ActionState::TargetPoint { target, skill } => {
            execute_skill(actor, skill, *target, None, state, ctx)
        }
    }
}

/// Movement: query the planner, then either arrive, stop at the
/// movement budget, or go nowhere.
fn execute_move(actor: &Unit, target: Vec2Fixed, ctx: &BattleContext) -> Vec<Effect> {
    let Some(path) = ctx.planner.search(actor.pos, target) else {
        return vec![Effect::MovementImpossible { actor: actor.id }];
    };

    let budget = actor.stats.movement.max(0) as u32;
    if path.cost <= budget {
        return vec![Effect::MoveTarget {
            actor: actor.id,
            target,
        }];
    }

    // Truncate at the budget: the unit walks as far as it can along the
    // planned path and stops there.
    let block_pos = path.waypoint_at(budget);
    vec![
        Effect::MovementBlocked {
            actor: actor.id,
            block_pos,
        },
        Effect::MoveTarget {
            actor: actor.id,
            target: block_pos,
        },
    ]
}

/// Skill execution: gather the affected units, then emit one effect per
/// affected unit per skill effect, in declaration order.
fn execute_skill(
    actor: &Unit,
    skill_id: &str,
    center: Vec2Fixed,
    single_target: Option<UnitId>,
    state: &GameState,
    ctx: &BattleContext,
) -> Vec<Effect> {
    let Some(skill) = ctx.skills.get(skill_id) else {
        // The resolver vetted this id; a miss here is a data regression.
        tracing::warn!(actor = actor.id, skill = skill_id, "skill vanished from book");
        return Vec::new();
    };

    let affected: Vec<UnitId> = match skill.target {
        SkillTarget::Single { .. } => single_target.into_iter().collect(),
        SkillTarget::Radius { size, affects } => {
            let radius = Fixed::from_num(size);
            state
                .sorted_unit_ids()
                .into_iter()
                .filter(|id| {
                    let unit = &state.units[id];
                    if !unit.pos.within(center, radius) {
                        return false;
                    }
                    match affects {
                        Affects::All => true,
                        Affects::Ally => actor.is_ally_of(unit),
                        Affects::Enemy => !actor.is_ally_of(unit),
                    }
                })
                .collect()
        }
    };

    let mut effects = Vec::new();
    for target_id in affected {
        for skill_effect in &skill.effects {
            match skill_effect {
                SkillEffect::Damage { amount, scale } => {
                    // Negative so the effect reads as damage; zero is a
                    // canonical miss and is still emitted.
                    let modifier = -(amount + scale.apply(&actor.stats));
                    effects.push(Effect::HpChange {
                        actor: actor.id,
                        target: target_id,
                        amount: modifier,
                    });
                }
                SkillEffect::Setback { amount } => {
                    effects.push(Effect::Setback {
                        actor: actor.id,
                        target: target_id,
                        amount: *amount,
                    });
                }
                SkillEffect::Blind { amount, duration_ms } => {
                    effects.push(Effect::StatusApplied {
                        actor: actor.id,
                        target: target_id,
                        status: StatusKind::Blind { severity: *amount },
                        duration_frames: ctx.config.frames(*duration_ms),
                    });
                }
            }
        }
    }
    effects
}
