//! Enemy decision-making.
//!
//! Enemies answer their own decision requests inside the frame they
//! open, through the same resolver path as player input. The behaviour
//! is keyed by the enemy's `ai_type` string so scenario data can pick
//! a policy without code changes.

use crate::intent::{ActionTarget, BattleAction};
use crate::state::{BattleContext, GameState};
use crate::units::{Side, UnitId};

/// Pick an action for an enemy whose wait has matured.
///
/// Returns `None` when the enemy has no AI policy (it idles passively)
/// or no viable target exists.
pub fn decide(actor_id: UnitId, state: &GameState, ctx: &BattleContext) -> Option<BattleAction> {
    let actor = state.unit(actor_id)?;
    let ai_type = match &actor.kind {
        crate::units::UnitKind::Enemy { ai_type } => ai_type.as_deref()?,
        crate::units::UnitKind::Player => return None,
    };

    match ai_type {
        "aggressive" => aggressive_action(actor_id, state, ctx),
        other => {
            tracing::warn!(unit = actor_id, ai_type = other, "unknown ai type, idling");
            None
        }
    }
}

/// Close on the nearest living opponent and hit it with the first
/// usable offensive skill; otherwise walk toward it.
///
/// Public so scripted drivers (headless runs, soak tests) can steer
/// player units with the same policy enemies use.
pub fn aggressive_action(
    actor_id: UnitId,
    state: &GameState,
    ctx: &BattleContext,
) -> Option<BattleAction> {
    let actor = state.unit(actor_id)?;
    let opponents = match actor.side() {
        Side::Players => Side::Enemies,
        Side::Enemies => Side::Players,
    };
    // Nearest by squared distance, lowest id on ties: deterministic.
    let target = state
        .sorted_unit_ids()
        .into_iter()
        .filter_map(|id| state.unit(id))
        .filter(|unit| unit.side() == opponents)
        .min_by_key(|unit| actor.pos.distance_squared(unit.pos))?;

    for skill_id in &actor.skills {
        let Some(skill) = ctx.skills.get(skill_id) else {
            continue;
        };
        if !skill.targets_enemies() {
            continue;
        }
        let range = crate::math::Fixed::from_num(skill.range);
        if actor.pos.within(target.pos, range) {
            return Some(BattleAction::Skill {
                skill: skill_id.clone(),
                target: ActionTarget::Unit(target.id),
            });
        }
    }

    Some(BattleAction::Move { target: target.pos })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Relation, Skill, SkillBook, SkillEffect, SkillTarget, SkillTime, StatScale};
    use crate::map::BattleMap;
    use crate::math::{Fixed, Vec2Fixed};
    use crate::planner::GridPlanner;
    use crate::state::BattleConfig;
    use crate::units::{Stats, Unit, UnitKind};

    fn bite(range: i32) -> Skill {
        Skill {
            name: "bite".into(),
            range,
            cost: 0,
            time: SkillTime::default(),
            target: SkillTarget::Single {
                valid: Relation::Enemy,
            },
            effects: vec![SkillEffect::Damage {
                amount: 5,
                scale: StatScale::default(),
            }],
        }
    }

    fn test_ctx(range: i32) -> BattleContext {
        let map = BattleMap::new("arena", 16, 16, Fixed::from_num(16));
        BattleContext {
            config: BattleConfig::default(),
            skills: SkillBook::new(vec![bite(range)]),
            planner: Box::new(GridPlanner::new(map.clone())),
            map,
        }
    }

    fn unit(id: UnitId, x: i32, kind: UnitKind) -> Unit {
        Unit {
            id,
            name: format!("u{id}"),
            size: Fixed::from_num(8),
            pos: Vec2Fixed::new(Fixed::from_num(x), Fixed::from_num(8)),
            current_hp: 20,
            max_hp: 20,
            stats: Stats::default(),
            skills: vec!["bite".into()],
            kind,
            statuses: vec![],
        }
    }

    fn aggressive() -> UnitKind {
        UnitKind::Enemy {
            ai_type: Some("aggressive".into()),
        }
    }

    #[test]
    fn test_attacks_nearest_player_in_range() {
        let mut state = GameState::default();
        state.units.insert(1, unit(1, 8, UnitKind::Player));
        state.units.insert(2, unit(2, 100, UnitKind::Player));
        state.units.insert(3, unit(3, 16, aggressive()));
        let ctx = test_ctx(48);

        assert_eq!(
            decide(3, &state, &ctx),
            Some(BattleAction::Skill {
                skill: "bite".into(),
                target: ActionTarget::Unit(1),
            })
        );
    }

    #[test]
    fn test_moves_toward_player_out_of_range() {
        let mut state = GameState::default();
        state.units.insert(1, unit(1, 200, UnitKind::Player));
        state.units.insert(3, unit(3, 8, aggressive()));
        let ctx = test_ctx(48);

        assert_eq!(
            decide(3, &state, &ctx),
            Some(BattleAction::Move {
                target: state.unit(1).unwrap().pos,
            })
        );
    }

    #[test]
    fn test_no_ai_type_idles() {
        let mut state = GameState::default();
        state.units.insert(1, unit(1, 8, UnitKind::Player));
        state
            .units
            .insert(3, unit(3, 16, UnitKind::Enemy { ai_type: None }));
        let ctx = test_ctx(48);

        assert_eq!(decide(3, &state, &ctx), None);
    }

    #[test]
    fn test_no_players_idles() {
        let mut state = GameState::default();
        state.units.insert(3, unit(3, 16, aggressive()));
        let ctx = test_ctx(48);

        assert_eq!(decide(3, &state, &ctx), None);
    }

    #[test]
    fn test_equidistant_tie_breaks_by_id() {
        let mut state = GameState::default();
        state.units.insert(5, unit(5, 24, UnitKind::Player));
        state.units.insert(2, unit(2, 8, UnitKind::Player));
        state.units.insert(9, unit(9, 16, aggressive()));
        let ctx = test_ctx(48);

        // Both players are 8 units away; the lower id wins.
        assert_eq!(
            decide(9, &state, &ctx),
            Some(BattleAction::Skill {
                skill: "bite".into(),
                target: ActionTarget::Unit(2),
            })
        );
    }
}
