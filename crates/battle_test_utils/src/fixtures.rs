//! Test fixtures and helpers.
//!
//! Pre-built contexts, skill books and rosters for consistent testing.

use std::sync::Arc;

use fixed::types::I32F32;

use battle_core::prelude::*;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// World position from integer coordinates.
#[must_use]
pub fn pos(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::new(fixed(x), fixed(y))
}

/// A small skill book covering every targeting mode and effect kind:
/// `slash` (single-target damage), `heal` (single-target ally healing),
/// `quake` (radius damage plus setback) and `flash` (radius blind).
#[must_use]
pub fn test_skill_book() -> SkillBook {
    SkillBook::new(vec![
        Skill {
            name: "slash".into(),
            range: 64,
            cost: 0,
            time: SkillTime {
                startup_ms: 500,
                cooldown_ms: 500,
                recharge_ms: 0,
            },
            target: SkillTarget::Single {
                valid: Relation::Enemy,
            },
            effects: vec![SkillEffect::Damage {
                amount: 10,
                scale: StatScale {
                    str: 100,
                    ..StatScale::default()
                },
            }],
        },
        Skill {
            name: "heal".into(),
            range: 96,
            cost: 0,
            time: SkillTime {
                startup_ms: 800,
                ..SkillTime::default()
            },
            target: SkillTarget::Single {
                valid: Relation::Ally,
            },
            effects: vec![SkillEffect::Damage {
                amount: -12,
                scale: StatScale {
                    wis: -50,
                    ..StatScale::default()
                },
            }],
        },
        Skill {
            name: "quake".into(),
            range: 128,
            cost: 0,
            time: SkillTime {
                startup_ms: 1200,
                cooldown_ms: 1000,
                recharge_ms: 500,
            },
            target: SkillTarget::Radius {
                size: 32,
                affects: Affects::Enemy,
            },
            effects: vec![
                SkillEffect::Damage {
                    amount: 6,
                    scale: StatScale {
                        mag: 100,
                        ..StatScale::default()
                    },
                },
                SkillEffect::Setback { amount: 30 },
            ],
        },
        Skill {
            name: "flash".into(),
            range: 96,
            cost: 0,
            time: SkillTime {
                startup_ms: 400,
                ..SkillTime::default()
            },
            target: SkillTarget::Radius {
                size: 48,
                affects: Affects::All,
            },
            effects: vec![SkillEffect::Blind {
                amount: 3,
                duration_ms: 2000,
            }],
        },
    ])
}

/// An open (wall-free) square arena of `tiles` x `tiles`, 16-unit tiles.
#[must_use]
pub fn open_arena(tiles: u32) -> BattleMap {
    BattleMap::new("test-arena", tiles, tiles, fixed(16))
}

/// A complete context over [`test_skill_book`] and [`open_arena`], with
/// short waits so tests reach decisions quickly.
#[must_use]
pub fn test_context() -> Arc<BattleContext> {
    let map = open_arena(16);
    Arc::new(BattleContext {
        config: BattleConfig {
            fps: 30,
            timeline_wait_frames: 3,
            movement_startup_ms: 500,
            base_cooldown_ms: 1000,
        },
        skills: test_skill_book(),
        planner: Box::new(GridPlanner::new(map.clone())),
        map,
    })
}

/// Roster data for a baseline test player knowing every test skill.
#[must_use]
pub fn test_player(name: &str, position: (i32, i32)) -> PlayerData {
    PlayerData {
        id: name.to_lowercase(),
        name: name.into(),
        size: 8,
        pos: position,
        current_hp: 30,
        max_hp: 30,
        stats: Stats {
            resilience: 2,
            movement: 4,
            str: 3,
            mag: 2,
            wis: 2,
        },
        skills: vec!["slash".into(), "heal".into(), "quake".into(), "flash".into()],
    }
}

/// Template for a melee enemy, optionally with the aggressive AI.
#[must_use]
pub fn test_goblin(aggressive: bool) -> EnemyTemplate {
    EnemyTemplate {
        type_id: "goblin".into(),
        name: "Goblin".into(),
        size: 8,
        max_hp: 15,
        stats: Stats {
            movement: 3,
            str: 1,
            ..Stats::default()
        },
        skills: vec!["slash".into()],
        ai_type: aggressive.then(|| "aggressive".into()),
    }
}

/// A ready-to-step duel: one player at (24, 24), one passive goblin at
/// (56, 24). Returns the battle and the two unit ids.
#[must_use]
pub fn duel_battle() -> (Battle, UnitId, UnitId) {
    let mut battle = Battle::new(test_context());
    let player = battle
        .spawn_player(&test_player("Ayla", (24, 24)))
        .expect("test roster is valid");
    let enemy = battle
        .spawn_enemy(&test_goblin(false), pos(56, 24))
        .expect("test template is valid");
    (battle, player, enemy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_book_is_complete() {
        let book = test_skill_book();
        for name in ["slash", "heal", "quake", "flash"] {
            assert!(book.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_duel_battle_spawns_both_sides() {
        let (battle, player, enemy) = duel_battle();
        assert_eq!(battle.state().unit(player).unwrap().side(), Side::Players);
        assert_eq!(battle.state().unit(enemy).unwrap().side(), Side::Enemies);
    }
}
