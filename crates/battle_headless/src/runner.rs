//! Scenario runner: drives a battle without a client attached.
//!
//! Player units are steered by the same aggressive policy enemies use,
//! which is enough for balance runs, determinism checks and CI. Every
//! run can capture a replay for later verification.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use battle_core::ai;
use battle_core::prelude::*;
use std::result::Result;

use crate::assets::{AssetError, Assets, Scenario};

/// Errors raised while setting up or driving a scenario.
#[derive(Debug, Error)]
pub enum RunError {
    /// Asset loading or lookup failed.
    #[error(transparent)]
    Asset(#[from] AssetError),
    /// Battle construction or persistence failed.
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Options controlling a scenario run.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    /// Simulation tuning for the battle.
    pub battle: BattleConfig,
    /// Override the scenario's frame count, if set.
    pub max_frames: Option<u64>,
    /// Capture a replay of the run.
    pub record_replay: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            max_frames: None,
            record_replay: false,
        }
    }
}

/// A surviving unit at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survivor {
    /// Unit id.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Remaining hit points.
    pub hp: i32,
}

/// Summary of a completed scenario run, JSON-printable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Frames actually simulated.
    pub frames: u64,
    /// Deterministic state hash at the end of the run.
    pub final_hash: u64,
    /// True if one side was wiped out before the frame limit.
    pub decided: bool,
    /// Surviving player units.
    pub players_alive: Vec<Survivor>,
    /// Surviving enemy units.
    pub enemies_alive: Vec<Survivor>,
    /// Total effects emitted over the run.
    pub effects_emitted: usize,
    /// `InvalidAction` effects seen (should stay at zero for scripted runs).
    pub invalid_actions: usize,
}

/// The outcome of [`run_scenario`]: the report plus the battle and any
/// captured replay, for callers that want to poke further.
pub struct RunOutcome {
    /// Printable summary.
    pub report: RunReport,
    /// The battle in its final state.
    pub battle: Battle,
    /// Captured replay, when recording was requested.
    pub replay: Option<Replay>,
}

/// Build a battle from a scenario and drive it to completion.
pub fn run_scenario(
    assets: &Assets,
    scenario: &Scenario,
    config: &RunConfig,
) -> Result<RunOutcome, RunError> {
    let ctx = Arc::new(assets.build_context(&scenario.map, config.battle)?);
    let mut battle = Battle::new(ctx.clone());

    for roster_id in &scenario.players {
        battle.spawn_player(assets.player(roster_id)?)?;
    }
    for (type_id, (x, y)) in &scenario.enemies {
        let pos = Vec2Fixed::new(Fixed::from_num(*x), Fixed::from_num(*y));
        battle.spawn_enemy(assets.enemy(type_id)?, pos)?;
    }

    let mut replay = if config.record_replay {
        Some(Replay::start(scenario.name.clone(), &battle)?)
    } else {
        None
    };

    let max_frames = config.max_frames.unwrap_or(scenario.frames);
    let mut effects_emitted = 0;
    let mut invalid_actions = 0;
    let mut decided = false;

    for _ in 0..max_frames {
        let inputs = scripted_inputs(&battle);
        if let Some(replay) = replay.as_mut() {
            let frame = battle.state().frame + 1;
            for (decision_id, action) in &inputs {
                replay.record(frame, *decision_id, action.clone());
            }
        }

        let effects = battle.step(&inputs);
        effects_emitted += effects.len();
        invalid_actions += effects
            .iter()
            .filter(|e| matches!(e, Effect::InvalidAction { .. }))
            .count();

        if side_wiped(battle.state()) {
            decided = true;
            break;
        }
    }

    if let Some(replay) = replay.as_mut() {
        replay.finish(&battle);
    }

    let report = RunReport {
        scenario: scenario.name.clone(),
        frames: battle.state().frame,
        final_hash: battle.state_hash(),
        decided,
        players_alive: survivors(battle.state(), Side::Players),
        enemies_alive: survivors(battle.state(), Side::Enemies),
        effects_emitted,
        invalid_actions,
    };
    tracing::info!(
        scenario = %report.scenario,
        frames = report.frames,
        decided = report.decided,
        players = report.players_alive.len(),
        enemies = report.enemies_alive.len(),
        "run finished"
    );

    Ok(RunOutcome {
        report,
        battle,
        replay,
    })
}

/// Answer every pending player decision with the aggressive policy.
///
/// Enemies decide for themselves inside the frame loop; only player
/// decisions are visible here.
fn scripted_inputs(battle: &Battle) -> Vec<(DecisionId, BattleAction)> {
    let state = battle.state();
    let mut unit_ids: Vec<UnitId> = state.pending_decisions.keys().copied().collect();
    unit_ids.sort_unstable();

    let mut inputs = Vec::new();
    for unit_id in unit_ids {
        let Some(pending) = state.pending_decisions.get(&unit_id) else {
            continue;
        };
        if let Some(action) = ai::aggressive_action(unit_id, state, battle.context()) {
            inputs.push((pending.id, action));
        }
    }
    inputs
}

fn survivors(state: &GameState, side: Side) -> Vec<Survivor> {
    state
        .sorted_unit_ids()
        .into_iter()
        .filter_map(|id| state.unit(id))
        .filter(|unit| unit.side() == side)
        .map(|unit| Survivor {
            id: unit.id,
            name: unit.name.clone(),
            hp: unit.current_hp,
        })
        .collect()
}

fn side_wiped(state: &GameState) -> bool {
    let mut players = 0;
    let mut enemies = 0;
    for unit in state.units.values() {
        match unit.side() {
            Side::Players => players += 1,
            Side::Enemies => enemies += 1,
        }
    }
    players == 0 || enemies == 0
}
