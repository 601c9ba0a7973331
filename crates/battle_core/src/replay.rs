//! Replay capture and deterministic playback.
//!
//! A replay is the initial state plus the frame-stamped input log.
//! Because the simulation is deterministic, re-running the inputs from
//! the initial state reproduces the battle exactly; the recorded final
//! hash verifies it did.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::battle::Battle;
use crate::decision::DecisionId;
use crate::error::{GameError, Result};
use crate::intent::BattleAction;
use crate::state::BattleContext;

/// Bumped whenever the serialized layout changes incompatibly.
pub const REPLAY_VERSION: u32 = 1;

/// One recorded input, stamped with the frame it was fed to [`Battle::step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayInput {
    /// Frame the input was processed on.
    pub frame: u64,
    /// The decision this input answered.
    pub decision_id: DecisionId,
    /// The submitted action.
    pub action: BattleAction,
}

/// A complete recorded battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    /// Layout version of this replay.
    pub version: u32,
    /// Caller-chosen label for the scenario that was run.
    pub scenario_id: String,
    /// Serialized state at recording start.
    pub initial_state: Vec<u8>,
    /// Frame-stamped inputs, in submission order.
    pub inputs: Vec<ReplayInput>,
    /// Frame the recording stopped on.
    pub final_frame: u64,
    /// State hash at `final_frame`, checked on playback.
    pub final_hash: u64,
}

impl Replay {
    /// Begin recording from the battle's current state.
    pub fn start(scenario_id: impl Into<String>, battle: &Battle) -> Result<Self> {
        Ok(Self {
            version: REPLAY_VERSION,
            scenario_id: scenario_id.into(),
            initial_state: battle.serialize()?,
            inputs: Vec::new(),
            final_frame: battle.state().frame,
            final_hash: battle.state_hash(),
        })
    }

    /// Record one input as it is fed to the battle.
    pub fn record(&mut self, frame: u64, decision_id: DecisionId, action: BattleAction) {
        self.inputs.push(ReplayInput {
            frame,
            decision_id,
            action,
        });
    }

    /// Seal the recording with the battle's final frame and hash.
    pub fn finish(&mut self, battle: &Battle) {
        self.final_frame = battle.state().frame;
        self.final_hash = battle.state_hash();
    }

    /// Re-run the recording against a context, verifying the final hash.
    ///
    /// Returns the replayed battle at `final_frame`, or
    /// [`GameError::InvalidState`] if the hash diverges (context
    /// mismatch or a determinism bug).
    pub fn playback(&self, ctx: Arc<BattleContext>) -> Result<Battle> {
        if self.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "replay version {} (expected {REPLAY_VERSION})",
                self.version
            )));
        }

        let mut battle = Battle::deserialize(&self.initial_state, ctx)?;
        let mut next_input = 0;
        while battle.state().frame < self.final_frame {
            let frame = battle.state().frame + 1;
            let mut inputs = Vec::new();
            while let Some(input) = self.inputs.get(next_input) {
                if input.frame != frame {
                    break;
                }
                inputs.push((input.decision_id, input.action.clone()));
                next_input += 1;
            }
            battle.step(&inputs);
        }

        let hash = battle.state_hash();
        if hash != self.final_hash {
            return Err(GameError::InvalidState(format!(
                "replay hash mismatch at frame {}: {hash:#x} != {:#x}",
                self.final_frame, self.final_hash
            )));
        }
        tracing::info!(
            scenario = %self.scenario_id,
            frames = self.final_frame,
            "replay verified"
        );
        Ok(battle)
    }

    /// Serialize the replay for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("replay serialize failed: {e}")))
    }

    /// Load a replay from storage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| GameError::InvalidState(format!("replay deserialize failed: {e}")))
    }
}
