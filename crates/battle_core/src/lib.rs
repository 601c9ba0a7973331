//! # Battle Core
//!
//! Deterministic turn-based battle simulation core.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Server-authoritative multiplayer (clients render, never simulate)
//! - Headless scenario runs
//! - Replay systems
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`battle`] - Frame loop, spawning, and input intake
//! - [`timeline`] - Per-unit wait/act timeline entries
//! - [`decision`] - Decision requests and their single-use ids
//! - [`intent`] - Input resolution into committed intents
//! - [`executor`] - Matured intents into effect sequences
//! - [`effect`] - The effect channel and its state fold
//! - [`ai`] - Enemy decision policies
//! - [`data`] - Data-driven skill and roster definitions
//! - [`map`] - Tile maps and the path-query trait
//! - [`planner`] - Grid A* planner
//! - [`replay`] - Replay capture and verified playback
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod battle;
pub mod data;
pub mod decision;
pub mod effect;
pub mod error;
pub mod executor;
pub mod intent;
pub mod map;
pub mod math;
pub mod planner;
pub mod replay;
pub mod state;
pub mod timeline;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::Battle;
    pub use crate::data::{
        Affects, EnemyTemplate, PlayerData, Relation, Settings, Skill, SkillBook, SkillEffect,
        SkillId, SkillTarget, SkillTime, StatScale,
    };
    pub use crate::decision::{DecisionId, PendingDecision};
    pub use crate::effect::Effect;
    pub use crate::error::{GameError, Result};
    pub use crate::intent::{ActionState, ActionTarget, BattleAction, InvalidReason, UserInput};
    pub use crate::map::{BattleMap, PlannedPath, Planner, TileType};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::planner::GridPlanner;
    pub use crate::replay::{Replay, ReplayInput};
    pub use crate::state::{BattleConfig, BattleContext, BattleMode, GameState};
    pub use crate::timeline::TimelinePos;
    pub use crate::units::{Side, Stats, StatusEffect, StatusKind, Unit, UnitId, UnitKind};
}
