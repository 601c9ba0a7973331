//! Data structures for the static asset catalog.
//!
//! These are pure serde data types deserialized from RON files: the
//! skill book, the player roster, enemy templates and server settings.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `battle_headless`.

mod roster_data;
mod skill_data;

pub use roster_data::{EnemyTemplate, PlayerData, Settings};
pub use skill_data::{
    Affects, Relation, Skill, SkillBook, SkillEffect, SkillId, SkillTarget, SkillTime, StatScale,
};
