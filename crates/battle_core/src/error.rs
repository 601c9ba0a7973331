//! Error types for the battle simulation.
//!
//! Rule violations (bad targets, stale decisions, blocked movement) are
//! *not* errors: they flow through the [`Effect`](crate::effect::Effect)
//! channel so the frame loop is never interrupted. [`GameError`] covers
//! construction, data, and serialization problems only.

use thiserror::Error;

use crate::units::UnitId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for battle construction and persistence.
#[derive(Debug, Error)]
pub enum GameError {
    /// Unit reference that does not exist in the battle.
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    /// A spawned unit references a skill missing from the skill book.
    #[error("Unknown skill '{skill}' on unit '{unit}'")]
    UnknownSkill {
        /// Skill id that failed to resolve.
        skill: String,
        /// Name of the unit carrying the reference.
        unit: String,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid game state (serialization failures, replay mismatches).
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
