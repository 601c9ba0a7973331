//! Roster and settings data: player definitions and enemy templates.

use serde::{Deserialize, Serialize};

use crate::data::SkillId;
use crate::units::Stats;

/// Data-driven player definition loaded from the roster file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    /// Account id, unique across the roster.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Collision/display radius in world units.
    pub size: i32,
    /// Starting world position as integer world units.
    pub pos: (i32, i32),
    /// Starting hit points.
    pub current_hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Attribute block.
    pub stats: Stats,
    /// Skills this player knows.
    pub skills: Vec<SkillId>,
}

/// Data-driven enemy template; concrete enemies are stamped out of
/// templates at spawn positions chosen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Template id, unique across the bestiary.
    pub type_id: String,
    /// Display name.
    pub name: String,
    /// Collision/display radius in world units.
    pub size: i32,
    /// Maximum (and starting) hit points.
    pub max_hp: i32,
    /// Attribute block.
    pub stats: Stats,
    /// Skills enemies of this type know.
    pub skills: Vec<SkillId>,
    /// AI policy tag (`None` = passive idle).
    #[serde(default)]
    pub ai_type: Option<String>,
}

/// Server-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Display name of the game instance.
    pub game_name: String,
    /// Password for game-master commands.
    pub game_master_password: String,
}
