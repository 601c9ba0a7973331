//! Asset loading for headless battles.
//!
//! Loads skill books, rosters, enemy templates, maps and scenarios from
//! RON files. The core defines the data types; all file IO lives here.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use battle_core::prelude::*;
use std::result::Result;

/// Errors raised while loading asset files.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The file could not be read.
    #[error("failed to read '{path}': {message}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying IO error.
        message: String,
    },
    /// The file was read but did not parse as the expected type.
    #[error("failed to parse '{path}': {message}")]
    Parse {
        /// Path that failed.
        path: String,
        /// Parse error detail.
        message: String,
    },
    /// An asset referenced by id is missing from the catalog.
    #[error("missing asset '{0}'")]
    Missing(String),
    /// A map file described an inconsistent grid.
    #[error("invalid map '{path}': {message}")]
    InvalidMap {
        /// Path of the offending map.
        path: String,
        /// What is wrong with it.
        message: String,
    },
}

fn read_ron<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AssetError> {
    let content = fs::read_to_string(path).map_err(|e| AssetError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    ron::from_str(&content).map_err(|e| AssetError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// A tile map as authored on disk: one string per row, `.` open and
/// `#` wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFile {
    /// Map id.
    pub id: String,
    /// Tile edge length in world units.
    pub tile_size: i32,
    /// Rows of `.`/`#` characters, all the same length.
    pub rows: Vec<String>,
}

impl MapFile {
    /// Convert the authored grid into a [`BattleMap`].
    pub fn build(&self, path: &Path) -> Result<BattleMap, AssetError> {
        let height = self.rows.len() as u32;
        let width = self.rows.first().map_or(0, |r| r.chars().count()) as u32;
        if width == 0 || height == 0 {
            return Err(AssetError::InvalidMap {
                path: path.display().to_string(),
                message: "empty grid".into(),
            });
        }

        let mut map = BattleMap::new(
            self.id.clone(),
            width,
            height,
            Fixed::from_num(self.tile_size),
        );
        for (y, row) in self.rows.iter().enumerate() {
            if row.chars().count() as u32 != width {
                return Err(AssetError::InvalidMap {
                    path: path.display().to_string(),
                    message: format!("row {y} has inconsistent width"),
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '.' => TileType::Empty,
                    '#' => TileType::Wall,
                    other => {
                        return Err(AssetError::InvalidMap {
                            path: path.display().to_string(),
                            message: format!("unknown tile '{other}' at ({x}, {y})"),
                        });
                    }
                };
                map.set_tile(x as u32, y as u32, tile);
            }
        }
        Ok(map)
    }
}

/// A scripted battle setup: which map, who fights, and for how long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name, used in reports and replay labels.
    pub name: String,
    /// Map id, resolved against `maps/`.
    pub map: String,
    /// Roster ids of the players taking part.
    pub players: Vec<String>,
    /// Enemy spawns: template type id and integer world position.
    pub enemies: Vec<(String, (i32, i32))>,
    /// Frames to simulate.
    pub frames: u64,
}

/// Everything loaded from an asset directory.
#[derive(Debug)]
pub struct Assets {
    /// All skill definitions.
    pub skills: SkillBook,
    /// Player roster by roster id.
    pub roster: HashMap<String, PlayerData>,
    /// Enemy templates by type id.
    pub enemies: HashMap<String, EnemyTemplate>,
    /// Server settings.
    pub settings: Settings,
    root: PathBuf,
}

impl Assets {
    /// Load the fixed-name catalog files from an asset directory:
    /// `skills.ron`, `roster.ron`, `enemies.ron` and `settings.ron`.
    pub fn load(root: &Path) -> Result<Self, AssetError> {
        let skills: Vec<Skill> = read_ron(&root.join("skills.ron"))?;
        let roster: Vec<PlayerData> = read_ron(&root.join("roster.ron"))?;
        let enemies: Vec<EnemyTemplate> = read_ron(&root.join("enemies.ron"))?;
        let settings: Settings = read_ron(&root.join("settings.ron"))?;

        tracing::info!(
            skills = skills.len(),
            players = roster.len(),
            enemy_types = enemies.len(),
            "assets loaded"
        );

        Ok(Self {
            skills: SkillBook::new(skills),
            roster: roster.into_iter().map(|p| (p.id.clone(), p)).collect(),
            enemies: enemies.into_iter().map(|e| (e.type_id.clone(), e)).collect(),
            settings,
            root: root.to_path_buf(),
        })
    }

    /// Load a map by id from `maps/<id>.ron`.
    pub fn load_map(&self, id: &str) -> Result<BattleMap, AssetError> {
        let path = self.root.join("maps").join(format!("{id}.ron"));
        let file: MapFile = read_ron(&path)?;
        file.build(&path)
    }

    /// Load a scenario by name from `scenarios/<name>.ron`.
    pub fn load_scenario(&self, name: &str) -> Result<Scenario, AssetError> {
        read_ron(&self.root.join("scenarios").join(format!("{name}.ron")))
    }

    /// Look up a roster entry.
    pub fn player(&self, id: &str) -> Result<&PlayerData, AssetError> {
        self.roster
            .get(id)
            .ok_or_else(|| AssetError::Missing(format!("player '{id}'")))
    }

    /// Look up an enemy template.
    pub fn enemy(&self, type_id: &str) -> Result<&EnemyTemplate, AssetError> {
        self.enemies
            .get(type_id)
            .ok_or_else(|| AssetError::Missing(format!("enemy '{type_id}'")))
    }

    /// Build a [`BattleContext`] for a scenario's map.
    pub fn build_context(
        &self,
        map_id: &str,
        config: BattleConfig,
    ) -> Result<BattleContext, AssetError> {
        let map = self.load_map(map_id)?;
        Ok(BattleContext {
            config,
            skills: self.skills.clone(),
            planner: Box::new(GridPlanner::new(map.clone())),
            map,
        })
    }
}
