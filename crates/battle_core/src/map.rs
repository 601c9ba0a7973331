//! Battle map grid and the path-query capability consumed by the core.
//!
//! The simulation never pathfinds directly: it only asks a [`Planner`]
//! whether one point can reach another and what the path looks like.
//! How the planner is built (including any internal coordinate
//! conventions) is entirely the map collaborator's business.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Cell types for the battle grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    /// Open, walkable ground.
    #[default]
    Empty,
    /// Impassable wall.
    Wall,
}

impl TileType {
    /// Returns true if units can stand on this tile.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Static battle map: a fixed-size grid of tiles plus presentation data.
///
/// `image_url` and `tile_map_cols` are presentation-only and never read
/// by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleMap {
    /// Map identifier.
    pub id: String,
    /// Grid width in tiles.
    width: u32,
    /// Grid height in tiles.
    height: u32,
    /// Tile data stored in row-major order.
    tiles: Vec<TileType>,
    /// Size of each tile in world units.
    #[serde(with = "fixed_serde")]
    tile_size: Fixed,
    /// Columns in the client tileset image (presentation-only).
    pub tile_map_cols: u32,
    /// Client asset url for the rendered map (presentation-only).
    pub image_url: String,
}

impl BattleMap {
    /// Create a map with all tiles open.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero, or if `tile_size` is not
    /// positive.
    #[must_use]
    pub fn new(id: impl Into<String>, width: u32, height: u32, tile_size: Fixed) -> Self {
        assert!(width > 0, "BattleMap width must be positive");
        assert!(height > 0, "BattleMap height must be positive");
        assert!(tile_size > Fixed::ZERO, "BattleMap tile_size must be positive");

        let tile_count = (width as usize) * (height as usize);
        Self {
            id: id.into(),
            width,
            height,
            tiles: vec![TileType::Empty; tile_count],
            tile_size,
            tile_map_cols: 0,
            image_url: String::new(),
        }
    }

    /// Grid width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Tile size in world units.
    #[must_use]
    pub const fn tile_size(&self) -> Fixed {
        self.tile_size
    }

    #[inline]
    fn tile_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Check if tile coordinates are within bounds.
    #[must_use]
    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Get the tile at grid coordinates, `None` if out of bounds.
    #[must_use]
    pub fn tile(&self, x: u32, y: u32) -> Option<TileType> {
        if self.in_bounds(x, y) {
            Some(self.tiles[self.tile_index(x, y)])
        } else {
            None
        }
    }

    /// Set the tile at grid coordinates. Returns `false` if out of bounds.
    pub fn set_tile(&mut self, x: u32, y: u32, tile: TileType) -> bool {
        if self.in_bounds(x, y) {
            let index = self.tile_index(x, y);
            self.tiles[index] = tile;
            true
        } else {
            false
        }
    }

    /// Whether units can stand on the tile at grid coordinates.
    #[must_use]
    pub fn is_open(&self, x: u32, y: u32) -> bool {
        self.tile(x, y).is_some_and(|t| t.is_open())
    }

    /// Convert a world position to tile coordinates.
    ///
    /// Returns `None` for positions outside the grid.
    #[must_use]
    pub fn world_to_tile(&self, pos: Vec2Fixed) -> Option<(u32, u32)> {
        if pos.x < Fixed::ZERO || pos.y < Fixed::ZERO {
            return None;
        }

        let x = (pos.x / self.tile_size).to_num::<i64>();
        let y = (pos.y / self.tile_size).to_num::<i64>();

        if x >= 0 && x < i64::from(self.width) && y >= 0 && y < i64::from(self.height) {
            Some((x as u32, y as u32))
        } else {
            None
        }
    }

    /// Convert tile coordinates to a world position (center of the tile).
    #[must_use]
    pub fn tile_to_world(&self, x: u32, y: u32) -> Vec2Fixed {
        let half = self.tile_size / Fixed::from_num(2);
        Vec2Fixed::new(
            Fixed::from_num(x) * self.tile_size + half,
            Fixed::from_num(y) * self.tile_size + half,
        )
    }
}

/// A successful path query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPath {
    /// Path length in tile steps.
    pub cost: u32,
    /// Tile-center waypoints from start to goal, inclusive.
    pub waypoints: Vec<Vec2Fixed>,
}

impl PlannedPath {
    /// The waypoint reached after walking at most `budget` steps.
    ///
    /// `budget = 0` returns the start position.
    #[must_use]
    pub fn waypoint_at(&self, budget: u32) -> Vec2Fixed {
        let index = (budget as usize).min(self.waypoints.len().saturating_sub(1));
        self.waypoints[index]
    }
}

/// The opaque path-query capability consumed by the simulation.
///
/// Implementations must be deterministic and side-effect free; the core
/// treats `search` as a pure function. A `None` result means the goal is
/// unreachable (walled off, out of bounds, or standing on a wall).
pub trait Planner: Send + Sync {
    /// Find a path between two world positions.
    fn search(&self, from: Vec2Fixed, to: Vec2Fixed) -> Option<PlannedPath>;
}
