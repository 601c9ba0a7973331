//! Rectilinear grid pathfinding behind the [`Planner`] capability.
//!
//! A* over the battle grid with 4-directional movement and a Manhattan
//! heuristic, matching the rectilinear planner the client renders paths
//! for. All ordering is deterministic: ties in the open set are broken
//! by tile coordinates, never by insertion order.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::map::{BattleMap, PlannedPath, Planner};
use crate::math::Vec2Fixed;

/// Grid-backed [`Planner`] implementation.
///
/// Holds its own copy of the walkability data so the planner can be
/// shared read-only across battles independently of map mutations.
#[derive(Debug, Clone)]
pub struct GridPlanner {
    map: BattleMap,
}

impl GridPlanner {
    /// Build a planner over a snapshot of the given map.
    #[must_use]
    pub fn new(map: BattleMap) -> Self {
        Self { map }
    }
}

impl Planner for GridPlanner {
    fn search(&self, from: Vec2Fixed, to: Vec2Fixed) -> Option<PlannedPath> {
        let (start_x, start_y) = self.map.world_to_tile(from)?;
        let (goal_x, goal_y) = self.map.world_to_tile(to)?;

        if !self.map.is_open(start_x, start_y) || !self.map.is_open(goal_x, goal_y) {
            return None;
        }

        if start_x == goal_x && start_y == goal_y {
            return Some(PlannedPath {
                cost: 0,
                waypoints: vec![self.map.tile_to_world(start_x, start_y)],
            });
        }

        search_grid(&self.map, start_x, start_y, goal_x, goal_y)
    }
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct OpenNode {
    x: u32,
    y: u32,
    /// f = g + Manhattan heuristic.
    f_score: u32,
    /// Tie-breaker for determinism: lower coordinates first.
    tie_breaker: u64,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for min-heap behavior.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.tie_breaker.cmp(&self.tie_breaker),
            ord => ord,
        }
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cardinal neighbor offsets. No diagonals: the planner is rectilinear.
const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

#[inline]
fn manhattan(x1: u32, y1: u32, x2: u32, y2: u32) -> u32 {
    x1.abs_diff(x2) + y1.abs_diff(y2)
}

#[inline]
fn tie_breaker(x: u32, y: u32) -> u64 {
    (u64::from(y) << 32) | u64::from(x)
}

fn search_grid(
    map: &BattleMap,
    start_x: u32,
    start_y: u32,
    goal_x: u32,
    goal_y: u32,
) -> Option<PlannedPath> {
    let mut open_set: BinaryHeap<OpenNode> = BinaryHeap::new();
    let mut came_from: HashMap<(u32, u32), (u32, u32)> = HashMap::new();
    let mut g_score: HashMap<(u32, u32), u32> = HashMap::new();

    g_score.insert((start_x, start_y), 0);
    open_set.push(OpenNode {
        x: start_x,
        y: start_y,
        f_score: manhattan(start_x, start_y, goal_x, goal_y),
        tie_breaker: tie_breaker(start_x, start_y),
    });

    while let Some(current) = open_set.pop() {
        if current.x == goal_x && current.y == goal_y {
            return Some(reconstruct_path(map, &came_from, goal_x, goal_y));
        }

        let current_g = g_score
            .get(&(current.x, current.y))
            .copied()
            .unwrap_or(u32::MAX);

        for &(dx, dy) in &DIRECTIONS {
            let nx = current.x as i32 + dx;
            let ny = current.y as i32 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);

            if !map.is_open(nx, ny) {
                continue;
            }

            let tentative_g = current_g + 1;
            let neighbor_g = g_score.get(&(nx, ny)).copied().unwrap_or(u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert((nx, ny), (current.x, current.y));
                g_score.insert((nx, ny), tentative_g);
                open_set.push(OpenNode {
                    x: nx,
                    y: ny,
                    f_score: tentative_g + manhattan(nx, ny, goal_x, goal_y),
                    tie_breaker: tie_breaker(nx, ny),
                });
            }
        }
    }

    None
}

fn reconstruct_path(
    map: &BattleMap,
    came_from: &HashMap<(u32, u32), (u32, u32)>,
    goal_x: u32,
    goal_y: u32,
) -> PlannedPath {
    let mut tiles = vec![(goal_x, goal_y)];
    let mut current = (goal_x, goal_y);

    while let Some(&prev) = came_from.get(&current) {
        tiles.push(prev);
        current = prev;
    }

    tiles.reverse();

    PlannedPath {
        cost: (tiles.len() - 1) as u32,
        waypoints: tiles
            .into_iter()
            .map(|(x, y)| map.tile_to_world(x, y))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TileType;
    use crate::math::Fixed;

    fn fixed(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    fn open_map(width: u32, height: u32) -> BattleMap {
        BattleMap::new("test", width, height, fixed(1))
    }

    #[test]
    fn test_straight_path_cost() {
        let map = open_map(10, 10);
        let from = map.tile_to_world(0, 5);
        let to = map.tile_to_world(6, 5);
        let planner = GridPlanner::new(map);
        let path = planner.search(from, to).unwrap();
        assert_eq!(path.cost, 6);
        assert_eq!(path.waypoints.len(), 7);
    }

    #[test]
    fn test_path_routes_around_wall() {
        let mut map = open_map(10, 10);
        for y in 0..9 {
            map.set_tile(5, y, TileType::Wall);
        }
        let from = map.tile_to_world(2, 2);
        let to = map.tile_to_world(8, 2);
        let planner = GridPlanner::new(map.clone());

        let path = planner.search(from, to).unwrap();
        // Detour through row 9: longer than the straight 6 steps.
        assert!(path.cost > 6);
        for point in &path.waypoints {
            let (x, y) = map.world_to_tile(*point).unwrap();
            assert!(map.is_open(x, y), "path crosses wall at ({x}, {y})");
        }
    }

    #[test]
    fn test_unreachable_goal() {
        let mut map = open_map(10, 10);
        for y in 0..10 {
            map.set_tile(5, y, TileType::Wall);
        }
        let from = map.tile_to_world(2, 2);
        let to = map.tile_to_world(8, 2);
        let planner = GridPlanner::new(map);
        assert!(planner.search(from, to).is_none());
    }

    #[test]
    fn test_goal_on_wall_is_unreachable() {
        let mut map = open_map(5, 5);
        map.set_tile(3, 3, TileType::Wall);
        let from = map.tile_to_world(0, 0);
        let to = map.tile_to_world(3, 3);
        let planner = GridPlanner::new(map);
        assert!(planner.search(from, to).is_none());
    }

    #[test]
    fn test_same_tile_is_zero_cost() {
        let map = open_map(5, 5);
        let at = map.tile_to_world(2, 2);
        let planner = GridPlanner::new(map);
        let path = planner.search(at, at).unwrap();
        assert_eq!(path.cost, 0);
        assert_eq!(path.waypoints.len(), 1);
    }

    #[test]
    fn test_determinism() {
        let mut map = open_map(20, 20);
        for y in 5..15 {
            map.set_tile(10, y, TileType::Wall);
        }
        let from = map.tile_to_world(5, 10);
        let to = map.tile_to_world(15, 10);
        let planner = GridPlanner::new(map);

        let a = planner.search(from, to).unwrap();
        let b = planner.search(from, to).unwrap();
        let c = planner.search(from, to).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    proptest::proptest! {
        /// Repeated queries over randomly scattered walls must return
        /// identical paths, and successful paths never cross a wall.
        #[test]
        fn prop_search_is_deterministic_and_wall_free(
            walls in proptest::collection::vec((0u32..12, 0u32..12), 0..24),
            from in (0u32..12, 0u32..12),
            to in (0u32..12, 0u32..12),
        ) {
            let mut map = open_map(12, 12);
            for (x, y) in walls {
                map.set_tile(x, y, TileType::Wall);
            }
            let from = map.tile_to_world(from.0, from.1);
            let to = map.tile_to_world(to.0, to.1);
            let planner = GridPlanner::new(map.clone());

            let first = planner.search(from, to);
            let second = planner.search(from, to);
            proptest::prop_assert_eq!(&first, &second);

            if let Some(path) = first {
                for point in &path.waypoints {
                    let (x, y) = map.world_to_tile(*point).expect("waypoint in bounds");
                    proptest::prop_assert!(map.is_open(x, y));
                }
            }
        }
    }
}
