//! Shortest-path search on occupancy-sampled grids.
//!
//! A [`NavGrid`] is built once from a [`GridConfig`] and an
//! [`OccupancyOracle`]: every cell is sampled at its center, walls are
//! recorded, and each node's walkable neighbors (8-directional, no cutting
//! across two walls at a corner) are derived up front. The grid is then
//! read-only and can be searched any number of times:
//!
//! - **Best-first** (A*-style) search ([`PathFinder::astar_path`],
//!   [`search_best_first`])
//! - **Iterative deepening** (IDA*-style) search ([`PathFinder::ida_star_path`],
//!   [`search_iterative_deepening`])
//!
//! Both return a [`Path`] from start to goal inclusive, empty when the goal
//! is unreachable. Steps cost 10 straight and 15 diagonal; see [`cost`] for
//! the distance estimate and its caveats.
//!
//! Per-search state lives in a [`PathFinder`], not in the grid, so separate
//! finders may search the same grid from different threads.
//!
//! ```
//! use navgrid_core::{Point, Vec2};
//! use navgrid_paths::{NavGrid, OccupancyMap, search_best_first};
//!
//! let map = OccupancyMap::from_ascii("S.#.\n..#.\n...G", 1.0, Vec2::ZERO).unwrap();
//! let grid = NavGrid::new(map.grid_config(), &map).unwrap();
//! let start = grid.id_at(map.start().unwrap()).unwrap();
//! let goal = grid.id_at(map.goal().unwrap()).unwrap();
//!
//! let path = search_best_first(start, goal, &grid);
//! assert_eq!(path.first().map(|w| w.pos), Some(Point::new(0, 2)));
//! assert_eq!(path.last().map(|w| w.pos), Some(Point::new(3, 0)));
//! ```

mod astar;
pub mod cost;
mod error;
mod finder;
mod grid;
mod idastar;
mod node;
mod oracle;
mod path;

pub use cost::{COST_INFINITY, DIAGONAL_COST, STRAIGHT_COST};
pub use error::{GridError, MapError, Result};
pub use finder::{Algorithm, ParseAlgorithmError, PathFinder, SearchLimits, SearchStats};
pub use grid::{GridConfig, NavGrid};
pub use node::{Node, NodeId};
pub use oracle::{OccupancyMap, OccupancyOracle};
pub use path::{Path, Waypoint};

/// Best-first search with a fresh [`PathFinder`].
///
/// Use a long-lived `PathFinder` instead when searching repeatedly.
pub fn search_best_first(start: NodeId, goal: NodeId, grid: &NavGrid) -> Path {
    PathFinder::new().astar_path(grid, start, goal)
}

/// Iterative-deepening search with a fresh [`PathFinder`].
pub fn search_iterative_deepening(start: NodeId, goal: NodeId, grid: &NavGrid) -> Path {
    PathFinder::new().ida_star_path(grid, start, goal)
}
