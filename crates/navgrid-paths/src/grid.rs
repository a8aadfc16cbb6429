//! The navigation grid: nodes sampled from an occupancy oracle, with
//! neighbor lists derived once at construction.

use navgrid_core::{Point, Range, Vec2};

use crate::error::{GridError, Result};
use crate::node::{Node, NodeId};
use crate::oracle::OccupancyOracle;

/// Geometry of a [`NavGrid`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct GridConfig {
    /// Number of nodes along x.
    pub width: i32,
    /// Number of nodes along y.
    pub height: i32,
    /// Side length of a node in world units.
    pub node_size: f32,
    /// World position of the grid's bottom-left corner.
    pub origin: Vec2,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            node_size: 1.0,
            origin: Vec2::ZERO,
        }
    }
}

impl GridConfig {
    /// A `width × height` grid of unit nodes at the world origin.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// The grid spanning the rectangle between two world-space corners.
    ///
    /// Each corner coordinate is snapped toward the world origin onto the
    /// `node_size` lattice, so a grid laid out around the origin covers whole
    /// cells on both sides of it. The corners may be given in any order.
    pub fn from_corners(a: Vec2, b: Vec2, node_size: f32) -> Result<Self> {
        if !node_size.is_finite() || node_size <= 0.0 {
            return Err(GridError::InvalidNodeSize(node_size));
        }
        for corner in [a, b] {
            if !corner.is_finite() {
                return Err(GridError::InvalidOrigin(corner));
            }
        }
        let snap = |v: f32| (v / node_size).trunc() as i32;
        let (x0, x1) = (snap(a.x.min(b.x)), snap(a.x.max(b.x)));
        let (y0, y1) = (snap(a.y.min(b.y)), snap(a.y.max(b.y)));
        let config = Self {
            width: x1 - x0,
            height: y1 - y0,
            node_size,
            origin: Vec2::new(x0 as f32, y0 as f32) * node_size,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_node_size(mut self, node_size: f32) -> Self {
        self.node_size = node_size;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Check that the configuration describes a non-empty grid.
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(GridError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.node_size.is_finite() || self.node_size <= 0.0 {
            return Err(GridError::InvalidNodeSize(self.node_size));
        }
        if !self.origin.is_finite() {
            return Err(GridError::InvalidOrigin(self.origin));
        }
        Ok(())
    }
}

/// A rectangular grid of [`Node`]s.
///
/// Topology (walls and neighbor lists) is fixed at construction, so a grid
/// can be shared by reference between any number of concurrent searches.
#[derive(Debug, Clone)]
pub struct NavGrid {
    config: GridConfig,
    bounds: Range,
    nodes: Vec<Node>,
    walls: usize,
}

impl NavGrid {
    /// Build a grid, sampling `oracle` at the center of every cell.
    ///
    /// A grid with no walls at all is legal but logged as a warning, since it
    /// usually means the oracle is not looking at the right world.
    pub fn new<O>(config: GridConfig, oracle: &O) -> Result<Self>
    where
        O: OccupancyOracle + ?Sized,
    {
        config.validate()?;
        let bounds = Range::with_size(config.width, config.height);

        let mut grid = Self {
            config,
            bounds,
            nodes: Vec::with_capacity(bounds.len()),
            walls: 0,
        };

        for p in bounds.iter() {
            let anchor = grid.node_position(p);
            let center = anchor + Vec2::splat(config.node_size / 2.0);
            let wall = oracle.is_occupied(center);
            if wall {
                grid.walls += 1;
            }
            let id = NodeId(grid.nodes.len());
            grid.nodes.push(Node::new(id, p, wall, anchor, config.node_size));
        }

        if grid.walls == 0 {
            log::warn!(
                "no walls detected in {}x{} grid; check the occupancy oracle",
                config.width,
                config.height
            );
        }

        let neighbors: Vec<Vec<NodeId>> = grid
            .nodes
            .iter()
            .map(|node| grid.derive_neighbors(node.pos))
            .collect();
        for (node, list) in grid.nodes.iter_mut().zip(neighbors) {
            node.neighbors = list;
        }

        log::debug!(
            "built {}x{} grid at {} (node size {}, {} walls)",
            config.width,
            config.height,
            config.origin,
            config.node_size,
            grid.walls
        );
        Ok(grid)
    }

    /// Build a grid from individual parameters.
    pub fn build<O>(
        width: i32,
        height: i32,
        node_size: f32,
        origin: Vec2,
        oracle: &O,
    ) -> Result<Self>
    where
        O: OccupancyOracle + ?Sized,
    {
        Self::new(
            GridConfig {
                width,
                height,
                node_size,
                origin,
            },
            oracle,
        )
    }

    /// Walkable nodes around `p`.
    ///
    /// A diagonal neighbor is dropped when both cells flanking the move,
    /// `(neighbor.x, p.y)` and `(p.x, neighbor.y)`, are walls.
    fn derive_neighbors(&self, p: Point) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(8);
        for n in p.neighbors_8() {
            let Some(id) = self.id_at(n) else {
                continue;
            };
            if self.nodes[id.0].wall {
                continue;
            }
            if p.is_diagonal_to(n)
                && self.is_wall_at(Point::new(n.x, p.y))
                && self.is_wall_at(Point::new(p.x, n.y))
            {
                continue;
            }
            out.push(id);
        }
        out
    }

    /// Out-of-bounds cells are not walls.
    #[inline]
    fn is_wall_at(&self, p: Point) -> bool {
        self.id_at(p).is_some_and(|id| self.nodes[id.0].wall)
    }

    pub fn config(&self) -> GridConfig {
        self.config
    }

    /// Number of nodes along x.
    pub fn width(&self) -> i32 {
        self.config.width
    }

    /// Number of nodes along y.
    pub fn height(&self) -> i32 {
        self.config.height
    }

    pub fn node_size(&self) -> f32 {
        self.config.node_size
    }

    /// World position of the grid's bottom-left corner.
    pub fn origin(&self) -> Vec2 {
        self.config.origin
    }

    /// Cell rectangle `[0, width) × [0, height)`.
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of wall nodes.
    pub fn wall_count(&self) -> usize {
        self.walls
    }

    /// Whether `id` belongs to a grid of this size.
    #[inline]
    pub fn contains_id(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// The node with the given id.
    ///
    /// # Panics
    ///
    /// If `id` did not come from a grid of this size.
    #[inline]
    #[track_caller]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Id of the node at grid coordinates `p`, or `None` if out of bounds.
    #[inline]
    pub fn id_at(&self, p: Point) -> Option<NodeId> {
        if !self.bounds.contains(p) {
            return None;
        }
        Some(NodeId((p.y * self.config.width + p.x) as usize))
    }

    /// Node at grid coordinates `p`, or `None` if out of bounds.
    #[inline]
    pub fn node_at(&self, p: Point) -> Option<&Node> {
        self.id_at(p).map(|id| &self.nodes[id.0])
    }

    #[inline]
    pub fn node_at_xy(&self, x: i32, y: i32) -> Option<&Node> {
        self.node_at(Point::new(x, y))
    }

    /// Node whose cell contains the world position, or `None` outside the grid.
    pub fn node_at_world(&self, position: Vec2) -> Option<&Node> {
        let x = ((position.x - self.config.origin.x) / self.config.node_size).floor();
        let y = ((position.y - self.config.origin.y) / self.config.node_size).floor();
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        self.node_at(Point::new(x as i32, y as i32))
    }

    /// World position of the bottom-left corner of cell `p`. Defined for
    /// out-of-bounds cells as well.
    #[inline]
    pub fn node_position(&self, p: Point) -> Vec2 {
        self.config.origin + Vec2::new(p.x as f32, p.y as f32) * self.config.node_size
    }

    /// All nodes in row-major order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> + '_ {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OccupancyMap;

    /// Records log output per thread so parallel tests do not see each other.
    mod capture {
        use std::cell::RefCell;
        use std::sync::Once;

        type Records = Vec<(log::Level, String)>;

        thread_local! {
            static RECORDS: RefCell<Records> = const { RefCell::new(Vec::new()) };
        }

        struct Capture;

        impl log::Log for Capture {
            fn enabled(&self, _: &log::Metadata<'_>) -> bool {
                true
            }

            fn log(&self, record: &log::Record<'_>) {
                RECORDS.with(|r| {
                    r.borrow_mut()
                        .push((record.level(), record.args().to_string()))
                });
            }

            fn flush(&self) {}
        }

        static LOGGER: Capture = Capture;
        static INIT: Once = Once::new();

        /// Run `f`, returning its result and what it logged on this thread.
        pub fn records<R>(f: impl FnOnce() -> R) -> (R, Records) {
            INIT.call_once(|| {
                let _ = log::set_logger(&LOGGER);
                log::set_max_level(log::LevelFilter::Trace);
            });
            RECORDS.with(|r| r.borrow_mut().clear());
            let out = f();
            (out, RECORDS.with(|r| r.take()))
        }
    }

    fn grid_from(picture: &str) -> NavGrid {
        let map = OccupancyMap::from_ascii(picture, 1.0, Vec2::ZERO).unwrap();
        NavGrid::new(map.grid_config(), &map).unwrap()
    }

    fn neighbor_points(grid: &NavGrid, x: i32, y: i32) -> Vec<Point> {
        let node = grid.node_at_xy(x, y).unwrap();
        node.neighbors().iter().map(|&id| grid.node(id).pos()).collect()
    }

    #[test]
    fn rejects_invalid_configuration() {
        let open = |_: Vec2| false;
        assert_eq!(
            NavGrid::new(GridConfig::new(0, 5), &open).unwrap_err(),
            GridError::InvalidDimensions {
                width: 0,
                height: 5
            }
        );
        assert!(matches!(
            NavGrid::new(GridConfig::new(5, -1), &open),
            Err(GridError::InvalidDimensions { .. })
        ));
        assert_eq!(
            NavGrid::new(GridConfig::new(2, 2).with_node_size(0.0), &open).unwrap_err(),
            GridError::InvalidNodeSize(0.0)
        );
        assert!(matches!(
            NavGrid::new(GridConfig::new(2, 2).with_node_size(f32::NAN), &open),
            Err(GridError::InvalidNodeSize(_))
        ));
        assert!(matches!(
            NavGrid::new(
                GridConfig::new(2, 2).with_origin(Vec2::new(f32::INFINITY, 0.0)),
                &open
            ),
            Err(GridError::InvalidOrigin(_))
        ));
    }

    #[test]
    fn corners_straddling_the_origin() {
        let a = Vec2::new(-2.5, -1.2);
        let b = Vec2::new(3.7, 2.0);
        let cfg = GridConfig::from_corners(a, b, 1.0).unwrap();
        assert_eq!((cfg.width, cfg.height), (5, 3));
        assert_eq!(cfg.origin, Vec2::new(-2.0, -1.0));
        assert_eq!(cfg.node_size, 1.0);
        assert_eq!(GridConfig::from_corners(b, a, 1.0).unwrap(), cfg);
    }

    #[test]
    fn corners_in_one_quadrant() {
        // First quadrant, half-size nodes.
        let cfg =
            GridConfig::from_corners(Vec2::new(6.0, 4.5), Vec2::new(2.5, 1.0), 0.5).unwrap();
        assert_eq!((cfg.width, cfg.height), (7, 7));
        assert_eq!(cfg.origin, Vec2::new(2.5, 1.0));

        // Third quadrant.
        let cfg =
            GridConfig::from_corners(Vec2::new(-6.0, -4.0), Vec2::new(-1.5, -0.5), 1.0).unwrap();
        assert_eq!((cfg.width, cfg.height), (5, 4));
        assert_eq!(cfg.origin, Vec2::new(-6.0, -4.0));

        // Second and first quadrants.
        let cfg = GridConfig::from_corners(Vec2::new(-3.0, 2.0), Vec2::new(2.0, 5.0), 1.0).unwrap();
        assert_eq!((cfg.width, cfg.height), (5, 3));
        assert_eq!(cfg.origin, Vec2::new(-3.0, 2.0));

        let grid = NavGrid::new(cfg, &|_: Vec2| false).unwrap();
        assert_eq!(grid.node_at_world(Vec2::new(-2.9, 2.1)).map(|n| n.pos()), Some(Point::new(0, 0)));
        assert_eq!(grid.node_at_world(Vec2::new(1.9, 4.9)).map(|n| n.pos()), Some(Point::new(4, 2)));
    }

    #[test]
    fn degenerate_corners_are_rejected() {
        let a = Vec2::new(0.2, 0.2);
        assert!(matches!(
            GridConfig::from_corners(a, Vec2::new(0.7, 5.0), 1.0),
            Err(GridError::InvalidDimensions { width: 0, .. })
        ));
        assert_eq!(
            GridConfig::from_corners(a, Vec2::new(4.0, 4.0), 0.0).unwrap_err(),
            GridError::InvalidNodeSize(0.0)
        );
        assert!(matches!(
            GridConfig::from_corners(a, Vec2::new(f32::NAN, 4.0), 1.0),
            Err(GridError::InvalidOrigin(_))
        ));
    }

    #[test]
    fn warns_when_no_walls_are_found() {
        let (grid, records) =
            capture::records(|| NavGrid::new(GridConfig::new(3, 2), &|_: Vec2| false));
        assert!(grid.is_ok());
        let warnings: Vec<_> = records
            .iter()
            .filter(|(level, _)| *level == log::Level::Warn)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].1.contains("no walls"));
    }

    #[test]
    fn silent_when_walls_exist() {
        let (grid, records) = capture::records(|| grid_from("#..\n"));
        assert_eq!(grid.wall_count(), 1);
        assert!(records.iter().all(|(level, _)| *level != log::Level::Warn));
        assert!(
            records
                .iter()
                .any(|(level, msg)| *level == log::Level::Debug && msg.contains("1 walls"))
        );
    }

    #[test]
    fn samples_oracle_at_cell_centers() {
        let cfg = GridConfig::new(3, 2)
            .with_node_size(2.0)
            .with_origin(Vec2::new(10.0, 20.0));
        let samples = std::cell::RefCell::new(Vec::new());
        let oracle = |p: Vec2| {
            samples.borrow_mut().push(p);
            false
        };
        let grid = NavGrid::new(cfg, &oracle).unwrap();
        let samples = samples.into_inner();
        assert_eq!(samples.len(), 6);
        assert_eq!(samples[0], Vec2::new(11.0, 21.0));
        assert_eq!(samples[5], Vec2::new(15.0, 23.0));
        assert_eq!(grid.wall_count(), 0);
        assert_eq!(grid.len(), 6);
    }

    #[test]
    fn node_geometry() {
        let grid = NavGrid::build(4, 4, 0.5, Vec2::new(-1.0, 2.0), &|_: Vec2| false).unwrap();
        let n = grid.node_at_xy(2, 3).unwrap();
        assert_eq!(n.pos(), Point::new(2, 3));
        assert_eq!(n.anchor(), Vec2::new(0.0, 3.5));
        assert_eq!(n.center(), Vec2::new(0.25, 3.75));
        assert_eq!(n.size(), 0.5);
        assert_eq!(grid.node(n.id()).pos(), n.pos());
    }

    #[test]
    fn out_of_bounds_lookups_are_absent() {
        let grid = NavGrid::new(GridConfig::new(3, 3), &|_: Vec2| false).unwrap();
        assert!(grid.node_at_xy(-1, 0).is_none());
        assert!(grid.node_at_xy(0, 3).is_none());
        assert!(grid.node_at_xy(3, 0).is_none());
        assert!(grid.node_at_world(Vec2::new(-0.1, 1.0)).is_none());
        assert!(grid.node_at_world(Vec2::new(1.0, 3.0)).is_none());
        assert!(grid.node_at_world(Vec2::new(f32::NAN, 1.0)).is_none());
        assert!(!grid.contains_id(NodeId(9)));
    }

    #[test]
    fn world_lookup_floors_by_node_size() {
        let grid = NavGrid::build(5, 5, 2.0, Vec2::new(-5.0, -5.0), &|_: Vec2| false).unwrap();
        let n = grid.node_at_world(Vec2::new(-5.0, -5.0)).unwrap();
        assert_eq!(n.pos(), Point::new(0, 0));
        let n = grid.node_at_world(Vec2::new(0.9, -1.1)).unwrap();
        assert_eq!(n.pos(), Point::new(2, 1));
        let n = grid.node_at_world(Vec2::new(4.99, 4.99)).unwrap();
        assert_eq!(n.pos(), Point::new(4, 4));
        assert!(grid.node_at_world(Vec2::new(5.0, 0.0)).is_none());
    }

    #[test]
    fn open_grid_neighbors() {
        let grid = grid_from("...\n...\n...\n");
        assert_eq!(neighbor_points(&grid, 1, 1).len(), 8);
        assert_eq!(neighbor_points(&grid, 0, 0).len(), 3);
        assert_eq!(neighbor_points(&grid, 1, 0).len(), 5);
    }

    #[test]
    fn walls_are_never_neighbors() {
        let grid = grid_from(
            "
.#.
...
#..
",
        );
        for node in grid.nodes() {
            for &id in node.neighbors() {
                assert!(grid.node(id).is_walkable());
                assert!(grid.bounds().contains(grid.node(id).pos()));
            }
        }
        let around_center = neighbor_points(&grid, 1, 1);
        assert_eq!(around_center.len(), 6);
        assert!(!around_center.contains(&Point::new(1, 2)));
        assert!(!around_center.contains(&Point::new(0, 0)));
    }

    #[test]
    fn diagonal_blocked_when_both_flanks_are_walls() {
        // Center (1, 1); diagonal (2, 2) is flanked by (2, 1) and (1, 2).
        let grid = grid_from(
            "
.#.
..#
...
",
        );
        let ns = neighbor_points(&grid, 1, 1);
        assert!(!ns.contains(&Point::new(2, 2)));
        assert!(ns.contains(&Point::new(0, 2)));
        assert!(ns.contains(&Point::new(2, 0)));
    }

    #[test]
    fn diagonal_allowed_with_one_open_flank() {
        let grid = grid_from(
            "
...
..#
...
",
        );
        let ns = neighbor_points(&grid, 1, 1);
        assert!(ns.contains(&Point::new(2, 2)));
        assert!(ns.contains(&Point::new(2, 0)));
        assert!(!ns.contains(&Point::new(2, 1)));
    }

    #[test]
    fn walls_get_neighbor_lists_too() {
        let grid = grid_from("...\n.#.\n...\n");
        let wall = grid.node_at_xy(1, 1).unwrap();
        assert!(wall.is_wall());
        assert_eq!(wall.neighbors().len(), 8);
        assert_eq!(grid.wall_count(), 1);
    }

    #[test]
    fn grid_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NavGrid>();
    }
}
