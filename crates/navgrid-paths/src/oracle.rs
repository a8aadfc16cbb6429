//! Occupancy sampling: the only outside knowledge a grid needs.
//!
//! A [`NavGrid`](crate::NavGrid) asks an [`OccupancyOracle`] once per cell,
//! at the cell's center, whether the world is blocked there. Closures
//! `Fn(Vec2) -> bool` are oracles; [`OccupancyMap`] is a static raster that
//! can be built in code or parsed from ASCII art.

use navgrid_core::{Point, Range, Vec2};

use crate::error::MapError;
use crate::grid::GridConfig;

/// Answers whether a world-space point is occupied.
///
/// Implementations must be side-effect free; the grid calls this exactly
/// once per cell during construction.
pub trait OccupancyOracle {
    fn is_occupied(&self, point: Vec2) -> bool;
}

impl<F> OccupancyOracle for F
where
    F: Fn(Vec2) -> bool,
{
    #[inline]
    fn is_occupied(&self, point: Vec2) -> bool {
        self(point)
    }
}

/// A static occupancy raster.
///
/// Cell `(x, y)` covers the world square whose bottom-left corner is
/// `origin + (x, y) * cell_size`. World points outside the raster are free.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyMap {
    bounds: Range,
    cell_size: f32,
    origin: Vec2,
    cells: Vec<bool>,
    start: Option<Point>,
    goal: Option<Point>,
}

impl OccupancyMap {
    /// Character for an occupied cell.
    pub const WALL: char = '#';
    /// Characters for a free cell.
    pub const FLOOR: [char; 2] = ['.', ' '];
    /// Free cell marking the start.
    pub const START: char = 'S';
    /// Free cell marking the goal.
    pub const GOAL: char = 'G';

    /// Create an all-free raster. Negative sizes are treated as zero.
    pub fn new(width: i32, height: i32, cell_size: f32, origin: Vec2) -> Self {
        let bounds = Range::with_size(width.max(0), height.max(0));
        Self {
            bounds,
            cell_size,
            origin,
            cells: vec![false; bounds.len()],
            start: None,
            goal: None,
        }
    }

    /// Parse an ASCII picture of the map.
    ///
    /// `#` is occupied; `.` and space are free; `S` and `G` are free cells
    /// recorded as [`start`](Self::start) and [`goal`](Self::goal). The top
    /// line of text is the highest row, so the picture reads the same way the
    /// world is drawn with y up. Blank lines before and after the picture are
    /// ignored; every other line must have the same width.
    pub fn from_ascii(text: &str, cell_size: f32, origin: Vec2) -> Result<Self, MapError> {
        let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        let first = lines.iter().position(|l| !l.trim().is_empty());
        let last = lines.iter().rposition(|l| !l.trim().is_empty());
        let (Some(first), Some(last)) = (first, last) else {
            return Err(MapError::Empty);
        };
        let lines = &lines[first..=last];

        let width = lines[0].chars().count();
        let height = lines.len();
        let mut map = Self::new(width as i32, height as i32, cell_size, origin);

        for (line_no, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MapError::InconsistentWidth {
                    line: line_no + 1,
                    expected: width,
                    found,
                });
            }
            let y = (height - 1 - line_no) as i32;
            for (column, ch) in line.chars().enumerate() {
                let p = Point::new(column as i32, y);
                match ch {
                    Self::WALL => map.set_occupied(p, true),
                    Self::START => {
                        if map.start.replace(p).is_some() {
                            return Err(MapError::DuplicateMarker(ch));
                        }
                    }
                    Self::GOAL => {
                        if map.goal.replace(p).is_some() {
                            return Err(MapError::DuplicateMarker(ch));
                        }
                    }
                    c if Self::FLOOR.contains(&c) => {}
                    _ => {
                        return Err(MapError::InvalidChar {
                            ch,
                            line: line_no + 1,
                            column: column + 1,
                        });
                    }
                }
            }
        }
        Ok(map)
    }

    /// Raster width in cells.
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    /// Raster height in cells.
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// The cell rectangle covered by the raster.
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Side length of a raster cell in world units.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World position of the raster's bottom-left corner.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Cell marked `S`, if any.
    pub fn start(&self) -> Option<Point> {
        self.start
    }

    /// Cell marked `G`, if any.
    pub fn goal(&self) -> Option<Point> {
        self.goal
    }

    /// Mark a cell occupied or free. Does nothing if out of bounds.
    pub fn set_occupied(&mut self, p: Point, occupied: bool) {
        if let Some(i) = self.idx(p) {
            self.cells[i] = occupied;
        }
    }

    /// Whether a cell is occupied. Out-of-bounds cells are free.
    pub fn is_cell_occupied(&self, p: Point) -> bool {
        self.idx(p).is_some_and(|i| self.cells[i])
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Cell containing a world point, by floor division.
    pub fn cell_at_world(&self, point: Vec2) -> Point {
        let x = ((point.x - self.origin.x) / self.cell_size).floor();
        let y = ((point.y - self.origin.y) / self.cell_size).floor();
        Point::new(x as i32, y as i32)
    }

    /// A grid configuration that lays one node over each raster cell.
    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            width: self.width(),
            height: self.height(),
            node_size: self.cell_size,
            origin: self.origin,
        }
    }

    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        Some((p.y * self.bounds.width() + p.x) as usize)
    }
}

impl OccupancyOracle for OccupancyMap {
    fn is_occupied(&self, point: Vec2) -> bool {
        if !point.is_finite() {
            return false;
        }
        self.is_cell_occupied(self.cell_at_world(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = "
#####
#S..#
#.#G#
#####
";

    #[test]
    fn parse_flips_rows() {
        let map = OccupancyMap::from_ascii(ROOM, 1.0, Vec2::ZERO).unwrap();
        assert_eq!(map.width(), 5);
        assert_eq!(map.height(), 4);
        // Top text line is y = 3.
        assert_eq!(map.start(), Some(Point::new(1, 2)));
        assert_eq!(map.goal(), Some(Point::new(3, 1)));
        assert!(map.is_cell_occupied(Point::new(2, 1)));
        assert!(!map.is_cell_occupied(Point::new(2, 2)));
        assert_eq!(map.occupied_count(), 15);
    }

    #[test]
    fn parse_rejects_ragged_lines() {
        let err = OccupancyMap::from_ascii("...\n..\n", 1.0, Vec2::ZERO).unwrap_err();
        assert_eq!(
            err,
            MapError::InconsistentWidth {
                line: 2,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn parse_rejects_unknown_characters() {
        let err = OccupancyMap::from_ascii("..\n.x\n", 1.0, Vec2::ZERO).unwrap_err();
        assert_eq!(
            err,
            MapError::InvalidChar {
                ch: 'x',
                line: 2,
                column: 2
            }
        );
    }

    #[test]
    fn parse_rejects_empty_and_duplicates() {
        assert_eq!(
            OccupancyMap::from_ascii("\n  \n", 1.0, Vec2::ZERO),
            Err(MapError::Empty)
        );
        assert_eq!(
            OccupancyMap::from_ascii("S.S\n", 1.0, Vec2::ZERO),
            Err(MapError::DuplicateMarker('S'))
        );
    }

    #[test]
    fn oracle_samples_world_points() {
        let mut map = OccupancyMap::new(4, 4, 2.0, Vec2::new(-4.0, -4.0));
        map.set_occupied(Point::new(1, 2), true);
        // Cell (1, 2) spans x in [-2, 0), y in [0, 2).
        assert!(map.is_occupied(Vec2::new(-1.0, 1.0)));
        assert!(map.is_occupied(Vec2::new(-2.0, 0.0)));
        assert!(!map.is_occupied(Vec2::new(0.0, 1.0)));
        assert!(!map.is_occupied(Vec2::new(100.0, 100.0)));
        assert!(!map.is_occupied(Vec2::new(f32::NAN, 1.0)));
    }

    #[test]
    fn closures_are_oracles() {
        let left_half = |p: Vec2| p.x < 0.0;
        assert!(left_half.is_occupied(Vec2::new(-1.0, 0.0)));
        assert!(!left_half.is_occupied(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn grid_config_matches_raster() {
        let map = OccupancyMap::new(7, 3, 0.5, Vec2::new(1.0, 2.0));
        let cfg = map.grid_config();
        assert_eq!((cfg.width, cfg.height), (7, 3));
        assert_eq!(cfg.node_size, 0.5);
        assert_eq!(cfg.origin, Vec2::new(1.0, 2.0));
    }
}
