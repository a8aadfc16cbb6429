use std::fmt;

use navgrid_core::{Point, Vec2};

/// Index of a node inside the [`NavGrid`](crate::NavGrid) that created it.
///
/// Ids are row-major: `y * width + x`. They are only meaningful for the grid
/// they came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the grid's node array.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A grid cell.
///
/// Holds only static data fixed at grid construction. Costs and predecessors
/// produced by a search live in the [`PathFinder`](crate::PathFinder) that
/// ran it.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) pos: Point,
    pub(crate) wall: bool,
    pub(crate) anchor: Vec2,
    pub(crate) size: f32,
    pub(crate) neighbors: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, pos: Point, wall: bool, anchor: Vec2, size: f32) -> Self {
        Self {
            id,
            pos,
            wall,
            anchor,
            size,
            neighbors: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Grid coordinates.
    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.pos.y
    }

    /// Whether the occupancy oracle reported this cell as blocked.
    #[inline]
    pub fn is_wall(&self) -> bool {
        self.wall
    }

    #[inline]
    pub fn is_walkable(&self) -> bool {
        !self.wall
    }

    /// World position of the cell's bottom-left corner.
    #[inline]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Side length of the cell in world units.
    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// World position of the cell's center.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.anchor + Vec2::splat(self.size / 2.0)
    }

    /// Walkable adjacent nodes, at most eight. Never changes after the grid
    /// is built.
    #[inline]
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pos)
    }
}
