//! Step costs and the distance estimate used by both searches.
//!
//! Costs are fixed-point integers scaled by 10: a straight step costs 10 and
//! a diagonal step 15 (≈ 10·√2).
//!
//! The estimate is the Manhattan distance between world positions. It is
//! only admissible for 4-directional movement; with diagonal steps and large
//! node sizes it can overestimate, in which case neither search is
//! guaranteed to return a minimal-cost path.

use navgrid_core::{Point, Vec2};

use crate::node::Node;

/// Cost of a step that keeps one coordinate.
pub const STRAIGHT_COST: i32 = 10;

/// Cost of a diagonal step.
pub const DIAGONAL_COST: i32 = 15;

/// Sentinel "infinite" cost. Half of `i32::MAX` so that `g + h` of two
/// sentinels cannot overflow.
pub const COST_INFINITY: i32 = i32::MAX / 2;

/// Cost of moving between two adjacent nodes.
#[inline]
pub fn step_cost(a: &Node, b: &Node) -> i32 {
    if a.id() == b.id() {
        0
    } else if a.x() == b.x() || a.y() == b.y() {
        STRAIGHT_COST
    } else {
        DIAGONAL_COST
    }
}

/// Floored Manhattan distance between two world positions.
#[inline]
pub fn heuristic(from: Vec2, to: Vec2) -> i32 {
    let d = from.manhattan_distance(to).floor();
    if d >= COST_INFINITY as f32 {
        COST_INFINITY
    } else {
        d as i32
    }
}

/// Manhattan (L1) distance between two cells.
#[inline]
pub fn manhattan(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
