//! **navgrid-core**: geometry primitives for navigation grids.
//!
//! Two coordinate spaces meet in a navigation grid: integer cell coordinates
//! ([`Point`], grouped into rectangles by [`Range`]) and continuous world
//! positions ([`Vec2`]). This crate provides both, with no knowledge of
//! walls, costs, or search.

pub mod geom;
pub mod world;

pub use geom::{Point, Range, RangeIter};
pub use world::Vec2;
