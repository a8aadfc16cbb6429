//! Error types for grid construction and occupancy map parsing.

use navgrid_core::Vec2;
use thiserror::Error;

/// Invalid grid configuration, reported by [`NavGrid::new`](crate::NavGrid::new).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Width or height is not positive.
    #[error("invalid grid dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: i32, height: i32 },

    /// Node size is zero, negative, or not finite.
    #[error("invalid node size {0}: must be finite and positive")]
    InvalidNodeSize(f32),

    /// Origin has a non-finite coordinate.
    #[error("invalid grid origin {0}: coordinates must be finite")]
    InvalidOrigin(Vec2),
}

/// Errors that can occur when parsing an ASCII occupancy map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The text contains no map lines.
    #[error("occupancy map is empty")]
    Empty,

    /// A line is wider or narrower than the first one.
    #[error("occupancy map line {line} has width {found}, expected {expected}")]
    InconsistentWidth {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A character outside the map alphabet.
    #[error("occupancy map contains invalid character '{ch}' at line {line}, column {column}")]
    InvalidChar { ch: char, line: usize, column: usize },

    /// `S` or `G` appears more than once.
    #[error("occupancy map marks more than one '{0}' cell")]
    DuplicateMarker(char),
}

/// Result type for grid construction.
pub type Result<T> = std::result::Result<T, GridError>;
