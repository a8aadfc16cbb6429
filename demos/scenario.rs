//! TOML scenario files for the `gridpath` demo.

use std::fs;
use std::path::{Path, PathBuf};

use navgrid_core::{Point, Vec2};
use navgrid_paths::{Algorithm, GridError, MapError, NavGrid, NodeId, OccupancyMap, SearchLimits};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid scenario: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("map has no `{0}` marker")]
    MissingMarker(char),
}

/// Which searches to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmChoice {
    #[default]
    Astar,
    Idastar,
    Both,
}

const BOTH: &[Algorithm] = &Algorithm::ALL;

impl AlgorithmChoice {
    pub fn algorithms(self) -> &'static [Algorithm] {
        match self {
            AlgorithmChoice::Astar => &[Algorithm::BestFirst],
            AlgorithmChoice::Idastar => &[Algorithm::IterativeDeepening],
            AlgorithmChoice::Both => BOTH,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub algorithm: AlgorithmChoice,
    pub max_expansions: Option<usize>,
    pub grid: GridSection,
    pub map: MapSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GridSection {
    pub node_size: f32,
    pub origin: Vec2,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            node_size: 1.0,
            origin: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MapSection {
    pub text: String,
}

/// A scenario turned into something searchable.
#[derive(Debug)]
pub struct Prepared {
    pub grid: NavGrid,
    pub start: NodeId,
    pub goal: NodeId,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(text)?)
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_expansions: self.max_expansions,
        }
    }

    /// Parse the map, build the grid, and resolve the `S` and `G` markers.
    pub fn prepare(&self) -> Result<Prepared, ScenarioError> {
        let map = OccupancyMap::from_ascii(&self.map.text, self.grid.node_size, self.grid.origin)?;
        let grid = NavGrid::new(map.grid_config(), &map)?;
        let start = marker(&grid, map.start(), OccupancyMap::START)?;
        let goal = marker(&grid, map.goal(), OccupancyMap::GOAL)?;
        Ok(Prepared { grid, start, goal })
    }
}

fn marker(grid: &NavGrid, p: Option<Point>, c: char) -> Result<NodeId, ScenarioError> {
    p.and_then(|p| grid.id_at(p)).ok_or(ScenarioError::MissingMarker(c))
}

/// Draw the grid top row first, with `*` on each step of `path`.
pub fn render(grid: &NavGrid, path: &navgrid_paths::Path) -> String {
    let mut out = String::new();
    for y in (0..grid.height()).rev() {
        for x in 0..grid.width() {
            let p = Point::new(x, y);
            let on_path = path.points().any(|q| q == p);
            let c = match grid.node_at(p) {
                Some(n) if n.is_wall() => OccupancyMap::WALL,
                _ if path.first().is_some_and(|w| w.pos == p) => OccupancyMap::START,
                _ if path.last().is_some_and(|w| w.pos == p) => OccupancyMap::GOAL,
                _ if on_path => '*',
                _ => '.',
            };
            out.push(c);
        }
        out.push('\n');
    }
    out
}
