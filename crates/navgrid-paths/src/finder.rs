use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::cost::COST_INFINITY;
use crate::grid::NavGrid;
use crate::idastar::Frame;
use crate::node::NodeId;
use crate::path::Path;

// ---------------------------------------------------------------------------
// Per-search node state
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeState {
    /// Not touched by the current search.
    New,
    /// Best-first frontier.
    Open,
    /// Best-first finalized, or popped off the iterative-deepening stack.
    Closed,
    /// On the current iterative-deepening path.
    OnPath,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Scratch {
    pub(crate) g: i32,
    pub(crate) h: i32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) state: NodeState,
    generation: u32,
}

impl Scratch {
    #[inline]
    pub(crate) fn f(&self) -> i32 {
        self.g + self.h
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self {
            g: COST_INFINITY,
            h: COST_INFINITY,
            parent: None,
            state: NodeState::New,
            generation: 0,
        }
    }
}

/// Frontier entry, ordered so that `BinaryHeap` pops the smallest `f` first
/// and, among equal `f`, the earliest discovered.
#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) struct NodeRef {
    pub(crate) id: NodeId,
    pub(crate) f: i32,
    pub(crate) seq: u64,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.f.cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Configuration and reporting
// ---------------------------------------------------------------------------

/// Which search a [`PathFinder::find`] call runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// A*-style best-first search.
    #[cfg_attr(feature = "serde", serde(rename = "astar"))]
    BestFirst,
    /// IDA*-style iterative deepening.
    #[cfg_attr(feature = "serde", serde(rename = "idastar"))]
    IterativeDeepening,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::BestFirst, Algorithm::IterativeDeepening];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::BestFirst => "astar",
            Algorithm::IterativeDeepening => "idastar",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown search algorithm `{0}` (expected `astar` or `idastar`)")]
pub struct ParseAlgorithmError(String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "astar" | "a*" | "best-first" => Ok(Algorithm::BestFirst),
            "idastar" | "ida*" | "iterative-deepening" => Ok(Algorithm::IterativeDeepening),
            _ => Err(ParseAlgorithmError(s.to_string())),
        }
    }
}

/// Bounds on the work a single search may do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SearchLimits {
    /// Stop with an empty path after expanding this many nodes.
    pub max_expansions: Option<usize>,
}

impl SearchLimits {
    /// No bound.
    pub const fn unbounded() -> Self {
        Self {
            max_expansions: None,
        }
    }

    pub const fn with_max_expansions(max: usize) -> Self {
        Self {
            max_expansions: Some(max),
        }
    }

    #[inline]
    pub(crate) fn reached(&self, expanded: usize) -> bool {
        self.max_expansions.is_some_and(|max| expanded >= max)
    }
}

/// Counters from the most recent search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes expanded, summed over all iterations.
    pub expanded: usize,
    /// Deepening rounds; always 1 for best-first search.
    pub iterations: usize,
    /// Whether the search gave up because of [`SearchLimits`].
    pub limit_reached: bool,
}

// ---------------------------------------------------------------------------
// PathFinder
// ---------------------------------------------------------------------------

/// Reusable search context.
///
/// A `PathFinder` owns the per-node costs, predecessors, and frontier
/// membership of the searches it runs, so the [`NavGrid`] stays read-only and
/// can be searched by several finders at once. Scratch memory is reused
/// across calls and invalidated lazily with a generation counter, so repeated
/// queries allocate nothing after the first one on a given grid size.
#[derive(Debug, Clone, Default)]
pub struct PathFinder {
    scratch: Vec<Scratch>,
    generation: u32,
    limits: SearchLimits,
    stats: SearchStats,
    pub(crate) stack: Vec<NodeId>,
    pub(crate) frames: Vec<Frame>,
}

impl PathFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SearchLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: SearchLimits) {
        self.limits = limits;
    }

    /// Counters from the last search.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Run the chosen algorithm.
    pub fn find(
        &mut self,
        algorithm: Algorithm,
        grid: &NavGrid,
        start: NodeId,
        goal: NodeId,
    ) -> Path {
        match algorithm {
            Algorithm::BestFirst => self.astar_path(grid, start, goal),
            Algorithm::IterativeDeepening => self.ida_star_path(grid, start, goal),
        }
    }

    /// Best known cost from the start in the last search, or
    /// [`COST_INFINITY`] if the node was not reached.
    pub fn g_cost(&self, id: NodeId) -> i32 {
        self.scratch(id).g
    }

    /// Heuristic estimate to the goal recorded in the last search, or
    /// [`COST_INFINITY`] if the node was not reached.
    pub fn h_cost(&self, id: NodeId) -> i32 {
        self.scratch(id).h
    }

    /// `g_cost + h_cost`.
    pub fn f_cost(&self, id: NodeId) -> i32 {
        self.scratch(id).f()
    }

    /// Predecessor assigned by the last best-first search.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.scratch(id).parent
    }

    // -----------------------------------------------------------------------
    // Scratch helpers
    // -----------------------------------------------------------------------

    /// Start a new search on `grid`: invalidate all scratch state and reset
    /// counters. Returns false if either endpoint is not a node of `grid`.
    pub(crate) fn begin(&mut self, grid: &NavGrid, start: NodeId, goal: NodeId) -> bool {
        self.stats = SearchStats::default();
        self.stack.clear();
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: stale entries could now look current.
            self.scratch.fill(Scratch::default());
            self.generation = 1;
        }

        if !grid.contains_id(start) || !grid.contains_id(goal) {
            log::warn!(
                "search endpoints {start} -> {goal} are outside a grid of {} nodes",
                grid.len()
            );
            return false;
        }
        if self.scratch.len() < grid.len() {
            self.scratch.resize(grid.len(), Scratch::default());
        }
        true
    }

    #[inline]
    pub(crate) fn scratch(&self, id: NodeId) -> Scratch {
        match self.scratch.get(id.index()) {
            Some(s) if s.generation == self.generation => *s,
            _ => Scratch::default(),
        }
    }

    #[inline]
    pub(crate) fn scratch_mut(&mut self, id: NodeId) -> &mut Scratch {
        let generation = self.generation;
        let s = &mut self.scratch[id.index()];
        if s.generation != generation {
            *s = Scratch {
                generation,
                ..Scratch::default()
            };
        }
        s
    }

    #[inline]
    pub(crate) fn stats_mut(&mut self) -> &mut SearchStats {
        &mut self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridConfig;
    use navgrid_core::{Point, Vec2};
    use std::collections::BinaryHeap;

    fn open_grid(w: i32, h: i32) -> NavGrid {
        NavGrid::new(GridConfig::new(w, h), &|_: Vec2| false).unwrap()
    }

    #[test]
    fn heap_pops_lowest_f_then_earliest() {
        let mut heap = BinaryHeap::new();
        heap.push(NodeRef { id: NodeId(0), f: 20, seq: 0 });
        heap.push(NodeRef { id: NodeId(1), f: 10, seq: 2 });
        heap.push(NodeRef { id: NodeId(2), f: 10, seq: 1 });
        heap.push(NodeRef { id: NodeId(3), f: 5, seq: 3 });
        let order: Vec<_> = std::iter::from_fn(|| heap.pop()).map(|r| r.id.index()).collect();
        assert_eq!(order, vec![3, 2, 1, 0]);
    }

    #[test]
    fn scratch_starts_at_infinity() {
        let grid = open_grid(3, 3);
        let mut finder = PathFinder::new();
        let a = grid.id_at(Point::new(0, 0)).unwrap();
        assert!(finder.begin(&grid, a, a));
        let s = finder.scratch(a);
        assert_eq!(s.g, COST_INFINITY);
        assert_eq!(s.h, COST_INFINITY);
        assert_eq!(s.parent, None);
        assert_eq!(s.state, NodeState::New);
    }

    #[test]
    fn begin_invalidates_previous_search() {
        let grid = open_grid(3, 3);
        let mut finder = PathFinder::new();
        let a = grid.id_at(Point::new(1, 1)).unwrap();
        finder.begin(&grid, a, a);
        {
            let s = finder.scratch_mut(a);
            s.g = 7;
            s.state = NodeState::Closed;
        }
        assert_eq!(finder.g_cost(a), 7);
        finder.begin(&grid, a, a);
        assert_eq!(finder.g_cost(a), COST_INFINITY);
        assert_eq!(finder.scratch(a).state, NodeState::New);
    }

    #[test]
    fn generation_wrap_clears_scratch() {
        let grid = open_grid(2, 2);
        let mut finder = PathFinder::new();
        let a = grid.id_at(Point::new(0, 0)).unwrap();
        finder.begin(&grid, a, a);
        finder.scratch_mut(a).g = 3;
        finder.generation = u32::MAX;
        finder.scratch[a.index()].generation = 1;
        finder.begin(&grid, a, a);
        assert_eq!(finder.generation, 1);
        assert_eq!(finder.g_cost(a), COST_INFINITY);
    }

    #[test]
    fn foreign_ids_are_rejected() {
        let small = open_grid(2, 2);
        let big = open_grid(5, 5);
        let far = big.id_at(Point::new(4, 4)).unwrap();
        let near = small.id_at(Point::new(0, 0)).unwrap();
        let mut finder = PathFinder::new();
        assert!(!finder.begin(&small, near, far));
        assert!(finder.astar_path(&small, near, far).is_empty());
        assert!(finder.ida_star_path(&small, far, near).is_empty());
    }

    #[test]
    fn algorithm_names_parse() {
        assert_eq!("astar".parse::<Algorithm>(), Ok(Algorithm::BestFirst));
        assert_eq!("IDA*".parse::<Algorithm>(), Ok(Algorithm::IterativeDeepening));
        assert_eq!(Algorithm::IterativeDeepening.to_string(), "idastar");
        assert!("dijkstra".parse::<Algorithm>().is_err());
    }

    #[test]
    fn limits() {
        assert!(!SearchLimits::unbounded().reached(usize::MAX));
        let l = SearchLimits::with_max_expansions(3);
        assert!(!l.reached(2));
        assert!(l.reached(3));
    }
}
