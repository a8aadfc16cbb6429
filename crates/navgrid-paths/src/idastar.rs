use navgrid_core::Vec2;

use crate::PathFinder;
use crate::cost::{heuristic, step_cost};
use crate::finder::NodeState;
use crate::grid::NavGrid;
use crate::node::NodeId;
use crate::path::Path;

/// Outcome of one deepening round.
enum Round {
    /// The goal was reached; the finder's stack holds the path.
    Found,
    /// Smallest `f` that exceeded the threshold, or `None` if no branch was
    /// cut off and the start's region is exhausted.
    Exceeded(Option<i32>),
    /// The expansion limit was hit.
    Aborted,
}

/// Outcome of stepping onto one node.
enum Entry {
    Expanded,
    Exceeded(i32),
    Found,
    Aborted,
}

/// A node on the current depth-first path and how far through its
/// neighbor list the search has got.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Frame {
    id: NodeId,
    g: i32,
    cursor: usize,
    min: Option<i32>,
}

/// Fixed inputs of one deepening round.
struct Bound {
    goal: NodeId,
    goal_center: Vec2,
    threshold: i32,
}

#[inline]
fn lower(a: Option<i32>, b: Option<i32>) -> Option<i32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

impl PathFinder {
    /// Compute a path from `start` to `goal` with iterative-deepening
    /// (IDA*-style) search.
    ///
    /// Same contract as [`astar_path`](Self::astar_path). Memory use is
    /// proportional to the path length rather than to the explored area, at
    /// the price of re-walking the shallow part of the tree each round.
    ///
    /// A node already on the current path is never revisited, so a round
    /// ends once every simple path under the threshold is explored. When the
    /// goal is unreachable the search still terminates, but only after
    /// enumerating every simple path of the start's region; bound that work
    /// with [`SearchLimits`](crate::SearchLimits) on large grids.
    pub fn ida_star_path(&mut self, grid: &NavGrid, start: NodeId, goal: NodeId) -> Path {
        if !self.begin(grid, start, goal) {
            return Path::default();
        }

        let goal_center = grid.node(goal).center();
        let mut bound = Bound {
            goal,
            goal_center,
            threshold: heuristic(grid.node(start).center(), goal_center),
        };

        let mut frames = std::mem::take(&mut self.frames);
        let found = loop {
            self.stats_mut().iterations += 1;
            match self.deepen(grid, &bound, start, &mut frames) {
                Round::Found => break true,
                Round::Aborted => {
                    self.stats_mut().limit_reached = true;
                    break false;
                }
                Round::Exceeded(None) => break false,
                Round::Exceeded(Some(next)) => {
                    log::trace!("idastar threshold {} -> {}", bound.threshold, next);
                    bound.threshold = next;
                }
            }
        };
        frames.clear();
        self.frames = frames;

        let path = if found {
            Path::from_ids(grid, std::mem::take(&mut self.stack))
        } else {
            self.stack.clear();
            Path::default()
        };

        let stats = self.stats();
        log::debug!(
            "idastar {} -> {}: {} nodes, cost {}, {} expanded over {} rounds{}",
            grid.node(start),
            grid.node(goal),
            path.len(),
            path.cost(),
            stats.expanded,
            stats.iterations,
            if stats.limit_reached { " (limit reached)" } else { "" }
        );
        path
    }

    /// One depth-first round from `start`, driven by an explicit frame stack
    /// so path length is not limited by the thread stack.
    ///
    /// `self.stack` mirrors `frames` and keeps the goal on success, so it
    /// reads start to goal.
    fn deepen(
        &mut self,
        grid: &NavGrid,
        bound: &Bound,
        start: NodeId,
        frames: &mut Vec<Frame>,
    ) -> Round {
        frames.clear();
        match self.enter(grid, bound, start, 0) {
            Entry::Expanded => frames.push(Frame {
                id: start,
                g: 0,
                cursor: 0,
                min: None,
            }),
            Entry::Exceeded(f) => return Round::Exceeded(Some(f)),
            Entry::Found => return Round::Found,
            Entry::Aborted => return Round::Aborted,
        }

        while let Some(top) = frames.last_mut() {
            let node = grid.node(top.id);
            let Some(&ni) = node.neighbors().get(top.cursor) else {
                let done = *top;
                frames.pop();
                self.scratch_mut(done.id).state = NodeState::Closed;
                self.stack.pop();
                match frames.last_mut() {
                    Some(parent) => parent.min = lower(parent.min, done.min),
                    None => return Round::Exceeded(done.min),
                }
                continue;
            };
            top.cursor += 1;
            let g = top.g;

            let next = grid.node(ni);
            if next.is_wall() || self.scratch(ni).state == NodeState::OnPath {
                continue;
            }
            let ng = g + step_cost(node, next);
            match self.enter(grid, bound, ni, ng) {
                Entry::Expanded => frames.push(Frame {
                    id: ni,
                    g: ng,
                    cursor: 0,
                    min: None,
                }),
                Entry::Exceeded(f) => {
                    if let Some(top) = frames.last_mut() {
                        top.min = lower(top.min, Some(f));
                    }
                }
                Entry::Found => return Round::Found,
                Entry::Aborted => return Round::Aborted,
            }
        }
        Round::Exceeded(None)
    }

    /// Step onto `id`, reached with cost `g`. On [`Entry::Expanded`] the
    /// node is on the path and its neighbors are to be visited.
    fn enter(&mut self, grid: &NavGrid, bound: &Bound, id: NodeId, g: i32) -> Entry {
        let h = heuristic(grid.node(id).center(), bound.goal_center);
        let f = g.saturating_add(h);
        if f > bound.threshold {
            return Entry::Exceeded(f);
        }

        self.stack.push(id);
        if id == bound.goal {
            return Entry::Found;
        }
        if self.limits().reached(self.stats().expanded) {
            return Entry::Aborted;
        }

        let s = self.scratch_mut(id);
        s.g = g;
        s.h = h;
        s.state = NodeState::OnPath;
        self.stats_mut().expanded += 1;
        Entry::Expanded
    }
}
