use std::collections::BinaryHeap;

use crate::PathFinder;
use crate::cost::{heuristic, step_cost};
use crate::finder::{NodeRef, NodeState};
use crate::grid::NavGrid;
use crate::node::NodeId;
use crate::path::Path;

impl PathFinder {
    /// Compute a minimal-cost path from `start` to `goal` with best-first
    /// (A*-style) search.
    ///
    /// Returns the full path including both endpoints, a single-node path if
    /// `start == goal`, or an empty path if the goal cannot be reached.
    /// Finalized nodes are reopened when a cheaper route to them turns up, so
    /// the result stays minimal even where the estimate is inconsistent.
    pub fn astar_path(&mut self, grid: &NavGrid, start: NodeId, goal: NodeId) -> Path {
        if !self.begin(grid, start, goal) {
            return Path::default();
        }
        self.stats_mut().iterations = 1;

        let goal_center = grid.node(goal).center();
        let limits = self.limits();

        let start_h = heuristic(grid.node(start).center(), goal_center);
        {
            let s = self.scratch_mut(start);
            s.g = 0;
            s.h = start_h;
            s.state = NodeState::Open;
        }

        let mut seq = 0u64;
        let mut open = BinaryHeap::new();
        open.push(NodeRef {
            id: start,
            f: start_h,
            seq,
        });

        let found = 'search: loop {
            let Some(current) = open.pop() else {
                break 'search false;
            };
            let ci = current.id;

            // Skip entries superseded by a cheaper push or already closed.
            let cs = self.scratch(ci);
            if cs.state != NodeState::Open || cs.f() != current.f {
                continue;
            }

            self.scratch_mut(ci).state = NodeState::Closed;
            self.stats_mut().expanded += 1;

            if ci == goal {
                break 'search true;
            }
            if limits.reached(self.stats().expanded) {
                self.stats_mut().limit_reached = true;
                break 'search false;
            }

            let node = grid.node(ci);
            for &ni in node.neighbors() {
                let next = grid.node(ni);
                let tentative = cs.g + step_cost(node, next);

                let n = self.scratch_mut(ni);
                let improves = match n.state {
                    NodeState::New => true,
                    // Closed nodes are reopened.
                    NodeState::Open | NodeState::Closed => tentative < n.g,
                    NodeState::OnPath => false,
                };
                if !improves {
                    continue;
                }

                n.g = tentative;
                n.h = heuristic(next.center(), goal_center);
                n.parent = Some(ci);
                n.state = NodeState::Open;

                seq += 1;
                open.push(NodeRef {
                    id: ni,
                    f: n.f(),
                    seq,
                });
            }
        };

        let path = if found {
            self.reconstruct(grid, goal)
        } else {
            Path::default()
        };

        let stats = self.stats();
        log::debug!(
            "astar {} -> {}: {} nodes, cost {}, {} expanded{}",
            grid.node(start),
            grid.node(goal),
            path.len(),
            path.cost(),
            stats.expanded,
            if stats.limit_reached { " (limit reached)" } else { "" }
        );
        path
    }

    /// Follow predecessor links back from `goal`.
    fn reconstruct(&self, grid: &NavGrid, goal: NodeId) -> Path {
        let mut ids = vec![goal];
        let mut ci = goal;
        while let Some(parent) = self.parent(ci) {
            ids.push(parent);
            ci = parent;
        }
        ids.reverse();
        Path::from_ids(grid, ids)
    }
}
