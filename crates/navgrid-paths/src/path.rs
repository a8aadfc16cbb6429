use std::ops::Index;

use navgrid_core::{Point, Vec2};

use crate::cost::step_cost;
use crate::grid::NavGrid;
use crate::node::NodeId;

/// One step of a [`Path`]: the node and the geometry consumers move along.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub id: NodeId,
    pub pos: Point,
    pub center: Vec2,
}

/// Ordered nodes from start to goal, both inclusive.
///
/// An empty path means the goal is unreachable; it is not an error.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    steps: Vec<Waypoint>,
    cost: i32,
}

impl Path {
    /// Build a path from consecutive node ids, summing step costs.
    pub(crate) fn from_ids<I>(grid: &NavGrid, ids: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut steps: Vec<Waypoint> = Vec::new();
        let mut cost = 0;
        for id in ids {
            let node = grid.node(id);
            if let Some(prev) = steps.last() {
                cost += step_cost(grid.node(prev.id), node);
            }
            steps.push(Waypoint {
                id,
                pos: node.pos(),
                center: node.center(),
            });
        }
        Self { steps, cost }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of nodes, including start and goal.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Sum of step costs along the path. Zero for empty and single-node paths.
    #[inline]
    pub fn cost(&self) -> i32 {
        self.cost
    }

    pub fn first(&self) -> Option<&Waypoint> {
        self.steps.first()
    }

    pub fn last(&self) -> Option<&Waypoint> {
        self.steps.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Waypoint> {
        self.steps.iter()
    }

    pub fn as_slice(&self) -> &[Waypoint] {
        &self.steps
    }

    /// Grid coordinates of each step.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.steps.iter().map(|w| w.pos)
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.steps.iter().map(|w| w.id)
    }

    /// World-space centers of each step, the positions an agent walks through.
    pub fn centers(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.steps.iter().map(|w| w.center)
    }

    pub fn into_vec(self) -> Vec<Waypoint> {
        self.steps
    }
}

impl Index<usize> for Path {
    type Output = Waypoint;

    #[track_caller]
    fn index(&self, index: usize) -> &Waypoint {
        &self.steps[index]
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Waypoint;
    type IntoIter = std::slice::Iter<'a, Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl IntoIterator for Path {
    type Item = Waypoint;
    type IntoIter = std::vec::IntoIter<Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}
