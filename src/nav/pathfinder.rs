//! A* path search over the grid graph
//!
//! Classic A* with a Manhattan heuristic in world units; swapping in the
//! zero heuristic degenerates to Dijkstra and must produce equal path costs
//! for the same inputs, which the tests use as an admissibility check.

use std::collections::VecDeque;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::nav::queue::PriorityQueue;
use crate::world::GameMap;

/// Cost-to-go estimate used to prioritize the open set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    /// Manhattan distance in world units: admissible and consistent on an
    /// orthogonal grid with no diagonal moves
    Manhattan,
    /// Always zero: plain Dijkstra
    Zero,
}

impl Heuristic {
    fn estimate(self, map: &GameMap, from: usize, goal: usize) -> f32 {
        match self {
            Heuristic::Manhattan => {
                let a = map.localize(from);
                let b = map.localize(goal);
                (a.x - b.x).abs() + (a.z - b.z).abs()
            }
            Heuristic::Zero => 0.0,
        }
    }
}

/// An ordered run of world waypoints from the node after the start through
/// the goal (the start tile itself is excluded)
///
/// Consumed front to back as waypoints are reached; recompute rather than
/// share between consumers.
#[derive(Debug, Clone)]
pub struct Path {
    waypoints: VecDeque<Vec3>,
}

impl Path {
    fn new(waypoints: Vec<Vec3>) -> Self {
        Self {
            waypoints: waypoints.into(),
        }
    }

    /// The waypoint currently being moved toward
    #[must_use]
    pub fn next_waypoint(&self) -> Option<Vec3> {
        self.waypoints.front().copied()
    }

    /// Pop the front waypoint once it has been reached
    pub fn advance(&mut self) -> Option<Vec3> {
        self.waypoints.pop_front()
    }

    /// Sum of the remaining segment lengths, in world units
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.waypoints
            .iter()
            .zip(self.waypoints.iter().skip(1))
            .map(|(a, b)| a.distance(*b))
            .sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Remaining waypoints, front first
    pub fn waypoints(&self) -> impl Iterator<Item = &Vec3> {
        self.waypoints.iter()
    }
}

/// Find a path between two world positions with the Manhattan heuristic
#[must_use]
pub fn find_path(map: &GameMap, from: Vec3, to: Vec3) -> Option<Path> {
    find_path_with(map, from, to, Heuristic::Manhattan)
}

/// Find a path between two world positions
///
/// Returns `None` when either endpoint quantizes to no traversable node or
/// the search exhausts the graph without reaching the goal. Unreachable is a
/// routine outcome, never an error.
#[must_use]
pub fn find_path_with(map: &GameMap, from: Vec3, to: Vec3, heuristic: Heuristic) -> Option<Path> {
    let start = map.quantize(from).filter(|n| n.is_traversable())?.id;
    let goal = map.quantize(to).filter(|n| n.is_traversable())?.id;

    let mut open = PriorityQueue::new();
    let mut came_from: FxHashMap<usize, usize> = FxHashMap::default();
    let mut g_score: FxHashMap<usize, f32> = FxHashMap::default();

    g_score.insert(start, 0.0);
    open.enqueue(start, heuristic.estimate(map, start, goal));

    while let Some(current) = open.dequeue() {
        if current == goal {
            return Some(reconstruct(map, &came_from, start, goal));
        }

        let current_g = g_score[&current];
        for edge in &map.graph().nodes()[current].edges {
            // edge costs are in tiles; scale into world units so the
            // heuristic never overestimates
            let tentative = current_g + edge.cost * map.tile_size;
            if tentative < *g_score.get(&edge.to).unwrap_or(&f32::INFINITY) {
                came_from.insert(edge.to, current);
                g_score.insert(edge.to, tentative);
                let priority = tentative + heuristic.estimate(map, edge.to, goal);
                if open.contains(edge.to) {
                    open.update_priority(edge.to, priority);
                } else {
                    open.enqueue(edge.to, priority);
                }
            }
        }
    }

    None
}

fn reconstruct(map: &GameMap, came_from: &FxHashMap<usize, usize>, start: usize, goal: usize) -> Path {
    let mut waypoints = Vec::new();
    let mut current = goal;
    while current != start {
        waypoints.push(map.localize(current));
        match came_from.get(&current) {
            Some(&previous) => current = previous,
            None => break,
        }
    }
    waypoints.reverse();
    Path::new(waypoints)
}
