//! Graph pathfinding
//!
//! A binary min-heap priority queue with decrease-key support, and the
//! A*/Dijkstra search built on top of it.

mod pathfinder;
mod queue;

pub use pathfinder::{Heuristic, Path, find_path, find_path_with};
pub use queue::PriorityQueue;
