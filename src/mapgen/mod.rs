//! Procedural level generation
//!
//! Two independent strategies populate a grid graph's traversability and
//! edges: randomized-DFS maze carving with braiding, and BSP dungeon
//! carving with MST corridors. Both take an explicit random source so
//! generation is seedable and deterministic.

mod dungeon;
mod maze;

pub use dungeon::{DungeonCarver, DungeonLayout, Partition, Rect};
pub use maze::MazeCarver;
