//! Grid-graph world model and AI core for a survival game
//!
//! This crate provides:
//! - Procedural level generation (DFS mazes with braiding, BSP dungeons)
//! - A*/Dijkstra pathfinding over a tile graph
//! - Steering, flocking, and whisker obstacle avoidance
//! - A finite-state-machine driven agent manager built on hecs
//!
//! Rendering, asset loading, input, and UI live outside this crate: they
//! consume its outputs (a traversable grid, a computed path, a behavior
//! decision) and feed it elapsed time and target positions.

pub mod ai;
pub mod config;
pub mod mapgen;
pub mod nav;
pub mod world;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        AgentBody, AnimationKey, Avoidance, BehaviorConfig, BehaviorState, BehaviorStateMachine,
        Health, Horde, HordeEvent, Neighbor, StateUpdate, Steering, TargetState, WallProbe,
    };
    pub use crate::config::{ConfigError, GeneratorKind, LevelConfig};
    pub use crate::mapgen::{DungeonCarver, DungeonLayout, MazeCarver, Partition, Rect};
    pub use crate::nav::{Heuristic, Path, PriorityQueue, find_path, find_path_with};
    pub use crate::world::{GameMap, GridGraph, GridNode, TileKind};
    pub use glam::{Vec2, Vec3};
}
