//! World-space bridge over the grid graph
//!
//! `GameMap` owns a generated `GridGraph` and translates between world
//! positions and grid cells, answers the wall queries used by obstacle
//! avoidance, and resolves agent movement against solid tiles.

use glam::Vec3;
use rand::Rng;

use crate::mapgen::{DungeonCarver, MazeCarver};
use crate::world::graph::{GridGraph, GridNode, TileKind};

/// A generated level, centered on the world origin
#[derive(Debug, Clone)]
pub struct GameMap {
    graph: GridGraph,
    /// World units per tile
    pub tile_size: f32,
    /// Minimum world corner; the level is centered on the origin
    min: Vec3,
}

impl GameMap {
    /// Wrap an already generated graph
    #[must_use]
    pub fn from_graph(graph: GridGraph, tile_size: f32) -> Self {
        let min = Vec3::new(
            -(graph.cols as f32 * tile_size) / 2.0,
            0.0,
            -(graph.rows as f32 * tile_size) / 2.0,
        );
        Self {
            graph,
            tile_size,
            min,
        }
    }

    /// Generate a braided maze level
    pub fn generate_maze<R: Rng>(
        cols: usize,
        rows: usize,
        tile_size: f32,
        braid_probability: f32,
        rng: &mut R,
    ) -> Self {
        let mut graph = GridGraph::new(cols, rows);
        MazeCarver::new(braid_probability).carve(&mut graph, 0, rng);
        log::info!(
            "generated {cols}x{rows} maze: {} edges, braid probability {braid_probability}",
            graph.undirected_edge_count()
        );
        Self::from_graph(graph, tile_size)
    }

    /// Generate a BSP dungeon level
    pub fn generate_dungeon<R: Rng>(
        cols: usize,
        rows: usize,
        tile_size: f32,
        min_room_size: usize,
        rng: &mut R,
    ) -> Self {
        let mut graph = GridGraph::new(cols, rows);
        let layout = DungeonCarver::new(min_room_size).carve(&mut graph, rng);
        log::info!(
            "generated {cols}x{rows} dungeon: {} rooms, {} corridors",
            layout.rooms.len(),
            layout.connections.len()
        );
        Self::from_graph(graph, tile_size)
    }

    /// The underlying graph (read-only after generation)
    #[must_use]
    pub fn graph(&self) -> &GridGraph {
        &self.graph
    }

    /// Retype one tile and re-derive every edge from the new tile kinds.
    /// Returns false if (i, j) is out of range.
    pub fn set_tile_kind(&mut self, i: i32, j: i32, kind: TileKind) -> bool {
        let Some(id) = self.graph.node_at(i, j).map(|n| n.id) else {
            return false;
        };
        self.graph.set_kind(id, kind);
        self.graph.rebuild_edges();
        true
    }

    /// World position of a node's tile center, on the ground plane
    #[must_use]
    pub fn localize(&self, id: usize) -> Vec3 {
        let node = &self.graph.nodes()[id];
        self.cell_center(node.i as i64, node.j as i64)
    }

    fn cell_center(&self, i: i64, j: i64) -> Vec3 {
        Vec3::new(
            self.min.x + (i as f32 * self.tile_size) + self.tile_size / 2.0,
            0.0,
            self.min.z + (j as f32 * self.tile_size) + self.tile_size / 2.0,
        )
    }

    /// Map a world position to the node whose tile contains it
    #[must_use]
    pub fn quantize(&self, position: Vec3) -> Option<&GridNode> {
        let i = ((position.x - self.min.x) / self.tile_size).floor();
        let j = ((position.z - self.min.z) / self.tile_size).floor();
        self.graph.node_at(i as i32, j as i32)
    }

    /// Whether the world position (x, z) is solid: an obstacle tile or
    /// anywhere outside the level bounds
    #[must_use]
    pub fn is_wall(&self, x: f32, z: f32) -> bool {
        match self.quantize(Vec3::new(x, 0.0, z)) {
            Some(node) => !node.is_traversable(),
            None => true,
        }
    }

    /// Tile centers of every wall face adjacent to `id`: orthogonal
    /// neighbours with no connecting edge, including the virtual cells just
    /// outside the level border
    #[must_use]
    pub fn wall_positions(&self, id: usize) -> Vec<Vec3> {
        let node = &self.graph.nodes()[id];
        let (i, j) = (node.i as i64, node.j as i64);
        let mut walls = Vec::new();
        for (di, dj) in [(-1i64, 0i64), (1, 0), (0, -1), (0, 1)] {
            let (ni, nj) = (i + di, j + dj);
            match self.graph.node_at(ni as i32, nj as i32) {
                Some(neighbor) if node.has_edge(neighbor.id) => {}
                _ => walls.push(self.cell_center(ni, nj)),
            }
        }
        walls
    }

    /// Slab test of a ray against a tile-sized AABB footprint on the ground
    /// plane. `direction` must be normalized; hits past `max_distance` are
    /// ignored.
    #[must_use]
    pub fn ray_intersects_box(
        origin: Vec3,
        direction: Vec3,
        box_min: Vec3,
        box_max: Vec3,
        max_distance: f32,
    ) -> bool {
        let mut t_min = 0.0f32;
        let mut t_max = max_distance;
        let axes = [
            (origin.x, direction.x, box_min.x, box_max.x),
            (origin.z, direction.z, box_min.z, box_max.z),
        ];
        for (o, d, lo, hi) in axes {
            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return false;
                }
            } else {
                let inv = 1.0 / d;
                let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min > t_max {
                    return false;
                }
            }
        }
        true
    }

    /// Wall-probe query consumed by whisker avoidance: does a ray from
    /// `position` along `direction` hit a wall face within `max_distance`?
    #[must_use]
    pub fn is_wall_nearby(&self, position: Vec3, direction: Vec3, max_distance: f32) -> bool {
        let Some(node) = self.quantize(position) else {
            return true;
        };
        let dir = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        if dir == Vec3::ZERO {
            return false;
        }
        let half = self.tile_size / 2.0;
        self.wall_positions(node.id).into_iter().any(|center| {
            let box_min = Vec3::new(center.x - half, 0.0, center.z - half);
            let box_max = Vec3::new(center.x + half, self.tile_size, center.z + half);
            Self::ray_intersects_box(position, dir, box_min, box_max, max_distance)
        })
    }

    /// Advance a position by `velocity * dt`, refusing to step into walls.
    /// When the full step is blocked, the x-only and z-only components are
    /// tried in turn so agents slide along walls instead of sticking.
    #[must_use]
    pub fn resolve_move(&self, position: Vec3, velocity: Vec3, dt: f32) -> Vec3 {
        let next = position + velocity * dt;
        if !self.is_wall(next.x, next.z) {
            return next;
        }
        let x_only = Vec3::new(position.x + velocity.x * dt, position.y, position.z);
        if !self.is_wall(x_only.x, x_only.z) {
            return x_only;
        }
        let z_only = Vec3::new(position.x, position.y, position.z + velocity.z * dt);
        if !self.is_wall(z_only.x, z_only.z) {
            return z_only;
        }
        position
    }

    /// Render the level as text: one cell per tile plus wall rows between
    /// them, walls being missing edges. Debug aid for the headless demo.
    #[must_use]
    pub fn ascii(&self) -> String {
        let (cols, rows) = (self.graph.cols, self.graph.rows);
        let width = cols * 2 + 1;
        let height = rows * 2 + 1;
        let mut canvas = vec![vec!['#'; width]; height];
        for node in self.graph.nodes() {
            let (cx, cy) = (node.i * 2 + 1, node.j * 2 + 1);
            canvas[cy][cx] = if node.is_traversable() { '.' } else { '#' };
            if node.i + 1 < cols && node.has_edge(node.id + 1) {
                canvas[cy][cx + 1] = '.';
            }
            if node.j + 1 < rows && node.has_edge(node.id + cols) {
                canvas[cy + 1][cx] = '.';
            }
        }
        let mut out = String::with_capacity(height * (width + 1));
        for row in canvas {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}
