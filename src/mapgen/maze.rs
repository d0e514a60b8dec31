//! Randomized depth-first maze carving with optional braiding
//!
//! The DFS pass produces a perfect maze: a spanning tree over all cells with
//! exactly one simple path between any two of them. The braiding pass then
//! injects loops by reconnecting dead ends with a configurable probability.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::world::{GridGraph, TileKind};

/// Maze generation strategy for a grid graph
#[derive(Debug, Clone, Copy)]
pub struct MazeCarver {
    braid_probability: f64,
}

impl MazeCarver {
    /// Create a carver; `braid_probability` is clamped to [0, 1].
    /// 0 leaves the perfect maze untouched, 1 reconnects every dead end it can.
    #[must_use]
    pub fn new(braid_probability: f32) -> Self {
        Self {
            braid_probability: f64::from(braid_probability.clamp(0.0, 1.0)),
        }
    }

    /// Carve a maze over the whole graph, starting the traversal at `root`.
    ///
    /// Every cell is flipped to Ground (maze walls are the *absence* of edges
    /// between cells), then the randomized DFS wires up the spanning tree.
    /// Carving only ever adds edges.
    pub fn carve<R: Rng>(&self, graph: &mut GridGraph, root: usize, rng: &mut R) {
        if graph.is_empty() {
            return;
        }
        for id in 0..graph.len() {
            graph.set_kind(id, TileKind::Ground);
        }
        let mut visited = vec![false; graph.len()];
        Self::dfs(graph, root, &mut visited, rng);
        if self.braid_probability > 0.0 {
            self.braid(graph, rng);
        }
    }

    fn dfs<R: Rng>(graph: &mut GridGraph, node: usize, visited: &mut [bool], rng: &mut R) {
        visited[node] = true;

        let mut neighbors = graph.grid_neighbors(node);
        neighbors.shuffle(rng);

        for &next in &neighbors {
            if !visited[next] {
                graph.try_add_edge(node, next, 1.0);
                graph.try_add_edge(next, node, 1.0);
                Self::dfs(graph, next, visited, rng);
            }
        }
    }

    /// Reconnect dead ends (degree-1 nodes) to a random unconnected
    /// neighbour. A dead end already boxed in by existing edges and the
    /// border has no candidates and is skipped silently.
    fn braid<R: Rng>(&self, graph: &mut GridGraph, rng: &mut R) {
        let dead_ends: Vec<usize> = graph
            .nodes()
            .iter()
            .filter(|n| n.degree() == 1)
            .map(|n| n.id)
            .collect();

        for id in dead_ends {
            if !rng.gen_bool(self.braid_probability) {
                continue;
            }
            let candidates: Vec<usize> = graph
                .grid_neighbors(id)
                .into_iter()
                .filter(|&n| !graph.has_edge(id, n))
                .collect();
            if candidates.is_empty() {
                continue;
            }
            let pick = candidates[rng.gen_range(0..candidates.len())];
            graph.try_add_edge(id, pick, 1.0);
            graph.try_add_edge(pick, id, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn carved(cols: usize, rows: usize, braid: f32, seed: u64) -> GridGraph {
        let mut graph = GridGraph::new(cols, rows);
        let mut rng = StdRng::seed_from_u64(seed);
        MazeCarver::new(braid).carve(&mut graph, 0, &mut rng);
        graph
    }

    #[test]
    fn test_perfect_maze_is_spanning_tree() {
        // 10x10, fixed seed: exactly cells - 1 edges, far corner reachable
        let graph = carved(10, 10, 0.0, 1234);
        assert_eq!(graph.undirected_edge_count(), 99);
        assert_eq!(graph.reachable_from(0), 100);
        let far = graph.index_of(9, 9);
        assert!(graph.get(far).unwrap().degree() > 0);
    }

    #[test]
    fn test_full_connectivity_across_seeds() {
        for seed in 0..8 {
            let graph = carved(7, 9, 0.0, seed);
            assert_eq!(graph.reachable_from(0), 63);
            assert_eq!(graph.undirected_edge_count(), 62);
        }
    }

    #[test]
    fn test_braiding_never_removes_edges() {
        for seed in 0..8 {
            let base = carved(8, 8, 0.0, seed).undirected_edge_count();
            let braided = carved(8, 8, 1.0, seed).undirected_edge_count();
            assert!(braided >= base);
        }
    }

    #[test]
    fn test_full_braid_reduces_dead_ends() {
        let graph = carved(10, 10, 1.0, 99);
        let base = carved(10, 10, 0.0, 99);
        let dead = |g: &GridGraph| g.nodes().iter().filter(|n| n.degree() == 1).count();
        assert!(dead(&graph) < dead(&base));
    }

    #[test]
    fn test_edges_are_symmetric() {
        let graph = carved(6, 6, 0.5, 5);
        for node in graph.nodes() {
            for edge in &node.edges {
                assert!(graph.has_edge(edge.to, node.id));
            }
        }
    }

    #[test]
    fn test_single_cell_grid() {
        let graph = carved(1, 1, 1.0, 0);
        assert_eq!(graph.undirected_edge_count(), 0);
        assert_eq!(graph.reachable_from(0), 1);
    }
}
