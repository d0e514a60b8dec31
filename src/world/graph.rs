//! Dense tile-graph world model
//!
//! Nodes live in a flat row-major arena and reference each other by index,
//! so the graph has no ownership cycles. Generation strategies flip tile
//! kinds and add edges; everything downstream reads the finished graph.

use std::collections::VecDeque;

use smallvec::SmallVec;

/// Traversability tag for a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    /// Walkable floor
    Ground,
    /// Solid wall
    Obstacle,
}

/// A weighted edge to another node, stored by index
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    /// Destination node index
    pub to: usize,
    /// Traversal cost, in tiles (>= 0)
    pub cost: f32,
}

/// A single grid cell
#[derive(Debug, Clone)]
pub struct GridNode {
    /// Row-major index into the graph's node array
    pub id: usize,
    /// Column
    pub i: usize,
    /// Row
    pub j: usize,
    /// Traversability tag
    pub kind: TileKind,
    /// Outgoing edges; 4-directional adjacency, so inline storage
    pub edges: SmallVec<[Edge; 4]>,
}

impl GridNode {
    /// Whether agents can stand on this node
    #[must_use]
    pub fn is_traversable(&self) -> bool {
        self.kind == TileKind::Ground
    }

    /// Whether this node has an edge to `other`
    #[must_use]
    pub fn has_edge(&self, other: usize) -> bool {
        self.edges.iter().any(|e| e.to == other)
    }

    /// Outgoing edge count
    #[must_use]
    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}

/// A grid graph of `cols * rows` nodes
///
/// The node count is fixed for the graph's lifetime: generators retype and
/// re-edge nodes but never add or remove them.
#[derive(Debug, Clone)]
pub struct GridGraph {
    /// Width in cells
    pub cols: usize,
    /// Height in cells
    pub rows: usize,
    nodes: Vec<GridNode>,
}

impl GridGraph {
    /// Create a graph where every node is an edge-less Obstacle
    #[must_use]
    pub fn new(cols: usize, rows: usize) -> Self {
        let mut nodes = Vec::with_capacity(cols * rows);
        for j in 0..rows {
            for i in 0..cols {
                nodes.push(GridNode {
                    id: j * cols + i,
                    i,
                    j,
                    kind: TileKind::Obstacle,
                    edges: SmallVec::new(),
                });
            }
        }
        Self { cols, rows, nodes }
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in row-major order
    #[must_use]
    pub fn nodes(&self) -> &[GridNode] {
        &self.nodes
    }

    /// Row-major index of cell (i, j)
    #[must_use]
    pub fn index_of(&self, i: usize, j: usize) -> usize {
        j * self.cols + i
    }

    /// Look up a node by linear index
    #[must_use]
    pub fn get(&self, id: usize) -> Option<&GridNode> {
        self.nodes.get(id)
    }

    /// Look up a node by grid coordinates; out-of-range is rejected, not wrapped
    #[must_use]
    pub fn node_at(&self, i: i32, j: i32) -> Option<&GridNode> {
        if i < 0 || j < 0 || i as usize >= self.cols || j as usize >= self.rows {
            return None;
        }
        self.nodes.get(self.index_of(i as usize, j as usize))
    }

    /// Retype a node
    pub fn set_kind(&mut self, id: usize, kind: TileKind) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.kind = kind;
        }
    }

    /// Add an edge from `a` to `b` if `b` is traversable
    ///
    /// Generators are responsible for calling this symmetrically. Negative
    /// costs are a precondition violation, not a runtime condition.
    pub fn try_add_edge(&mut self, a: usize, b: usize, cost: f32) {
        assert!(cost >= 0.0, "edge cost must be non-negative");
        if self.nodes[b].is_traversable() {
            self.nodes[a].edges.push(Edge { to: b, cost });
        }
    }

    /// Whether an edge a -> b exists
    #[must_use]
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.nodes.get(a).is_some_and(|n| n.has_edge(b))
    }

    /// Orthogonally adjacent node indices, independent of edges or tile kind
    #[must_use]
    pub fn grid_neighbors(&self, id: usize) -> SmallVec<[usize; 4]> {
        let node = &self.nodes[id];
        let mut out = SmallVec::new();
        if node.i > 0 {
            out.push(id - 1);
        }
        if node.i + 1 < self.cols {
            out.push(id + 1);
        }
        if node.j > 0 {
            out.push(id - self.cols);
        }
        if node.j + 1 < self.rows {
            out.push(id + self.cols);
        }
        out
    }

    /// Number of undirected edges (generators add directed pairs)
    #[must_use]
    pub fn undirected_edge_count(&self) -> usize {
        self.nodes.iter().map(GridNode::degree).sum::<usize>() / 2
    }

    /// Drop all edges and re-derive them from tile kinds: every pair of
    /// adjacent Ground tiles gets a bidirectional unit edge
    pub fn rebuild_edges(&mut self) {
        for node in &mut self.nodes {
            node.edges.clear();
        }
        for id in 0..self.nodes.len() {
            if !self.nodes[id].is_traversable() {
                continue;
            }
            for n in self.grid_neighbors(id) {
                self.try_add_edge(id, n, 1.0);
            }
        }
    }

    /// Number of nodes reachable from `root` by breadth-first edge traversal
    #[must_use]
    pub fn reachable_from(&self, root: usize) -> usize {
        if root >= self.nodes.len() {
            return 0;
        }
        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        visited[root] = true;
        queue.push_back(root);
        let mut count = 0;
        while let Some(id) = queue.pop_front() {
            count += 1;
            for edge in &self.nodes[id].edges {
                if !visited[edge.to] {
                    visited[edge.to] = true;
                    queue.push_back(edge.to);
                }
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_cardinality() {
        let graph = GridGraph::new(8, 5);
        assert_eq!(graph.len(), 40);
        assert!(graph.nodes().iter().all(|n| n.kind == TileKind::Obstacle));
        assert!(graph.nodes().iter().all(|n| n.edges.is_empty()));
    }

    #[test]
    fn test_row_major_ids() {
        let graph = GridGraph::new(4, 3);
        let node = graph.node_at(2, 1).unwrap();
        assert_eq!(node.id, 6);
        assert_eq!((node.i, node.j), (2, 1));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let graph = GridGraph::new(4, 3);
        assert!(graph.node_at(-1, 0).is_none());
        assert!(graph.node_at(4, 0).is_none());
        assert!(graph.node_at(0, 3).is_none());
    }

    #[test]
    fn test_try_add_edge_requires_traversable_target() {
        let mut graph = GridGraph::new(3, 1);
        graph.set_kind(0, TileKind::Ground);
        // node 1 is still an obstacle, so the edge is refused
        graph.try_add_edge(0, 1, 1.0);
        assert!(!graph.has_edge(0, 1));

        graph.set_kind(1, TileKind::Ground);
        graph.try_add_edge(0, 1, 1.0);
        graph.try_add_edge(1, 0, 1.0);
        assert!(graph.has_edge(0, 1));
        assert!(graph.has_edge(1, 0));
        assert_eq!(graph.undirected_edge_count(), 1);
    }

    #[test]
    #[should_panic]
    fn test_negative_cost_rejected() {
        let mut graph = GridGraph::new(2, 1);
        graph.set_kind(0, TileKind::Ground);
        graph.set_kind(1, TileKind::Ground);
        graph.try_add_edge(0, 1, -1.0);
    }

    #[test]
    fn test_rebuild_edges_is_symmetric() {
        let mut graph = GridGraph::new(3, 3);
        for id in [0, 1, 2, 4, 7] {
            graph.set_kind(id, TileKind::Ground);
        }
        graph.rebuild_edges();
        for node in graph.nodes() {
            for edge in &node.edges {
                assert!(graph.has_edge(edge.to, node.id));
            }
        }
        // obstacle tiles keep no edges in either direction
        assert_eq!(graph.get(3).unwrap().degree(), 0);
        assert!(!graph.has_edge(4, 3));
    }

    #[test]
    fn test_reachable_from_counts_component() {
        let mut graph = GridGraph::new(3, 1);
        for id in 0..3 {
            graph.set_kind(id, TileKind::Ground);
        }
        graph.try_add_edge(0, 1, 1.0);
        graph.try_add_edge(1, 0, 1.0);
        assert_eq!(graph.reachable_from(0), 2);
        assert_eq!(graph.reachable_from(2), 1);
    }
}
