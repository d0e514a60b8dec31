//! BSP dungeon carving
//!
//! Three phases: recursively partition the grid rectangle, carve one room
//! per leaf, then connect room centers with L-shaped corridors along a
//! minimum spanning tree and re-derive the graph's edges from the tiles.

use rand::Rng;

use crate::world::{GridGraph, TileKind};

/// An axis-aligned rectangle in grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    #[must_use]
    pub fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }

    /// Floored center cell
    #[must_use]
    pub fn center(&self) -> (usize, usize) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    #[must_use]
    pub fn area(&self) -> usize {
        self.w * self.h
    }

    /// Whether the cell (i, j) lies inside this rectangle
    #[must_use]
    pub fn contains(&self, i: usize, j: usize) -> bool {
        i >= self.x && i < self.x + self.w && j >= self.y && j < self.y + self.h
    }
}

/// A node in the binary space partition tree
///
/// A non-leaf's children split its rectangle along one axis: they are
/// disjoint and their union is exactly the parent rectangle.
#[derive(Debug)]
pub struct Partition {
    pub rect: Rect,
    left: Option<Box<Partition>>,
    right: Option<Box<Partition>>,
}

impl Partition {
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            left: None,
            right: None,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Recursively split until neither axis can keep both children at
    /// `min_size`. When only one axis is splittable it is preferred,
    /// otherwise the axis is a coin flip.
    pub fn split<R: Rng>(&mut self, min_size: usize, rng: &mut R) {
        let can_split_h = self.rect.h >= min_size * 2;
        let can_split_v = self.rect.w >= min_size * 2;
        if !can_split_h && !can_split_v {
            return;
        }

        let split_h = can_split_h && (!can_split_v || rng.gen_bool(0.5));
        let Rect { x, y, w, h } = self.rect;

        if split_h {
            let at = rng.gen_range(min_size..=h - min_size);
            self.left = Some(Box::new(Partition::new(Rect::new(x, y, w, at))));
            self.right = Some(Box::new(Partition::new(Rect::new(x, y + at, w, h - at))));
        } else {
            let at = rng.gen_range(min_size..=w - min_size);
            self.left = Some(Box::new(Partition::new(Rect::new(x, y, at, h))));
            self.right = Some(Box::new(Partition::new(Rect::new(x + at, y, w - at, h))));
        }

        if let Some(left) = self.left.as_mut() {
            left.split(min_size, rng);
        }
        if let Some(right) = self.right.as_mut() {
            right.split(min_size, rng);
        }
    }

    /// All leaf partitions under (and including) this node
    #[must_use]
    pub fn leaves(&self) -> Vec<&Partition> {
        if self.is_leaf() {
            return vec![self];
        }
        let mut out = Vec::new();
        if let Some(left) = &self.left {
            out.extend(left.leaves());
        }
        if let Some(right) = &self.right {
            out.extend(right.leaves());
        }
        out
    }
}

/// Rooms carved and corridor connections recorded by a dungeon pass.
/// Connections are index pairs into `rooms` and form a spanning tree:
/// `rooms.len() - 1` entries, no cycles. A single-room dungeon (grid too
/// small to split) legitimately has zero connections.
#[derive(Debug, Clone)]
pub struct DungeonLayout {
    pub rooms: Vec<Rect>,
    pub connections: Vec<(usize, usize)>,
}

/// Dungeon generation strategy for a grid graph
#[derive(Debug, Clone, Copy)]
pub struct DungeonCarver {
    min_room_size: usize,
    min_partition_size: usize,
}

impl DungeonCarver {
    /// Partitions must fit a room plus a one-tile margin, hence twice the
    /// room minimum.
    #[must_use]
    pub fn new(min_room_size: usize) -> Self {
        let min_room_size = min_room_size.max(1);
        Self {
            min_room_size,
            min_partition_size: min_room_size * 2,
        }
    }

    /// Carve rooms and corridors into `graph` and return the layout
    pub fn carve<R: Rng>(&self, graph: &mut GridGraph, rng: &mut R) -> DungeonLayout {
        let mut root = Partition::new(Rect::new(0, 0, graph.cols, graph.rows));
        root.split(self.min_partition_size, rng);

        let mut rooms = Vec::new();
        for leaf in root.leaves() {
            let room = self.place_room(&leaf.rect, rng);
            for i in room.x..room.x + room.w {
                for j in room.y..room.y + room.h {
                    let id = graph.index_of(i, j);
                    graph.set_kind(id, TileKind::Ground);
                }
            }
            rooms.push(room);
        }

        let connections = Self::connect(&rooms);
        for &(a, b) in &connections {
            Self::carve_corridor(graph, rooms[a].center(), rooms[b].center(), rng);
        }

        graph.rebuild_edges();
        DungeonLayout { rooms, connections }
    }

    /// One room per leaf: extents in [min_room_size, leaf extent - 2],
    /// offset at least one tile from every leaf edge. Leaves too small to
    /// honor the bounds degrade to the largest room that still fits.
    fn place_room<R: Rng>(&self, leaf: &Rect, rng: &mut R) -> Rect {
        let w = self.room_extent(leaf.w, rng);
        let h = self.room_extent(leaf.h, rng);
        let x = rand_in(leaf.x + 1, (leaf.x + leaf.w).saturating_sub(w + 1), rng)
            .min(leaf.x + leaf.w - w);
        let y = rand_in(leaf.y + 1, (leaf.y + leaf.h).saturating_sub(h + 1), rng)
            .min(leaf.y + leaf.h - h);
        Rect::new(x, y, w, h)
    }

    fn room_extent<R: Rng>(&self, leaf_extent: usize, rng: &mut R) -> usize {
        let hi = leaf_extent.saturating_sub(2).max(1).min(leaf_extent);
        let lo = self.min_room_size.min(hi);
        rand_in(lo, hi, rng)
    }

    /// Prim-style minimum spanning tree over room centers by Manhattan
    /// distance. O(n^2) over the room count, which stays small.
    fn connect(rooms: &[Rect]) -> Vec<(usize, usize)> {
        if rooms.len() < 2 {
            return Vec::new();
        }

        let mut connected = vec![0usize];
        let mut remaining: Vec<usize> = (1..rooms.len()).collect();
        let mut connections = Vec::with_capacity(rooms.len() - 1);

        while !remaining.is_empty() {
            let mut best = usize::MAX;
            let mut from = 0;
            let mut pick = 0;
            for &a in &connected {
                for (idx, &b) in remaining.iter().enumerate() {
                    let d = manhattan(rooms[a].center(), rooms[b].center());
                    if d < best {
                        best = d;
                        from = a;
                        pick = idx;
                    }
                }
            }
            let to = remaining.remove(pick);
            connected.push(to);
            connections.push((from, to));
        }
        connections
    }

    /// L-shaped corridor between two centers; leg order is a coin flip
    fn carve_corridor<R: Rng>(
        graph: &mut GridGraph,
        a: (usize, usize),
        b: (usize, usize),
        rng: &mut R,
    ) {
        if rng.gen_bool(0.5) {
            Self::carve_horizontal(graph, a.0, b.0, a.1);
            Self::carve_vertical(graph, a.1, b.1, b.0);
        } else {
            Self::carve_vertical(graph, a.1, b.1, a.0);
            Self::carve_horizontal(graph, a.0, b.0, b.1);
        }
    }

    fn carve_horizontal(graph: &mut GridGraph, x1: usize, x2: usize, y: usize) {
        for x in x1.min(x2)..=x1.max(x2) {
            let id = graph.index_of(x, y);
            graph.set_kind(id, TileKind::Ground);
        }
    }

    fn carve_vertical(graph: &mut GridGraph, y1: usize, y2: usize, x: usize) {
        for y in y1.min(y2)..=y1.max(y2) {
            let id = graph.index_of(x, y);
            graph.set_kind(id, TileKind::Ground);
        }
    }
}

fn manhattan(a: (usize, usize), b: (usize, usize)) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

fn rand_in<R: Rng>(lo: usize, hi: usize, rng: &mut R) -> usize {
    if lo >= hi { lo } else { rng.gen_range(lo..=hi) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct UnionFind(Vec<usize>);

    impl UnionFind {
        fn new(n: usize) -> Self {
            Self((0..n).collect())
        }

        fn find(&mut self, a: usize) -> usize {
            let parent = self.0[a];
            if parent != a {
                let root = self.find(parent);
                self.0[a] = root;
            }
            self.0[a]
        }

        /// Returns false if a and b were already joined
        fn union(&mut self, a: usize, b: usize) -> bool {
            let (ra, rb) = (self.find(a), self.find(b));
            self.0[ra] = rb;
            ra != rb
        }
    }

    #[test]
    fn test_leaves_tile_the_root_exactly() {
        for seed in 0..6 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut root = Partition::new(Rect::new(0, 0, 40, 30));
            root.split(8, &mut rng);

            let leaves = root.leaves();
            let mut covered = vec![false; 40 * 30];
            for leaf in &leaves {
                for i in leaf.rect.x..leaf.rect.x + leaf.rect.w {
                    for j in leaf.rect.y..leaf.rect.y + leaf.rect.h {
                        assert!(!covered[j * 40 + i], "leaf rectangles overlap");
                        covered[j * 40 + i] = true;
                    }
                }
            }
            assert!(covered.iter().all(|&c| c), "leaves do not cover the root");
            let total: usize = leaves.iter().map(|l| l.rect.area()).sum();
            assert_eq!(total, 40 * 30);
        }
    }

    #[test]
    fn test_mst_is_spanning_and_acyclic() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut graph = GridGraph::new(48, 48);
        let layout = DungeonCarver::new(4).carve(&mut graph, &mut rng);

        assert!(layout.rooms.len() > 1);
        assert_eq!(layout.connections.len(), layout.rooms.len() - 1);

        let mut uf = UnionFind::new(layout.rooms.len());
        for &(a, b) in &layout.connections {
            assert!(uf.union(a, b), "connection set contains a cycle");
        }
        let root = uf.find(0);
        for r in 0..layout.rooms.len() {
            assert_eq!(uf.find(r), root, "room not spanned by the MST");
        }
    }

    #[test]
    fn test_rooms_stay_inside_their_leaves() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut root = Partition::new(Rect::new(0, 0, 32, 32));
        root.split(8, &mut rng);
        let carver = DungeonCarver::new(4);
        for leaf in root.leaves() {
            let room = carver.place_room(&leaf.rect, &mut rng);
            assert!(room.x >= leaf.rect.x + 1);
            assert!(room.y >= leaf.rect.y + 1);
            assert!(room.x + room.w <= leaf.rect.x + leaf.rect.w);
            assert!(room.y + room.h <= leaf.rect.y + leaf.rect.h);
        }
    }

    #[test]
    fn test_room_tiles_are_ground() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut graph = GridGraph::new(32, 32);
        let layout = DungeonCarver::new(4).carve(&mut graph, &mut rng);
        for room in &layout.rooms {
            for i in room.x..room.x + room.w {
                for j in room.y..room.y + room.h {
                    let node = graph.node_at(i as i32, j as i32).unwrap();
                    assert!(node.is_traversable());
                }
            }
        }
    }

    #[test]
    fn test_all_ground_is_connected() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut graph = GridGraph::new(40, 40);
        let layout = DungeonCarver::new(4).carve(&mut graph, &mut rng);

        let ground = graph.nodes().iter().filter(|n| n.is_traversable()).count();
        let (ci, cj) = layout.rooms[0].center();
        let start = graph.index_of(ci, cj);
        assert_eq!(graph.reachable_from(start), ground);
    }

    #[test]
    fn test_single_leaf_dungeon_is_valid() {
        // grid too small to split: one room, zero corridors
        let mut rng = StdRng::seed_from_u64(0);
        let mut graph = GridGraph::new(7, 7);
        let layout = DungeonCarver::new(4).carve(&mut graph, &mut rng);
        assert_eq!(layout.rooms.len(), 1);
        assert!(layout.connections.is_empty());
        assert!(graph.nodes().iter().any(|n| n.is_traversable()));
    }
}
