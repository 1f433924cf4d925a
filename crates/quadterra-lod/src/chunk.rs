//! Quadtree chunk nodes.
//!
//! Each internal chunk owns exactly four children outright; traversal is
//! always top-down, so no parent links are needed.

use std::sync::Arc;

use glam::Vec2;

use crate::{ChunkGeometry, UvRect};

/// Observable state of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Has four children and no geometry.
    Internal,
    /// Leaf with generated geometry.
    Leaf,
    /// Leaf without geometry (culled or not generated yet).
    EmptyLeaf,
}

#[derive(Debug)]
enum ChunkKind {
    Leaf {
        geometry: Option<Arc<ChunkGeometry>>,
    },
    /// Children ordered `[NW, NE, SW, SE]`.
    Internal { children: Box<[Chunk; 4]> },
}

/// A node of the terrain quadtree.
#[derive(Debug)]
pub struct Chunk {
    bounds: UvRect,
    depth: u32,
    kind: ChunkKind,
    visible: bool,
    last_triangle_width: f32,
}

impl Chunk {
    fn leaf(bounds: UvRect, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            kind: ChunkKind::Leaf { geometry: None },
            visible: false,
            last_triangle_width: 0.0,
        }
    }

    /// A fresh root leaf spanning `[0, 1]²`, without geometry.
    pub fn root() -> Self {
        Self::leaf(UvRect::UNIT, 0)
    }

    /// UV bounds.
    pub fn bounds(&self) -> UvRect {
        self.bounds
    }

    /// Depth in the tree, 0 for the root.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Current state.
    pub fn state(&self) -> ChunkState {
        match &self.kind {
            ChunkKind::Internal { .. } => ChunkState::Internal,
            ChunkKind::Leaf { geometry: Some(_) } => ChunkState::Leaf,
            ChunkKind::Leaf { geometry: None } => ChunkState::EmptyLeaf,
        }
    }

    /// Returns true if this chunk has no children.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, ChunkKind::Leaf { .. })
    }

    /// Whether the chunk passed the frustum test in the last pass that reached it.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Triangle width computed the last time this chunk was evaluated.
    pub fn last_triangle_width(&self) -> f32 {
        self.last_triangle_width
    }

    /// Leaf geometry, if generated.
    pub fn geometry(&self) -> Option<&Arc<ChunkGeometry>> {
        match &self.kind {
            ChunkKind::Leaf { geometry } => geometry.as_ref(),
            ChunkKind::Internal { .. } => None,
        }
    }

    /// Children in `[NW, NE, SW, SE]` order, if internal.
    pub fn children(&self) -> Option<&[Chunk; 4]> {
        match &self.kind {
            ChunkKind::Internal { children } => Some(children),
            ChunkKind::Leaf { .. } => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut [Chunk; 4]> {
        match &mut self.kind {
            ChunkKind::Internal { children } => Some(children),
            ChunkKind::Leaf { .. } => None,
        }
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_last_triangle_width(&mut self, width: f32) {
        self.last_triangle_width = width;
    }

    /// Attach geometry to a leaf. Ignored on internal chunks.
    pub(crate) fn set_geometry(&mut self, geometry: Arc<ChunkGeometry>) {
        if let ChunkKind::Leaf { geometry: slot } = &mut self.kind {
            *slot = Some(geometry);
        }
    }

    /// Drop a leaf's geometry, returning true if there was any.
    pub(crate) fn clear_geometry(&mut self) -> bool {
        match &mut self.kind {
            ChunkKind::Leaf { geometry } => geometry.take().is_some(),
            ChunkKind::Internal { .. } => false,
        }
    }

    /// Replace this leaf by four child leaves covering its bounds.
    ///
    /// The leaf's geometry is discarded. Returns false (and does nothing)
    /// if the chunk is already internal.
    pub(crate) fn split(&mut self) -> bool {
        if !self.is_leaf() {
            return false;
        }
        let depth = self.depth + 1;
        let children = self.bounds.quadrants().map(|bounds| Chunk::leaf(bounds, depth));
        self.kind = ChunkKind::Internal {
            children: Box::new(children),
        };
        true
    }

    /// Collapse this chunk into a leaf, dropping all descendants.
    ///
    /// Returns the number of descendants removed (0 if already a leaf).
    pub(crate) fn merge(&mut self) -> usize {
        if self.is_leaf() {
            return 0;
        }
        let removed = self.node_count() - 1;
        self.kind = ChunkKind::Leaf { geometry: None };
        removed
    }

    /// Total number of chunks in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        match &self.kind {
            ChunkKind::Leaf { .. } => 1,
            ChunkKind::Internal { children } => {
                1 + children.iter().map(Chunk::node_count).sum::<usize>()
            }
        }
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match &self.kind {
            ChunkKind::Leaf { .. } => 1,
            ChunkKind::Internal { children } => children.iter().map(Chunk::leaf_count).sum(),
        }
    }

    /// Deepest depth reached in this subtree.
    pub fn max_tree_depth(&self) -> u32 {
        match &self.kind {
            ChunkKind::Leaf { .. } => self.depth,
            ChunkKind::Internal { children } => children
                .iter()
                .map(Chunk::max_tree_depth)
                .max()
                .unwrap_or(self.depth),
        }
    }

    /// All leaves in depth-first `[NW, NE, SW, SE]` order.
    pub fn leaves(&self) -> Vec<&Chunk> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Chunk>) {
        match &self.kind {
            ChunkKind::Leaf { .. } => out.push(self),
            ChunkKind::Internal { children } => {
                for child in children.iter() {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// The leaf containing `(u, v)`, or `None` if outside this chunk.
    pub fn find_leaf(&self, u: f32, v: f32) -> Option<&Chunk> {
        let uv = Vec2::new(u, v);
        if !self.bounds.contains(uv) {
            return None;
        }
        match &self.kind {
            ChunkKind::Leaf { .. } => Some(self),
            ChunkKind::Internal { children } => {
                let quadrant = self.bounds.quadrant_of(uv);
                children[quadrant as usize].find_leaf(u, v)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeometryGenerator, PrimitiveMode};

    fn split_twice() -> Chunk {
        let mut root = Chunk::root();
        root.split();
        root.children_mut().unwrap()[3].split();
        root
    }

    #[test]
    fn test_root_is_empty_leaf() {
        let root = Chunk::root();
        assert_eq!(root.state(), ChunkState::EmptyLeaf);
        assert_eq!(root.depth(), 0);
        assert_eq!(root.bounds(), UvRect::UNIT);
        assert!(root.children().is_none());
    }

    #[test]
    fn test_split_creates_four_children_and_drops_geometry() {
        let mut root = Chunk::root();
        let generator = GeometryGenerator::new(PrimitiveMode::Patch, 1);
        root.set_geometry(Arc::new(generator.generate(root.bounds(), 0)));
        assert_eq!(root.state(), ChunkState::Leaf);

        assert!(root.split());
        assert_eq!(root.state(), ChunkState::Internal);
        assert!(root.geometry().is_none());
        let children = root.children().unwrap();
        assert!(children.iter().all(|c| c.depth() == 1 && c.is_leaf()));
        assert_eq!(children.each_ref().map(|c| c.bounds()), UvRect::UNIT.quadrants());
    }

    #[test]
    fn test_split_internal_is_refused() {
        let mut root = Chunk::root();
        assert!(root.split());
        assert!(!root.split());
        assert_eq!(root.node_count(), 5);
    }

    #[test]
    fn test_merge_removes_all_descendants() {
        let mut root = split_twice();
        assert_eq!(root.node_count(), 9);
        assert_eq!(root.leaf_count(), 7);
        assert_eq!(root.merge(), 8);
        assert_eq!(root.state(), ChunkState::EmptyLeaf);
        assert_eq!(root.merge(), 0);
    }

    #[test]
    fn test_leaves_cover_domain() {
        let root = split_twice();
        let leaves = root.leaves();
        let area: f32 = leaves.iter().map(|c| c.bounds().area()).sum();
        assert_eq!(area, 1.0);
        for (i, a) in leaves.iter().enumerate() {
            for b in &leaves[i + 1..] {
                assert!(!a.bounds().overlaps(&b.bounds()));
            }
        }
        assert_eq!(root.max_tree_depth(), 2);
    }

    #[test]
    fn test_find_leaf() {
        let root = split_twice();
        let leaf = root.find_leaf(0.9, 0.9).unwrap();
        assert_eq!(leaf.depth(), 2);
        assert_eq!(leaf.bounds().origin, Vec2::new(0.75, 0.75));
        assert_eq!(root.find_leaf(0.1, 0.1).unwrap().depth(), 1);
        assert_eq!(root.find_leaf(1.0, 1.0).unwrap().depth(), 2);
        assert!(root.find_leaf(1.5, 0.5).is_none());
    }

    #[test]
    fn test_clear_geometry() {
        let mut root = Chunk::root();
        assert!(!root.clear_geometry());
        let generator = GeometryGenerator::new(PrimitiveMode::Triangles, 2);
        root.set_geometry(Arc::new(generator.generate(root.bounds(), 0)));
        assert!(root.clear_geometry());
        assert_eq!(root.state(), ChunkState::EmptyLeaf);
    }
}
