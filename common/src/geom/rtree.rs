use super::rect::Rect;
use rstar::{AABB, RTree};

pub struct SpatialIndex {
    tree: RTree<IndexedRect>,
}

struct IndexedRect {
    rect: Rect<i64>,
    id: usize,
}

impl rstar::RTreeObject for IndexedRect {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.rect.min.x as f64, self.rect.min.y as f64],
            [self.rect.max.x as f64, self.rect.max.y as f64],
        )
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    pub fn insert(&mut self, rect: Rect<i64>, id: usize) {
        self.tree.insert(IndexedRect { rect, id });
    }

    pub fn query(&self, rect: Rect<i64>) -> Vec<usize> {
        let aabb = AABB::from_corners(
            [rect.min.x as f64, rect.min.y as f64],
            [rect.max.x as f64, rect.max.y as f64],
        );
        self.tree
            .locate_in_envelope_intersecting(&aabb)
            .map(|item| item.id)
            .collect()
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
