//! Broad-phase spatial index (uniform grid hash)
//!
//! World space is cut into square cells keyed by `floor(x / cell_size)`,
//! `floor(y / cell_size)`. The grid is unbounded and sparse: only occupied
//! cells are stored. It is cleared and refilled every frame, so nothing here
//! tracks moving entities.
//!
//! Query results are deduplicated but come back in cell-enumeration order,
//! not sorted by distance.

use std::hash::Hash;

use glam::Vec2;
use rustc_hash::{FxHashMap, FxHashSet};

use super::geometry::Rect;
use crate::consts::DEFAULT_CELL_SIZE;

/// Integer cell coordinate
pub type CellKey = (i32, i32);

/// Inclusive range of cells covered by a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub min: CellKey,
    pub max: CellKey,
}

impl CellRange {
    /// Iterate every cell in the range, row by row
    pub fn cells(self) -> impl Iterator<Item = CellKey> {
        (self.min.1..=self.max.1)
            .flat_map(move |cy| (self.min.0..=self.max.0).map(move |cx| (cx, cy)))
    }

    /// Number of cells in the range
    pub fn len(&self) -> usize {
        let w = (self.max.0 - self.min.0 + 1).max(0) as usize;
        let h = (self.max.1 - self.min.1 + 1).max(0) as usize;
        w * h
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Uniform grid hash over entity keys `K`
#[derive(Debug, Clone)]
pub struct SpatialGrid<K> {
    cell_size: f32,
    cells: FxHashMap<CellKey, Vec<K>>,
    /// Number of inserted entities (not cell references)
    len: usize,
    /// Dedup scratch reused across queries
    seen: FxHashSet<K>,
}

impl<K> Default for SpatialGrid<K> {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl<K> SpatialGrid<K> {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: FxHashMap::default(),
            len: 0,
            seen: FxHashSet::default(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of entities inserted since the last clear
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.values().filter(|c| !c.is_empty()).count()
    }

    /// Empty every cell. Cell buffers keep their allocation for the next frame.
    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Cell containing a point
    #[inline]
    pub fn cell_of(&self, p: Vec2) -> CellKey {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    /// Inclusive cell range spanned by `bounds`. Zero-size bounds map to one cell.
    pub fn cell_range(&self, bounds: &Rect) -> CellRange {
        CellRange {
            min: self.cell_of(bounds.min()),
            max: self.cell_of(bounds.max()),
        }
    }
}

impl<K: Copy + Eq + Hash> SpatialGrid<K> {
    /// Add `key` to every cell its bounds touch.
    ///
    /// Entities without bounds are skipped and cannot be found this frame.
    /// Returns whether the entity was inserted.
    pub fn insert(&mut self, key: K, bounds: Option<Rect>) -> bool {
        let Some(bounds) = bounds else {
            return false;
        };
        let range = self.cell_range(&bounds);
        for cell in range.cells() {
            self.cells.entry(cell).or_default().push(key);
        }
        self.len += 1;
        true
    }

    /// Deduplicated union of entities in every cell overlapping `bounds`
    pub fn query(&mut self, bounds: &Rect) -> Vec<K> {
        let mut out = Vec::new();
        self.query_into(bounds, &mut out);
        out
    }

    /// Same as [`query`](Self::query) but writes into `buf` (cleared first)
    pub fn query_into(&mut self, bounds: &Rect, buf: &mut Vec<K>) {
        buf.clear();
        self.seen.clear();
        for cell in self.cell_range(bounds).cells() {
            if let Some(bucket) = self.cells.get(&cell) {
                for &key in bucket {
                    if self.seen.insert(key) {
                        buf.push(key);
                    }
                }
            }
        }
    }

    /// Candidates near a circle (its bounding box is queried)
    pub fn query_circle(&mut self, center: Vec2, radius: f32) -> Vec<K> {
        self.query(&Rect::new(
            center.x - radius,
            center.y - radius,
            radius * 2.0,
            radius * 2.0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_entity_spanning_four_cells_found_from_each() {
        let mut grid = SpatialGrid::new(100.0);
        assert!(grid.insert(7u32, Some(Rect::new(90.0, 90.0, 30.0, 30.0))));
        assert_eq!(grid.occupied_cells(), 4);

        assert_eq!(grid.query(&Rect::new(0.0, 0.0, 50.0, 50.0)), vec![7]);
        assert_eq!(grid.query(&Rect::new(110.0, 110.0, 10.0, 10.0)), vec![7]);
    }

    #[test]
    fn test_query_dedups_multi_cell_entity() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(1u32, Some(Rect::new(0.0, 0.0, 35.0, 25.0)));
        grid.insert(2u32, Some(Rect::new(12.0, 12.0, 1.0, 1.0)));

        let found = grid.query(&Rect::new(-5.0, -5.0, 50.0, 50.0));
        assert_eq!(found.iter().filter(|&&k| k == 1).count(), 1);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_back_to_back_queries_do_not_share_dedup_state() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(1u32, Some(Rect::new(0.0, 0.0, 25.0, 5.0)));
        grid.insert(2u32, Some(Rect::new(40.0, 0.0, 5.0, 5.0)));

        let mut buf = Vec::new();
        grid.query_into(&Rect::new(0.0, 0.0, 25.0, 5.0), &mut buf);
        assert_eq!(buf, vec![1]);
        // Entity 1 was seen by the previous query and must still be returned
        grid.query_into(&Rect::new(15.0, 0.0, 30.0, 5.0), &mut buf);
        assert_eq!(buf, vec![1, 2]);
        grid.query_into(&Rect::new(15.0, 0.0, 30.0, 5.0), &mut buf);
        assert_eq!(buf, vec![1, 2]);
    }

    #[test]
    fn test_absent_bounds_are_skipped() {
        let mut grid: SpatialGrid<u32> = SpatialGrid::new(10.0);
        assert!(!grid.insert(3, None));
        assert!(grid.is_empty());
        assert!(grid.query(&Rect::new(-1000.0, -1000.0, 2000.0, 2000.0)).is_empty());
    }

    #[test]
    fn test_zero_size_and_negative_coordinates() {
        let mut grid = SpatialGrid::new(10.0);
        let point = Rect::new(-15.0, -0.5, 0.0, 0.0);
        assert_eq!(grid.cell_range(&point).len(), 1);
        assert_eq!(grid.cell_range(&point).min, (-2, -1));

        grid.insert(9u32, Some(point));
        assert_eq!(grid.query(&Rect::new(-19.0, -9.0, 2.0, 2.0)), vec![9]);
        assert!(grid.query(&Rect::new(1.0, 1.0, 2.0, 2.0)).is_empty());
    }

    #[test]
    fn test_clear_empties_all_cells() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(1u32, Some(Rect::new(0.0, 0.0, 30.0, 30.0)));
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.occupied_cells(), 0);
        assert!(grid.query(&Rect::new(0.0, 0.0, 30.0, 30.0)).is_empty());
    }

    #[test]
    fn test_query_circle_uses_bounding_box() {
        let mut grid = SpatialGrid::new(16.0);
        grid.insert(5u32, Some(Rect::new(40.0, 0.0, 4.0, 4.0)));
        assert!(grid.query_circle(Vec2::new(0.0, 0.0), 8.0).is_empty());
        assert_eq!(grid.query_circle(Vec2::new(30.0, 0.0), 12.0), vec![5]);
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (-500.0f32..500.0, -500.0f32..500.0, 0.0f32..120.0, 0.0f32..120.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_query_has_no_false_negatives(
            cell_size in 8.0f32..128.0,
            rects in prop::collection::vec(arb_rect(), 1..40),
            query in arb_rect(),
        ) {
            let mut grid = SpatialGrid::new(cell_size);
            for (i, r) in rects.iter().enumerate() {
                grid.insert(i, Some(*r));
            }
            let found = grid.query(&query);
            for (i, r) in rects.iter().enumerate() {
                if r.overlaps(&query) {
                    prop_assert!(found.contains(&i), "missing entity {} for {:?}", i, query);
                }
            }
        }

        #[test]
        fn prop_query_returns_each_entity_once(
            cell_size in 8.0f32..64.0,
            rects in prop::collection::vec(arb_rect(), 1..30),
        ) {
            let mut grid = SpatialGrid::new(cell_size);
            for (i, r) in rects.iter().enumerate() {
                grid.insert(i, Some(*r));
            }
            let found = grid.query(&Rect::new(-700.0, -700.0, 1400.0, 1400.0));
            prop_assert_eq!(found.len(), rects.len());
            let unique: FxHashSet<_> = found.iter().copied().collect();
            prop_assert_eq!(unique.len(), found.len());
        }
    }
}
