//! Shared-edge lookup and cell adjacency
//!
//! Two cells are neighbors when one of their segments is the same edge within the
//! configured tolerance. Instead of comparing every segment with every other one,
//! segments are bucketed by their quantized midpoint: matching edges have
//! midpoints at most one tolerance apart per axis, so a lookup only has to probe
//! the 3×3 block of buckets around the query.

use std::collections::HashMap;

use glam::Vec3;

use crate::cell::Cell;
use crate::geometry::Segment;

/// A segment of a specific cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRef {
    pub cell: usize,
    pub segment: usize,
}

/// Spatial hash of cell segments keyed by quantized midpoint
#[derive(Debug, Clone)]
pub struct EdgeIndex {
    tolerance: f32,
    buckets: HashMap<(i64, i64), Vec<(EdgeRef, Segment)>>,
}

impl EdgeIndex {
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance,
            buckets: HashMap::new(),
        }
    }

    /// Index every segment of the given cells
    pub fn from_cells<'a, I>(cells: I, tolerance: f32) -> Self
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let mut index = Self::new(tolerance);
        for cell in cells {
            for (segment_index, segment) in cell.segments.iter().enumerate() {
                index.insert(
                    EdgeRef {
                        cell: cell.index,
                        segment: segment_index,
                    },
                    *segment,
                );
            }
        }
        index
    }

    pub fn insert(&mut self, edge: EdgeRef, segment: Segment) {
        let key = self.key(segment.center());
        self.buckets.entry(key).or_default().push((edge, segment));
    }

    /// All indexed edges that are the same edge as `segment`, in either direction
    pub fn matches<'a>(&'a self, segment: &'a Segment) -> impl Iterator<Item = EdgeRef> + 'a {
        let (x, y) = self.key(segment.center());
        let tolerance = self.tolerance;

        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dy| (x + dx, y + dy)))
            .filter_map(move |key| self.buckets.get(&key))
            .flatten()
            .filter(move |(_, other)| segment.same_as(other, tolerance))
            .map(|(edge, _)| *edge)
    }

    /// Whether a cell other than `cell` owns the same edge
    pub fn is_shared(&self, cell: usize, segment: &Segment) -> bool {
        self.matches(segment).any(|edge| edge.cell != cell)
    }

    #[inline]
    fn key(&self, point: Vec3) -> (i64, i64) {
        (
            (point.x / self.tolerance).floor() as i64,
            (point.y / self.tolerance).floor() as i64,
        )
    }
}

/// Adjacency between valid cells
///
/// Invalid cells keep an empty neighbor list and are never reported as adjacent.
#[derive(Debug, Clone)]
pub struct CellGraph {
    neighbors: Vec<Vec<usize>>,
    shared: Vec<Vec<bool>>,
    valid: Vec<bool>,
}

impl CellGraph {
    /// Build the graph for a full set of cells (indexed by `Cell::index`)
    pub fn new(cells: &[Cell], tolerance: f32) -> Self {
        let index = EdgeIndex::from_cells(cells.iter().filter(|c| c.valid), tolerance);

        let mut neighbors = vec![Vec::new(); cells.len()];
        let mut shared = vec![Vec::new(); cells.len()];

        for cell in cells.iter().filter(|c| c.valid) {
            let mut adjacent = Vec::new();
            let mut flags = Vec::with_capacity(cell.segments.len());

            for segment in &cell.segments {
                let mut is_shared = false;
                for edge in index.matches(segment).filter(|e| e.cell != cell.index) {
                    adjacent.push(edge.cell);
                    is_shared = true;
                }
                flags.push(is_shared);
            }

            adjacent.sort_unstable();
            adjacent.dedup();
            neighbors[cell.index] = adjacent;
            shared[cell.index] = flags;
        }

        Self {
            neighbors,
            shared,
            valid: cells.iter().map(|c| c.valid).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Sorted indices of cells sharing an edge with `cell`
    #[inline]
    pub fn neighbors(&self, cell: usize) -> &[usize] {
        &self.neighbors[cell]
    }

    #[inline]
    pub fn is_valid(&self, cell: usize) -> bool {
        self.valid[cell]
    }

    #[inline]
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbors[a].binary_search(&b).is_ok()
    }

    /// Per-segment flags telling whether each edge borders another valid cell
    #[inline]
    pub fn shared_edges(&self, cell: usize) -> &[bool] {
        &self.shared[cell]
    }

    /// A valid cell whose every edge borders another valid cell
    pub fn is_enclosed(&self, cell: usize) -> bool {
        self.valid[cell] && !self.shared[cell].is_empty() && self.shared[cell].iter().all(|&s| s)
    }

    /// Whether any cell in `group` is adjacent to `cell`
    pub fn touches(&self, cell: usize, group: &[usize]) -> bool {
        group.iter().any(|&other| self.is_adjacent(cell, other))
    }
}
