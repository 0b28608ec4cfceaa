//! Voronoi Cell Structure
//!
//! A planar convex polygon owned by one seed center, produced by the cell builder.

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{approximately, signed_area, Segment};

/// A single Voronoi cell in the generation plane
///
/// # Winding
///
/// Segments are ordered clockwise (seen from +Z), so the cell interior lies on the
/// right of every segment: `segment.side(center) < 0` for a well-formed cell.
///
/// # Validity
///
/// Floating-point edge cases during clipping can leave a polygon that is not closed
/// or does not enclose its center. The builder runs [`Cell::verify`] once and stores
/// the outcome in `valid`; invalid cells never take part in region selection.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Cell {
    /// Index of the seed center (0 to cell_count-1), stable for a given config
    pub index: usize,

    /// Grid coordinate `(column, row)` the seed center was jittered inside
    pub grid: (usize, usize),

    /// The Voronoi site
    pub center: Vec3,

    /// Boundary segments, closed and clockwise
    pub segments: Vec<Segment>,

    /// Result of [`Cell::verify`] at build time
    pub valid: bool,
}

impl Cell {
    /// Create a new cell
    ///
    /// This is typically called by the cell builder, not by user code.
    pub fn new(index: usize, grid: (usize, usize), center: Vec3, segments: Vec<Segment>) -> Self {
        Self {
            index,
            grid,
            center,
            segments,
            valid: true,
        }
    }

    /// Polygon corners, one per segment (each segment's start)
    pub fn vertices(&self) -> Vec<Vec3> {
        self.segments.iter().map(|s| s.start).collect()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.segments.len()
    }

    /// Check that the polygon is a closed loop enclosing the center
    ///
    /// Requires at least three finite segments, each ending within `tolerance` of
    /// the next one's start, and the center strictly on the interior side of all.
    pub fn verify(&self, tolerance: f32) -> bool {
        if self.segments.len() < 3 || !self.center.is_finite() {
            return false;
        }

        let count = self.segments.len();
        for (i, segment) in self.segments.iter().enumerate() {
            if !segment.start.is_finite() || !segment.end.is_finite() {
                return false;
            }

            let next = &self.segments[(i + 1) % count];
            if !approximately(segment.end, next.start, tolerance) {
                return false;
            }

            if segment.side(self.center) >= 0.0 {
                return false;
            }
        }

        signed_area(&self.vertices()) < 0.0
    }

    /// Check whether two cells share an edge
    ///
    /// Brute force over both segment lists. The region selector uses the hashed
    /// [`CellGraph`](crate::region::CellGraph) instead.
    pub fn is_adjacent_to(&self, other: &Cell, tolerance: f32) -> bool {
        self.segments
            .iter()
            .any(|s| other.segments.iter().any(|o| s.same_as(o, tolerance)))
    }

    /// Polygon area (always non-negative)
    pub fn area(&self) -> f32 {
        signed_area(&self.vertices()).abs()
    }

    /// Distance from `point` to the nearest corner of this cell
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.segments
            .iter()
            .map(|s| s.start.distance(point))
            .fold(f32::MAX, f32::min)
    }

    /// Corner of this cell nearest to `point`
    pub fn nearest_vertex(&self, point: Vec3) -> Option<Vec3> {
        self.segments
            .iter()
            .map(|s| s.start)
            .min_by(|a, b| {
                a.distance(point)
                    .partial_cmp(&b.distance(point))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}
