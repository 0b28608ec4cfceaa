//! Voronoi cell construction by half-plane clipping
//!
//! Each cell starts as the padded bounding rectangle of all sites and is cut by the
//! perpendicular bisector to every other site. Cells never look at each other's
//! polygons, so the whole diagram is built as one parallel-for over site indices.

use glam::Vec3;
use std::cmp::Ordering;

use crate::cell::Cell;
use crate::geometry::{approximately, cross, intersect, normalize, Rect, Segment};

use super::points::grid_coordinate;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Partial edges shorter than this are dropped after a cut
const DEGENERATE_LENGTH: f32 = 1e-6;

/// Bisector hits closer than this fraction of the bounds diagonal are one point
///
/// Only a cut through an existing vertex produces such a pair. Anything wider is a
/// genuine corner cut and must be applied, however small.
const COINCIDENT_FRACTION: f32 = 1e-5;

/// A point where a bisector crosses a polygon edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Vec3,
    /// Index of the crossed edge in the polygon being clipped
    pub segment: usize,
}

impl Intersection {
    /// Intersections are equal by point only
    #[inline]
    pub fn same_point(&self, other: &Intersection, tolerance: f32) -> bool {
        approximately(self.point, other.point, tolerance)
    }
}

/// A bisector clipped to the polygon it cuts
///
/// Oriented so the owning center lies on its interior (right) side, which makes the
/// walk from `end` forward around the old polygon trace the part that is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BisectorSegment {
    pub start: Intersection,
    pub end: Intersection,
}

impl BisectorSegment {
    /// Build from two intersections, swapping them if `center` is on the wrong side
    ///
    /// Returns `None` when the center is collinear with the cut, which only happens
    /// for coincident sites.
    pub fn oriented(first: Intersection, second: Intersection, center: Vec3) -> Option<Self> {
        let candidate = Self {
            start: first,
            end: second,
        };

        if candidate.verify(center) {
            return Some(candidate);
        }

        let swapped = Self {
            start: second,
            end: first,
        };
        swapped.verify(center).then_some(swapped)
    }

    /// The cut as a plain segment
    #[inline]
    pub fn segment(&self) -> Segment {
        Segment::new(self.start.point, self.end.point)
    }

    /// Check the center is strictly on the interior side
    #[inline]
    pub fn verify(&self, center: Vec3) -> bool {
        self.segment().side(center) < 0.0
    }
}

/// Build every cell of the diagram
///
/// # Arguments
///
/// * `centers` - Voronoi sites
/// * `bounds` - Initial polygon for every cell
/// * `grid_width` - Grid columns, used to record each cell's grid coordinate
/// * `tolerance` - Shared comparison epsilon
///
/// # Returns
///
/// One cell per site, in site order. Cells failing verification are returned with
/// `valid == false`.
pub fn build_cells(centers: &[Vec3], bounds: &Rect, grid_width: usize, tolerance: f32) -> Vec<Cell> {
    maybe_par_into_iter!(0..centers.len())
        .map(|index| build_cell(index, centers, bounds, grid_width, tolerance))
        .collect()
}

/// Build the cell of a single site
pub fn build_cell(
    index: usize,
    centers: &[Vec3],
    bounds: &Rect,
    grid_width: usize,
    tolerance: f32,
) -> Cell {
    let center = centers[index];
    let diagonal = bounds.diagonal();
    let coincident = diagonal * COINCIDENT_FRACTION;
    let mut segments = bounds.segments().to_vec();

    // Nearest sites first: they shape the cell quickly and let the reach test stop early
    let mut others: Vec<usize> = (0..centers.len()).filter(|&j| j != index).collect();
    others.sort_by(|&a, &b| {
        center
            .distance_squared(centers[a])
            .partial_cmp(&center.distance_squared(centers[b]))
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut reach = farthest_vertex(&segments, center);

    for other in others {
        let other = centers[other];

        // Sorted by distance, so no later bisector can reach the polygon either
        if center.distance(other) * 0.5 > reach {
            break;
        }

        let Some(bisector) = bisector_between(center, other, diagonal) else {
            continue;
        };

        let hits = intersections(&segments, &bisector, coincident);
        if hits.len() != 2 || hits[0].segment == hits[1].segment {
            continue;
        }

        let Some(cut) = BisectorSegment::oriented(hits[0], hits[1], center) else {
            continue;
        };

        segments = clip(&segments, &cut);
        reach = farthest_vertex(&segments, center);
    }

    let mut cell = Cell::new(index, grid_coordinate(index, grid_width), center, segments);
    cell.valid = cell.verify(tolerance);
    cell
}

/// Perpendicular bisector of `center`–`other`, extending `half_length` each way
/// from the midpoint
fn bisector_between(center: Vec3, other: Vec3, half_length: f32) -> Option<Segment> {
    let direction = normalize(cross(other - center, Vec3::Z)) * half_length;
    if direction == Vec3::ZERO {
        return None;
    }

    let midpoint = (center + other) * 0.5;
    Some(Segment::new(midpoint - direction, midpoint + direction))
}

/// All distinct crossings of `bisector` with the polygon
fn intersections(segments: &[Segment], bisector: &Segment, coincident: f32) -> Vec<Intersection> {
    let mut hits: Vec<Intersection> = Vec::with_capacity(2);

    for (index, segment) in segments.iter().enumerate() {
        if let Some(point) = intersect(bisector, segment) {
            let hit = Intersection {
                point,
                segment: index,
            };
            if !hits.iter().any(|h| h.same_point(&hit, coincident)) {
                hits.push(hit);
            }
        }
    }

    hits
}

/// Replace the polygon by the part on the interior side of `cut`
///
/// New edge order: the cut, the remainder of the edge hit at `cut.end`, the old edges
/// walking forward, and the leading part of the edge hit at `cut.start`.
fn clip(segments: &[Segment], cut: &BisectorSegment) -> Vec<Segment> {
    let count = segments.len();
    let mut clipped = Vec::with_capacity(count + 1);

    clipped.push(cut.segment());

    let end_edge = segments[cut.end.segment];
    push_non_degenerate(&mut clipped, Segment::new(cut.end.point, end_edge.end));

    let mut index = (cut.end.segment + 1) % count;
    while index != cut.start.segment {
        clipped.push(segments[index]);
        index = (index + 1) % count;
    }

    let start_edge = segments[cut.start.segment];
    push_non_degenerate(&mut clipped, Segment::new(start_edge.start, cut.start.point));

    clipped
}

#[inline]
fn push_non_degenerate(segments: &mut Vec<Segment>, segment: Segment) {
    if segment.length() > DEGENERATE_LENGTH {
        segments.push(segment);
    }
}

fn farthest_vertex(segments: &[Segment], center: Vec3) -> f32 {
    segments
        .iter()
        .map(|s| s.start.distance(center))
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::points::generate_grid_points;
    use crate::geometry::DEFAULT_TOLERANCE;
    use approx::assert_abs_diff_eq;

    fn diagram(width: usize, height: usize, seed: u32) -> (Vec<Cell>, Rect) {
        let centers = generate_grid_points(width, height, 5.0, seed);
        let bounds = Rect::from_points(&centers, 1.0).unwrap();
        (build_cells(&centers, &bounds, width, DEFAULT_TOLERANCE), bounds)
    }

    #[test]
    fn test_two_sites_split_rectangle() {
        let centers = vec![Vec3::new(1.0, 1.0, 0.0), Vec3::new(3.0, 1.0, 0.0)];
        let bounds = Rect::from_points(&centers, 1.0).unwrap();
        let cells = build_cells(&centers, &bounds, 2, DEFAULT_TOLERANCE);

        assert_eq!(cells.len(), 2);
        for cell in &cells {
            assert!(cell.valid);
            assert_eq!(cell.vertex_count(), 4);
            assert_abs_diff_eq!(cell.area(), 4.0, epsilon = 1e-4);
        }

        // Left cell ends at x = 2
        let max_x = cells[0].vertices().iter().map(|v| v.x).fold(f32::MIN, f32::max);
        assert_abs_diff_eq!(max_x, 2.0, epsilon = 1e-5);
        assert!(cells[0].is_adjacent_to(&cells[1], DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_bisector_orientation() {
        let first = Intersection {
            point: Vec3::new(0.0, 0.0, 0.0),
            segment: 0,
        };
        let second = Intersection {
            point: Vec3::new(0.0, 2.0, 0.0),
            segment: 2,
        };

        // Going up along x = 0, the right side is +x
        let cut = BisectorSegment::oriented(first, second, Vec3::new(1.0, 1.0, 0.0)).unwrap();
        assert_eq!(cut.start, first);

        let cut = BisectorSegment::oriented(first, second, Vec3::new(-1.0, 1.0, 0.0)).unwrap();
        assert_eq!(cut.start, second);
        assert!(cut.verify(Vec3::new(-1.0, 1.0, 0.0)));

        assert!(BisectorSegment::oriented(first, second, Vec3::new(0.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn test_all_cells_valid() {
        for seed in [1, 42, 12345] {
            let (cells, _) = diagram(5, 5, seed);
            assert_eq!(cells.len(), 25);
            assert!(cells.iter().all(|c| c.valid), "seed {} produced an invalid cell", seed);
        }
    }

    #[test]
    fn test_cells_partition_bounds() {
        let (cells, bounds) = diagram(6, 4, 7);
        let total: f32 = cells.iter().map(|c| c.area()).sum();
        let expected = bounds.width() * bounds.height();

        assert!((total - expected).abs() / expected < 1e-2);
    }

    #[test]
    fn test_cell_owns_only_its_center() {
        let (cells, _) = diagram(5, 5, 99);

        for cell in &cells {
            for other in &cells {
                if other.index == cell.index {
                    continue;
                }
                assert!(
                    cell.segments.iter().any(|s| s.side(other.center) > -1e-4),
                    "cell {} encloses center {}",
                    cell.index,
                    other.index
                );
            }
        }
    }

    #[test]
    fn test_neighbor_symmetry() {
        let (cells, _) = diagram(5, 5, 12345);

        for a in &cells {
            for b in &cells {
                if a.index != b.index {
                    assert_eq!(
                        a.is_adjacent_to(b, DEFAULT_TOLERANCE),
                        b.is_adjacent_to(a, DEFAULT_TOLERANCE)
                    );
                }
            }
        }
    }

    #[test]
    fn test_small_corner_cut_applied() {
        // Bisector x + y = 19.97 clips a corner whose crossings are 0.042 apart
        let centers = vec![Vec3::new(5.0, 5.0, 0.0), Vec3::new(14.97, 14.97, 0.0)];
        let bounds = Rect::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 0.0));
        let cells = build_cells(&centers, &bounds, 2, DEFAULT_TOLERANCE);

        assert_eq!(cells[0].vertex_count(), 5);
        assert_eq!(cells[1].vertex_count(), 3);
        assert!(cells[0].is_adjacent_to(&cells[1], DEFAULT_TOLERANCE));

        let total = cells[0].area() + cells[1].area();
        assert_abs_diff_eq!(total, 100.0, epsilon = 1e-3);
        assert!(cells[1].area() < 1e-3);
    }

    #[test]
    fn test_neighbors_share_vertices_across_seeds() {
        // Every cell vertex off the bounds is a Voronoi vertex shared by a neighbor
        for seed in 0..50 {
            let (cells, bounds) = diagram(6, 6, seed);
            let on_bounds = |v: Vec3| {
                (v.x - bounds.min.x).abs() < 1e-3
                    || (v.x - bounds.max.x).abs() < 1e-3
                    || (v.y - bounds.min.y).abs() < 1e-3
                    || (v.y - bounds.max.y).abs() < 1e-3
            };

            for cell in &cells {
                for vertex in cell.vertices() {
                    if on_bounds(vertex) {
                        continue;
                    }
                    let shared = cells.iter().any(|other| {
                        other.index != cell.index
                            && other
                                .vertices()
                                .iter()
                                .any(|v| v.distance(vertex) < DEFAULT_TOLERANCE)
                    });
                    assert!(shared, "seed {}: cell {} has a stray vertex", seed, cell.index);
                }
            }
        }
    }

    #[test]
    fn test_grid_coordinates_recorded() {
        let (cells, _) = diagram(5, 3, 3);
        assert_eq!(cells[7].grid, (2, 1));
        assert_eq!(cells[14].grid, (4, 2));
    }
}
