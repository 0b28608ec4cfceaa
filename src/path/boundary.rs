//! Outer boundary of a region
//!
//! The boundary is every edge of a region cell that no other region cell owns.
//! Edges are then chained end-to-start into one closed loop. Because region cells
//! are clockwise, the outer boundary edges already run clockwise around the region.

use glam::Vec3;

use crate::cell::Cell;
use crate::error::{Result, TrackError};
use crate::geometry::{approximately, Segment};
use crate::region::{EdgeIndex, Region};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Closed vertex loop produced by [`order_boundary`]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLoop {
    /// Loop vertices; the last one equals the first
    pub vertices: Vec<Vec3>,
    /// Boundary edges that were not part of the loop (inner holes)
    pub discarded: usize,
}

/// Collect the edges of region cells that border a non-region cell or the outside
pub fn extract_boundary(cells: &[Cell], region: &Region, tolerance: f32) -> Vec<Segment> {
    let members: Vec<&Cell> = region.interior.iter().map(|&i| &cells[i]).collect();
    let index = EdgeIndex::from_cells(members.iter().copied(), tolerance);

    let edges: Vec<(usize, Segment)> = members
        .iter()
        .flat_map(|cell| cell.segments.iter().map(move |s| (cell.index, *s)))
        .collect();

    maybe_par_iter!(edges)
        .filter(|(cell, segment)| !index.is_shared(*cell, segment))
        .map(|(_, segment)| *segment)
        .collect()
}

/// Chain boundary edges into a single closed loop
///
/// Starts at the edge whose start vertex has the smallest X and repeatedly
/// follows the unvisited edge whose start is nearest to the current end. The loop
/// closes once the chain is back within `tolerance` of its origin and no edge
/// continues from the chain end more closely than the origin does.
///
/// # Errors
///
/// Returns `Topology` if the chain cannot continue within `tolerance` or the
/// edges run out before the loop closes.
pub fn order_boundary(edges: &[Segment], tolerance: f32) -> Result<BoundaryLoop> {
    let first = edges
        .iter()
        .enumerate()
        .min_by(|(i, a), (j, b)| a.start.x.total_cmp(&b.start.x).then(i.cmp(j)))
        .map(|(i, _)| i)
        .ok_or_else(|| TrackError::Topology("region has no boundary edges".into()))?;

    let mut visited = vec![false; edges.len()];
    visited[first] = true;

    let origin = edges[first].start;
    let mut vertices = vec![origin, edges[first].end];
    let mut remaining = edges.len() - 1;

    loop {
        let end = vertices[vertices.len() - 1];

        let next = edges
            .iter()
            .enumerate()
            .filter(|(i, _)| !visited[*i])
            .map(|(i, edge)| (edge.start.distance_squared(end), i))
            .min_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));

        // Near the origin, a short edge still leaving the chain end belongs to the loop
        if vertices.len() > 2 && approximately(end, origin, tolerance) {
            let continues = next.is_some_and(|(distance, _)| {
                distance <= end.distance_squared(origin) && end != origin
            });
            if !continues {
                let last = vertices.len() - 1;
                vertices[last] = origin;
                break;
            }
        }

        let Some((_, next)) = next else {
            return Err(TrackError::Topology(format!(
                "boundary ran out of edges after {} vertices without closing",
                vertices.len()
            )));
        };

        let edge = edges[next];
        if !approximately(edge.start, end, tolerance) {
            return Err(TrackError::Topology(format!(
                "no boundary edge continues from ({:.3}, {:.3}); nearest starts at ({:.3}, {:.3})",
                end.x, end.y, edge.start.x, edge.start.y
            )));
        }

        visited[next] = true;
        remaining -= 1;
        vertices.push(edge.end);
    }

    if remaining > 0 {
        log::warn!("Discarding {} boundary edges enclosing holes", remaining);
    }

    Ok(BoundaryLoop {
        vertices,
        discarded: remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{signed_area, Rect, DEFAULT_TOLERANCE};
    use approx::assert_abs_diff_eq;

    /// Row-major grid of unit squares
    fn squares(width: usize, height: usize) -> Vec<Cell> {
        (0..width * height)
            .map(|i| {
                let min = Vec3::new((i % width) as f32, (i / width) as f32, 0.0);
                let rect = Rect::new(min, min + Vec3::new(1.0, 1.0, 0.0));
                Cell::new(
                    i,
                    (i % width, i / width),
                    min + Vec3::new(0.5, 0.5, 0.0),
                    rect.segments().to_vec(),
                )
            })
            .collect()
    }

    #[test]
    fn test_extract_boundary_of_block() {
        let cells = squares(3, 3);
        let region = Region::from_interior(&cells, vec![0, 1, 3, 4]);

        let edges = extract_boundary(&cells, &region, DEFAULT_TOLERANCE);
        // 2x2 block has 8 unit edges on its outline
        assert_eq!(edges.len(), 8);
    }

    #[test]
    fn test_order_boundary_closes_clockwise() {
        let cells = squares(3, 3);
        let region = Region::from_interior(&cells, vec![0, 1, 3, 4]);
        let edges = extract_boundary(&cells, &region, DEFAULT_TOLERANCE);

        let boundary = order_boundary(&edges, DEFAULT_TOLERANCE).unwrap();

        assert_eq!(boundary.vertices.len(), 9);
        assert_eq!(boundary.vertices[0], boundary.vertices[8]);
        assert_eq!(boundary.vertices[0].x, 0.0);
        assert_eq!(boundary.discarded, 0);
        assert_abs_diff_eq!(signed_area(&boundary.vertices), -4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_order_boundary_discards_hole() {
        // Ring of eight squares around the center one
        let cells = squares(3, 3);
        let region = Region::from_interior(&cells, vec![0, 1, 2, 3, 5, 6, 7, 8]);
        let edges = extract_boundary(&cells, &region, DEFAULT_TOLERANCE);
        assert_eq!(edges.len(), 16);

        let boundary = order_boundary(&edges, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(boundary.vertices.len(), 13);
        assert_eq!(boundary.discarded, 4);
    }

    #[test]
    fn test_order_boundary_keeps_short_closing_edge() {
        let corners = [
            (0.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.03, 0.0),
        ];
        let edges: Vec<Segment> = (0..corners.len())
            .map(|i| {
                let (x0, y0) = corners[i];
                let (x1, y1) = corners[(i + 1) % corners.len()];
                Segment::new(Vec3::new(x0, y0, 0.0), Vec3::new(x1, y1, 0.0))
            })
            .collect();

        let boundary = order_boundary(&edges, DEFAULT_TOLERANCE).unwrap();

        assert_eq!(boundary.discarded, 0);
        assert_eq!(boundary.vertices.len(), 6);
        assert_eq!(boundary.vertices[4], Vec3::new(0.03, 0.0, 0.0));
        assert_eq!(boundary.vertices[5], boundary.vertices[0]);
    }

    #[test]
    fn test_order_boundary_gap_is_topology_error() {
        let edges = vec![
            Segment::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            Segment::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0)),
            Segment::new(Vec3::new(1.5, 1.0, 0.0), Vec3::new(0.0, 0.0, 0.0)),
        ];

        let result = order_boundary(&edges, DEFAULT_TOLERANCE);
        assert!(matches!(result, Err(TrackError::Topology(_))));
    }

    #[test]
    fn test_order_boundary_open_chain_is_topology_error() {
        let edges = vec![
            Segment::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            Segment::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0)),
        ];

        assert!(order_boundary(&edges, DEFAULT_TOLERANCE).is_err());
        assert!(order_boundary(&[], DEFAULT_TOLERANCE).is_err());
    }
}
