//! Connected components of a region and bridge merging
//!
//! Random growth can leave the selected cells split into several clusters. They are
//! merged closest-pair first, annexing exterior cells as a bridge when the pair
//! does not already touch, until a single cluster remains.

use glam::Vec3;

use crate::cell::Cell;
use crate::error::{Result, TrackError};

use super::graph::CellGraph;
use super::Region;

/// Counters describing what the merge step did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Number of cluster pairs fused
    pub clusters_merged: usize,
    /// Exterior cells annexed as bridges
    pub bridge_cells: usize,
}

/// Connected components of the subgraph induced by `members`
///
/// Each component is sorted; components are ordered by their smallest cell index.
pub fn find_clusters(members: &[usize], graph: &CellGraph) -> Vec<Vec<usize>> {
    let mut in_set = vec![false; graph.len()];
    for &cell in members {
        in_set[cell] = true;
    }

    let mut visited = vec![false; graph.len()];
    let mut sorted = members.to_vec();
    sorted.sort_unstable();

    let mut clusters = Vec::new();
    for &root in &sorted {
        if visited[root] {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![root];
        visited[root] = true;

        while let Some(cell) = stack.pop() {
            component.push(cell);
            for &neighbor in graph.neighbors(cell) {
                if in_set[neighbor] && !visited[neighbor] {
                    visited[neighbor] = true;
                    stack.push(neighbor);
                }
            }
        }

        component.sort_unstable();
        clusters.push(component);
    }

    clusters
}

/// Merge the region's interior into one connected cluster
///
/// # Errors
///
/// Returns `SelectionExhausted` if a bridge needs an exterior cell and none
/// adjacent to the growing cluster is left.
pub fn merge_clusters(cells: &[Cell], graph: &CellGraph, region: &mut Region) -> Result<MergeSummary> {
    let mut clusters = find_clusters(&region.interior, graph);
    let mut summary = MergeSummary::default();

    if clusters.len() > 1 {
        log::debug!("Merging {} clusters", clusters.len());
    }

    let mut exterior = vec![false; cells.len()];
    for &cell in &region.exterior {
        exterior[cell] = true;
    }

    while clusters.len() > 1 {
        let (a, b, target) = closest_pair(cells, &clusters);

        let touching = clusters[a].iter().any(|&cell| graph.touches(cell, &clusters[b]));
        let bridge = if touching {
            Vec::new()
        } else {
            build_bridge(cells, graph, &clusters[a], &clusters[b], target, &mut exterior)?
        };

        summary.bridge_cells += bridge.len();
        summary.clusters_merged += 1;

        let second = clusters.remove(b);
        let first = &mut clusters[a];
        first.extend(bridge);
        first.extend(second);
        first.sort_unstable();
    }

    if let Some(merged) = clusters.pop() {
        region.interior = merged;
    }
    region.exterior.retain(|&cell| exterior[cell]);

    Ok(summary)
}

/// The pair `(a, b)` with `a < b` whose nearest corners are globally closest,
/// and the corner of `b` realizing that distance
fn closest_pair(cells: &[Cell], clusters: &[Vec<usize>]) -> (usize, usize, Vec3) {
    let corners: Vec<Vec<Vec3>> = clusters
        .iter()
        .map(|cluster| cluster.iter().flat_map(|&c| cells[c].vertices()).collect())
        .collect();

    let mut best = (0, 1, Vec3::ZERO);
    let mut best_distance = f32::MAX;

    for a in 0..clusters.len() {
        for b in a + 1..clusters.len() {
            for &p in &corners[a] {
                for &q in &corners[b] {
                    let distance = p.distance_squared(q);
                    if distance < best_distance {
                        best_distance = distance;
                        best = (a, b, q);
                    }
                }
            }
        }
    }

    best
}

/// Annex exterior cells from `from` toward `to` until the chain touches `to`
fn build_bridge(
    cells: &[Cell],
    graph: &CellGraph,
    from: &[usize],
    to: &[usize],
    target: Vec3,
    exterior: &mut [bool],
) -> Result<Vec<usize>> {
    let mut grown = from.to_vec();
    let mut bridge = Vec::new();

    loop {
        let next = grown
            .iter()
            .flat_map(|&cell| graph.neighbors(cell).iter().copied())
            .filter(|&cell| exterior[cell])
            .map(|cell| (cells[cell].distance_to_point(target), cell))
            .min_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));

        let Some((_, cell)) = next else {
            return Err(TrackError::SelectionExhausted(format!(
                "no exterior cell left to bridge toward cluster of {} cells",
                to.len()
            )));
        };

        exterior[cell] = false;
        grown.push(cell);
        bridge.push(cell);

        if graph.touches(cell, to) {
            return Ok(bridge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, DEFAULT_TOLERANCE};

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
    fn test_find_clusters() {
        let cells = squares(5, 1);
        let graph = CellGraph::new(&cells, DEFAULT_TOLERANCE);

        let clusters = find_clusters(&[4, 0, 1, 3], &graph);
        assert_eq!(clusters, vec![vec![0, 1], vec![3, 4]]);
    }

    #[test]
    fn test_merge_adjacent_clusters_need_no_bridge() {
        let cells = squares(3, 1);
        let graph = CellGraph::new(&cells, DEFAULT_TOLERANCE);
        let mut region = Region::from_interior(&cells, vec![0, 1]);

        let summary = merge_clusters(&cells, &graph, &mut region).unwrap();
        assert_eq!(summary, MergeSummary::default());
        assert_eq!(region.interior, vec![0, 1]);
    }

    #[test]
    fn test_merge_builds_bridge() {
        // Row of seven squares with the ends selected
        let cells = squares(7, 1);
        let graph = CellGraph::new(&cells, DEFAULT_TOLERANCE);
        let mut region = Region::from_interior(&cells, vec![0, 6]);

        let summary = merge_clusters(&cells, &graph, &mut region).unwrap();

        assert_eq!(summary.clusters_merged, 1);
        assert_eq!(summary.bridge_cells, 5);
        assert_eq!(region.interior, (0..7).collect::<Vec<_>>());
        assert!(region.exterior.is_empty());
        assert_eq!(find_clusters(&region.interior, &graph).len(), 1);
    }

    #[test]
    fn test_merge_prefers_closest_pair() {
        // 5x3 grid, three isolated cells on the middle row
        let cells = squares(5, 3);
        let graph = CellGraph::new(&cells, DEFAULT_TOLERANCE);
        let mut region = Region::from_interior(&cells, vec![5, 7, 9]);

        let summary = merge_clusters(&cells, &graph, &mut region).unwrap();

        assert_eq!(summary.clusters_merged, 2);
        assert_eq!(summary.bridge_cells, 2);
        assert_eq!(find_clusters(&region.interior, &graph).len(), 1);
        assert!(region.interior.contains(&6));
        assert!(region.interior.contains(&8));
    }

    #[test]
    fn test_merge_exhausted_without_exterior() {
        let cells = squares(3, 1);
        let graph = CellGraph::new(&cells, DEFAULT_TOLERANCE);
        let mut region = Region {
            interior: vec![0, 2],
            exterior: Vec::new(),
        };

        let result = merge_clusters(&cells, &graph, &mut region);
        assert!(matches!(result, Err(TrackError::SelectionExhausted(_))));
    }
}
