//! Region selection over the Voronoi diagram
//!
//! Builds the cell adjacency graph, picks the interior cells of the track and
//! merges them into a single connected cluster whose outline becomes the path.

mod cluster;
mod graph;
mod growth;

pub use cluster::{find_clusters, merge_clusters, MergeSummary};
pub use graph::{CellGraph, EdgeIndex, EdgeRef};
pub use growth::select_region;

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::cell::Cell;
use crate::config::TrackConfig;
use crate::error::Result;

/// Stream id of the selection RNG; grid sites use streams `0..cell_count`
const SELECTION_STREAM: u64 = u64::MAX;

/// Selected cells and the remaining pool
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    /// Sorted indices of the cells forming the track footprint
    pub interior: Vec<usize>,
    /// Sorted indices of valid cells not (yet) part of the footprint
    pub exterior: Vec<usize>,
}

impl Region {
    /// Region with the given interior; every other valid cell is exterior
    pub fn from_interior(cells: &[Cell], mut interior: Vec<usize>) -> Self {
        interior.sort_unstable();
        interior.dedup();

        let exterior = cells
            .iter()
            .filter(|c| c.valid && interior.binary_search(&c.index).is_err())
            .map(|c| c.index)
            .collect();

        Self { interior, exterior }
    }

    #[inline]
    pub fn contains(&self, cell: usize) -> bool {
        self.interior.binary_search(&cell).is_ok()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.interior.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.interior.is_empty()
    }
}

/// Deterministic RNG for every selection decision of a configuration
pub fn selection_rng(seed: u32) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));
    rng.set_stream(SELECTION_STREAM);
    rng
}

/// Select and merge the track footprint
///
/// Returns the connected region together with the graph it was computed on, so
/// callers can reuse the adjacency without rebuilding it.
pub fn carve_region(cells: &[Cell], config: &TrackConfig) -> Result<(Region, CellGraph, MergeSummary)> {
    let start = Instant::now();

    let graph = CellGraph::new(cells, config.tolerance);
    log::debug!("Built cell graph in {:.2?}", start.elapsed());

    let mut rng = selection_rng(config.seed);
    let mut region = select_region(cells, &graph, config, &mut rng)?;
    let summary = merge_clusters(cells, &graph, &mut region)?;

    log::debug!(
        "Selected {} cells ({}) with {} merges and {} bridge cells in {:.2?}",
        region.len(),
        config.selection.name(),
        summary.clusters_merged,
        summary.bridge_cells,
        start.elapsed()
    );

    Ok((region, graph, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackConfigBuilder;
    use crate::generation::generate_cells;

    #[test]
    fn test_carve_region_connected() {
        for seed in [1, 2, 3, 4] {
            let config = TrackConfigBuilder::new()
                .seed(seed)
                .for_cell_count(10)
                .unwrap()
                .build()
                .unwrap();
            let cells = generate_cells(&config).unwrap();

            let (region, graph, _) = carve_region(&cells, &config).unwrap();

            assert!(region.len() >= 10);
            assert_eq!(find_clusters(&region.interior, &graph).len(), 1);
            assert!(region.interior.iter().all(|&i| !region.exterior.contains(&i)));
        }
    }

    #[test]
    fn test_region_from_interior() {
        let config = TrackConfigBuilder::new().seed(8).grid(3, 3).unwrap().build().unwrap();
        let cells = generate_cells(&config).unwrap();

        let region = Region::from_interior(&cells, vec![4, 4, 1]);
        assert_eq!(region.interior, vec![1, 4]);
        assert!(region.contains(4));
        assert!(!region.contains(0));
        assert_eq!(region.len() + region.exterior.len(), cells.iter().filter(|c| c.valid).count());
    }
}
