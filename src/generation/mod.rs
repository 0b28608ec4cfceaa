//! Core Voronoi generation algorithm
//!
//! Generates bounded planar Voronoi cells from a jittered grid of sites by clipping
//! a shared bounding rectangle against perpendicular bisectors.

mod points;
mod voronoi;

pub use points::{generate_grid_points, grid_coordinate};
pub use voronoi::{build_cell, build_cells, BisectorSegment, Intersection};

use std::time::Instant;

use crate::cell::Cell;
use crate::config::TrackConfig;
use crate::error::{Result, TrackError};
use crate::geometry::Rect;

/// Generate the Voronoi cells for a configuration
///
/// Returns one cell per grid site in index order, including cells that failed
/// verification (`valid == false`).
pub fn generate_cells(config: &TrackConfig) -> Result<Vec<Cell>> {
    let start = Instant::now();

    // Step 1: One jittered site per grid square
    let points = generate_grid_points(
        config.plane_width,
        config.plane_height,
        config.cell_size,
        config.seed,
    );

    // Step 2: Padded bounding rectangle shared by every cell
    let bounds = Rect::from_points(&points, config.padding)
        .ok_or_else(|| TrackError::InvalidConfig("grid produced no sites".into()))?;

    // Step 3: Clip each cell independently
    let cells = build_cells(&points, &bounds, config.plane_width, config.tolerance);

    let invalid = cells.iter().filter(|c| !c.valid).count();
    if invalid > 0 {
        log::warn!("{} of {} cells failed verification", invalid, cells.len());
    }
    log::debug!(
        "Built {} Voronoi cells in {:.2?}",
        cells.len(),
        start.elapsed()
    );

    Ok(cells)
}
