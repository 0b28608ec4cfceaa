//! Closed track path extraction
//!
//! Turns the selected region into the final vertex loop: boundary extraction,
//! ordering, simplification and placement in world space.

mod boundary;

pub use boundary::{extract_boundary, order_boundary, BoundaryLoop};

use std::time::Instant;

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{Placement, TrackConfig};
use crate::error::{Result, TrackError};
use crate::geometry::{normalize, Segment};
use crate::generation::generate_cells;
use crate::region::carve_region;

/// The ordered closed centerline of a track
///
/// `vertices` repeats the first vertex at the end. The loop is non-self-intersecting
/// and wound clockwise when viewed against `normal`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPath {
    pub vertices: Vec<Vec3>,
    /// Unit up vector of the track plane
    pub normal: Vec3,
}

impl TrackPath {
    /// Create a path from a closed loop
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the loop is not closed or has fewer than three
    /// unique vertices.
    pub fn new(vertices: Vec<Vec3>, normal: Vec3) -> Result<Self> {
        if vertices.len() < 4 || vertices.first() != vertices.last() {
            return Err(TrackError::InvalidConfig(format!(
                "a track path needs a closed loop of at least 3 vertices (got {})",
                vertices.len()
            )));
        }
        Ok(Self {
            vertices,
            normal: normalize(normal),
        })
    }

    /// Loop vertices without the closing duplicate
    #[inline]
    pub fn points(&self) -> &[Vec3] {
        &self.vertices[..self.vertices.len() - 1]
    }

    /// Number of unique vertices
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.len() <= 1
    }

    /// Consecutive edges of the loop, including the closing one
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        self.vertices.windows(2).map(|w| Segment::new(w[0], w[1]))
    }

    /// Length of the polyline (not the spline)
    pub fn perimeter(&self) -> f32 {
        self.edges().map(|e| e.length()).sum()
    }

    /// Map the path from the generation plane into world space
    pub fn placed(&self, placement: &Placement) -> Self {
        let rotation = placement.rotation();
        Self {
            vertices: self.vertices.iter().map(|&v| placement.apply(v)).collect(),
            normal: normalize(rotation * self.normal),
        }
    }
}

/// Diagnostics collected while generating a path
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    /// Cells in the Voronoi diagram
    pub cells: usize,
    /// Cells that failed verification and were excluded
    pub invalid_cells: usize,
    /// Sorted indices of the cells forming the track footprint
    pub region: Vec<usize>,
    /// Cluster pairs fused during merging
    pub clusters_merged: usize,
    /// Exterior cells annexed to connect clusters
    pub bridge_cells: usize,
    /// Edges on the region outline (holes included)
    pub boundary_edges: usize,
    /// Outline edges dropped because they enclose holes
    pub holes_discarded: usize,
    /// Unique loop vertices before simplification
    pub raw_vertices: usize,
}

/// Remove vertices closer than `min_spacing` to their successor
///
/// `vertices` is a closed loop (last equals first). The first vertex is an anchor
/// and is never removed; its successor goes instead. After every removal the
/// predecessor is checked again so runs of close vertices collapse. The loop never
/// drops below three unique vertices.
pub fn simplify(vertices: &[Vec3], min_spacing: f32) -> Vec<Vec3> {
    let mut points: Vec<Vec3> = match vertices.split_last() {
        Some((_, rest)) => rest.to_vec(),
        None => return Vec::new(),
    };

    let mut i = 0;
    while i < points.len() && points.len() > 3 {
        let next = (i + 1) % points.len();
        if points[i].distance(points[next]) >= min_spacing {
            i += 1;
        } else if i == 0 {
            points.remove(next);
        } else {
            points.remove(i);
            i -= 1;
        }
    }

    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

/// Generate the closed track path for a configuration
///
/// Deterministic: the same configuration yields the identical path.
///
/// # Errors
///
/// - `InvalidConfig` for configurations failing [`TrackConfig::validate`]
/// - `SelectionExhausted` when the region cannot be selected or connected
/// - `Topology` when the region outline does not form a closed loop
///
/// # Example
///
/// ```rust
/// use voronoi_track::*;
///
/// let config = TrackConfigBuilder::new().seed(42).build().unwrap();
/// let path = generate_path(&config).unwrap();
///
/// assert!(path.len() >= 3);
/// assert_eq!(path.vertices.first(), path.vertices.last());
/// ```
pub fn generate_path(config: &TrackConfig) -> Result<TrackPath> {
    generate_path_with_report(config).map(|(path, _)| path)
}

/// Like [`generate_path`], also returning what each stage did
pub fn generate_path_with_report(config: &TrackConfig) -> Result<(TrackPath, GenerationReport)> {
    config.validate()?;
    let start = Instant::now();

    // Step 1: Voronoi diagram
    let cells = generate_cells(config)?;

    // Step 2: Track footprint
    let (region, _, summary) = carve_region(&cells, config)?;

    // Step 3: Outline as a single loop
    let edges = extract_boundary(&cells, &region, config.tolerance);
    let outline = order_boundary(&edges, config.tolerance)?;

    // Step 4: Simplify and place
    let raw_vertices = outline.vertices.len() - 1;
    let vertices = simplify(&outline.vertices, config.min_vertex_spacing());
    let path = TrackPath::new(vertices, Vec3::Z)?.placed(&config.placement);

    let report = GenerationReport {
        cells: cells.len(),
        invalid_cells: cells.iter().filter(|c| !c.valid).count(),
        region: region.interior,
        clusters_merged: summary.clusters_merged,
        bridge_cells: summary.bridge_cells,
        boundary_edges: edges.len(),
        holes_discarded: outline.discarded,
        raw_vertices,
    };

    log::info!(
        "Generated track path: {} vertices ({} before simplification) from {} cells in {:.2?}",
        path.len(),
        raw_vertices,
        report.region.len(),
        start.elapsed()
    );

    Ok((path, report))
}
